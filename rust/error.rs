use std::fmt;
use std::num::ParseIntError;

use thiserror::Error;

/// The fields that may appear at most once on an input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    BirthDate,
    PhoneNumber,
    Gender,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Field::BirthDate => write!(f, "даты рождения"),
            Field::PhoneNumber => write!(f, "номера телефона"),
            Field::Gender => write!(f, "пола"),
        }
    }
}

/// Everything that can be wrong with a line the user typed.
#[derive(Error, Debug, PartialEq)]
pub enum ValidationError {
    #[error("Ожидалось 6 параметров, получено {found}.")]
    WrongTokenCount { found: usize },

    #[error("Найдено более одного значения {0}.")]
    DuplicateField(Field),

    #[error("Неверный формат или несуществующая дата: {token}")]
    InvalidDateFormat { token: String },
    #[error("Неверный формат или несуществующая дата: {token} (месяц {month} вне диапазона 1-12)")]
    InvalidMonth { token: String, month: u32 },
    #[error("Неверный формат или несуществующая дата: {token} (день {day}, в этом месяце {max} дней)")]
    InvalidDay { token: String, day: u32, max: u32 },

    #[error("Неверный формат номера телефона: {token}")]
    NumericParseError {
        token: String,
        #[source]
        source: ParseIntError,
    },

    #[error("Неверное количество данных для Ф.И.О. Ожидалось 3 значения, получено {found}.")]
    WrongNameCount { found: usize },

    #[error("Не все обязательные параметры введены или они имеют неверный формат.")]
    MissingRequiredField,
}

/// Failure of a whole submission: either the line was bad or the file was.
#[derive(Error, Debug)]
pub enum SubmitError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error("не удалось дописать запись в файл {file_name}")]
    Write {
        file_name: String,
        #[source]
        source: std::io::Error,
    },
}

#[test]
fn test_duplicate_messages() {
    assert_eq!(
        ValidationError::DuplicateField(Field::BirthDate).to_string(),
        "Найдено более одного значения даты рождения."
    );
    assert_eq!(
        ValidationError::DuplicateField(Field::PhoneNumber).to_string(),
        "Найдено более одного значения номера телефона."
    );
    assert_eq!(
        ValidationError::DuplicateField(Field::Gender).to_string(),
        "Найдено более одного значения пола."
    );
}

#[test]
fn test_count_messages() {
    assert_eq!(
        ValidationError::WrongTokenCount { found: 4 }.to_string(),
        "Ожидалось 6 параметров, получено 4."
    );
    assert_eq!(
        ValidationError::WrongNameCount { found: 2 }.to_string(),
        "Неверное количество данных для Ф.И.О. Ожидалось 3 значения, получено 2."
    );
}
