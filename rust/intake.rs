use std::io::{BufRead, Write};

use anyhow::anyhow;

pub mod config;
pub mod date;
pub mod error;
pub mod sink;

pub use config::Config;
pub use date::BirthDate;
pub use error::{Field, SubmitError, ValidationError};
pub use sink::{FileSink, MemorySink, RecordSink};

pub const TOKEN_COUNT: usize = 6;
pub const NAME_COUNT: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gender {
    Female,
    Male,
}

impl Gender {
    /// Accepts exactly one character, `f` or `m` in either case.
    pub fn of_token(s: &str) -> Option<Self> {
        let mut chars = s.chars();
        let c = chars.next()?;
        if chars.next().is_some() {
            return None;
        }
        match c {
            'f' | 'F' => Some(Gender::Female),
            'm' | 'M' => Some(Gender::Male),
            _ => None,
        }
    }
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Gender::Female => write!(f, "f"),
            Gender::Male => write!(f, "m"),
        }
    }
}

/// What a single token looks like. Dates and numbers are only shape-checked
/// here; their values are checked once we know they are not duplicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tok<'a> {
    Date(&'a str),
    Number(&'a str),
    Gender(Gender),
    Name(&'a str),
}

pub fn classify_token(s: &str) -> Tok<'_> {
    if date::is_date_shaped(s) {
        Tok::Date(s)
    } else if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) {
        Tok::Number(s)
    } else if let Some(g) = Gender::of_token(s) {
        Tok::Gender(g)
    } else {
        Tok::Name(s)
    }
}

#[test]
fn test_classify_token() {
    assert_eq!(classify_token("15.05.1990"), Tok::Date("15.05.1990"));
    assert_eq!(classify_token("31.02.1985"), Tok::Date("31.02.1985"));
    assert_eq!(classify_token("0123"), Tok::Number("0123"));
    assert_eq!(classify_token("F"), Tok::Gender(Gender::Female));
    assert_eq!(classify_token("m"), Tok::Gender(Gender::Male));
    assert_eq!(classify_token("x"), Tok::Name("x"));
    assert_eq!(classify_token("fm"), Tok::Name("fm"));
    assert_eq!(classify_token("+79991234567"), Tok::Name("+79991234567"));
    assert_eq!(classify_token("15.5.1990"), Tok::Name("15.5.1990"));
    assert_eq!(classify_token("Иванов"), Tok::Name("Иванов"));
}

/// Fields collected while walking the tokens of one line.
#[derive(Debug, Default)]
struct ParseState<'a> {
    birth_date: Option<BirthDate>,
    phone_number: Option<u64>,
    gender: Option<Gender>,
    names: Vec<&'a str>,
}

impl<'a> ParseState<'a> {
    fn absorb(&mut self, tok: Tok<'a>) -> Result<(), ValidationError> {
        match tok {
            Tok::Date(s) => {
                if self.birth_date.is_some() {
                    return Err(ValidationError::DuplicateField(Field::BirthDate));
                }
                self.birth_date = Some(BirthDate::parse(s)?);
            }
            Tok::Number(s) => {
                if self.phone_number.is_some() {
                    return Err(ValidationError::DuplicateField(Field::PhoneNumber));
                }
                let n = s
                    .parse::<u64>()
                    .map_err(|source| ValidationError::NumericParseError {
                        token: s.to_string(),
                        source,
                    })?;
                self.phone_number = Some(n);
            }
            Tok::Gender(g) => {
                if self.gender.is_some() {
                    return Err(ValidationError::DuplicateField(Field::Gender));
                }
                self.gender = Some(g);
            }
            Tok::Name(s) => self.names.push(s),
        }
        Ok(())
    }

    fn finish(self) -> Result<Record, ValidationError> {
        let names: [&str; NAME_COUNT] =
            self.names
                .as_slice()
                .try_into()
                .map_err(|_| ValidationError::WrongNameCount {
                    found: self.names.len(),
                })?;
        let [surname, first_name, patronymic] = names;
        match (self.birth_date, self.phone_number, self.gender) {
            (Some(birth_date), Some(phone_number), Some(gender)) => Ok(Record {
                surname: surname.to_string(),
                first_name: first_name.to_string(),
                patronymic: patronymic.to_string(),
                birth_date,
                phone_number,
                gender,
            }),
            _ => Err(ValidationError::MissingRequiredField),
        }
    }
}

/// One accepted person. `Display` gives the six-field line without its
/// trailing newline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub surname: String,
    pub first_name: String,
    pub patronymic: String,
    pub birth_date: BirthDate,
    pub phone_number: u64,
    pub gender: Gender,
}

impl Record {
    pub fn file_name(&self) -> String {
        format!("{}.txt", self.surname)
    }

    pub fn to_line(&self) -> String {
        format!("{self}\n")
    }
}

impl std::fmt::Display for Record {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "{} {} {} {} {} {}",
            self.surname,
            self.first_name,
            self.patronymic,
            self.birth_date,
            self.phone_number,
            self.gender
        )
    }
}

/// Whitespace-separated tokens. A byte order mark counts as whitespace too,
/// so a line pasted from a BOM-prefixed file still splits cleanly.
pub fn split_tokens(input: &str) -> impl Iterator<Item = &str> {
    input
        .split(|c: char| c.is_whitespace() || c == '\u{FEFF}')
        .filter(|s| !s.is_empty())
}

/// Parses one input line. Fields may come in any order as long as each
/// shape occurs the right number of times; the first three unrecognised
/// tokens are surname, first name and patronymic.
pub fn process(input: &str) -> Result<(Record, String), ValidationError> {
    let toks: Vec<&str> = split_tokens(input).collect();
    if toks.len() != TOKEN_COUNT {
        return Err(ValidationError::WrongTokenCount { found: toks.len() });
    }

    let mut state = ParseState::default();
    for s in toks {
        let tok = classify_token(s);
        tracing::debug!(token = s, kind = ?tok, "classified");
        state.absorb(tok)?;
    }

    let record = state.finish()?;
    let file_name = record.file_name();
    Ok((record, file_name))
}

/// Validates the line and, if it is good, hands the record to `sink`.
/// Returns the file name that was written.
pub fn submit<S: RecordSink>(input: &str, sink: &mut S) -> Result<String, SubmitError> {
    let (record, file_name) = process(input)?;
    sink.append(&file_name, &record.to_line())
        .map_err(|source| SubmitError::Write {
            file_name: file_name.clone(),
            source,
        })?;
    tracing::info!(file = %file_name, "record stored");
    Ok(file_name)
}

/// Writes the prompt on its own line and waits for exactly one line of
/// input. Only the line terminator is stripped. Bytes that are not UTF-8
/// are replaced with U+FFFD rather than rejected.
pub fn prompt_and_read<R: BufRead, W: Write>(
    prompt: &str,
    input: &mut R,
    output: &mut W,
) -> anyhow::Result<String> {
    writeln!(output, "{prompt}")?;
    output.flush()?;

    let mut buf = vec![];
    if input.read_until(b'\n', &mut buf)? == 0 {
        return Err(anyhow!("stdin closed before a line was read"));
    }
    let mut line = String::from_utf8_lossy(&buf).into_owned();
    if line.ends_with('\n') {
        line.pop();
        if line.ends_with('\r') {
            line.pop();
        }
    }
    Ok(line)
}

/// Installs a stderr `fmt` subscriber filtered at [`config::LOG_DIRECTIVE`].
pub fn init_logging() {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::new(config::LOG_DIRECTIVE);
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init();
}

#[test]
fn test_scenario_ivanov() {
    let (record, file) = process("Ivanov Ivan Ivanovich 15.05.1990 1234567890 m").unwrap();
    assert_eq!(file, "Ivanov.txt");
    assert_eq!(record.to_line(), "Ivanov Ivan Ivanovich 15.05.1990 1234567890 m\n");
}

#[test]
fn test_byte_order_mark() {
    let (record, file) = process("\u{FEFF}Ivanov Ivan Ivanovich 15.05.1990 1234567890 m").unwrap();
    assert_eq!(file, "Ivanov.txt");
    assert_eq!(record.surname, "Ivanov");
    assert_eq!(split_tokens(" a\u{FEFF}b  c ").collect::<Vec<_>>(), vec!["a", "b", "c"]);
}

#[test]
fn test_any_order() {
    let (record, file) = process("  M 15.05.1990 Ivanov 1234567890 Ivan\tIvanovich ").unwrap();
    assert_eq!(file, "Ivanov.txt");
    assert_eq!(record.to_string(), "Ivanov Ivan Ivanovich 15.05.1990 1234567890 m");
}

#[test]
fn test_feb_31() {
    assert_eq!(
        process("Petrova Anna Sergeevna 31.02.1985 555 f"),
        Err(ValidationError::InvalidDay {
            token: "31.02.1985".into(),
            day: 31,
            max: 28
        })
    );
}

#[test]
fn test_token_count() {
    assert_eq!(
        process("OnlyFour Tokens Here 01.01.2000"),
        Err(ValidationError::WrongTokenCount { found: 4 })
    );
    assert_eq!(process(""), Err(ValidationError::WrongTokenCount { found: 0 }));
    assert_eq!(
        process("a b c 01.01.2000 1 f extra"),
        Err(ValidationError::WrongTokenCount { found: 7 })
    );
}

#[test]
fn test_duplicates() {
    assert_eq!(
        process("A B 01.01.2000 01.01.2000 1 f"),
        Err(ValidationError::DuplicateField(Field::BirthDate))
    );
    // the second date is impossible, but the duplicate is seen first
    assert_eq!(
        process("A B 01.01.2000 99.99.2000 1 f"),
        Err(ValidationError::DuplicateField(Field::BirthDate))
    );
    assert_eq!(
        process("A B C 01.01.2000 1 2"),
        Err(ValidationError::DuplicateField(Field::PhoneNumber))
    );
    assert_eq!(
        process("A B 01.01.2000 1 f M"),
        Err(ValidationError::DuplicateField(Field::Gender))
    );
}

#[test]
fn test_name_count() {
    // "x" is not a gender, so it becomes a fourth name
    assert_eq!(
        process("A B C 01.01.2000 1 x"),
        Err(ValidationError::WrongNameCount { found: 4 })
    );
    assert_eq!(
        process("A 01.01.2000 1 f"),
        Err(ValidationError::WrongTokenCount { found: 4 })
    );
}

#[test]
fn test_gender_case() {
    for (g, want) in [("F", "f"), ("f", "f"), ("M", "m"), ("m", "m")] {
        let (record, _) = process(&format!("A B C 01.01.2000 1 {g}")).unwrap();
        assert_eq!(record.gender.to_string(), want);
    }
}

#[test]
fn test_phone_number() {
    let (record, _) = process("A B C 01.01.2000 007 f").unwrap();
    assert_eq!(record.phone_number, 7);
    assert_eq!(record.to_line(), "A B C 01.01.2000 7 f\n");

    let (record, _) = process("A B C 01.01.2000 18446744073709551615 f").unwrap();
    assert_eq!(record.phone_number, u64::MAX);

    assert!(matches!(
        process("A B C 01.01.2000 18446744073709551616 f"),
        Err(ValidationError::NumericParseError { .. })
    ));
}

#[test]
fn test_submit_to_memory() {
    let mut sink = MemorySink::new();
    assert_eq!(
        submit("Ivanov Ivan Ivanovich 15.05.1990 1234567890 m", &mut sink).unwrap(),
        "Ivanov.txt"
    );
    submit("Ivanov Petr Ivanovich 01.01.2000 5 m", &mut sink).unwrap();
    assert_eq!(
        sink.contents("Ivanov.txt"),
        Some("Ivanov Ivan Ivanovich 15.05.1990 1234567890 m\nIvanov Petr Ivanovich 01.01.2000 5 m\n")
    );

    assert!(matches!(
        submit("Petrova Anna Sergeevna 31.02.1985 555 f", &mut sink),
        Err(SubmitError::Invalid(ValidationError::InvalidDay { .. }))
    ));
    assert_eq!(sink.contents("Petrova.txt"), None);
}

#[test]
fn test_prompt_and_read() {
    let mut input = std::io::Cursor::new("  a b c \r\nnext line\n");
    let mut output = vec![];
    let line = prompt_and_read("Prompt:", &mut input, &mut output).unwrap();
    assert_eq!(line, "  a b c ");
    assert_eq!(output, b"Prompt:\n");
}

#[test]
fn test_prompt_and_read_eof() {
    let mut input = std::io::Cursor::new("");
    let mut output = vec![];
    assert!(prompt_and_read("Prompt:", &mut input, &mut output).is_err());

    let mut input = std::io::Cursor::new("no newline");
    assert_eq!(prompt_and_read("", &mut input, &mut output).unwrap(), "no newline");
}

#[test]
fn test_prompt_and_read_not_utf8() {
    // "Иванов" in cp1251
    let mut input = std::io::Cursor::new(b"\xC8\xE2\xE0\xED\xEE\xE2 Ivan\n".to_vec());
    let mut output = vec![];
    let line = prompt_and_read("", &mut input, &mut output).unwrap();
    assert_eq!(line, "\u{FFFD}\u{FFFD}\u{FFFD}\u{FFFD}\u{FFFD}\u{FFFD} Ivan");
}
