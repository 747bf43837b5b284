use std::fs;
use std::io::Write;
use std::process::{Command, Stdio};

use intake::{submit, FileSink, SubmitError, ValidationError};

#[test_log::test]
fn test_appends_per_surname() {
    let dir = tempfile::tempdir().unwrap();
    let mut sink = FileSink::new(dir.path());

    let name = submit("Ivanov Ivan Ivanovich 15.05.1990 1234567890 m", &mut sink).unwrap();
    assert_eq!(name, "Ivanov.txt");
    submit("f 29.02.2024 Ivanov 42 Maria Petrovna", &mut sink).unwrap();
    submit("Sidorov Oleg Olegovich 31.12.2024 1 M", &mut sink).unwrap();

    assert_eq!(
        fs::read_to_string(dir.path().join("Ivanov.txt")).unwrap(),
        "Ivanov Ivan Ivanovich 15.05.1990 1234567890 m\nIvanov Maria Petrovna 29.02.2024 42 f\n"
    );
    assert_eq!(
        fs::read_to_string(dir.path().join("Sidorov.txt")).unwrap(),
        "Sidorov Oleg Olegovich 31.12.2024 1 m\n"
    );
}

#[test_log::test]
fn test_rejected_line_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let mut sink = FileSink::new(dir.path());

    let err = submit("Petrova Anna Sergeevna 31.02.1985 555 f", &mut sink).unwrap_err();
    assert!(matches!(
        err,
        SubmitError::Invalid(ValidationError::InvalidDay { .. })
    ));
    let err = submit("OnlyFour Tokens Here 01.01.2000", &mut sink).unwrap_err();
    assert!(matches!(
        err,
        SubmitError::Invalid(ValidationError::WrongTokenCount { found: 4 })
    ));

    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test_log::test]
fn test_write_failure_is_not_a_validation_error() {
    let dir = tempfile::tempdir().unwrap();
    let mut sink = FileSink::new(dir.path().join("missing"));

    match submit("Ivanov Ivan Ivanovich 15.05.1990 1234567890 m", &mut sink) {
        Err(SubmitError::Write { file_name, source }) => {
            assert_eq!(file_name, "Ivanov.txt");
            assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
        }
        other => panic!("expected a write error, got {other:?}"),
    }
}

fn run_binary(dir: &std::path::Path, stdin: impl AsRef<[u8]>) -> std::process::Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_enter-record"))
        .current_dir(dir)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    child
        .stdin
        .take()
        .unwrap()
        .write_all(stdin.as_ref())
        .unwrap();
    child.wait_with_output().unwrap()
}

#[test]
fn test_binary_success() {
    let dir = tempfile::tempdir().unwrap();
    let out = run_binary(dir.path(), "Ivanov Ivan Ivanovich 15.05.1990 1234567890 m\n");

    assert!(out.status.success());
    let stdout = String::from_utf8(out.stdout).unwrap();
    assert!(stdout.starts_with(intake::config::DEFAULT_PROMPT));
    assert!(stdout.contains("Данные успешно записаны в файл: Ivanov.txt"));
    assert_eq!(
        fs::read_to_string(dir.path().join("Ivanov.txt")).unwrap(),
        "Ivanov Ivan Ivanovich 15.05.1990 1234567890 m\n"
    );
}

#[test]
fn test_binary_rejects() {
    let dir = tempfile::tempdir().unwrap();
    let out = run_binary(dir.path(), "Petrova Anna Sergeevna 31.02.1985 555 f\n");

    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8(out.stderr).unwrap();
    assert!(stderr.contains("Ошибка: Неверный формат или несуществующая дата: 31.02.1985"));
    assert!(!dir.path().join("Petrova.txt").exists());
}

#[test]
fn test_binary_reads_one_line_only() {
    let dir = tempfile::tempdir().unwrap();
    let out = run_binary(
        dir.path(),
        "OnlyFour Tokens Here 01.01.2000\nIvanov Ivan Ivanovich 15.05.1990 1234567890 m\n",
    );

    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8(out.stderr).unwrap();
    assert!(stderr.contains("Ожидалось 6 параметров, получено 4."));
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn test_binary_empty_stdin() {
    let dir = tempfile::tempdir().unwrap();
    let out = run_binary(dir.path(), "");
    assert_eq!(out.status.code(), Some(3));
}

#[test]
fn test_binary_accepts_non_utf8_line() {
    let dir = tempfile::tempdir().unwrap();
    // cp1251 surname followed by the remaining fields
    let mut line = b"\xC8\xE2\xE0\xED\xEE\xE2".to_vec();
    line.extend_from_slice(b" Ivan Ivanovich 15.05.1990 1234567890 m\n");
    let out = run_binary(dir.path(), line);

    assert!(out.status.success());
    let surname = "\u{FFFD}".repeat(6);
    let stdout = String::from_utf8(out.stdout).unwrap();
    assert!(stdout.contains(&format!("Данные успешно записаны в файл: {surname}.txt")));
    assert_eq!(
        fs::read_to_string(dir.path().join(format!("{surname}.txt"))).unwrap(),
        format!("{surname} Ivan Ivanovich 15.05.1990 1234567890 m\n")
    );
}

#[test]
fn test_binary_reports_write_failure() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir(dir.path().join("Ivanov.txt")).unwrap();
    let out = run_binary(dir.path(), "Ivanov Ivan Ivanovich 15.05.1990 1234567890 m\n");

    assert_eq!(out.status.code(), Some(2));
    let stdout = String::from_utf8(out.stdout).unwrap();
    assert!(!stdout.contains("Данные успешно записаны"));
    let stderr = String::from_utf8(out.stderr).unwrap();
    assert!(stderr.contains("Ошибка при работе с файлом:"));
    assert!(stderr.contains("append to Ivanov.txt"));
    assert!(stderr.contains("Caused by:"));
    assert!(!stderr.contains("Ошибка: "));
    assert!(fs::metadata(dir.path().join("Ivanov.txt")).unwrap().is_dir());
}
