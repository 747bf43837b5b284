use std::io;
use std::process::ExitCode;

use intake::{Config, FileSink, SubmitError};

pub fn main() -> ExitCode {
    let config = Config::default();
    intake::init_logging();

    let line = match intake::prompt_and_read(&config.prompt, &mut io::stdin().lock(), &mut io::stdout()) {
        Ok(line) => line,
        Err(e) => {
            tracing::warn!(error = %e, "no input");
            eprintln!("Ошибка: {e}");
            return ExitCode::from(3);
        }
    };

    let mut sink = FileSink::new(config.output_dir.clone());
    match intake::submit(&line, &mut sink) {
        Ok(file_name) => {
            println!("Данные успешно записаны в файл: {file_name}");
            ExitCode::SUCCESS
        }
        Err(SubmitError::Invalid(e)) => {
            eprintln!("Ошибка: {e}");
            ExitCode::from(1)
        }
        Err(SubmitError::Write { file_name, source }) => {
            tracing::error!(
                file = %file_name,
                path = %sink.path_of(&file_name).display(),
                error = ?source,
                "append failed"
            );
            eprintln!("Ошибка при работе с файлом:");
            eprintln!("{:?}", anyhow::Error::new(source).context(format!("append to {file_name}")));
            ExitCode::from(2)
        }
    }
}
