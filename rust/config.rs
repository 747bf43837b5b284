use std::path::PathBuf;

pub const DEFAULT_PROMPT: &str =
    "Введите данные через пробел (Фамилия Имя Отчество дата_рождения номер_телефона пол):";

/// `tracing_subscriber::EnvFilter` directive used for every run.
pub const LOG_DIRECTIVE: &str = "warn";

/// Settings for one run. Only ever built in code; the program takes no
/// flags and reads no environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub prompt: String,
    /// Directory the `<surname>.txt` files are written to.
    pub output_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            prompt: DEFAULT_PROMPT.to_string(),
            output_dir: PathBuf::from("."),
        }
    }
}
