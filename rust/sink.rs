use std::collections::BTreeMap;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::PathBuf;

/// Where accepted records go. `file_name` is the per-surname target, e.g.
/// `Ivanov.txt`; `record` already ends in a newline.
pub trait RecordSink {
    fn append(&mut self, file_name: &str, record: &str) -> io::Result<()>;
}

/// Appends to real files under `dir`, creating them on first use.
#[derive(Debug, Clone)]
pub struct FileSink {
    dir: PathBuf,
}

impl FileSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_of(&self, file_name: &str) -> PathBuf {
        self.dir.join(file_name)
    }
}

impl RecordSink for FileSink {
    fn append(&mut self, file_name: &str, record: &str) -> io::Result<()> {
        let path = self.path_of(file_name);
        let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
        file.write_all(record.as_bytes())?;
        tracing::debug!(path = %path.display(), bytes = record.len(), "record appended");
        Ok(())
    }
}

/// Keeps appended text in memory, keyed by file name.
#[derive(Debug, Default)]
pub struct MemorySink {
    files: BTreeMap<String, String>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self, file_name: &str) -> Option<&str> {
        self.files.get(file_name).map(String::as_str)
    }
}

impl RecordSink for MemorySink {
    fn append(&mut self, file_name: &str, record: &str) -> io::Result<()> {
        self.files
            .entry(file_name.to_string())
            .or_default()
            .push_str(record);
        Ok(())
    }
}

#[test]
fn test_memory_sink_accumulates() {
    let mut sink = MemorySink::new();
    sink.append("A.txt", "one\n").unwrap();
    sink.append("B.txt", "two\n").unwrap();
    sink.append("A.txt", "three\n").unwrap();
    assert_eq!(sink.contents("A.txt"), Some("one\nthree\n"));
    assert_eq!(sink.contents("B.txt"), Some("two\n"));
    assert_eq!(sink.contents("C.txt"), None);
}
