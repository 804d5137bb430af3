//! Log file writers shared by the process logger and job loggers.

use std::fs::{self, File};
use std::io;
use std::path::Path;
use tracing_subscriber::fmt::MakeWriter;

use crate::config::LogMode;

/// Where one log record goes: the job or master log file, or stderr if its
/// handle could not be duplicated for this record.
pub(crate) enum LogSink {
    File(File),
    Stderr(io::Stderr),
}

impl io::Write for LogSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            LogSink::File(file) => file.write(buf),
            LogSink::Stderr(stderr) => stderr.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            LogSink::File(file) => file.flush(),
            LogSink::Stderr(stderr) => stderr.flush(),
        }
    }
}

/// Hands every event a clone of the same open log file.
pub(crate) struct LogFile(File);

impl LogFile {
    pub(crate) fn open(path: &Path, mode: LogMode) -> io::Result<Self> {
        let mut options = fs::OpenOptions::new();
        options.create(true);
        match mode {
            LogMode::Append => options.append(true),
            LogMode::Write => options.write(true).truncate(true),
        };
        Ok(Self(options.open(path)?))
    }
}

impl<'a> MakeWriter<'a> for LogFile {
    type Writer = LogSink;

    fn make_writer(&'a self) -> Self::Writer {
        match self.0.try_clone() {
            Ok(file) => LogSink::File(file),
            Err(_) => LogSink::Stderr(io::stderr()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn append_keeps_and_write_truncates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("job.log");
        fs::write(&path, "old\n").unwrap();

        let writer = LogFile::open(&path, LogMode::Append).unwrap();
        writer.make_writer().write_all(b"new\n").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "old\nnew\n");

        let writer = LogFile::open(&path, LogMode::Write).unwrap();
        writer.make_writer().write_all(b"fresh\n").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "fresh\n");
    }
}
