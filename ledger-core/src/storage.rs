//! Append-only transaction log
//!
//! One JSON-encoded transaction per line. The file is opened in
//! append+read mode: writes always land at the end regardless of the read
//! cursor, and existing bytes are never rewritten or truncated.
//!
//! A crash or failed write can leave the last line unterminated. The next
//! append then starts with a newline so the torn bytes stay on their own
//! line and never merge with a fresh record.

use crate::error::{Error, Result};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// Raw log line with its 1-based position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    /// Line number in the file
    pub line: usize,
    /// Line content without the newline
    pub bytes: Vec<u8>,
}

/// Failure injected into the next log operation
#[cfg(test)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Fault {
    /// Write half of the next record, then fail
    TornAppend,
    /// Fail the next `read_all`
    Read,
}

/// File-backed transaction log
#[derive(Debug)]
pub struct TxLog {
    file: File,
    path: PathBuf,
    sync_on_append: bool,
    /// Whether the file ends mid-line; `None` until checked
    torn_tail: Option<bool>,
    #[cfg(test)]
    fault: Option<Fault>,
}

impl TxLog {
    /// Open or create the log
    pub fn open(path: impl AsRef<Path>, sync_on_append: bool) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let file = OpenOptions::new()
            .read(true)
            .append(true)
            .create(true)
            .open(&path)
            .map_err(|e| Error::storage(format!("open {}", path.display()), e))?;

        tracing::info!(path = %path.display(), "Opened transaction log");

        Ok(Self {
            file,
            path,
            sync_on_append,
            torn_tail: None,
            #[cfg(test)]
            fault: None,
        })
    }

    /// Log location
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every line from the beginning
    pub fn records(&mut self) -> Result<Vec<LogRecord>> {
        self.seek(SeekFrom::Start(0))?;

        let mut reader = BufReader::new(&self.file);
        let mut records = Vec::new();
        let mut buf = Vec::new();
        let mut line = 0;

        loop {
            buf.clear();
            let read = reader
                .read_until(b'\n', &mut buf)
                .map_err(|e| Error::storage(format!("read {}", self.path.display()), e))?;
            if read == 0 {
                break;
            }
            line += 1;
            if buf.last() == Some(&b'\n') {
                buf.pop();
            }
            records.push(LogRecord {
                line,
                bytes: buf.clone(),
            });
        }

        Ok(records)
    }

    /// Append one record followed by a newline
    pub fn append(&mut self, record: &[u8]) -> Result<()> {
        let torn = match self.torn_tail {
            Some(torn) => torn,
            None => self.tail_is_torn()?,
        };

        let mut line = Vec::with_capacity(record.len() + 2);
        if torn {
            tracing::warn!(path = %self.path.display(), "Log ends mid-line, terminating it");
            line.push(b'\n');
        }
        line.extend_from_slice(record);
        line.push(b'\n');

        if let Err(e) = self.write_line(&line) {
            // A partial write may have reached the file.
            self.torn_tail = None;
            return Err(e);
        }
        self.torn_tail = Some(false);

        if self.sync_on_append {
            self.file
                .sync_data()
                .map_err(|e| Error::storage(format!("sync {}", self.path.display()), e))?;
        }

        Ok(())
    }

    /// Entire current content
    pub fn read_all(&mut self) -> Result<Vec<u8>> {
        #[cfg(test)]
        if self.fault == Some(Fault::Read) {
            self.fault = None;
            return Err(Error::storage("read", injected()));
        }

        self.seek(SeekFrom::Start(0))?;

        let mut content = Vec::new();
        (&self.file)
            .read_to_end(&mut content)
            .map_err(|e| Error::storage(format!("read {}", self.path.display()), e))?;
        Ok(content)
    }

    /// Current size in bytes
    pub fn len(&self) -> Result<u64> {
        self.file
            .metadata()
            .map(|m| m.len())
            .map_err(|e| Error::storage(format!("stat {}", self.path.display()), e))
    }

    /// Release the file handle
    pub fn close(self) {
        drop(self.file);
        tracing::debug!(path = %self.path.display(), "Transaction log closed");
    }

    #[cfg(test)]
    pub(crate) fn inject(&mut self, fault: Fault) {
        self.fault = Some(fault);
    }

    fn write_line(&mut self, line: &[u8]) -> Result<()> {
        #[cfg(test)]
        if self.fault == Some(Fault::TornAppend) {
            self.fault = None;
            let _ = self.file.write_all(&line[..line.len() / 2]);
            return Err(Error::storage("append", injected()));
        }

        self.file
            .write_all(line)
            .and_then(|_| self.file.flush())
            .map_err(|e| Error::storage(format!("append to {}", self.path.display()), e))
    }

    fn tail_is_torn(&mut self) -> Result<bool> {
        if self.len()? == 0 {
            return Ok(false);
        }

        self.seek(SeekFrom::End(-1))?;
        let mut last = [0u8; 1];
        (&self.file)
            .read_exact(&mut last)
            .map_err(|e| Error::storage(format!("read {}", self.path.display()), e))?;
        Ok(last[0] != b'\n')
    }

    fn seek(&mut self, pos: SeekFrom) -> Result<()> {
        self.file
            .seek(pos)
            .map(|_| ())
            .map_err(|e| Error::storage(format!("seek {}", self.path.display()), e))
    }
}

#[cfg(test)]
fn injected() -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::Other, "injected fault")
}
