//! Input payload shared by every trial of a sweep.
//!
//! Each trial opens its own reader; the handle lives only as long as the trial body.

use std::fmt;
use std::fs::File;
use std::io::{self, BufReader, Cursor, ErrorKind, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::Result;

#[derive(Debug, Clone)]
pub enum PayloadSource {
    File(PathBuf),
    Memory(Arc<[u8]>),
}

impl PayloadSource {
    pub fn file(path: impl AsRef<Path>) -> Self {
        Self::File(path.as_ref().to_path_buf())
    }

    pub fn memory(bytes: impl Into<Vec<u8>>) -> Self {
        Self::Memory(Arc::from(bytes.into()))
    }

    /// Opens a fresh buffered reader over the payload.
    pub fn open(&self) -> Result<Box<dyn Read>> {
        match self {
            Self::File(path) => Ok(Box::new(BufReader::new(File::open(path)?))),
            Self::Memory(bytes) => Ok(Box::new(Cursor::new(Arc::clone(bytes)))),
        }
    }

    pub fn read_all(&self) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        self.open()?.read_to_end(&mut buffer)?;
        Ok(buffer)
    }

    /// Feeds the payload to `f` in chunks of `chunk_size` bytes; only the last may be shorter.
    pub fn for_each_chunk<F>(&self, chunk_size: usize, mut f: F) -> Result<()>
    where
        F: FnMut(&[u8]) -> Result<()>,
    {
        let mut reader = self.open()?;
        let mut buffer = vec![0u8; chunk_size.max(1)];
        loop {
            let filled = fill_chunk(&mut reader, &mut buffer)?;
            if filled == 0 {
                return Ok(());
            }
            f(&buffer[..filled])?;
            if filled < buffer.len() {
                return Ok(());
            }
        }
    }
}

impl fmt::Display for PayloadSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Memory(bytes) => write!(f, "<{} bytes in memory>", bytes.len()),
        }
    }
}

fn fill_chunk(reader: &mut dyn Read, buffer: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buffer.len() {
        match reader.read(&mut buffer[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
