//! Console destination

use std::io::{self, Write};
use std::sync::Mutex;

use super::LogError;

/// Unbuffered console writer
///
/// Every write is flushed immediately so lines are visible even if the
/// process dies right after.
pub struct Console {
    writer: Mutex<Box<dyn Write + Send>>,
}

impl Console {
    /// Console backed by the process's standard output
    pub fn stdout() -> Self {
        Self::with_writer(Box::new(io::stdout()))
    }

    /// Console backed by an arbitrary writer
    pub fn with_writer(writer: Box<dyn Write + Send>) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Write `text` exactly as given and flush
    pub fn write(&self, text: &str) -> Result<(), LogError> {
        let mut writer = match self.writer.lock() {
            Ok(writer) => writer,
            Err(poisoned) => poisoned.into_inner(),
        };
        writer
            .write_all(text.as_bytes())
            .map_err(LogError::Console)?;
        writer.flush().map_err(LogError::Console)
    }
}

impl std::fmt::Debug for Console {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Console").finish_non_exhaustive()
    }
}

/// Writer that appends into a shared in-memory buffer
#[cfg(test)]
#[derive(Clone, Default)]
pub(crate) struct CapturedOutput {
    bytes: std::sync::Arc<Mutex<Vec<u8>>>,
}

#[cfg(test)]
impl CapturedOutput {
    pub(crate) fn contents(&self) -> String {
        String::from_utf8(self.bytes.lock().unwrap().clone()).unwrap()
    }

    pub(crate) fn console(&self) -> Console {
        Console::with_writer(Box::new(self.clone()))
    }
}

#[cfg(test)]
impl Write for CapturedOutput {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.bytes.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
