//! Terminal I/O for the views.
//!
//! Rendered views go to `out`; notices, prompts and loading lines go to
//! `err` so piping `bookstore list` stays clean.

use std::io::{self, BufRead, Write};
use std::sync::{Arc, Mutex};

use crate::views::{Notice, LOADING};

pub struct Console {
    out: Box<dyn Write + Send>,
    err: Box<dyn Write + Send>,
    input: Box<dyn BufRead + Send>,
    interactive: bool,
}

impl Console {
    /// Process stdio. Retry prompts are only offered when stdin is a
    /// terminal.
    pub fn stdio() -> Self {
        use std::io::IsTerminal;

        let interactive = io::stdin().is_terminal();
        Self {
            out: Box::new(io::stdout()),
            err: Box::new(io::stderr()),
            input: Box::new(io::BufReader::new(io::stdin())),
            interactive,
        }
    }

    pub fn new(
        out: impl Write + Send + 'static,
        err: impl Write + Send + 'static,
        input: impl BufRead + Send + 'static,
        interactive: bool,
    ) -> Self {
        Self {
            out: Box::new(out),
            err: Box::new(err),
            input: Box::new(input),
            interactive,
        }
    }

    pub fn is_interactive(&self) -> bool {
        self.interactive
    }

    pub fn show(&mut self, rendered: &str) -> io::Result<()> {
        writeln!(self.out, "{rendered}")?;
        self.out.flush()
    }

    pub fn notify(&mut self, notice: &Notice) -> io::Result<()> {
        writeln!(self.err, "{notice}")?;
        self.err.flush()
    }

    /// Transient progress line, e.g. while a request is in flight.
    pub fn status(&mut self, line: &str) -> io::Result<()> {
        writeln!(self.err, "{line}")?;
        self.err.flush()
    }

    pub fn loading(&mut self) -> io::Result<()> {
        self.status(LOADING)
    }

    /// Ask a yes/no question. Anything but `y`/`yes` (including EOF) is no.
    pub fn confirm(&mut self, prompt: &str) -> io::Result<bool> {
        write!(self.err, "{prompt} [y/N] ")?;
        self.err.flush()?;

        let mut answer = String::new();
        self.input.read_line(&mut answer)?;
        let answer = answer.trim().to_ascii_lowercase();
        Ok(answer == "y" || answer == "yes")
    }
}

/// Cloneable in-memory sink, handy for capturing console output.
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    pub fn contents(&self) -> String {
        let bytes = match self.0.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        };
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut guard = self
            .0
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "buffer lock poisoned"))?;
        guard.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
