//! Line counting for read sessions.
//!
//! A [`ReadSession`] holds the name of the source being read and the 1-based
//! number of the line most recently handed to the parser. The
//! [`LineCountingReader`] advances that counter as lines are pulled; the
//! assignment hook of the tracking parser reads it back when an option is stored.

use std::cell::Cell;
use std::io::{self, BufRead};

/// State of a single read-from-source call.
///
/// `current_line` is `None` before the first line is pulled and again once the
/// source is exhausted.
#[derive(Debug)]
pub struct ReadSession {
    source: String,
    current_line: Cell<Option<usize>>,
}

impl ReadSession {
    /// Opens a session for the named source. No line has been read yet.
    pub fn new(source: impl Into<String>) -> Self {
        ReadSession {
            source: source.into(),
            current_line: Cell::new(None),
        }
    }

    /// Name of the source being read.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Line most recently pulled from the source, if any.
    pub fn current_line(&self) -> Option<usize> {
        self.current_line.get()
    }

    fn next_line(&self) {
        let next = self.current_line.get().map_or(1, |n| n + 1);
        self.current_line.set(Some(next));
    }

    fn finish(&self) {
        self.current_line.set(None);
    }
}

/// Wraps a buffered reader and counts lines into a [`ReadSession`].
///
/// Lines are returned without their terminator (`\n` or `\r\n`).
pub struct LineCountingReader<'s, R: BufRead> {
    inner: R,
    session: &'s ReadSession,
    buf: String,
}

impl<'s, R: BufRead> LineCountingReader<'s, R> {
    /// Creates a reader that reports into `session`.
    pub fn new(inner: R, session: &'s ReadSession) -> Self {
        session.finish();
        LineCountingReader {
            inner,
            session,
            buf: String::new(),
        }
    }

    /// Pulls the next line, or `None` at end of input.
    ///
    /// Reaching the end resets the session's current line to unknown.
    pub fn next_line(&mut self) -> io::Result<Option<String>> {
        self.buf.clear();
        if self.inner.read_line(&mut self.buf)? == 0 {
            self.session.finish();
            return Ok(None);
        }
        self.session.next_line();
        let line = self.buf.strip_suffix('\n').unwrap_or(&self.buf);
        let line = line.strip_suffix('\r').unwrap_or(line);
        Ok(Some(line.to_string()))
    }
}

impl<R: BufRead> Iterator for LineCountingReader<'_, R> {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_line().transpose()
    }
}
