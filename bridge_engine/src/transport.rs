//! Line transports
//!
//! The engine reads and writes whole lines through a [`Transport`]. The
//! production transport wraps standard input and output; tests script the
//! host side through a [`MemoryTransport`].

use bridge_wire::{decode, Envelope};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::io::{self, BufRead, Write};
use std::rc::Rc;
use thiserror::Error;

/// Transport errors
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("I/O error")]
    Io(#[from] io::Error),
}

/// A bidirectional line pipe to the host
pub trait Transport {
    /// Writes one newline-terminated line and flushes it
    fn send_line(&mut self, line: &str) -> Result<(), TransportError>;

    /// Reads the next line without its terminator
    ///
    /// `None` means the host closed the pipe. A line that is not valid
    /// UTF-8 is still returned, with the bad bytes replaced, so the decoder
    /// reports it like any other malformed record.
    fn receive_line(&mut self) -> Result<Option<String>, TransportError>;
}

/// Transport over any buffered reader and writer
pub struct LineTransport<R, W> {
    reader: R,
    writer: W,
}

impl<R: BufRead, W: Write> LineTransport<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    pub fn into_parts(self) -> (R, W) {
        (self.reader, self.writer)
    }
}

impl LineTransport<io::StdinLock<'static>, io::Stdout> {
    /// Transport over the process's standard input and output
    ///
    /// Panics outside a handler are also reported on standard output from
    /// here on.
    pub fn stdio() -> Self {
        crate::panic_capture::forward_unguarded_to_stdout();
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Transport for LineTransport<R, W> {
    fn send_line(&mut self, line: &str) -> Result<(), TransportError> {
        self.writer.write_all(line.as_bytes())?;
        if !line.ends_with('\n') {
            self.writer.write_all(b"\n")?;
        }
        self.writer.flush()?;
        Ok(())
    }

    fn receive_line(&mut self) -> Result<Option<String>, TransportError> {
        let mut buf = Vec::new();
        if self.reader.read_until(b'\n', &mut buf)? == 0 {
            return Ok(None);
        }

        let mut line = String::from_utf8_lossy(&buf).into_owned();
        while line.ends_with('\n') || line.ends_with('\r') {
            line.pop();
        }
        Ok(Some(line))
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    inbound: VecDeque<String>,
    outbound: Vec<String>,
}

/// In-memory transport
///
/// Reads drain a queue of scripted host lines and report a closed pipe
/// once it is empty. Writes are recorded for inspection through a
/// [`MemoryTransportHandle`].
#[derive(Debug, Default)]
pub struct MemoryTransport {
    state: Rc<RefCell<MemoryState>>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a handle that shares this transport's queues
    pub fn handle(&self) -> MemoryTransportHandle {
        MemoryTransportHandle {
            state: Rc::clone(&self.state),
        }
    }
}

impl Transport for MemoryTransport {
    fn send_line(&mut self, line: &str) -> Result<(), TransportError> {
        self.state
            .borrow_mut()
            .outbound
            .push(line.trim_end_matches('\n').to_string());
        Ok(())
    }

    fn receive_line(&mut self) -> Result<Option<String>, TransportError> {
        Ok(self.state.borrow_mut().inbound.pop_front())
    }
}

/// Host side of a [`MemoryTransport`]
#[derive(Debug, Clone)]
pub struct MemoryTransportHandle {
    state: Rc<RefCell<MemoryState>>,
}

impl MemoryTransportHandle {
    /// Queues a raw line for the engine to read
    pub fn push_line(&self, line: impl Into<String>) {
        self.state.borrow_mut().inbound.push_back(line.into());
    }

    /// Queues an envelope for the engine to read
    pub fn push_envelope(&self, envelope: &Envelope) {
        let line = serde_json::to_string(envelope).unwrap_or_default();
        self.push_line(line);
    }

    /// Number of queued lines not yet read
    pub fn pending_inbound(&self) -> usize {
        self.state.borrow().inbound.len()
    }

    /// Lines the engine has written so far
    pub fn sent_lines(&self) -> Vec<String> {
        self.state.borrow().outbound.clone()
    }

    /// Decoded envelopes the engine has written so far
    pub fn sent(&self) -> Vec<Envelope> {
        self.state
            .borrow()
            .outbound
            .iter()
            .filter_map(|line| decode(line).ok())
            .collect()
    }

    /// Removes and returns everything written so far
    pub fn take_sent(&self) -> Vec<Envelope> {
        let lines = std::mem::take(&mut self.state.borrow_mut().outbound);
        lines.iter().filter_map(|line| decode(line).ok()).collect()
    }
}
