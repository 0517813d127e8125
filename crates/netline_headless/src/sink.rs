//! Broadcast sinks used by the runner.
//!
//! Broadcast messages leave the runner as JSON lines, one message per line,
//! in publish order.

use std::io::Write;

use netline_core::channel::{BroadcastSink, NetMessage};
use netline_core::error::{GameError, Result};

/// Writes every published message as one JSON line.
#[derive(Debug)]
pub struct JsonLinesSink<W: Write> {
    writer: W,
    published: usize,
}

impl<W: Write> JsonLinesSink<W> {
    /// Wrap a writer.
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            published: 0,
        }
    }

    /// Number of messages written so far.
    #[must_use]
    pub fn published(&self) -> usize {
        self.published
    }

    /// Unwrap the writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> BroadcastSink for JsonLinesSink<W> {
    fn publish(&mut self, message: &NetMessage) -> Result<()> {
        let line = message.encode()?;
        writeln!(self.writer, "{line}")
            .and_then(|()| self.writer.flush())
            .map_err(|e| GameError::Transport(e.to_string()))?;
        self.published += 1;
        Ok(())
    }
}

/// Keeps published messages in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    /// Messages in publish order.
    pub messages: Vec<NetMessage>,
}

impl BroadcastSink for MemorySink {
    fn publish(&mut self, message: &NetMessage) -> Result<()> {
        self.messages.push(message.clone());
        Ok(())
    }
}
