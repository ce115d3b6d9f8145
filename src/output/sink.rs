//! Item sinks.

use std::io::Write;

use crate::error::{Error, Result};
use crate::media::Item;

/// Receives emitted items, in order, one at a time.
pub trait ItemSink {
    fn emit(&mut self, item: &Item) -> Result<()>;
}

/// Collects items in memory.
impl ItemSink for Vec<Item> {
    fn emit(&mut self, item: &Item) -> Result<()> {
        self.push(item.clone());
        Ok(())
    }
}

/// Writes one JSON object per line and flushes after each record.
pub struct JsonLinesSink<W: Write> {
    writer: W,
    written: u64,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, written: 0 }
    }

    /// Number of records written so far.
    pub fn written(&self) -> u64 {
        self.written
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> ItemSink for JsonLinesSink<W> {
    fn emit(&mut self, item: &Item) -> Result<()> {
        let line = item.to_json_line()?;
        writeln!(self.writer, "{}", line)
            .and_then(|_| self.writer.flush())
            .map_err(|e| Error::Output(format!("Failed to write item {}: {}", item.id, e)))?;
        self.written += 1;
        Ok(())
    }
}
