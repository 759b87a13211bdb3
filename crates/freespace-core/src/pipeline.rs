//! Bounded, double-buffered output pipeline
//!
//! The encoder appends rows into one growing buffer. When the buffer
//! crosses the size threshold it is handed to a dedicated writer thread
//! over a channel and a recycled buffer takes its place. Availability
//! slots cap the buffers in flight: a slot is taken per handoff and
//! released when the writer dequeues the buffer, before the write
//! completes, so the producer fills the next buffer while the previous
//! one is still being written. Acquiring a slot is the scan's only
//! backpressure: when output I/O lags, the producer blocks here instead
//! of growing memory without bound.
//!
//! Buffer ownership moves one way only: producer → channel → writer →
//! pool → producer. No buffer is ever mutated from two sides.

use std::io::Write;
use std::mem;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
use tracing::debug;

use crate::error::ScanError;

/// Buffer size threshold that triggers a handoff, in bytes.
pub const MAX_BUFFER_LEN: usize = 4 * 1024 * 1024;

/// Cap on buffers in flight between producer and writer.
pub const MAX_BUFFERS: usize = 2;

/// Producer side of the pipeline; owns the current buffer.
pub struct CsvPipeline {
    current: Vec<u8>,
    max_buffer_len: usize,
    slots: Receiver<()>,
    full_tx: Option<Sender<Vec<u8>>>,
    pool: Receiver<Vec<u8>>,
    writer: Option<JoinHandle<std::io::Result<()>>>,
    allocated: usize,
}

impl CsvPipeline {
    /// Creates the output file (truncating) and starts the writer thread
    /// with the default threshold and slot count.
    pub fn create(path: &std::path::Path) -> Result<Self, ScanError> {
        let file = std::fs::File::create(path)?;
        Ok(Self::with_limits(file, MAX_BUFFER_LEN, MAX_BUFFERS))
    }

    /// Starts the pipeline over an arbitrary sink with the default limits.
    pub fn new<W: Write + Send + 'static>(sink: W) -> Self {
        Self::with_limits(sink, MAX_BUFFER_LEN, MAX_BUFFERS)
    }

    /// Starts the pipeline with explicit limits.
    pub fn with_limits<W: Write + Send + 'static>(
        mut sink: W,
        max_buffer_len: usize,
        max_buffers: usize,
    ) -> Self {
        let (slot_tx, slot_rx) = bounded::<()>(max_buffers);
        for _ in 0..max_buffers {
            let _ = slot_tx.send(());
        }
        let (full_tx, full_rx) = bounded::<Vec<u8>>(max_buffers);
        // The pool only ever holds buffers that already exist, so it needs
        // no bound of its own; the return must never block the writer.
        let (pool_tx, pool_rx) = unbounded::<Vec<u8>>();

        let writer = thread::spawn(move || -> std::io::Result<()> {
            for mut buffer in full_rx {
                // Release the slot before writing so the producer can
                // prepare the next buffer during this write.
                let _ = slot_tx.send(());
                sink.write_all(&buffer)?;
                buffer.clear();
                let _ = pool_tx.send(buffer);
                sink.flush()?;
            }
            sink.flush()
        });

        Self {
            current: Vec::with_capacity(max_buffer_len),
            max_buffer_len,
            slots: slot_rx,
            full_tx: Some(full_tx),
            pool: pool_rx,
            writer: Some(writer),
            allocated: 0,
        }
    }

    /// The buffer the encoder appends into.
    pub fn buf(&mut self) -> &mut Vec<u8> {
        &mut self.current
    }

    /// Hands the current buffer to the writer when it has crossed the
    /// threshold. Returns whether a handoff happened. Blocks while no
    /// availability slot is free.
    pub fn flush_if_full(&mut self) -> Result<bool, ScanError> {
        if self.current.len() <= self.max_buffer_len {
            return Ok(false);
        }
        self.hand_off()?;
        Ok(true)
    }

    /// Pushes any remaining output, closes the channel, and waits for the
    /// writer to drain and flush. Completes only once all buffers are
    /// durably written.
    pub fn finish(mut self) -> Result<(), ScanError> {
        if !self.current.is_empty() {
            self.hand_off()?;
        }
        drop(self.full_tx.take());
        match self.writer.take() {
            Some(handle) => match handle.join() {
                Ok(result) => result.map_err(ScanError::Pipeline),
                Err(_) => Err(ScanError::WriterPanicked),
            },
            None => Ok(()),
        }
    }

    fn hand_off(&mut self) -> Result<(), ScanError> {
        // A closed slot channel means the writer stopped; surface its
        // real error instead of a send failure.
        if self.slots.recv().is_err() {
            return Err(self.writer_error());
        }
        let Some(full_tx) = self.full_tx.as_ref() else {
            return Err(self.writer_error());
        };
        let full = mem::take(&mut self.current);
        if full_tx.send(full).is_err() {
            return Err(self.writer_error());
        }
        self.current = match self.pool.try_recv() {
            Ok(recycled) => recycled,
            Err(_) => {
                self.allocated += 1;
                debug!(allocated = self.allocated, "pool empty, allocating buffer");
                Vec::with_capacity(self.max_buffer_len)
            }
        };
        Ok(())
    }

    fn writer_error(&mut self) -> ScanError {
        match self.writer.take() {
            Some(handle) => match handle.join() {
                Ok(Err(e)) => ScanError::Pipeline(e),
                Ok(Ok(())) => ScanError::Pipeline(std::io::Error::other(
                    "output writer exited before shutdown",
                )),
                Err(_) => ScanError::WriterPanicked,
            },
            None => ScanError::WriterPanicked,
        }
    }
}
