//! The batching sender.
//!
//! A single background thread owns the transport and drains the line queue, packing successive
//! lines into newline-delimited payloads bounded by the maximum datagram size. A payload is
//! flushed the moment the next line would no longer fit, or as soon as the queue has nothing
//! immediately available, so batching never delays delivery by more than one queue poll.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::RecvTimeoutError;
use tracing::{debug, error, trace};

use crate::error::{ClientError, ErrorReporter};
use crate::queue::LineConsumer;
use crate::transport::Transport;

/// Upper bound on any single wait, so the stop signal is observed promptly.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SenderState {
    Running,
    Draining,
    Stopped,
}

pub(crate) struct Sender {
    queue: LineConsumer,
    transport: Box<dyn Transport>,
    reporter: Arc<dyn ErrorReporter>,
    max_payload_len: usize,
    stop: Arc<AtomicBool>,
    state: SenderState,
    buf: String,
}

impl Sender {
    pub(crate) fn new(
        queue: LineConsumer,
        transport: Box<dyn Transport>,
        reporter: Arc<dyn ErrorReporter>,
        max_payload_len: usize,
        stop: Arc<AtomicBool>,
    ) -> Self {
        Self {
            queue,
            transport,
            reporter,
            max_payload_len,
            stop,
            state: SenderState::Running,
            buf: String::with_capacity(max_payload_len),
        }
    }

    /// Runs until the stop signal is observed, then drains and stops.
    pub(crate) fn run(mut self) {
        debug!("sender started");

        while self.state == SenderState::Running {
            match self.queue.next_line(POLL_INTERVAL) {
                Ok(line) => {
                    self.append(line);
                    // Keep packing while lines are immediately available, then flush rather
                    // than waiting for a fuller payload.
                    while let Some(line) = self.queue.try_next_line() {
                        self.append(line);
                    }
                    self.flush();
                }
                Err(RecvTimeoutError::Timeout) => self.flush(),
                Err(RecvTimeoutError::Disconnected) => break,
            }

            if self.stop.load(Ordering::Acquire) {
                self.state = SenderState::Draining;
            }
        }

        // Drain whatever is still queued; no new producer activity is expected, so the
        // idle-flush trigger no longer applies and we pull until empty.
        self.state = SenderState::Draining;
        while let Some(line) = self.queue.try_next_line() {
            self.append(line);
        }
        self.flush();

        self.state = SenderState::Stopped;
        debug!(state = ?self.state, "sender stopped");
    }

    /// Adds a line to the pending payload, flushing first if it would no longer fit.
    ///
    /// Lines longer than the payload bound were already rejected before enqueue, so a line
    /// always fits into an empty payload.
    fn append(&mut self, line: String) {
        if !self.buf.is_empty() {
            if self.buf.len() + 1 + line.len() > self.max_payload_len {
                self.flush();
            } else {
                self.buf.push('\n');
            }
        }
        self.buf.push_str(&line);
    }

    /// Transmits the pending payload, if any.
    fn flush(&mut self) {
        if self.buf.is_empty() {
            return;
        }

        match self.transport.send(self.buf.as_bytes()) {
            Ok(sent) => trace!(bytes = sent, "sent payload"),
            Err(e) => {
                error!(error = %e, "failed to send payload");
                self.reporter.report(ClientError::Transmission { source: e });
            }
        }

        self.buf.clear();
    }
}
