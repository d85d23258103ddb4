use std::io;

use thiserror::Error;

/// Runtime failures routed through a client's [`ErrorReporter`].
///
/// None of these are ever surfaced to the calling thread: the client is best-effort over a lossy
/// transport, so a measurement that cannot be delivered is dropped and the failure is handed to the
/// reporter instead. Only configuration problems at construction time are hard errors (see
/// [`BuildError`](crate::BuildError)).
#[derive(Debug, Error)]
pub enum ClientError {
    /// A single formatted line exceeded the maximum datagram size.
    ///
    /// The offending line is carried here so reporters can log or inspect it; it was never
    /// enqueued, and no other measurement is affected.
    #[error("message of {} bytes exceeds maximum datagram size of {max_len} bytes", line.len())]
    InvalidMessage {
        /// The formatted line that was rejected.
        line: String,
        /// The configured maximum datagram size, in bytes.
        max_len: usize,
    },

    /// The bounded queue was full when a measurement was submitted.
    ///
    /// The line is discarded, not retried; the submitting thread was not blocked.
    #[error("metric queue is full; line dropped")]
    QueueOverflow {
        /// The formatted line that was dropped.
        line: String,
    },

    /// The background sender failed to transmit a batch.
    ///
    /// The batch is dropped and the sender moves on to the next one.
    #[error("failed to transmit batch")]
    Transmission {
        /// The underlying transport error.
        #[source]
        source: io::Error,
    },
}

/// A capability invoked with every runtime failure.
///
/// Reporters are per-client values passed through the builder, never global state, so multiple
/// clients in one process cannot interfere with each other's error routing. Implementations must
/// be cheap and non-blocking; they run on whichever thread detected the failure, which is the
/// submitting thread for [`ClientError::InvalidMessage`] and [`ClientError::QueueOverflow`], and
/// the background sender for [`ClientError::Transmission`].
pub trait ErrorReporter: Send + Sync {
    /// Handles a single runtime failure.
    fn report(&self, error: ClientError);
}

impl<F> ErrorReporter for F
where
    F: Fn(ClientError) + Send + Sync,
{
    fn report(&self, error: ClientError) {
        self(error);
    }
}

/// The default reporter: discards every failure silently.
pub struct NopErrorReporter;

impl ErrorReporter for NopErrorReporter {
    fn report(&self, _error: ClientError) {}
}
