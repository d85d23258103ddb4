//! The bounded line queue decoupling producers from the sender.
//!
//! This is the only synchronization boundary in the client: any number of producer threads hand
//! fully formatted lines to exactly one consumer. Producers never wait -- a full queue hands the
//! line straight back -- and the consumer's wait is always bounded so the shutdown signal is
//! observed promptly even when the queue stays idle.

use std::time::Duration;

use crossbeam_channel::{bounded, unbounded, Receiver, RecvTimeoutError, Sender};

/// Creates the line queue. `None` capacity means effectively unbounded.
pub(crate) fn line_queue(capacity: Option<usize>) -> (LineProducer, LineConsumer) {
    let (tx, rx) = match capacity {
        Some(capacity) => bounded(capacity),
        None => unbounded(),
    };
    (LineProducer { tx }, LineConsumer { rx })
}

/// The producer half, shared by all application threads.
#[derive(Clone)]
pub(crate) struct LineProducer {
    tx: Sender<String>,
}

impl LineProducer {
    /// Appends a line without ever blocking; a full (or closed) queue hands the line back.
    pub(crate) fn enqueue(&self, line: String) -> Result<(), String> {
        self.tx.try_send(line).map_err(crossbeam_channel::TrySendError::into_inner)
    }
}

/// The consumer half, owned exclusively by the background sender.
pub(crate) struct LineConsumer {
    rx: Receiver<String>,
}

impl LineConsumer {
    /// Waits up to `wait` for the next line.
    pub(crate) fn next_line(&self, wait: Duration) -> Result<String, RecvTimeoutError> {
        self.rx.recv_timeout(wait)
    }

    /// Returns the next line only if one is immediately available.
    pub(crate) fn try_next_line(&self) -> Option<String> {
        self.rx.try_recv().ok()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::line_queue;

    #[test]
    fn overflow_hands_the_line_back() {
        let (producer, _consumer) = line_queue(Some(1));

        assert_eq!(producer.enqueue("first".to_string()), Ok(()));
        assert_eq!(producer.enqueue("second".to_string()), Err("second".to_string()));
    }

    #[test]
    fn lines_come_out_in_submission_order() {
        let (producer, consumer) = line_queue(Some(4));

        producer.enqueue("a".to_string()).unwrap();
        producer.enqueue("b".to_string()).unwrap();

        assert_eq!(consumer.try_next_line(), Some("a".to_string()));
        assert_eq!(consumer.try_next_line(), Some("b".to_string()));
        assert_eq!(consumer.try_next_line(), None);
    }

    #[test]
    fn idle_wait_is_bounded() {
        let (_producer, consumer) = line_queue(None);

        let start = std::time::Instant::now();
        assert!(consumer.next_line(Duration::from_millis(20)).is_err());
        assert!(start.elapsed() < Duration::from_secs(2));
    }
}
