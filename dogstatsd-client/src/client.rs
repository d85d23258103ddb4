use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use crate::error::{ClientError, ErrorReporter};
use crate::event::Event;
use crate::format::{self, MetricKind};
use crate::queue::LineProducer;
use crate::service_check::ServiceCheck;

/// A non-blocking DogStatsD client.
///
/// Built through [`ClientBuilder`](crate::ClientBuilder). Every operation formats the measurement
/// synchronously and hands the finished line to the background sender without waiting: callers
/// are never blocked or slowed down by the network. Runtime failures -- an oversized message, a
/// full queue, a failed transmission -- go to the configured
/// [`ErrorReporter`](crate::ErrorReporter) instead of the caller.
///
/// The client is safe to share across threads behind a reference; all operations take `&self`.
/// Dropping the client (or calling [`stop`](Client::stop)) drains every buffered measurement
/// before releasing the transport.
pub struct Client {
    prefix: String,
    sticky_tags: Vec<String>,
    max_payload_len: usize,
    default_sample_rate: Option<f64>,
    queue: LineProducer,
    reporter: Arc<dyn ErrorReporter>,
    stop: Arc<AtomicBool>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl Client {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        prefix: String,
        sticky_tags: Vec<String>,
        max_payload_len: usize,
        default_sample_rate: Option<f64>,
        queue: LineProducer,
        reporter: Arc<dyn ErrorReporter>,
        stop: Arc<AtomicBool>,
        worker: JoinHandle<()>,
    ) -> Self {
        Self {
            prefix,
            sticky_tags,
            max_payload_len,
            default_sample_rate,
            queue,
            reporter,
            stop,
            worker: Mutex::new(Some(worker)),
        }
    }

    /// Increments a counter by one.
    pub fn incr(&self, name: &str, tags: &[&str]) {
        self.count(name, 1, tags);
    }

    /// Decrements a counter by one.
    pub fn decr(&self, name: &str, tags: &[&str]) {
        self.count(name, -1, tags);
    }

    /// Adjusts a counter by the given delta.
    pub fn count(&self, name: &str, delta: i64, tags: &[&str]) {
        self.send_metric(name, MetricKind::Counter, self.default_sample_rate, tags, |buf| {
            format::push_i64(buf, delta);
        });
    }

    /// Adjusts a counter by the given delta, at the given sample rate.
    pub fn count_sampled(&self, name: &str, delta: i64, rate: f64, tags: &[&str]) {
        self.send_metric(name, MetricKind::Counter, Some(rate), tags, |buf| {
            format::push_i64(buf, delta);
        });
    }

    /// Records the current value of a gauge.
    pub fn gauge(&self, name: &str, value: f64, tags: &[&str]) {
        self.send_metric(name, MetricKind::Gauge, self.default_sample_rate, tags, |buf| {
            format::push_f64(buf, value);
        });
    }

    /// Records the current value of a gauge, at the given sample rate.
    pub fn gauge_sampled(&self, name: &str, value: f64, rate: f64, tags: &[&str]) {
        self.send_metric(name, MetricKind::Gauge, Some(rate), tags, |buf| {
            format::push_f64(buf, value);
        });
    }

    /// Records a histogram value.
    pub fn histogram(&self, name: &str, value: f64, tags: &[&str]) {
        self.send_metric(name, MetricKind::Histogram, self.default_sample_rate, tags, |buf| {
            format::push_f64(buf, value);
        });
    }

    /// Records a histogram value, at the given sample rate.
    pub fn histogram_sampled(&self, name: &str, value: f64, rate: f64, tags: &[&str]) {
        self.send_metric(name, MetricKind::Histogram, Some(rate), tags, |buf| {
            format::push_f64(buf, value);
        });
    }

    /// Records a distribution value.
    pub fn distribution(&self, name: &str, value: f64, tags: &[&str]) {
        self.send_metric(name, MetricKind::Distribution, self.default_sample_rate, tags, |buf| {
            format::push_f64(buf, value);
        });
    }

    /// Records a distribution value, at the given sample rate.
    pub fn distribution_sampled(&self, name: &str, value: f64, rate: f64, tags: &[&str]) {
        self.send_metric(name, MetricKind::Distribution, Some(rate), tags, |buf| {
            format::push_f64(buf, value);
        });
    }

    /// Records an execution time, in milliseconds.
    pub fn time(&self, name: &str, millis: i64, tags: &[&str]) {
        self.send_metric(name, MetricKind::Timer, self.default_sample_rate, tags, |buf| {
            format::push_i64(buf, millis);
        });
    }

    /// Records an execution time, in milliseconds, at the given sample rate.
    pub fn time_sampled(&self, name: &str, millis: i64, rate: f64, tags: &[&str]) {
        self.send_metric(name, MetricKind::Timer, Some(rate), tags, |buf| {
            format::push_i64(buf, millis);
        });
    }

    /// Records a member of a set.
    pub fn set(&self, name: &str, value: &str, tags: &[&str]) {
        self.send_metric(name, MetricKind::Set, None, tags, |buf| {
            buf.push_str(value);
        });
    }

    /// Records an event, composing any per-call tags with the client's sticky tags.
    pub fn event(&self, event: &Event, tags: &[&str]) {
        let line = format::event_line(&self.prefix, event, &self.sticky_tags, tags);
        self.enqueue(line);
    }

    /// Records a service check.
    pub fn service_check(&self, check: &ServiceCheck) {
        let line = format::service_check_line(check, &self.sticky_tags);
        self.enqueue(line);
    }

    /// Stops the client, draining every buffered measurement first.
    ///
    /// Blocks the calling thread until the background sender has emptied the queue, flushed its
    /// final partial batch, and released the transport. Safe to call more than once; later calls
    /// return immediately.
    pub fn stop(&self) {
        self.stop.store(true, Ordering::Release);
        let handle = self
            .worker
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            let _ = handle.join();
        }
    }

    fn send_metric<F>(
        &self,
        name: &str,
        kind: MetricKind,
        sample_rate: Option<f64>,
        tags: &[&str],
        write_value: F,
    ) where
        F: FnOnce(&mut String),
    {
        if let Some(rate) = sample_rate {
            // Probabilistic suppression: below the neutral rate, a uniform draw decides
            // whether this call is transmitted at all.
            if rate < 1.0 && rand::random::<f64>() > rate {
                return;
            }
        }

        let line = format::metric_line(
            &self.prefix,
            name,
            kind,
            sample_rate,
            &self.sticky_tags,
            tags,
            write_value,
        );
        self.enqueue(line);
    }

    /// Length-checks a finished line and hands it to the queue, reporting rather than
    /// propagating either failure.
    fn enqueue(&self, line: String) {
        if line.len() > self.max_payload_len {
            self.reporter.report(ClientError::InvalidMessage {
                line,
                max_len: self.max_payload_len,
            });
            return;
        }

        if let Err(line) = self.queue.enqueue(line) {
            self.reporter.report(ClientError::QueueOverflow { line });
        }
    }
}

impl Drop for Client {
    fn drop(&mut self) {
        self.stop();
    }
}
