use std::env;
use std::io;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::thread;

use thiserror::Error;

use crate::client::Client;
use crate::error::{ErrorReporter, NopErrorReporter};
use crate::queue::line_queue;
use crate::sender::Sender;
use crate::tags;
use crate::transport::{AddressResolver as _, DnsResolver, Transport, UdpTransport};

/// Environment variable consulted for the destination host when none is configured.
pub const DD_AGENT_HOST_ENV_VAR: &str = "DD_AGENT_HOST";

/// Environment variable consulted for the destination port when none is configured.
pub const DD_DOGSTATSD_PORT_ENV_VAR: &str = "DD_DOGSTATSD_PORT";

/// Environment variable consulted for the entity id when none is configured.
pub const DD_ENTITY_ID_ENV_VAR: &str = "DD_ENTITY_ID";

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8125;

// Conservative bound suitable for typical network path MTUs.
const DEFAULT_MAX_PAYLOAD_LEN: usize = 1400;

// The shortest metric a conforming payload limit must be able to carry.
const SMALLEST_VALID_LINE: &str = "a:0|c";

/// Errors that could occur while building a [`Client`].
///
/// These are the only failures ever surfaced to the caller as hard errors; everything at runtime
/// goes through the configured [`ErrorReporter`] instead.
#[derive(Debug, Error)]
pub enum BuildError {
    /// The destination address could not be parsed or resolved.
    #[error("invalid remote address: {reason}")]
    InvalidRemoteAddress {
        /// Details about the failure.
        reason: String,
    },

    /// The queue capacity was zero, which would force producers to wait.
    #[error("queue capacity must be greater than zero")]
    InvalidQueueCapacity,

    /// The maximum payload length is too small to carry any metric at all.
    #[error("maximum payload length must be at least {} bytes", SMALLEST_VALID_LINE.len())]
    InvalidPayloadLength,

    /// The client socket could not be created.
    #[error("failed to create client socket")]
    Socket(#[source] io::Error),

    /// The background sender thread could not be spawned.
    #[error("failed to spawn background sender thread")]
    Backend(#[source] io::Error),
}

/// Builder for a [`Client`].
///
/// ```no_run
/// use dogstatsd_client::ClientBuilder;
///
/// let client = ClientBuilder::new("my.app")
///     .with_remote_address("localhost", 8125)
///     .with_constant_tags(&["env:prod"])
///     .build()
///     .expect("failed to build client");
///
/// client.incr("requests", &[]);
/// ```
pub struct ClientBuilder {
    prefix: String,
    host: Option<String>,
    port: Option<u16>,
    constant_tags: Vec<String>,
    entity_id: Option<String>,
    queue_capacity: Option<usize>,
    max_payload_len: usize,
    default_sample_rate: Option<f64>,
    reporter: Arc<dyn ErrorReporter>,
    transport: Option<Box<dyn Transport>>,
}

impl ClientBuilder {
    /// Creates a builder with the given metric prefix, which may be empty.
    ///
    /// A non-empty prefix is joined to every metric name and event title with a `.`.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            host: None,
            port: None,
            constant_tags: Vec::new(),
            entity_id: None,
            queue_capacity: None,
            max_payload_len: DEFAULT_MAX_PAYLOAD_LEN,
            default_sample_rate: None,
            reporter: Arc::new(NopErrorReporter),
            transport: None,
        }
    }

    /// Sets the destination host and port.
    ///
    /// When not set, the `DD_AGENT_HOST` and `DD_DOGSTATSD_PORT` environment variables are
    /// consulted, then `127.0.0.1:8125`. The hostname is re-resolved on every transmission, so
    /// DNS changes take effect without rebuilding the client.
    #[must_use]
    pub fn with_remote_address(mut self, host: impl Into<String>, port: u16) -> Self {
        self.host = Some(host.into());
        self.port = Some(port);
        self
    }

    /// Sets the constant tags attached to every measurement from this client, in order.
    #[must_use]
    pub fn with_constant_tags(mut self, tags: &[&str]) -> Self {
        self.constant_tags = tags.iter().map(ToString::to_string).collect();
        self
    }

    /// Sets the entity id reported as the `dd.internal.entity_id` tag.
    ///
    /// An explicit value always wins over the `DD_ENTITY_ID` environment fallback.
    #[must_use]
    pub fn with_entity_id(mut self, entity_id: impl Into<String>) -> Self {
        self.entity_id = Some(entity_id.into());
        self
    }

    /// Bounds the number of formatted lines that may be queued at once.
    ///
    /// When the bound is reached, further measurements are dropped (and reported) rather than
    /// blocking the submitting thread. Unbounded by default.
    #[must_use]
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = Some(capacity);
        self
    }

    /// Sets the maximum datagram payload length, in bytes.
    ///
    /// Single lines longer than this are rejected as invalid; batches are packed up to this
    /// bound. Defaults to 1400 bytes.
    #[must_use]
    pub fn with_maximum_payload_length(mut self, max_payload_len: usize) -> Self {
        self.max_payload_len = max_payload_len;
        self
    }

    /// Applies a default sample rate to every metric operation that does not carry an explicit
    /// one.
    ///
    /// By default there is none: unsampled operations transmit every call and emit no rate
    /// clause.
    #[must_use]
    pub fn with_default_sample_rate(mut self, rate: f64) -> Self {
        self.default_sample_rate = Some(rate);
        self
    }

    /// Sets the reporter invoked with every runtime failure.
    ///
    /// Defaults to [`NopErrorReporter`], which discards them.
    #[must_use]
    pub fn with_error_reporter<R>(mut self, reporter: R) -> Self
    where
        R: ErrorReporter + 'static,
    {
        self.reporter = Arc::new(reporter);
        self
    }

    /// Replaces the UDP transport with a custom [`Transport`] implementation.
    ///
    /// Mostly useful in tests, where a recording or deliberately stalled transport makes the
    /// batching and shutdown behavior observable without a network.
    #[must_use]
    pub fn with_transport(mut self, transport: Box<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Builds the client and starts its background sender.
    ///
    /// # Errors
    ///
    /// Returns a [`BuildError`] when the configuration is invalid (zero queue capacity, payload
    /// length too small, unresolvable destination) or when the socket or sender thread cannot be
    /// created.
    pub fn build(self) -> Result<Client, BuildError> {
        if self.queue_capacity == Some(0) {
            return Err(BuildError::InvalidQueueCapacity);
        }
        if self.max_payload_len < SMALLEST_VALID_LINE.len() {
            return Err(BuildError::InvalidPayloadLength);
        }

        let prefix = if self.prefix.is_empty() {
            String::new()
        } else {
            format!("{}.", self.prefix)
        };

        let entity_id = self
            .entity_id
            .or_else(|| env::var(DD_ENTITY_ID_ENV_VAR).ok().filter(|v| !v.is_empty()));
        let sticky_tags = tags::sticky_tags(self.constant_tags, entity_id.as_deref());

        let transport: Box<dyn Transport> = match self.transport {
            Some(transport) => transport,
            None => {
                let host = self
                    .host
                    .or_else(|| env::var(DD_AGENT_HOST_ENV_VAR).ok().filter(|v| !v.is_empty()))
                    .unwrap_or_else(|| DEFAULT_HOST.to_string());
                let port = match self.port {
                    Some(port) => port,
                    None => match env::var(DD_DOGSTATSD_PORT_ENV_VAR) {
                        Ok(value) => value.parse().map_err(|_| BuildError::InvalidRemoteAddress {
                            reason: format!("invalid port in {DD_DOGSTATSD_PORT_ENV_VAR}: {value}"),
                        })?,
                        Err(_) => DEFAULT_PORT,
                    },
                };

                let resolver = DnsResolver::new(host, port);

                // Check the destination resolves at all, so a typo fails construction rather
                // than every transmission.
                resolver
                    .resolve()
                    .map_err(|e| BuildError::InvalidRemoteAddress { reason: e.to_string() })?;

                Box::new(UdpTransport::new(Box::new(resolver)).map_err(BuildError::Socket)?)
            }
        };

        let (producer, consumer) = line_queue(self.queue_capacity);
        let stop = Arc::new(AtomicBool::new(false));

        let sender = Sender::new(
            consumer,
            transport,
            Arc::clone(&self.reporter),
            self.max_payload_len,
            Arc::clone(&stop),
        );
        let worker = thread::Builder::new()
            .name("dogstatsd-client-sender".to_string())
            .spawn(move || sender.run())
            .map_err(BuildError::Backend)?;

        Ok(Client::new(
            prefix,
            sticky_tags,
            self.max_payload_len,
            self.default_sample_rate,
            producer,
            self.reporter,
            stop,
            worker,
        ))
    }
}
