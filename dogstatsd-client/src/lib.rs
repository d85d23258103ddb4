//! A non-blocking client for sending metrics, events, and service checks to a
//! [DogStatsD][dsd]-compatible server.
//!
//! [dsd]: https://docs.datadoghq.com/developers/dogstatsd/
//!
//! # Usage
//!
//! Build a [`Client`] through the [`ClientBuilder`], then record away:
//!
//! ```no_run
//! use dogstatsd_client::ClientBuilder;
//!
//! let client = ClientBuilder::new("my.app")
//!     .with_remote_address("localhost", 8125)
//!     .with_constant_tags(&["env:prod", "service:checkout"])
//!     .build()
//!     .expect("failed to build client");
//!
//! client.incr("requests", &[]);
//! client.gauge("queue.depth", 42.0, &["worker:7"]);
//! client.time("request.duration", 123, &[]);
//!
//! // Draining shutdown: everything recorded above is transmitted before stop() returns.
//! client.stop();
//! ```
//!
//! # Design
//!
//! Recording a measurement formats it synchronously (cheap, pure) and hands the finished line to
//! a bounded queue; a single background thread drains the queue, packs lines into size-bounded
//! datagrams, and transmits them. The submitting thread never waits on the network, never blocks
//! on a full queue, and never sees a runtime error: invalid messages, queue overflow, and
//! transmission failures are routed to a configurable [`ErrorReporter`] and otherwise dropped,
//! which is the appropriate posture for a best-effort protocol over a lossy transport.
//!
//! # Delivery guarantees
//!
//! None, deliberately. Datagrams may be lost, and there is no retransmission or acknowledgement.
//! What the client does guarantee: a malformed or oversized measurement never suppresses its
//! neighbors, measurements from one thread are transmitted in the order that thread recorded
//! them, and [`Client::stop`] drains every queued measurement before releasing the transport.

#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_panics_doc)]
#![deny(missing_docs)]

mod builder;
pub use self::builder::{
    BuildError, ClientBuilder, DD_AGENT_HOST_ENV_VAR, DD_DOGSTATSD_PORT_ENV_VAR,
    DD_ENTITY_ID_ENV_VAR,
};

mod client;
pub use self::client::Client;

mod error;
pub use self::error::{ClientError, ErrorReporter, NopErrorReporter};

mod event;
pub use self::event::{AlertType, Event, EventBuilder, Priority};

mod service_check;
pub use self::service_check::{CheckStatus, ServiceCheck, ServiceCheckBuilder};

mod transport;
pub use self::transport::{AddressResolver, DnsResolver, Transport, UdpTransport};

mod format;
mod queue;
mod sender;
mod tags;
