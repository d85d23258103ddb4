/// Priority of an [`Event`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Priority {
    /// Low priority.
    Low,
    /// Normal priority, the daemon-side default.
    Normal,
}

impl Priority {
    pub(crate) const fn token(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Normal => "normal",
        }
    }
}

/// Alert type of an [`Event`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AlertType {
    /// An error event.
    Error,
    /// A warning event.
    Warning,
    /// An informational event.
    Info,
    /// A success event.
    Success,
}

impl AlertType {
    pub(crate) const fn token(self) -> &'static str {
        match self {
            AlertType::Error => "error",
            AlertType::Warning => "warning",
            AlertType::Info => "info",
            AlertType::Success => "success",
        }
    }
}

/// An event to be recorded via [`Client::event`](crate::Client::event).
///
/// Title and text are required and supplied up front; everything else is optional and set through
/// the builder:
///
/// ```
/// use dogstatsd_client::{AlertType, Event, Priority};
///
/// let event = Event::builder("deploy finished", "version 1.2.3 is live")
///     .with_hostname("web-1")
///     .with_priority(Priority::Low)
///     .with_alert_type(AlertType::Info)
///     .build();
/// ```
#[derive(Clone, Debug)]
pub struct Event {
    title: String,
    text: String,
    timestamp: Option<i64>,
    hostname: Option<String>,
    aggregation_key: Option<String>,
    priority: Option<Priority>,
    alert_type: Option<AlertType>,
}

impl Event {
    /// Starts building an event with the two required fields.
    pub fn builder(title: impl Into<String>, text: impl Into<String>) -> EventBuilder {
        EventBuilder {
            event: Event {
                title: title.into(),
                text: text.into(),
                timestamp: None,
                hostname: None,
                aggregation_key: None,
                priority: None,
                alert_type: None,
            },
        }
    }

    /// Returns the event title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the event text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns the event timestamp, in epoch seconds, if one was set.
    pub fn timestamp(&self) -> Option<i64> {
        self.timestamp
    }

    /// Returns the source hostname, if one was set.
    pub fn hostname(&self) -> Option<&str> {
        self.hostname.as_deref()
    }

    /// Returns the aggregation key, if one was set.
    pub fn aggregation_key(&self) -> Option<&str> {
        self.aggregation_key.as_deref()
    }

    /// Returns the priority, if one was set.
    pub fn priority(&self) -> Option<Priority> {
        self.priority
    }

    /// Returns the alert type, if one was set.
    pub fn alert_type(&self) -> Option<AlertType> {
        self.alert_type
    }
}

/// Builder for [`Event`].
#[derive(Clone, Debug)]
pub struct EventBuilder {
    event: Event,
}

impl EventBuilder {
    /// Sets the event timestamp, in epoch seconds.
    #[must_use]
    pub fn with_timestamp(mut self, timestamp: i64) -> Self {
        self.event.timestamp = Some(timestamp);
        self
    }

    /// Sets the source hostname.
    #[must_use]
    pub fn with_hostname(mut self, hostname: impl Into<String>) -> Self {
        self.event.hostname = Some(hostname.into());
        self
    }

    /// Sets the aggregation key the daemon uses to group related events.
    #[must_use]
    pub fn with_aggregation_key(mut self, key: impl Into<String>) -> Self {
        self.event.aggregation_key = Some(key.into());
        self
    }

    /// Sets the event priority.
    #[must_use]
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.event.priority = Some(priority);
        self
    }

    /// Sets the alert type.
    #[must_use]
    pub fn with_alert_type(mut self, alert_type: AlertType) -> Self {
        self.event.alert_type = Some(alert_type);
        self
    }

    /// Finishes the builder.
    pub fn build(self) -> Event {
        self.event
    }
}
