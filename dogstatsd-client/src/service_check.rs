/// Status of a [`ServiceCheck`], encoded on the wire as 0 through 3.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CheckStatus {
    /// The check passed.
    Ok,
    /// The check is degraded.
    Warning,
    /// The check failed.
    Critical,
    /// The check state could not be determined.
    Unknown,
}

impl CheckStatus {
    pub(crate) const fn code(self) -> u8 {
        match self {
            CheckStatus::Ok => 0,
            CheckStatus::Warning => 1,
            CheckStatus::Critical => 2,
            CheckStatus::Unknown => 3,
        }
    }
}

/// A service-check record submitted via [`Client::service_check`](crate::Client::service_check).
///
/// Name and status are required and supplied up front; the rest is optional:
///
/// ```
/// use dogstatsd_client::{CheckStatus, ServiceCheck};
///
/// let check = ServiceCheck::builder("db.connectivity", CheckStatus::Ok)
///     .with_hostname("web-1")
///     .with_message("primary reachable")
///     .build();
/// ```
#[derive(Clone, Debug)]
pub struct ServiceCheck {
    name: String,
    status: CheckStatus,
    timestamp: Option<i64>,
    hostname: Option<String>,
    tags: Vec<String>,
    message: Option<String>,
}

impl ServiceCheck {
    /// Starts building a service check with the two required fields.
    pub fn builder(name: impl Into<String>, status: CheckStatus) -> ServiceCheckBuilder {
        ServiceCheckBuilder {
            check: ServiceCheck {
                name: name.into(),
                status,
                timestamp: None,
                hostname: None,
                tags: Vec::new(),
                message: None,
            },
        }
    }

    /// Returns the check name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the check status.
    pub fn status(&self) -> CheckStatus {
        self.status
    }

    /// Returns the check timestamp, in epoch seconds, if one was set.
    pub fn timestamp(&self) -> Option<i64> {
        self.timestamp
    }

    /// Returns the source hostname, if one was set.
    pub fn hostname(&self) -> Option<&str> {
        self.hostname.as_deref()
    }

    /// Returns the tags attached to this check.
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Returns the check message, if one was set.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

/// Builder for [`ServiceCheck`].
#[derive(Clone, Debug)]
pub struct ServiceCheckBuilder {
    check: ServiceCheck,
}

impl ServiceCheckBuilder {
    /// Sets the check timestamp, in epoch seconds.
    #[must_use]
    pub fn with_timestamp(mut self, timestamp: i64) -> Self {
        self.check.timestamp = Some(timestamp);
        self
    }

    /// Sets the source hostname.
    #[must_use]
    pub fn with_hostname(mut self, hostname: impl Into<String>) -> Self {
        self.check.hostname = Some(hostname.into());
        self
    }

    /// Sets the tags attached to this check.
    #[must_use]
    pub fn with_tags(mut self, tags: &[&str]) -> Self {
        self.check.tags = tags.iter().map(ToString::to_string).collect();
        self
    }

    /// Sets the check message.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.check.message = Some(message.into());
        self
    }

    /// Finishes the builder.
    pub fn build(self) -> ServiceCheck {
        self.check
    }
}
