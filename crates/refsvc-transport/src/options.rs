use std::time::Duration;

/// Per-call settings handed to the transport.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CallOptions {
    /// Deadline for the whole call, stream included. `None` leaves it to the
    /// transport's default.
    pub timeout: Option<Duration>,
}

impl CallOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_has_no_deadline() {
        assert_eq!(CallOptions::new().timeout, None);
    }

    #[test]
    fn with_timeout_sets_deadline() {
        let opts = CallOptions::new().with_timeout(Duration::from_secs(5));
        assert_eq!(opts.timeout, Some(Duration::from_secs(5)));
    }
}
