/// Lifecycle state of a gateway session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    /// No transport and nothing scheduled.
    #[default]
    Disconnected,
    /// A transport is being opened.
    Connecting,
    /// Transport open, heartbeat running.
    Open,
    /// Transport closed, teardown done.
    Closed,
    /// A reconnect attempt is scheduled.
    Reconnecting {
        /// Attempt number, starting at 1.
        attempt: u32,
    },
}

impl ConnectionState {
    /// Whether the transport is open.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        matches!(self, Self::Open)
    }

    /// Whether a transport is being opened or is open.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self, Self::Connecting | Self::Open)
    }

    /// Whether a reconnect is pending.
    #[must_use]
    pub const fn is_reconnecting(&self) -> bool {
        matches!(self, Self::Reconnecting { .. })
    }

    /// Pending reconnect attempt number, if any.
    #[must_use]
    pub const fn reconnect_attempt(&self) -> Option<u32> {
        if let Self::Reconnecting { attempt } = self {
            Some(*attempt)
        } else {
            None
        }
    }
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Disconnected => write!(f, "Disconnected"),
            Self::Connecting => write!(f, "Connecting"),
            Self::Open => write!(f, "Open"),
            Self::Closed => write!(f, "Closed"),
            Self::Reconnecting { attempt } => write!(f, "Reconnecting (attempt {attempt})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_state_display() {
        assert_eq!(ConnectionState::Open.to_string(), "Open");
        assert_eq!(
            ConnectionState::Reconnecting { attempt: 3 }.to_string(),
            "Reconnecting (attempt 3)"
        );
    }

    #[test]
    fn test_connection_state_checks() {
        assert!(ConnectionState::Open.is_open());
        assert!(ConnectionState::Connecting.is_active());
        assert!(!ConnectionState::Closed.is_active());
        assert!(ConnectionState::Reconnecting { attempt: 1 }.is_reconnecting());
        assert_eq!(
            ConnectionState::Reconnecting { attempt: 2 }.reconnect_attempt(),
            Some(2)
        );
        assert_eq!(ConnectionState::default(), ConnectionState::Disconnected);
    }
}
