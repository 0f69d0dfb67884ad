/// Lifecycle of the single feed connection, as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConnectionState {
    /// No connection attempted yet.
    #[default]
    Idle,
    Connecting { url: String },
    Open { url: String },
    /// The server closed the stream.
    Closed { reason: String },
    /// Connect, read or apply failed; the list no longer updates.
    Failed { error: String },
}

impl ConnectionState {
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Connecting { .. } | Self::Open { .. })
    }

    pub fn is_open(&self) -> bool {
        matches!(self, Self::Open { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_active_states() {
        assert!(!ConnectionState::Idle.is_active());
        assert!(
            ConnectionState::Connecting {
                url: "wss://a/monitor".into()
            }
            .is_active()
        );
        assert!(
            ConnectionState::Open {
                url: "wss://a/monitor".into()
            }
            .is_open()
        );
        assert!(
            !ConnectionState::Closed {
                reason: String::new()
            }
            .is_active()
        );
        assert!(
            !ConnectionState::Failed {
                error: "refused".into()
            }
            .is_active()
        );
    }
}
