use std::fmt;

/// Outcome code posted back by the gateway in the `status` field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayStatus {
    Authorized,
    Captured,
    Canceled,
    Refused,
    Error,
    /// Anything the gateway sends that we do not act on, including a missing status.
    Other(String),
}

impl GatewayStatus {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("AUTHORIZED") => Self::Authorized,
            Some("CAPTURED") => Self::Captured,
            Some("CANCELED") => Self::Canceled,
            Some("REFUSED") => Self::Refused,
            Some("ERROR") => Self::Error,
            Some(other) => Self::Other(other.to_string()),
            None => Self::Other(String::new()),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Authorized | Self::Captured)
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Refused | Self::Error)
    }

    /// Plain-language explanation shown next to audit log entries.
    pub fn description(&self) -> &'static str {
        match self {
            Self::Authorized | Self::Captured => "Payment was successful.",
            Self::Canceled => "Payment failed, user canceled the process.",
            Self::Refused => "Payment failed, payment was denied by card or bank.",
            Self::Error => {
                "Non recoverable system or other error occurred during payment process."
            }
            Self::Other(_) => "",
        }
    }
}

impl fmt::Display for GatewayStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Authorized => f.write_str("AUTHORIZED"),
            Self::Captured => f.write_str("CAPTURED"),
            Self::Canceled => f.write_str("CANCELED"),
            Self::Refused => f.write_str("REFUSED"),
            Self::Error => f.write_str("ERROR"),
            Self::Other(raw) => f.write_str(raw),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_codes() {
        assert_eq!(GatewayStatus::parse(Some("CAPTURED")), GatewayStatus::Captured);
        assert_eq!(GatewayStatus::parse(Some("CANCELED")), GatewayStatus::Canceled);
        assert!(GatewayStatus::parse(Some("AUTHORIZED")).is_success());
        assert!(GatewayStatus::parse(Some("ERROR")).is_failure());
    }

    #[test]
    fn test_parse_is_case_sensitive() {
        assert_eq!(
            GatewayStatus::parse(Some("captured")),
            GatewayStatus::Other("captured".into())
        );
        assert_eq!(GatewayStatus::parse(None), GatewayStatus::Other(String::new()));
    }

    #[test]
    fn test_unknown_status_has_empty_description() {
        assert_eq!(GatewayStatus::parse(Some("PENDING")).description(), "");
        assert_eq!(GatewayStatus::Refused.to_string(), "REFUSED");
    }
}
