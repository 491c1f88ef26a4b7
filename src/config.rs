//! Typed gateway settings, one credential set per environment.

use crate::error::{GatewayError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Test,
    Production,
}

impl Environment {
    /// Orders placed while the event is in test mode talk to the test gateway.
    pub fn for_testmode(testmode: bool) -> Self {
        if testmode {
            Self::Test
        } else {
            Self::Production
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Test => f.write_str("test"),
            Self::Production => f.write_str("production"),
        }
    }
}

/// Connection details for one gateway environment.
///
/// Empty strings are treated the same as missing values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayCredentials {
    #[serde(default)]
    pub gateway_url: String,
    #[serde(default)]
    pub merchant_id: String,
    #[serde(default)]
    pub shared_secret: String,
}

impl GatewayCredentials {
    pub fn new(
        gateway_url: impl Into<String>,
        merchant_id: impl Into<String>,
        shared_secret: impl Into<String>,
    ) -> Self {
        Self {
            gateway_url: gateway_url.into(),
            merchant_id: merchant_id.into(),
            shared_secret: shared_secret.into(),
        }
    }

    fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.gateway_url.trim().is_empty() {
            missing.push("gateway_url");
        }
        if self.merchant_id.trim().is_empty() {
            missing.push("merchant_id");
        }
        if self.shared_secret.is_empty() {
            missing.push("shared_secret");
        }
        missing
    }

    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }
}

/// Gateway settings for an event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewaySettings {
    #[serde(default)]
    pub test: GatewayCredentials,
    #[serde(default)]
    pub production: GatewayCredentials,
    /// The gateway needs a full billing address, so the payment method is
    /// only offered when the host forces customers to enter one.
    #[serde(default)]
    pub invoice_address_required: bool,
}

impl GatewaySettings {
    /// Loads settings from a JSON document on disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    fn raw(&self, env: Environment) -> &GatewayCredentials {
        match env {
            Environment::Test => &self.test,
            Environment::Production => &self.production,
        }
    }

    /// Returns the credentials for `env`, failing when any field is unset.
    pub fn credentials(&self, env: Environment) -> Result<&GatewayCredentials> {
        let credentials = self.raw(env);
        let missing = credentials.missing_fields();
        if missing.is_empty() {
            Ok(credentials)
        } else {
            Err(GatewayError::Configuration(format!(
                "{env} credentials missing {}",
                missing.join(", ")
            )))
        }
    }

    pub fn is_configured(&self, env: Environment) -> bool {
        self.raw(env).is_complete()
    }

    /// Secret used to check inbound results, `None` when unset.
    pub fn shared_secret(&self, env: Environment) -> Option<&str> {
        let secret = self.raw(env).shared_secret.as_str();
        (!secret.is_empty()).then_some(secret)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> GatewaySettings {
        GatewaySettings {
            test: GatewayCredentials::new("https://test.example/vpos", "MID1", "GSECRET"),
            production: GatewayCredentials::new("https://prod.example/vpos", "", "PSECRET"),
            invoice_address_required: true,
        }
    }

    #[test]
    fn test_environment_selection() {
        assert_eq!(Environment::for_testmode(true), Environment::Test);
        assert_eq!(Environment::for_testmode(false), Environment::Production);
    }

    #[test]
    fn test_complete_credentials() {
        let settings = settings();
        let creds = settings.credentials(Environment::Test).unwrap();
        assert_eq!(creds.merchant_id, "MID1");
        assert!(settings.is_configured(Environment::Test));
    }

    #[test]
    fn test_incomplete_credentials_are_configuration_errors() {
        let settings = settings();
        assert!(!settings.is_configured(Environment::Production));
        match settings.credentials(Environment::Production) {
            Err(GatewayError::Configuration(msg)) => assert!(msg.contains("merchant_id")),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_deserialize_partial_document() {
        let json = r#"{"test": {"gateway_url": "https://t", "merchant_id": "M"}}"#;
        let settings: GatewaySettings = serde_json::from_str(json).unwrap();
        assert!(!settings.invoice_address_required);
        assert!(!settings.is_configured(Environment::Test));
        assert!(!settings.is_configured(Environment::Production));
    }
}
