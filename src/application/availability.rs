use crate::config::{Environment, GatewaySettings};

/// Whether the payment method may be offered for the given environment.
///
/// Requires complete credentials and a mandatory invoice address, because
/// the gateway rejects requests without billing details.
pub fn is_allowed(settings: &GatewaySettings, env: Environment) -> bool {
    let allowed = settings.invoice_address_required && settings.is_configured(env);
    if !allowed {
        tracing::debug!(environment = %env, "modirum payment method not available");
    }
    allowed
}

/// Warning for the settings page when invoice addresses are optional.
pub fn settings_warning(settings: &GatewaySettings) -> Option<&'static str> {
    (!settings.invoice_address_required).then_some(
        "Modirum payments only work if the customer fills in a full invoice address, \
         so we recommend requiring an address in your invoicing settings.",
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GatewayCredentials;

    fn configured() -> GatewaySettings {
        GatewaySettings {
            test: GatewayCredentials::new("https://t", "MID1", "GSECRET"),
            production: GatewayCredentials::new("https://p", "MID2", "PSECRET"),
            invoice_address_required: true,
        }
    }

    #[test]
    fn test_allowed_when_fully_configured() {
        let settings = configured();
        assert!(is_allowed(&settings, Environment::Test));
        assert!(is_allowed(&settings, Environment::Production));
        assert!(settings_warning(&settings).is_none());
    }

    #[test]
    fn test_requires_invoice_address() {
        let mut settings = configured();
        settings.invoice_address_required = false;
        assert!(!is_allowed(&settings, Environment::Test));
        assert!(settings_warning(&settings).is_some());
    }

    #[test]
    fn test_environments_are_independent() {
        let mut settings = configured();
        settings.production.shared_secret.clear();
        assert!(is_allowed(&settings, Environment::Test));
        assert!(!is_allowed(&settings, Environment::Production));
    }
}
