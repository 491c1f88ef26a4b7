use crate::config::{Environment, GatewaySettings};
use crate::domain::digest;
use crate::domain::parameters::{DIGEST_FIELD, ParameterSet};
use crate::domain::payment::{EventRef, Order, PaymentRecord};
use crate::domain::ports::HostUrls;
use crate::error::Result;

/// Protocol version spoken with the gateway.
pub const PROTOCOL_VERSION: &str = "2";

/// A parameter set ready to be posted to the hosted payment page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedRequest {
    pub gateway_url: String,
    pub params: ParameterSet,
}

fn gateway_path(
    endpoint: &str,
    event: &EventRef,
    order_code: &str,
    token: &str,
    payment_id: u64,
) -> String {
    format!(
        "/{}/{}/modirum/{endpoint}/{order_code}/{token}/{payment_id}/",
        event.organizer, event.slug
    )
}

/// Path of the page that forwards the customer to the gateway.
pub fn checkout_path(order: &Order, payment: &PaymentRecord) -> String {
    gateway_path(
        "redirect",
        &order.event,
        &order.code,
        &digest::integrity_token(&order.secret),
        payment.id,
    )
}

/// Path the gateway posts results back to. Used for both success and cancellation.
pub fn return_path(order: &Order, payment: &PaymentRecord) -> String {
    gateway_path(
        "return",
        &order.event,
        &order.code,
        &digest::integrity_token(&order.secret),
        payment.id,
    )
}

/// Appends the digest over all current values as the final parameter.
pub fn sign_parameters(mut params: ParameterSet, secret: &str) -> ParameterSet {
    let digest = digest::sign(params.values(), secret);
    params.push(DIGEST_FIELD, digest);
    params
}

/// Assembles outbound payment requests for one event.
pub struct OutboundRequestBuilder<'a> {
    settings: &'a GatewaySettings,
    urls: &'a dyn HostUrls,
}

impl<'a> OutboundRequestBuilder<'a> {
    pub fn new(settings: &'a GatewaySettings, urls: &'a dyn HostUrls) -> Self {
        Self { settings, urls }
    }

    /// Builds the unsigned parameter set for a payment.
    ///
    /// Fails with `GatewayError::Configuration` when the credentials of the
    /// order's environment are incomplete.
    pub fn build(&self, order: &Order, payment: &PaymentRecord) -> Result<ParameterSet> {
        let env = Environment::for_testmode(order.testmode);
        let credentials = self.settings.credentials(env)?;
        let event_upper = order.event.slug.to_uppercase();
        let callback = self.urls.absolute_url(&return_path(order, payment));
        let address = &order.invoice_address;

        let mut params = ParameterSet::new();
        params.push("version", PROTOCOL_VERSION);
        params.push("mid", credentials.merchant_id.as_str());
        params.push("lang", order.language());
        params.push(
            "orderid",
            format!("{event_upper}{}P{}", order.code, payment.local_id),
        );
        params.push("orderDesc", format!("Order {event_upper}-{}", order.code));
        params.push("orderAmount", payment.amount.to_string());
        params.push("currency", order.currency.as_str());
        params.push("billCountry", address.country.as_str());
        params.push("billState", address.state.as_str());
        params.push("billZip", address.zipcode.as_str());
        params.push("billCity", address.city.as_str());
        params.push("billAddress", address.street.as_str());
        params.push("confirmUrl", callback.as_str());
        params.push("cancelUrl", callback);
        params.push("var1", order.code.as_str());
        params.push("var2", order.event.slug.as_str());
        params.push("var3", order.event.organizer.as_str());
        Ok(params)
    }

    /// Builds and signs the request, pairing it with the gateway URL.
    pub fn prepare(&self, order: &Order, payment: &PaymentRecord) -> Result<SignedRequest> {
        let env = Environment::for_testmode(order.testmode);
        let credentials = self.settings.credentials(env)?;
        let params = self.build(order, payment)?;

        tracing::debug!(
            order = %order.code,
            payment = payment.id,
            environment = %env,
            fields = params.len(),
            "signing outbound payment request"
        );

        Ok(SignedRequest {
            gateway_url: credentials.gateway_url.clone(),
            params: sign_parameters(params, &credentials.shared_secret),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GatewayCredentials;
    use crate::domain::payment::{InvoiceAddress, OrderStatus};
    use crate::error::GatewayError;
    use rust_decimal_macros::dec;

    struct TestUrls;

    impl HostUrls for TestUrls {
        fn absolute_url(&self, path: &str) -> String {
            format!("https://tickets.example{path}")
        }

        fn order_status_url(&self, order: &Order) -> String {
            format!("https://tickets.example/order/{}/", order.code)
        }
    }

    fn settings() -> GatewaySettings {
        GatewaySettings {
            test: GatewayCredentials::new("https://test.example/vpos", "MID1", "GSECRET"),
            production: GatewayCredentials::default(),
            invoice_address_required: true,
        }
    }

    fn order(testmode: bool) -> Order {
        Order {
            code: "O1".into(),
            secret: "s3cr3t".into(),
            event: EventRef::new("org", "e1"),
            currency: "EUR".into(),
            locale: "en".into(),
            testmode,
            status: OrderStatus::Pending,
            total: dec!(100.00),
            invoice_address: InvoiceAddress {
                country: "AT".into(),
                state: "".into(),
                zipcode: "1010".into(),
                city: "Vienna".into(),
                street: "Ring 1".into(),
            },
        }
    }

    #[test]
    fn test_build_fixed_field_order() {
        let settings = settings();
        let builder = OutboundRequestBuilder::new(&settings, &TestUrls);
        let payment = PaymentRecord::new(42, 1, &order(true), dec!(100.00));
        let params = builder.build(&order(true), &payment).unwrap();

        let names: Vec<&str> = params.iter().map(|(n, _)| n).collect();
        assert_eq!(
            names,
            [
                "version",
                "mid",
                "lang",
                "orderid",
                "orderDesc",
                "orderAmount",
                "currency",
                "billCountry",
                "billState",
                "billZip",
                "billCity",
                "billAddress",
                "confirmUrl",
                "cancelUrl",
                "var1",
                "var2",
                "var3",
            ]
        );
        assert_eq!(params.get("mid"), Some("MID1"));
        assert_eq!(params.get("orderid"), Some("E1O1P1"));
        assert_eq!(params.get("orderDesc"), Some("Order E1-O1"));
        assert_eq!(params.get("orderAmount"), Some("100.00"));
        assert_eq!(params.get("confirmUrl"), params.get("cancelUrl"));
    }

    #[test]
    fn test_callback_url_embeds_locator() {
        let settings = settings();
        let builder = OutboundRequestBuilder::new(&settings, &TestUrls);
        let payment = PaymentRecord::new(42, 1, &order(true), dec!(100.00));
        let params = builder.build(&order(true), &payment).unwrap();

        let expected = format!(
            "https://tickets.example/org/e1/modirum/return/O1/{}/42/",
            digest::integrity_token("s3cr3t")
        );
        assert_eq!(params.get("confirmUrl"), Some(expected.as_str()));
    }

    #[test]
    fn test_prepare_appends_digest_last() {
        let settings = settings();
        let builder = OutboundRequestBuilder::new(&settings, &TestUrls);
        let payment = PaymentRecord::new(42, 1, &order(true), dec!(100.00));
        let request = builder.prepare(&order(true), &payment).unwrap();

        assert_eq!(request.gateway_url, "https://test.example/vpos");
        let (last_name, last_value) = request.params.iter().last().unwrap();
        assert_eq!(last_name, DIGEST_FIELD);

        let mut unsigned = request.params.clone();
        unsigned.remove(DIGEST_FIELD);
        assert!(digest::verify(unsigned.values(), "GSECRET", last_value));
    }

    #[test]
    fn test_missing_production_credentials() {
        let settings = settings();
        let builder = OutboundRequestBuilder::new(&settings, &TestUrls);
        let payment = PaymentRecord::new(42, 1, &order(true), dec!(100.00));
        assert!(matches!(
            builder.build(&order(false), &payment),
            Err(GatewayError::Configuration(_))
        ));
    }
}
