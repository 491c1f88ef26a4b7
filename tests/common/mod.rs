#![allow(dead_code)]

use modirum_gateway::application::gateway::{GatewayService, HostPorts};
use modirum_gateway::application::inbound::PaymentPath;
use modirum_gateway::config::{GatewayCredentials, GatewaySettings};
use modirum_gateway::domain::digest;
use modirum_gateway::domain::parameters::DIGEST_FIELD;
use modirum_gateway::domain::payment::{
    EventRef, InvoiceAddress, Order, OrderStatus, PaymentRecord, PaymentState,
};
use modirum_gateway::infrastructure::in_memory::{BaseUrl, InMemoryHost};
use rust_decimal_macros::dec;

pub const ORDER_CODE: &str = "O1";
pub const ORDER_SECRET: &str = "s3cr3t";
pub const GATEWAY_SECRET: &str = "GSECRET";
pub const PAYMENT_ID: u64 = 1;
pub const BASE_URL: &str = "https://tickets.example";

pub fn event() -> EventRef {
    EventRef::new("org", "e1")
}

pub fn settings() -> GatewaySettings {
    GatewaySettings {
        test: GatewayCredentials::new("https://test.gateway.example/vpos", "MID1", GATEWAY_SECRET),
        production: GatewayCredentials::new("https://gateway.example/vpos", "MID2", "PSECRET"),
        invoice_address_required: true,
    }
}

pub fn order() -> Order {
    Order {
        code: ORDER_CODE.to_string(),
        secret: ORDER_SECRET.to_string(),
        event: event(),
        currency: "EUR".to_string(),
        locale: "en".to_string(),
        testmode: true,
        status: OrderStatus::Pending,
        total: dec!(100.00),
        invoice_address: InvoiceAddress {
            country: "AT".to_string(),
            state: String::new(),
            zipcode: "1010".to_string(),
            city: "Vienna".to_string(),
            street: "Ring 1".to_string(),
        },
    }
}

pub async fn host_with_payment(state: PaymentState) -> InMemoryHost {
    let host = InMemoryHost::new();
    host.add_order(order()).await;
    let mut payment = PaymentRecord::new(PAYMENT_ID, 1, &order(), dec!(100.00));
    payment.state = state;
    host.add_payment(payment).await;
    host
}

pub fn service(host: &InMemoryHost, settings: GatewaySettings) -> GatewayService {
    let ports = HostPorts {
        orders: Box::new(host.clone()),
        payments: Box::new(host.clone()),
        confirmer: Box::new(host.clone()),
        audit: Box::new(host.clone()),
        messages: Box::new(host.clone()),
        urls: Box::new(BaseUrl::parse(BASE_URL).unwrap()),
    };
    GatewayService::new(settings, ports)
}

pub fn token() -> String {
    digest::integrity_token(ORDER_SECRET)
}

pub fn path() -> PaymentPath {
    PaymentPath {
        organizer: "org".to_string(),
        event: "e1".to_string(),
        order: ORDER_CODE.to_string(),
        hash: token(),
        payment: PAYMENT_ID.to_string(),
    }
}

pub fn order_status_url() -> String {
    format!("{BASE_URL}/org/e1/order/{ORDER_CODE}/{ORDER_SECRET}/")
}

/// Gateway-style callback body with a valid digest appended.
pub fn signed_body(fields: &[(&str, &str)], secret: &str) -> Vec<(String, String)> {
    let mut body: Vec<(String, String)> = fields
        .iter()
        .map(|(n, v)| (n.to_string(), v.to_string()))
        .collect();
    let digest = digest::sign(body.iter().map(|(_, v)| v.as_str()), secret);
    body.push((DIGEST_FIELD.to_string(), digest));
    body
}

pub fn callback_body(status: &str) -> Vec<(String, String)> {
    signed_body(
        &[
            ("mid", "MID1"),
            ("orderid", "E1O1P1"),
            ("status", status),
            ("orderAmount", "100.00"),
            ("currency", "EUR"),
            ("paymentTotal", "100.00"),
            ("message", "Card declined"),
            ("var1", ORDER_CODE),
            ("var2", "e1"),
            ("var3", "org"),
        ],
        GATEWAY_SECRET,
    )
}
