use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Provider identifier stored on payment records handled by this gateway.
pub const PROVIDER_IDENTIFIER: &str = "modirum";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentState {
    Created,
    Pending,
    Confirmed,
    Canceled,
    Failed,
}

impl PaymentState {
    /// States from which a gateway result may still move the payment.
    pub const OPEN: [PaymentState; 2] = [PaymentState::Created, PaymentState::Pending];

    pub fn is_open(self) -> bool {
        Self::OPEN.contains(&self)
    }
}

/// A payment attempt owned by the host. The gateway only writes `state`
/// and `info_data`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRecord {
    /// Host-wide primary key, used in URLs.
    pub id: u64,
    /// Sequence number of the payment within its order.
    pub local_id: u32,
    /// Order codes are only unique within an event.
    pub event: EventRef,
    pub order_code: String,
    pub provider: String,
    pub amount: Decimal,
    pub state: PaymentState,
    /// Last raw response posted back by the gateway.
    #[serde(default)]
    pub info_data: Map<String, Value>,
}

impl PaymentRecord {
    /// A fresh payment attempt for `order`.
    pub fn new(id: u64, local_id: u32, order: &Order, amount: Decimal) -> Self {
        Self {
            id,
            local_id,
            event: order.event.clone(),
            order_code: order.code.clone(),
            provider: PROVIDER_IDENTIFIER.to_string(),
            amount,
            state: PaymentState::Created,
            info_data: Map::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Paid,
    Expired,
    Canceled,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceAddress {
    /// ISO 3166 country code.
    pub country: String,
    #[serde(default)]
    pub state: String,
    pub zipcode: String,
    pub city: String,
    pub street: String,
}

/// The event an order belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventRef {
    pub organizer: String,
    pub slug: String,
}

impl EventRef {
    pub fn new(organizer: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            organizer: organizer.into(),
            slug: slug.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub code: String,
    pub secret: String,
    pub event: EventRef,
    pub currency: String,
    /// Locale tag such as `en` or `de-informal`.
    pub locale: String,
    pub testmode: bool,
    pub status: OrderStatus,
    pub total: Decimal,
    #[serde(default)]
    pub invoice_address: InvoiceAddress,
}

impl Order {
    /// Two-letter language code sent to the gateway.
    pub fn language(&self) -> &str {
        match self.locale.char_indices().nth(2) {
            Some((idx, _)) => &self.locale[..idx],
            None => &self.locale,
        }
    }

    pub fn is_paid(&self) -> bool {
        self.status == OrderStatus::Paid
    }

    /// Whether `payment` was made for this order.
    pub fn owns(&self, payment: &PaymentRecord) -> bool {
        payment.event == self.event && payment.order_code == self.code
    }
}
