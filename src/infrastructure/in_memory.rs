use crate::domain::payment::{EventRef, Order, OrderStatus, PaymentRecord, PaymentState};
use crate::domain::ports::{
    AuditEntry, AuditLog, HostUrls, MessageQueue, OrderRepository, PaymentConfirmer,
    PaymentRepository,
};
use crate::error::{GatewayError, Result};
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;
use url::Url;

/// Remaining inventory for one event.
#[derive(Debug, Clone, Deserialize)]
pub struct QuotaSeed {
    pub event: EventRef,
    pub remaining: u32,
}

/// Initial content of an [`InMemoryHost`], loadable from JSON.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HostSeed {
    #[serde(default)]
    pub orders: Vec<Order>,
    #[serde(default)]
    pub payments: Vec<PaymentRecord>,
    #[serde(default)]
    pub quotas: Vec<QuotaSeed>,
}

impl HostSeed {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }
}

#[derive(Default)]
struct HostState {
    orders: HashMap<(EventRef, String), Order>,
    payments: HashMap<u64, PaymentRecord>,
    quotas: HashMap<EventRef, u32>,
    audit: Vec<AuditEntry>,
    messages: Vec<(String, String)>,
}

/// A thread-safe in-memory stand-in for the host order system.
///
/// All state sits behind one `Arc<RwLock<..>>`, so every check-and-set on
/// a payment runs under a single write lock. Events without a quota entry
/// have unlimited inventory.
#[derive(Default, Clone)]
pub struct InMemoryHost {
    state: Arc<RwLock<HostState>>,
}

impl InMemoryHost {
    /// Creates a new, empty host.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_seed(seed: HostSeed) -> Self {
        let mut state = HostState::default();
        for order in seed.orders {
            state
                .orders
                .insert((order.event.clone(), order.code.clone()), order);
        }
        for payment in seed.payments {
            state.payments.insert(payment.id, payment);
        }
        for quota in seed.quotas {
            state.quotas.insert(quota.event, quota.remaining);
        }
        Self {
            state: Arc::new(RwLock::new(state)),
        }
    }

    pub async fn add_order(&self, order: Order) {
        let mut state = self.state.write().await;
        state
            .orders
            .insert((order.event.clone(), order.code.clone()), order);
    }

    pub async fn add_payment(&self, payment: PaymentRecord) {
        self.state.write().await.payments.insert(payment.id, payment);
    }

    pub async fn set_quota(&self, event: EventRef, remaining: u32) {
        self.state.write().await.quotas.insert(event, remaining);
    }

    pub async fn order(&self, event: &EventRef, code: &str) -> Option<Order> {
        let state = self.state.read().await;
        state.orders.get(&(event.clone(), code.to_string())).cloned()
    }

    pub async fn payment(&self, id: u64) -> Option<PaymentRecord> {
        self.state.read().await.payments.get(&id).cloned()
    }

    pub async fn audit_entries(&self, order_code: &str) -> Vec<AuditEntry> {
        let state = self.state.read().await;
        state
            .audit
            .iter()
            .filter(|e| e.order_code == order_code)
            .cloned()
            .collect()
    }

    pub async fn messages(&self, order_code: &str) -> Vec<String> {
        let state = self.state.read().await;
        state
            .messages
            .iter()
            .filter(|(code, _)| code == order_code)
            .map(|(_, msg)| msg.clone())
            .collect()
    }
}

fn confirmed_total(state: &HostState, order: &Order) -> Decimal {
    state
        .payments
        .values()
        .filter(|p| order.owns(p) && p.state == PaymentState::Confirmed)
        .map(|p| p.amount)
        .sum()
}

#[async_trait]
impl OrderRepository for InMemoryHost {
    async fn find(&self, event: &EventRef, code: &str) -> Result<Option<Order>> {
        Ok(self.order(event, code).await)
    }
}

#[async_trait]
impl PaymentRepository for InMemoryHost {
    async fn find(
        &self,
        order: &Order,
        payment_id: u64,
        provider_prefix: &str,
    ) -> Result<Option<PaymentRecord>> {
        let state = self.state.read().await;
        let prefix = provider_prefix.to_lowercase();
        Ok(state
            .payments
            .get(&payment_id)
            .filter(|p| order.owns(p) && p.provider.to_lowercase().starts_with(&prefix))
            .cloned())
    }

    async fn save_info_data(&self, payment_id: u64, info_data: Map<String, Value>) -> Result<()> {
        let mut state = self.state.write().await;
        let payment = state
            .payments
            .get_mut(&payment_id)
            .ok_or_else(|| GatewayError::Host(format!("payment {payment_id} vanished")))?;
        payment.info_data = info_data;
        Ok(())
    }

    async fn transition(
        &self,
        payment_id: u64,
        from: &[PaymentState],
        to: PaymentState,
    ) -> Result<bool> {
        let mut state = self.state.write().await;
        match state.payments.get_mut(&payment_id) {
            Some(payment) if from.contains(&payment.state) => {
                payment.state = to;
                Ok(true)
            }
            Some(_) => Ok(false),
            None => Err(GatewayError::Host(format!("payment {payment_id} vanished"))),
        }
    }
}

#[async_trait]
impl PaymentConfirmer for InMemoryHost {
    async fn confirm(&self, payment_id: u64) -> Result<bool> {
        let mut guard = self.state.write().await;
        let state = &mut *guard;

        let payment = state
            .payments
            .get(&payment_id)
            .ok_or_else(|| GatewayError::Host(format!("payment {payment_id} vanished")))?;
        if !payment.state.is_open() {
            return Ok(false);
        }
        let order_key = (payment.event.clone(), payment.order_code.clone());
        if !state.orders.contains_key(&order_key) {
            return Err(GatewayError::Host(format!(
                "order {} of {} vanished",
                order_key.1, order_key.0.slug
            )));
        }

        if let Some(remaining) = state.quotas.get_mut(&order_key.0) {
            if *remaining == 0 {
                return Err(GatewayError::Capacity(format!(
                    "The quota for {} is exhausted, the payment could not be confirmed.",
                    order_key.0.slug
                )));
            }
            *remaining -= 1;
        }

        if let Some(payment) = state.payments.get_mut(&payment_id) {
            payment.state = PaymentState::Confirmed;
        }
        let paid = match state.orders.get(&order_key) {
            Some(order) => confirmed_total(&*state, order),
            None => Decimal::ZERO,
        };
        if let Some(order) = state.orders.get_mut(&order_key)
            && paid >= order.total
        {
            order.status = OrderStatus::Paid;
        }
        Ok(true)
    }
}

#[async_trait]
impl AuditLog for InMemoryHost {
    async fn append(&self, entry: AuditEntry) -> Result<()> {
        self.state.write().await.audit.push(entry);
        Ok(())
    }
}

#[async_trait]
impl MessageQueue for InMemoryHost {
    async fn error(&self, order_code: &str, message: String) -> Result<()> {
        let mut state = self.state.write().await;
        state.messages.push((order_code.to_string(), message));
        Ok(())
    }
}

/// Builds host URLs below a fixed public base URL.
#[derive(Debug, Clone)]
pub struct BaseUrl {
    base: Url,
}

impl BaseUrl {
    pub fn parse(base: &str) -> Result<Self> {
        let base = Url::parse(base)
            .map_err(|e| GatewayError::Configuration(format!("invalid base url {base}: {e}")))?;
        Ok(Self { base })
    }
}

impl HostUrls for BaseUrl {
    fn absolute_url(&self, path: &str) -> String {
        match self.base.join(path) {
            Ok(url) => url.to_string(),
            Err(_) => format!("{}{path}", self.base.as_str().trim_end_matches('/')),
        }
    }

    fn order_status_url(&self, order: &Order) -> String {
        self.absolute_url(&format!(
            "/{}/{}/order/{}/{}/",
            order.event.organizer, order.event.slug, order.code, order.secret
        ))
    }
}
