//! Interfaces to the host order-management system.
//!
//! The gateway owns no persistent state. Everything it reads or mutates goes
//! through these traits, and the host is responsible for making
//! [`PaymentRepository::transition`] and [`PaymentConfirmer::confirm`]
//! atomic check-and-set operations.

use super::payment::{EventRef, Order, PaymentRecord, PaymentState};
use super::status::GatewayStatus;
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Action type of the audit entry written for every authenticated callback.
pub const GATEWAY_EVENT_ACTION: &str = "modirum.event";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub order_code: String,
    pub action_type: String,
    pub data: Map<String, Value>,
}

impl AuditEntry {
    pub fn gateway_event(order_code: impl Into<String>, data: Map<String, Value>) -> Self {
        Self {
            order_code: order_code.into(),
            action_type: GATEWAY_EVENT_ACTION.to_string(),
            data,
        }
    }

    /// Human readable line for gateway events, `None` for foreign entries.
    pub fn display(&self) -> Option<String> {
        if self.action_type != GATEWAY_EVENT_ACTION {
            return None;
        }
        let status = GatewayStatus::parse(self.data.get("status").and_then(Value::as_str));
        Some(format!("Modirum reported an event: {}", status.description()))
    }
}

#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn find(&self, event: &EventRef, code: &str) -> Result<Option<Order>>;
}

#[async_trait]
pub trait PaymentRepository: Send + Sync {
    /// Looks up a payment belonging to `order` whose provider starts with
    /// `provider_prefix`, ignoring case.
    async fn find(
        &self,
        order: &Order,
        payment_id: u64,
        provider_prefix: &str,
    ) -> Result<Option<PaymentRecord>>;

    async fn save_info_data(&self, payment_id: u64, info_data: Map<String, Value>) -> Result<()>;

    /// Moves the payment to `to` if its current state is one of `from`.
    /// Returns whether the transition happened.
    async fn transition(&self, payment_id: u64, from: &[PaymentState], to: PaymentState)
    -> Result<bool>;
}

#[async_trait]
pub trait PaymentConfirmer: Send + Sync {
    /// Confirms an open payment, allocating inventory for its order.
    ///
    /// Returns `Ok(false)` when the payment was no longer open and
    /// `GatewayError::Capacity` when the inventory is exhausted.
    async fn confirm(&self, payment_id: u64) -> Result<bool>;
}

#[async_trait]
pub trait AuditLog: Send + Sync {
    async fn append(&self, entry: AuditEntry) -> Result<()>;
}

/// Flash messages shown to the customer on the next page.
#[async_trait]
pub trait MessageQueue: Send + Sync {
    async fn error(&self, order_code: &str, message: String) -> Result<()>;
}

pub trait HostUrls: Send + Sync {
    /// Turns a host-absolute path into a full URL.
    fn absolute_url(&self, path: &str) -> String;

    /// Public status page of an order.
    fn order_status_url(&self, order: &Order) -> String;
}

pub type OrderRepositoryBox = Box<dyn OrderRepository>;
pub type PaymentRepositoryBox = Box<dyn PaymentRepository>;
pub type PaymentConfirmerBox = Box<dyn PaymentConfirmer>;
pub type AuditLogBox = Box<dyn AuditLog>;
pub type MessageQueueBox = Box<dyn MessageQueue>;
pub type HostUrlsBox = Box<dyn HostUrls>;
