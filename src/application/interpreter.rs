use super::inbound::ValidatedResult;
use crate::domain::payment::{PaymentRecord, PaymentState};
use crate::domain::ports::{PaymentConfirmer, PaymentRepository};
use crate::domain::status::GatewayStatus;
use crate::error::{GatewayError, Result};

/// What applying a result did to the payment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Applied {
    Confirmed,
    Canceled,
    Failed,
    /// Terminal payment, unrecognized status, or a concurrent callback won.
    Unchanged,
    /// The host could not allocate inventory. The payment stays open.
    CapacityExceeded(String),
}

/// What the customer is told after the callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserOutcome {
    Canceled,
    Failed { message: String },
    OrderStatus,
}

impl UserOutcome {
    pub fn for_result(result: &ValidatedResult) -> Self {
        match &result.status {
            GatewayStatus::Canceled => Self::Canceled,
            status if status.is_failure() => Self::Failed {
                message: result.message.clone().unwrap_or_default(),
            },
            _ => Self::OrderStatus,
        }
    }

    pub fn message(&self) -> Option<String> {
        match self {
            Self::Canceled => Some(
                "The payment process was canceled. You can click below to try again.".to_string(),
            ),
            Self::Failed { message } => Some(format!(
                "The payment failed with the following message: {message}. \
                 You can click below to try again."
            )),
            Self::OrderStatus => None,
        }
    }
}

/// Applies authenticated gateway results to payment records.
pub struct ResultInterpreter<'a> {
    payments: &'a dyn PaymentRepository,
    confirmer: &'a dyn PaymentConfirmer,
}

impl<'a> ResultInterpreter<'a> {
    pub fn new(payments: &'a dyn PaymentRepository, confirmer: &'a dyn PaymentConfirmer) -> Self {
        Self {
            payments,
            confirmer,
        }
    }

    /// Stores the raw response on the payment, then moves an open payment
    /// according to the reported status.
    ///
    /// The info data write is kept even when confirmation runs out of capacity.
    pub async fn apply(&self, result: &ValidatedResult, payment: &PaymentRecord) -> Result<Applied> {
        self.payments
            .save_info_data(payment.id, result.raw.to_map())
            .await?;

        if !payment.state.is_open() {
            tracing::debug!(
                payment = payment.id,
                state = ?payment.state,
                status = %result.status,
                "payment already final, ignoring result"
            );
            return Ok(Applied::Unchanged);
        }

        let applied = match &result.status {
            status if status.is_success() => match self.confirmer.confirm(payment.id).await {
                Ok(true) => Applied::Confirmed,
                Ok(false) => Applied::Unchanged,
                Err(GatewayError::Capacity(msg)) => {
                    tracing::warn!(payment = payment.id, error = %msg, "confirmation ran out of capacity");
                    Applied::CapacityExceeded(msg)
                }
                Err(e) => return Err(e),
            },
            GatewayStatus::Canceled => {
                self.transition(payment, PaymentState::Canceled, Applied::Canceled)
                    .await?
            }
            status if status.is_failure() => {
                self.transition(payment, PaymentState::Failed, Applied::Failed)
                    .await?
            }
            _ => Applied::Unchanged,
        };

        tracing::info!(
            payment = payment.id,
            status = %result.status,
            outcome = ?applied,
            "gateway result applied"
        );
        Ok(applied)
    }

    async fn transition(
        &self,
        payment: &PaymentRecord,
        to: PaymentState,
        applied: Applied,
    ) -> Result<Applied> {
        let moved = self
            .payments
            .transition(payment.id, &PaymentState::OPEN, to)
            .await?;
        Ok(if moved { applied } else { Applied::Unchanged })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::parameters::ParameterSet;

    fn result(status: &str, message: Option<&str>) -> ValidatedResult {
        let mut raw = ParameterSet::from_pairs([("status", status)]);
        if let Some(m) = message {
            raw.push("message", m);
        }
        ValidatedResult {
            raw,
            status: GatewayStatus::parse(Some(status)),
            message: message.map(str::to_string),
        }
    }

    #[test]
    fn test_outcome_for_cancel() {
        let outcome = UserOutcome::for_result(&result("CANCELED", None));
        assert_eq!(outcome, UserOutcome::Canceled);
        assert!(outcome.message().unwrap().contains("canceled"));
    }

    #[test]
    fn test_outcome_for_failure_carries_gateway_message() {
        let outcome = UserOutcome::for_result(&result("REFUSED", Some("Card expired")));
        assert_eq!(
            outcome.message().unwrap(),
            "The payment failed with the following message: Card expired. \
             You can click below to try again."
        );
    }

    #[test]
    fn test_outcome_for_success_and_unknown() {
        assert_eq!(
            UserOutcome::for_result(&result("CAPTURED", None)),
            UserOutcome::OrderStatus
        );
        assert_eq!(
            UserOutcome::for_result(&result("SOMETHING", None)),
            UserOutcome::OrderStatus
        );
        assert!(UserOutcome::OrderStatus.message().is_none());
    }
}
