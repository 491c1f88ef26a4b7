use super::inbound::{InboundResultValidator, PaymentPath};
use super::interpreter::{Applied, ResultInterpreter, UserOutcome};
use super::outbound::{OutboundRequestBuilder, SignedRequest};
use crate::config::GatewaySettings;
use crate::domain::parameters::ParameterSet;
use crate::domain::payment::{Order, PaymentRecord};
use crate::domain::ports::{
    AuditEntry, AuditLogBox, HostUrlsBox, MessageQueueBox, OrderRepositoryBox,
    PaymentConfirmerBox, PaymentRepositoryBox,
};
use crate::error::{GatewayError, Result};

pub const VALIDATION_FAILED_MESSAGE: &str = "Sorry, we could not validate the payment result. \
     Please try again or contact the event organizer to check if your payment was successful.";

pub const BARE_RETURN_MESSAGE: &str =
    "The payment failed without an error message. You can click below to try again.";

pub const UNAVAILABLE_MESSAGE: &str =
    "This payment method is currently unavailable. Please choose another one.";

pub const PROCESSING_FAILED_MESSAGE: &str = "Sorry, an error occurred while processing \
     the payment result. Please contact the event organizer to check if your payment was successful.";

/// Host collaborators the gateway talks to.
pub struct HostPorts {
    pub orders: OrderRepositoryBox,
    pub payments: PaymentRepositoryBox,
    pub confirmer: PaymentConfirmerBox,
    pub audit: AuditLogBox,
    pub messages: MessageQueueBox,
    pub urls: HostUrlsBox,
}

/// Response of the redirect endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedirectPage {
    /// Auto-submitting form posting the signed request to the gateway.
    AutoSubmit(SignedRequest),
    /// Send the customer elsewhere, a message has been queued.
    Redirect(String),
}

/// Entry point for both gateway endpoints.
///
/// Each call is an independent unit of work. Concurrent callbacks for the
/// same payment are serialized by the host through the state transition ports.
pub struct GatewayService {
    settings: GatewaySettings,
    ports: HostPorts,
}

impl GatewayService {
    pub fn new(settings: GatewaySettings, ports: HostPorts) -> Self {
        Self { settings, ports }
    }

    async fn locate(&self, path: &PaymentPath) -> Result<(Order, PaymentRecord)> {
        InboundResultValidator::new(&self.settings)
            .locate(
                self.ports.orders.as_ref(),
                self.ports.payments.as_ref(),
                path,
            )
            .await
    }

    /// Builds the signed request the customer's browser forwards to the gateway.
    pub async fn prepare_redirect(&self, path: &PaymentPath) -> Result<RedirectPage> {
        let (order, payment) = self.locate(path).await?;
        let builder = OutboundRequestBuilder::new(&self.settings, self.ports.urls.as_ref());

        match builder.prepare(&order, &payment) {
            Ok(request) => {
                tracing::info!(order = %order.code, payment = payment.id, "redirecting to gateway");
                Ok(RedirectPage::AutoSubmit(request))
            }
            Err(GatewayError::Configuration(reason)) => {
                tracing::error!(order = %order.code, %reason, "gateway not configured");
                self.ports
                    .messages
                    .error(&order.code, UNAVAILABLE_MESSAGE.to_string())
                    .await?;
                Ok(RedirectPage::Redirect(
                    self.ports.urls.order_status_url(&order),
                ))
            }
            Err(e) => Err(e),
        }
    }

    /// A plain GET on the return endpoint means the gateway sent the customer
    /// back without a result.
    pub async fn handle_bare_return(&self, path: &PaymentPath) -> Result<String> {
        let (order, _) = self.locate(path).await?;
        self.ports
            .messages
            .error(&order.code, BARE_RETURN_MESSAGE.to_string())
            .await?;
        Ok(self.order_location(&order))
    }

    /// Processes a result posted by the gateway and returns where to send
    /// the customer.
    ///
    /// Only a failed lookup surfaces as an error. Once the order is known,
    /// host failures send the customer back to it with a message.
    pub async fn handle_callback(
        &self,
        path: &PaymentPath,
        body: Vec<(String, String)>,
    ) -> Result<String> {
        let (order, payment) = self.locate(path).await?;
        match self.process_callback(&order, &payment, body).await {
            Ok(location) => Ok(location),
            Err(err) => {
                tracing::error!(order = %order.code, payment = payment.id, error = %err, "failed to process gateway result");
                if let Err(err) = self
                    .ports
                    .messages
                    .error(&order.code, PROCESSING_FAILED_MESSAGE.to_string())
                    .await
                {
                    tracing::error!(order = %order.code, error = %err, "could not queue customer message");
                }
                Ok(self.order_location(&order))
            }
        }
    }

    async fn process_callback(
        &self,
        order: &Order,
        payment: &PaymentRecord,
        body: Vec<(String, String)>,
    ) -> Result<String> {
        let posted = ParameterSet::from_pairs(body);

        let validator = InboundResultValidator::new(&self.settings);
        let result = match validator.authenticate(order, posted) {
            Ok(result) => result,
            Err(GatewayError::Validation(reason)) => {
                tracing::warn!(order = %order.code, payment = payment.id, %reason, "rejected gateway result");
                self.ports
                    .messages
                    .error(&order.code, VALIDATION_FAILED_MESSAGE.to_string())
                    .await?;
                return Ok(self.order_location(order));
            }
            Err(e) => return Err(e),
        };

        self.ports
            .audit
            .append(AuditEntry::gateway_event(&order.code, result.raw.to_map()))
            .await?;

        let interpreter =
            ResultInterpreter::new(self.ports.payments.as_ref(), self.ports.confirmer.as_ref());
        if let Applied::CapacityExceeded(msg) = interpreter.apply(&result, payment).await? {
            self.ports.messages.error(&order.code, msg).await?;
        }

        if let Some(message) = UserOutcome::for_result(&result).message() {
            self.ports.messages.error(&order.code, message).await?;
        }

        // Confirmation may have changed the order status.
        let refreshed = self.ports.orders.find(&order.event, &order.code).await?;
        Ok(self.order_location(refreshed.as_ref().unwrap_or(order)))
    }

    fn order_location(&self, order: &Order) -> String {
        let url = self.ports.urls.order_status_url(order);
        if order.is_paid() {
            format!("{url}?paid=yes")
        } else {
            url
        }
    }
}
