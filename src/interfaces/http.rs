//! HTTP endpoints for the hosted payment page round trip.
//!
//! ```text
//! GET  /{organizer}/{event}/modirum/redirect/{order}/{hash}/{payment}/  -> auto-submit form
//! GET  /{organizer}/{event}/modirum/return/{order}/{hash}/{payment}/    -> 303 to order
//! POST /{organizer}/{event}/modirum/return/{order}/{hash}/{payment}/    -> 303 to order
//! ```
//!
//! The return endpoint receives posts from the gateway's domain, so it takes
//! no CSRF token and sets no frame restrictions.

use crate::application::gateway::{GatewayService, RedirectPage};
use crate::application::inbound::PaymentPath;
use crate::application::outbound::SignedRequest;
use crate::error::GatewayError;
use axum::extract::{Form, Path, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::get;
use axum::Router;
use std::sync::Arc;

pub type SharedService = Arc<GatewayService>;

pub fn router(service: SharedService) -> Router {
    Router::new()
        .route(
            "/:organizer/:event/modirum/redirect/:order/:hash/:payment/",
            get(redirect),
        )
        .route(
            "/:organizer/:event/modirum/return/:order/:hash/:payment/",
            get(bare_return).post(callback),
        )
        .with_state(service)
}

/// Maps gateway errors onto HTTP responses.
struct HttpError(GatewayError);

impl From<GatewayError> for HttpError {
    fn from(err: GatewayError) -> Self {
        Self(err)
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        match self.0 {
            GatewayError::NotFound => (StatusCode::NOT_FOUND, "Unknown order").into_response(),
            err => {
                tracing::error!(error = %err, "gateway request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal error").into_response()
            }
        }
    }
}

async fn redirect(
    State(service): State<SharedService>,
    Path(path): Path<PaymentPath>,
) -> Result<Response, HttpError> {
    Ok(match service.prepare_redirect(&path).await? {
        RedirectPage::AutoSubmit(request) => Html(render_form(&request)).into_response(),
        RedirectPage::Redirect(location) => Redirect::to(&location).into_response(),
    })
}

async fn bare_return(
    State(service): State<SharedService>,
    Path(path): Path<PaymentPath>,
) -> Result<Redirect, HttpError> {
    let location = service.handle_bare_return(&path).await?;
    Ok(Redirect::to(&location))
}

async fn callback(
    State(service): State<SharedService>,
    Path(path): Path<PaymentPath>,
    Form(body): Form<Vec<(String, String)>>,
) -> Result<Redirect, HttpError> {
    let location = service.handle_callback(&path, body).await?;
    Ok(Redirect::to(&location))
}

/// Renders a page that posts the signed parameters to the gateway on load.
pub fn render_form(request: &SignedRequest) -> String {
    let mut inputs = String::new();
    for (name, value) in request.params.iter() {
        inputs.push_str(&format!(
            "    <input type=\"hidden\" name=\"{}\" value=\"{}\">\n",
            htmlescape::encode_attribute(name),
            htmlescape::encode_attribute(value)
        ));
    }
    format!(
        "<!DOCTYPE html>\n\
         <html>\n\
         <head><meta charset=\"utf-8\"><title>Redirecting to payment provider</title></head>\n\
         <body onload=\"document.forms[0].submit()\">\n\
         <form method=\"post\" action=\"{action}\">\n\
         {inputs}    <noscript><button type=\"submit\">Continue to payment</button></noscript>\n\
         </form>\n\
         </body>\n\
         </html>\n",
        action = htmlescape::encode_attribute(&request.gateway_url),
    )
}
