use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Form, Router as HttpRouter};
use serde::Deserialize;
use tracing::info;

use crate::message::Inbound;
use crate::router::Router;

/// Twilio webhook form. `Body` may be absent; it becomes the empty string.
#[derive(Debug, Deserialize)]
pub struct TwilioForm {
    #[serde(rename = "From")]
    pub from: String,
    #[serde(rename = "Body", default)]
    pub body: Option<String>,
}

pub fn app(router: Arc<Router>) -> HttpRouter {
    HttpRouter::new().route("/webhook", post(webhook)).with_state(router)
}

/// Always acknowledges with 200; the conversational reply goes out through
/// the messaging gateway, not the HTTP response body.
async fn webhook(State(router): State<Arc<Router>>, Form(form): Form<TwilioForm>) -> StatusCode {
    let msg = Inbound::new(&form.from, form.body.as_deref().unwrap_or_default());
    router.handle(msg).await;
    StatusCode::OK
}

pub async fn serve(router: Arc<Router>, port: u16) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("🚀 Adrian está funcionando en puerto {port}");
    axum::serve(listener, app(router)).await?;
    Ok(())
}
