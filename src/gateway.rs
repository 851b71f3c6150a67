use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::Mutex;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("gateway rejected message: status {0}")]
    Rejected(u16),
}

/// Outbound messaging seam. Send failures are logged and swallowed by the
/// caller, never retried synchronously, never allowed to crash a handler.
#[async_trait]
pub trait MessageGateway: Send + Sync {
    async fn send(&self, to: &str, text: &str) -> Result<(), GatewayError>;

    fn name(&self) -> &'static str;
}

impl fmt::Debug for dyn MessageGateway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageGateway").field("impl", &self.name()).finish()
    }
}

/// Twilio WhatsApp sender. Requests are bounded by the client timeout so a
/// stuck gateway surfaces as a retryable-by-caller failure, never a hang.
pub struct TwilioGateway {
    http: reqwest::Client,
    account_sid: String,
    auth_token: String,
    from_number: String,
}

impl TwilioGateway {
    pub fn new(
        account_sid: &str,
        auth_token: &str,
        from_number: &str,
    ) -> Result<Self, GatewayError> {
        let http = reqwest::Client::builder().timeout(Duration::from_secs(10)).build()?;
        Ok(Self {
            http,
            account_sid: account_sid.to_string(),
            auth_token: auth_token.to_string(),
            from_number: from_number.to_string(),
        })
    }
}

#[async_trait]
impl MessageGateway for TwilioGateway {
    async fn send(&self, to: &str, text: &str) -> Result<(), GatewayError> {
        let url = format!(
            "https://api.twilio.com/2010-04-01/Accounts/{}/Messages.json",
            self.account_sid
        );
        let params = [
            ("From", format!("whatsapp:{}", self.from_number)),
            ("To", format!("whatsapp:{to}")),
            ("Body", text.to_string()),
        ];
        let response = self
            .http
            .post(&url)
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(GatewayError::Rejected(response.status().as_u16()));
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "TwilioGateway"
    }
}

/// Captures outbound messages instead of sending them. Used by tests and
/// handy for dry runs.
#[derive(Debug, Default)]
pub struct RecordingGateway {
    sent: Mutex<Vec<(String, String)>>,
}

impl RecordingGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().await.clone()
    }

    pub async fn last(&self) -> Option<(String, String)> {
        self.sent.lock().await.last().cloned()
    }
}

#[async_trait]
impl MessageGateway for RecordingGateway {
    async fn send(&self, to: &str, text: &str) -> Result<(), GatewayError> {
        self.sent.lock().await.push((to.to_string(), text.to_string()));
        Ok(())
    }

    fn name(&self) -> &'static str {
        "RecordingGateway"
    }
}
