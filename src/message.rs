use crate::reply::Reply;

/// One inbound webhook message, normalized: the transport prefix is
/// stripped from the sender and the body is trimmed (an absent body is the
/// empty string, never null).
#[derive(Debug, Clone, PartialEq)]
pub struct Inbound {
    phone: String,
    body: String,
}

impl Inbound {
    pub fn new(from: &str, body: &str) -> Self {
        let phone = from.strip_prefix("whatsapp:").unwrap_or(from).to_string();
        Self { phone, body: body.trim().to_string() }
    }

    pub fn phone(&self) -> &str {
        &self.phone
    }

    pub fn body(&self) -> &str {
        &self.body
    }
}

/// Out-of-band message to someone other than the sender (e.g. the reward
/// announcement to the consumption target).
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub to: String,
    pub reply: Reply,
}

/// What every handler returns: a reply for the sender plus at most one
/// side notification. Error paths produce one too; nothing bypasses the
/// formatter.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub reply: Reply,
    pub notification: Option<Notification>,
}

impl Outcome {
    pub fn reply(reply: Reply) -> Self {
        Self { reply, notification: None }
    }

    pub fn silent() -> Self {
        Self::reply(Reply::Silent)
    }

    pub fn with_notification(reply: Reply, to: &str, side: Reply) -> Self {
        Self { reply, notification: Some(Notification { to: to.to_string(), reply: side }) }
    }
}
