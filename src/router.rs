use std::sync::Arc;

use tokio::sync::OwnedMutexGuard;
use tracing::{debug, error};

use crate::command::{self, Command};
use crate::flow::affiliation;
use crate::flow::session::{ConversationStore, ConversationStoreType, SessionLocks};
use crate::gateway::MessageGateway;
use crate::ledger;
use crate::message::{Inbound, Outcome};
use crate::reply::Reply;
use crate::report::ReportExporter;
use crate::responders;
use crate::store::DataStore;

/// Dispatches every inbound message: classify, run the matched handler,
/// render the outcome, send it. One instance serves all subscribers.
pub struct Router {
    store: Arc<dyn DataStore>,
    conversations: ConversationStore,
    locks: SessionLocks,
    gateway: Arc<dyn MessageGateway>,
    exporter: Arc<dyn ReportExporter>,
}

impl Router {
    pub fn new(
        store: Arc<dyn DataStore>,
        conversations: ConversationStore,
        gateway: Arc<dyn MessageGateway>,
        exporter: Arc<dyn ReportExporter>,
    ) -> Arc<Self> {
        Arc::new(Self { store, conversations, locks: SessionLocks::new(), gateway, exporter })
    }

    /// Handles one message end to end. Never returns an error: every
    /// failure is recovered here, at the single-request boundary, so other
    /// subscribers' requests are unaffected.
    pub async fn handle(&self, msg: Inbound) {
        // Serializes classify → mutate → persist per subscriber. Held
        // until the outcome is delivered; released on every exit path.
        let _guards = self.lock_records(&msg).await;
        let outcome = self.dispatch(&msg).await;
        self.deliver(msg.phone(), outcome).await;
    }

    /// Locks every record this message may mutate: the sender's, plus the
    /// target's when the body is a consumption registration for someone
    /// else. Keys are acquired in sorted order so two subscribers
    /// registering consumptions for each other cannot deadlock.
    async fn lock_records(&self, msg: &Inbound) -> Vec<OwnedMutexGuard<()>> {
        let mut keys = vec![msg.phone()];
        if let Some(target) = ledger::consumption_target(msg.body()) {
            if target != msg.phone() {
                keys.push(target);
            }
        }
        keys.sort_unstable();

        let mut guards = Vec::with_capacity(keys.len());
        for key in keys {
            guards.push(self.locks.acquire(key).await);
        }
        guards
    }

    async fn dispatch(&self, msg: &Inbound) -> Outcome {
        let state = self.conversations.get(msg.phone()).await;
        let cmd = command::classify(state.is_some(), msg.body());
        debug!("Inbound: phone={}, command={:?}", msg.phone(), cmd);

        let result = match cmd {
            Command::ContinueFlow => match state {
                Some(state) => {
                    affiliation::advance(
                        &self.store,
                        &self.conversations,
                        msg.phone(),
                        state,
                        msg.body(),
                    )
                    .await
                }
                // Classifier only yields ContinueFlow when state exists.
                None => Ok(Outcome::silent()),
            },
            Command::StartAffiliation => {
                Ok(affiliation::start(&self.conversations, msg.phone()).await)
            }
            Command::CheckStatus => responders::check_status(&self.store, msg.phone()).await,
            Command::ListClinics => responders::list_clinics(&self.store).await,
            Command::Faq => Ok(responders::faq(None)),
            Command::TalkToAgent => Ok(responders::talk_to_agent()),
            Command::RegisterConsumption => {
                ledger::register_consumption(&self.store, msg.body()).await
            }
            Command::UseFreeConsultation => {
                ledger::use_free_consultation(&self.store, msg.phone()).await
            }
            Command::ViewHistory => responders::view_history(&self.store, msg.phone()).await,
            Command::DownloadReport => {
                responders::download_report(&self.store, self.exporter.as_ref()).await
            }
            Command::AddClinic => responders::add_clinic(&self.store, msg.body()).await,
            Command::Unrecognized => Ok(Outcome::silent()),
        };

        result.unwrap_or_else(|err| {
            error!("Handler failed: phone={}, command={:?}: {err}", msg.phone(), cmd);
            Outcome::reply(Reply::SystemError)
        })
    }

    /// Sends the rendered reply and any side notification. Gateway errors
    /// are logged and swallowed; no synchronous retry.
    async fn deliver(&self, phone: &str, outcome: Outcome) {
        if let Some(text) = outcome.reply.render() {
            if let Err(err) = self.gateway.send(phone, &text).await {
                error!("Send failed: to={phone}: {err}");
            }
        }
        if let Some(notification) = outcome.notification {
            if let Some(text) = notification.reply.render() {
                if let Err(err) = self.gateway.send(&notification.to, &text).await {
                    error!("Notification send failed: to={}: {err}", notification.to);
                }
            }
        }
    }
}
