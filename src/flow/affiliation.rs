use std::sync::Arc;

use tracing::info;

use crate::flow::session::{ConversationStore, ConversationStoreType};
use crate::flow::state::AffiliationState;
use crate::message::Outcome;
use crate::model::{Plan, Subscriber};
use crate::reply::Reply;
use crate::store::{DataStore, StoreError};

/// Opens an affiliation flow for this phone and asks for the name.
/// No durable record is written until the final step.
pub async fn start(conversations: &ConversationStore, phone: &str) -> Outcome {
    conversations.put(phone, AffiliationState::start()).await;
    info!("Affiliation started: phone={phone}");
    Outcome::reply(Reply::AskName)
}

/// Advances an in-progress flow with the subscriber's next answer.
///
/// Name and cédula answers are stored literally. The plan answer is
/// validated against the fixed choices; an invalid choice leaves the
/// state untouched so the collected answers survive. The conversation
/// state is only removed after the subscriber record is confirmed saved;
/// a failed save keeps the flow alive at `CollectingPlan`.
pub async fn advance(
    store: &Arc<dyn DataStore>,
    conversations: &ConversationStore,
    phone: &str,
    state: AffiliationState,
    body: &str,
) -> Result<Outcome, StoreError> {
    match state {
        AffiliationState::CollectingName => {
            conversations
                .put(phone, AffiliationState::CollectingId { nombre: body.to_string() })
                .await;
            Ok(Outcome::reply(Reply::AskCedula))
        }
        AffiliationState::CollectingId { nombre } => {
            conversations
                .put(phone, AffiliationState::CollectingPlan { nombre, cedula: body.to_string() })
                .await;
            Ok(Outcome::reply(Reply::AskPlan))
        }
        AffiliationState::CollectingPlan { nombre, cedula } => {
            let Some(plan) = Plan::from_choice(body) else {
                return Ok(Outcome::reply(Reply::InvalidPlan));
            };

            let subscriber = Subscriber::new(phone, nombre, cedula, plan);
            store.save_subscriber(subscriber).await?;
            conversations.remove(phone).await;
            info!("Affiliation completed: phone={phone}, plan={}", plan.label());
            Ok(Outcome::reply(Reply::Affiliated { plan }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::session::InMemoryConversationStore;
    use crate::store::InMemoryStore;

    fn collaborators() -> (Arc<dyn DataStore>, ConversationStore) {
        let store: Arc<dyn DataStore> = InMemoryStore::new();
        let conversations: ConversationStore = InMemoryConversationStore::new(60);
        (store, conversations)
    }

    #[tokio::test]
    async fn test_start_prompts_for_name_and_writes_no_record() {
        let (store, conversations) = collaborators();

        let out = start(&conversations, "0414111").await;

        assert_eq!(out.reply, Reply::AskName);
        assert_eq!(conversations.get("0414111").await, Some(AffiliationState::CollectingName));
        assert!(store.list_subscribers().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_full_walkthrough_creates_exactly_one_subscriber() {
        let (store, conversations) = collaborators();
        let phone = "0414111";

        start(&conversations, phone).await;

        let state = conversations.get(phone).await.unwrap();
        let out = advance(&store, &conversations, phone, state, "Ana Pérez").await.unwrap();
        assert_eq!(out.reply, Reply::AskCedula);

        let state = conversations.get(phone).await.unwrap();
        let out = advance(&store, &conversations, phone, state, "12345678").await.unwrap();
        assert_eq!(out.reply, Reply::AskPlan);

        let state = conversations.get(phone).await.unwrap();
        let out = advance(&store, &conversations, phone, state, "2").await.unwrap();
        assert_eq!(out.reply, Reply::Affiliated { plan: Plan::Membresia2 });

        assert_eq!(conversations.get(phone).await, None);
        let subscribers = store.list_subscribers().await.unwrap();
        assert_eq!(subscribers.len(), 1);
        assert_eq!(subscribers[0].nombre, "Ana Pérez");
        assert_eq!(subscribers[0].cedula, "12345678");
        assert_eq!(subscribers[0].plan, Some(Plan::Membresia2));
        assert_eq!(subscribers[0].consumos, 0);
        assert!(!subscribers[0].consulta_gratis);
    }

    #[tokio::test]
    async fn test_invalid_plan_preserves_collected_answers() {
        let (store, conversations) = collaborators();
        let phone = "0414111";
        conversations
            .put(
                phone,
                AffiliationState::CollectingPlan {
                    nombre: "Ana Pérez".into(),
                    cedula: "12345678".into(),
                },
            )
            .await;

        let state = conversations.get(phone).await.unwrap();
        let out = advance(&store, &conversations, phone, state, "9").await.unwrap();

        assert_eq!(out.reply, Reply::InvalidPlan);
        assert!(store.list_subscribers().await.unwrap().is_empty());
        // Still at the plan step with everything collected so far.
        assert_eq!(
            conversations.get(phone).await,
            Some(AffiliationState::CollectingPlan {
                nombre: "Ana Pérez".into(),
                cedula: "12345678".into(),
            })
        );
    }
}
