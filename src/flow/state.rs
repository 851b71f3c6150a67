use serde::{Deserialize, Serialize};

/// Step tag for an in-progress affiliation, mainly for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AffiliationStep {
    CollectingName,
    CollectingId,
    CollectingPlan,
}

/// Conversation state for one subscriber's affiliation flow.
///
/// Each variant carries exactly the answers collected so far, so a state
/// at `CollectingPlan` always has a name and a cédula. Advancing produces
/// a new value; states are never mutated in place or aliased outside the
/// conversation store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AffiliationState {
    CollectingName,
    CollectingId { nombre: String },
    CollectingPlan { nombre: String, cedula: String },
}

impl AffiliationState {
    /// Initial state, entered when the subscriber asks to affiliate.
    pub fn start() -> Self {
        AffiliationState::CollectingName
    }

    pub fn step(&self) -> AffiliationStep {
        match self {
            AffiliationState::CollectingName => AffiliationStep::CollectingName,
            AffiliationState::CollectingId { .. } => AffiliationStep::CollectingId,
            AffiliationState::CollectingPlan { .. } => AffiliationStep::CollectingPlan,
        }
    }
}
