use thiserror::Error;
use uuid::Uuid;

/// Errors raised by the proposal calculation session.
#[derive(Error, Debug)]
pub enum ProposalError {
    #[error("Proposal has no sections to aggregate")]
    NoSections,

    #[error("An apply is already in flight for item {item_id} in section '{section_id}'")]
    ApplyInFlight { section_id: String, item_id: Uuid },

    #[error("Calculation context lock poisoned: {0}")]
    ContextLock(String),
}
