use thiserror::Error;
use uuid::Uuid;

use premia_rating::RatingClientError;

/// Errors surfaced by the rating boundary.
///
/// Transport failures are wrapped as-is; the remaining variants are logical
/// contract violations detected on otherwise successful responses.
#[derive(Error, Debug)]
pub enum RatingError {
    /// The rating client failed before a usable response existed
    /// (network failure, non-2xx status, malformed JSON).
    #[error("Rating service call failed: {0}")]
    Client(#[from] RatingClientError),

    /// The aggregate endpoint answered 2xx but with zero section
    /// aggregates. Distinct from transport failure: it almost always
    /// signals a payload contract mismatch, not an empty proposal.
    #[error("Aggregate calculation returned no section results")]
    EmptyAggregateResponse,

    /// The aggregate endpoint reported `success: false`.
    #[error("Aggregate calculation rejected by rating service: {0}")]
    AggregateRejected(String),

    /// A calculated item in a response matched no local risk item by id.
    /// The merge is aborted and local state left untouched.
    #[error("Calculated item {item_id} matches no local item in section {section_id}")]
    UnmatchedCalculatedItem { section_id: String, item_id: Uuid },

    /// A rating response came back without the item that was sent.
    #[error("Rating response carried no calculated item for {item_id} in section {section_id}")]
    MissingCalculatedItem { section_id: String, item_id: Uuid },

    /// A section aggregate in a response matched no local section by id.
    #[error("Section aggregate '{0}' matches no local section")]
    UnknownSectionAggregate(String),
}
