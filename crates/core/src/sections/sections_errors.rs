use thiserror::Error;
use uuid::Uuid;

/// Errors raised while editing or calculating sections.
#[derive(Error, Debug)]
pub enum SectionError {
    #[error("Section '{0}' not found")]
    SectionNotFound(String),

    #[error("Risk item {item_id} not found in section '{section_id}'")]
    ItemNotFound { section_id: String, item_id: Uuid },
}
