use thiserror::Error;

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("invalid JSON: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("missing or zero field `{field}`")]
    Validation { field: &'static str },
}

impl RecordError {
    pub(crate) fn missing(field: &'static str) -> Self {
        Self::Validation { field }
    }
}
