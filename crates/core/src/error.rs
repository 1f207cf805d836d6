use std::collections::BTreeMap;

use crate::types::DbId;

/// Field name to the list of messages reported for it.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    /// Validation failure attributed to individual request fields.
    #[error("Validation failed for fields: {}", field_names(.0))]
    FieldValidation(FieldErrors),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Rate limited: retry in {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },
}

impl CoreError {
    /// Build a single-field validation error.
    pub fn field(name: &str, message: impl Into<String>) -> Self {
        let mut fields = FieldErrors::new();
        fields.insert(name.to_string(), vec![message.into()]);
        CoreError::FieldValidation(fields)
    }
}

impl From<validator::ValidationErrors> for CoreError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let fields = errors
            .field_errors()
            .into_iter()
            .map(|(name, errs)| {
                let messages = errs
                    .iter()
                    .map(|e| {
                        e.message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| format!("Invalid value ({})", e.code))
                    })
                    .collect();
                (name.to_string(), messages)
            })
            .collect();
        CoreError::FieldValidation(fields)
    }
}

fn field_names(fields: &FieldErrors) -> String {
    fields.keys().cloned().collect::<Vec<_>>().join(", ")
}
