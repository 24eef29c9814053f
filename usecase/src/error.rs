use database::DatabaseError;
use thiserror::Error;
use types::IdError;

#[derive(Error, Debug)]
pub enum UsecaseError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Persistence failure: {0}")]
    Persistence(DatabaseError),

    #[error("Data integrity defect: {0}")]
    DataIntegrity(DatabaseError),

    #[error("Identity generation failed: {0}")]
    Identity(#[from] IdError),
}

impl From<DatabaseError> for UsecaseError {
    fn from(error: DatabaseError) -> Self {
        match error {
            DatabaseError::NotFound { entity, id } => UsecaseError::NotFound { entity, id },
            DatabaseError::DataIntegrity(_) => UsecaseError::DataIntegrity(error),
            other => UsecaseError::Persistence(other),
        }
    }
}

impl UsecaseError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, UsecaseError::NotFound { .. })
    }
}
