use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("duplicate variable {name} (in {first_questionnaire} and {second_questionnaire})")]
    DuplicateVariable {
        name: String,
        first_questionnaire: String,
        second_questionnaire: String,
    },
}

pub type Result<T> = std::result::Result<T, CatalogError>;
