/// Errors raised while setting up a mapper.
#[derive(Debug, thiserror::Error)]
pub enum MappingError {
    #[error("Invalid endpoint template for repository {repository}: {message}")]
    InvalidEndpoint { repository: String, message: String },
}
