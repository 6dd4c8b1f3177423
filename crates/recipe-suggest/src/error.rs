use recipe_common::llm::LlmError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(String),

    #[error("catalog error: {0}")]
    Catalog(String),

    #[error("recipe not found: {0}")]
    NotFound(i64),

    #[error("{0} capability is not configured")]
    Capability(&'static str),

    #[error("malformed model output: {0}")]
    MalformedOutput(String),

    #[error(transparent)]
    Llm(#[from] LlmError),
}
