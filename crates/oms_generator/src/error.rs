use thiserror::Error;

#[derive(Error, Debug)]
pub enum GeneratorError {
    #[error("invalid generator configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to {stage} for order {order_id}: {message}")]
    Sink {
        stage: &'static str,
        order_id: String,
        message: String,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, GeneratorError>;
