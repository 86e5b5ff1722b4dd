use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parsing error: {message}")]
    Parse { message: String },

    #[error("No size available for product `{product}`")]
    MissingSize { product: String },

    #[error("Corrupt availability state for `{name}` / `{size}`: more than one stored record")]
    CorruptState { name: String, size: String },
}

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, AppError>;
