use thiserror::Error;

pub type Result<T> = std::result::Result<T, GenError>;

/// Generation failures. Each aborts one generation call; nothing partial is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenError {
    #[error("zip token `{token}` is not a simple variable reference")]
    NotAReference { token: String },

    #[error("output arity must be at least 1")]
    ZeroOutputs,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{origin}: at JSON path {json_path} → {message}")]
    Parse {
        origin: String,
        json_path: String,
        message: String,
    },

    #[error("conventions field `{field}` is not a valid identifier: {value:?}")]
    InvalidIdentifier { field: &'static str, value: String },
}
