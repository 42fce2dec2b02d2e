use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Error, Debug)]
pub enum AdapterError {
    #[error("Connection error: {0}")]
    ConnectionError(#[source] BoxError),

    #[error("Schema error on table '{table}': {source}")]
    SchemaError {
        table: String,
        #[source]
        source: BoxError,
    },

    #[error("Storage error: {0}")]
    StorageError(#[source] BoxError),

    #[error("Table '{0}' not found")]
    TableNotFound(String),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("Rule for ptype '{ptype}' has an empty field before position {position}")]
    NonContiguousRule { ptype: String, position: usize },

    #[error("Policy engine error: {0}")]
    EngineError(String),

    #[error("Adapter initialization failed: {0}")]
    InitError(String),
}

pub type Result<T> = std::result::Result<T, AdapterError>;

impl AdapterError {
    /// Wrap a failed create/drop so callers can tell schema faults from row faults.
    pub fn schema(table: &str, source: AdapterError) -> Self {
        match source {
            already @ AdapterError::SchemaError { .. } => already,
            other => Self::SchemaError {
                table: table.to_string(),
                source: Box::new(other),
            },
        }
    }
}

impl From<sqlx::Error> for AdapterError {
    fn from(err: sqlx::Error) -> Self {
        Self::StorageError(Box::new(err))
    }
}

impl From<casbin::Error> for AdapterError {
    fn from(err: casbin::Error) -> Self {
        Self::EngineError(err.to_string())
    }
}

impl From<AdapterError> for casbin::Error {
    fn from(err: AdapterError) -> Self {
        casbin::error::AdapterError(Box::new(err)).into()
    }
}
