use thiserror::Error;

/// Failures raised while forming or running a dynamic statement.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MutationError {
    /// The statement could not be formed from the supplied parts.
    #[error("failed to prepare statement: {0}")]
    Prepare(String),
    /// The storage engine rejected the statement.
    #[error("failed to execute statement: {0}")]
    Execution(String),
}

impl From<diesel::result::Error> for MutationError {
    fn from(err: diesel::result::Error) -> Self {
        match err {
            diesel::result::Error::DatabaseError(_, info) => {
                Self::Execution(info.message().to_string())
            }
            diesel::result::Error::QueryBuilderError(err) => Self::Prepare(err.to_string()),
            other => Self::Execution(other.to_string()),
        }
    }
}

/// Errors surfaced by the repository layer.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] diesel::result::Error),
    #[error("connection pool error: {0}")]
    Pool(#[from] diesel::r2d2::PoolError),
    #[error(transparent)]
    Mutation(#[from] MutationError),
    #[error("malformed row: {0}")]
    MalformedRow(#[from] serde_json::Error),
    /// A column required by the operation is absent from the live table.
    #[error("table `{table}` has no `{column}` column")]
    MissingColumn {
        table: &'static str,
        column: &'static str,
    },
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;
