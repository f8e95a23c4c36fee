use pushkind_common::domain::auth::AuthenticatedUser;
use pushkind_common::routes::check_role;
use thiserror::Error;

use crate::SERVICE_ACCESS_ROLE;
use crate::domain::capability::{Capabilities, LogicalField};
use crate::repository::{MutationError, RepositoryError, SchemaReader};

pub mod addons;
pub mod discounts;
pub mod images;
pub mod orders;
pub mod vehicles;

/// Failures reported by the service layer. Each variant carries the
/// user-facing message returned to the client.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Client-correctable input problems, accumulated into one message.
    #[error("{0}")]
    Validation(String),
    /// Malformed request or invalid identifier.
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    /// A required table or column is missing from the deployment.
    #[error("{0}")]
    Schema(String),
    /// Storage failure, including the engine message.
    #[error("{0}")]
    Persistence(String),
    #[error("Authentication required.")]
    Unauthorized,
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    /// Wraps a repository failure, prefixing engine errors with `context`.
    pub fn storage(context: &str, err: RepositoryError) -> Self {
        match err {
            RepositoryError::MissingColumn { table, column } => {
                Self::Schema(format!("Table {table} is missing the {column} column."))
            }
            RepositoryError::Mutation(MutationError::Execution(message)) => {
                Self::Persistence(format!("{context}: {message}"))
            }
            other => Self::Persistence(format!("{context}: {other}")),
        }
    }
}

/// Rejects callers without the back-office role.
pub fn ensure_admin(user: &AuthenticatedUser) -> ServiceResult<()> {
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }
    Ok(())
}

/// Inspects the table behind `F` and resolves its logical fields.
pub fn load_capabilities<F, R>(repo: &R) -> ServiceResult<Capabilities<F>>
where
    F: LogicalField,
    R: SchemaReader + ?Sized,
{
    repo.inspect_table(F::TABLE)
        .map(Capabilities::resolve)
        .map_err(|err| ServiceError::storage("Unable to inspect schema", err))
}
