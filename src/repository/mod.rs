use pushkind_common::db::{DbConnection, DbPool};

use crate::domain::Record;
use crate::domain::addon::AddOnField;
use crate::domain::admin::AdminField;
use crate::domain::capability::{Capabilities, LogicalField, TableSchema};
use crate::domain::discount::{DiscountField, DiscountTarget};
use crate::domain::history::HistoryField;
use crate::domain::order::{ContactField, OrderField, OrderView};
use crate::domain::value::Assignment;
use crate::domain::vehicle::VehicleField;

pub mod addon;
pub mod admin;
pub mod discount;
pub mod errors;
pub mod history;
pub mod mutation;
pub mod order;
pub mod query;
pub mod schema;
pub mod vehicle;

#[cfg(test)]
pub mod mock;

pub use errors::{MutationError, RepositoryError, RepositoryResult};

#[derive(Clone)]
/// Diesel-backed repository implementation that wraps an r2d2 pool.
pub struct DieselRepository {
    pool: DbPool, // r2d2::Pool is cheap to clone
}

impl DieselRepository {
    /// Create a new repository using the provided connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> RepositoryResult<DbConnection> {
        Ok(self.pool.get()?)
    }
}

/// Physical column of `field`, or [`RepositoryError::MissingColumn`].
pub(crate) fn required_column<F: LogicalField>(
    caps: &Capabilities<F>,
    field: F,
) -> RepositoryResult<&'static str> {
    caps.column(field)
        .ok_or_else(|| RepositoryError::MissingColumn {
            table: F::TABLE,
            column: field.candidates().first().copied().unwrap_or_default(),
        })
}

/// Live table metadata. Every call re-inspects the database.
pub trait SchemaReader {
    fn inspect_table(&self, table: &str) -> RepositoryResult<TableSchema>;
}

pub trait VehicleReader {
    fn get_vehicle(
        &self,
        caps: &Capabilities<VehicleField>,
        id: i64,
    ) -> RepositoryResult<Option<Record>>;
    /// Whether `slug` is used by a vehicle other than `exclude_id`.
    fn slug_taken(
        &self,
        caps: &Capabilities<VehicleField>,
        slug: &str,
        exclude_id: Option<i64>,
    ) -> RepositoryResult<bool>;
    fn list_vehicles(&self, caps: &Capabilities<VehicleField>) -> RepositoryResult<Vec<Record>>;
}

pub trait VehicleWriter {
    /// Inserts a vehicle and returns its new id.
    fn create_vehicle(&self, assignments: &[Assignment]) -> RepositoryResult<i64>;
    fn update_vehicle(
        &self,
        caps: &Capabilities<VehicleField>,
        id: i64,
        assignments: &[Assignment],
    ) -> RepositoryResult<usize>;
}

pub trait AddOnReader {
    fn get_addon(
        &self,
        caps: &Capabilities<AddOnField>,
        id: i64,
    ) -> RepositoryResult<Option<Record>>;
}

pub trait AddOnWriter {
    fn update_addon(
        &self,
        caps: &Capabilities<AddOnField>,
        id: i64,
        assignments: &[Assignment],
    ) -> RepositoryResult<usize>;
}

pub trait DiscountReader {
    /// Most recent discount row of the vehicle.
    fn latest_discount(
        &self,
        caps: &Capabilities<DiscountField>,
        vehicle_id: i64,
    ) -> RepositoryResult<Option<Record>>;
}

pub trait DiscountWriter {
    fn delete_discounts(
        &self,
        caps: &Capabilities<DiscountField>,
        vehicle_id: i64,
    ) -> RepositoryResult<usize>;
    fn insert_discount(
        &self,
        caps: &Capabilities<DiscountField>,
        assignments: &[Assignment],
    ) -> RepositoryResult<usize>;
    fn update_discount(
        &self,
        caps: &Capabilities<DiscountField>,
        target: DiscountTarget,
        assignments: &[Assignment],
    ) -> RepositoryResult<usize>;
}

pub trait OrderReader {
    /// Raw `order_requests` row.
    fn get_order(
        &self,
        caps: &Capabilities<OrderField>,
        id: i64,
    ) -> RepositoryResult<Option<Record>>;
    fn get_contact(
        &self,
        caps: &Capabilities<ContactField>,
        id: i64,
    ) -> RepositoryResult<Option<Record>>;
    /// Order joined with its vehicle and contact, as returned to clients.
    fn refresh_order(&self, view: &OrderView, id: i64) -> RepositoryResult<Option<Record>>;
}

pub trait OrderWriter {
    fn update_order(
        &self,
        caps: &Capabilities<OrderField>,
        id: i64,
        assignments: &[Assignment],
    ) -> RepositoryResult<usize>;
}

pub trait HistoryReader {
    /// Newest entries first.
    fn list_history(
        &self,
        caps: &Capabilities<HistoryField>,
        order_id: i64,
        limit: i64,
    ) -> RepositoryResult<Vec<Record>>;
}

pub trait HistoryWriter {
    fn append_history(
        &self,
        caps: &Capabilities<HistoryField>,
        assignments: &[Assignment],
    ) -> RepositoryResult<usize>;
}

/// Lookup of back-office accounts by id.
pub trait AdminDirectory {
    fn find_admin(
        &self,
        caps: &Capabilities<AdminField>,
        id: i64,
    ) -> RepositoryResult<Option<Record>>;
}
