use mockall::mock;

use super::{
    AddOnReader, AddOnWriter, AdminDirectory, DiscountReader, DiscountWriter, HistoryReader,
    HistoryWriter, OrderReader, OrderWriter, RepositoryResult, SchemaReader, VehicleReader,
    VehicleWriter,
};
use crate::domain::Record;
use crate::domain::addon::AddOnField;
use crate::domain::admin::AdminField;
use crate::domain::capability::{Capabilities, TableSchema};
use crate::domain::discount::{DiscountField, DiscountTarget};
use crate::domain::history::HistoryField;
use crate::domain::order::{ContactField, OrderField, OrderView};
use crate::domain::value::Assignment;
use crate::domain::vehicle::VehicleField;

mock! {
    pub Store {}

    impl SchemaReader for Store {
        fn inspect_table(&self, table: &str) -> RepositoryResult<TableSchema>;
    }

    impl VehicleReader for Store {
        fn get_vehicle(&self, caps: &Capabilities<VehicleField>, id: i64) -> RepositoryResult<Option<Record>>;
        fn slug_taken(&self, caps: &Capabilities<VehicleField>, slug: &str, exclude_id: Option<i64>) -> RepositoryResult<bool>;
        fn list_vehicles(&self, caps: &Capabilities<VehicleField>) -> RepositoryResult<Vec<Record>>;
    }

    impl VehicleWriter for Store {
        fn create_vehicle(&self, assignments: &[Assignment]) -> RepositoryResult<i64>;
        fn update_vehicle(&self, caps: &Capabilities<VehicleField>, id: i64, assignments: &[Assignment]) -> RepositoryResult<usize>;
    }

    impl AddOnReader for Store {
        fn get_addon(&self, caps: &Capabilities<AddOnField>, id: i64) -> RepositoryResult<Option<Record>>;
    }

    impl AddOnWriter for Store {
        fn update_addon(&self, caps: &Capabilities<AddOnField>, id: i64, assignments: &[Assignment]) -> RepositoryResult<usize>;
    }

    impl DiscountReader for Store {
        fn latest_discount(&self, caps: &Capabilities<DiscountField>, vehicle_id: i64) -> RepositoryResult<Option<Record>>;
    }

    impl DiscountWriter for Store {
        fn delete_discounts(&self, caps: &Capabilities<DiscountField>, vehicle_id: i64) -> RepositoryResult<usize>;
        fn insert_discount(&self, caps: &Capabilities<DiscountField>, assignments: &[Assignment]) -> RepositoryResult<usize>;
        fn update_discount(&self, caps: &Capabilities<DiscountField>, target: DiscountTarget, assignments: &[Assignment]) -> RepositoryResult<usize>;
    }

    impl OrderReader for Store {
        fn get_order(&self, caps: &Capabilities<OrderField>, id: i64) -> RepositoryResult<Option<Record>>;
        fn get_contact(&self, caps: &Capabilities<ContactField>, id: i64) -> RepositoryResult<Option<Record>>;
        fn refresh_order(&self, view: &OrderView, id: i64) -> RepositoryResult<Option<Record>>;
    }

    impl OrderWriter for Store {
        fn update_order(&self, caps: &Capabilities<OrderField>, id: i64, assignments: &[Assignment]) -> RepositoryResult<usize>;
    }

    impl HistoryReader for Store {
        fn list_history(&self, caps: &Capabilities<HistoryField>, order_id: i64, limit: i64) -> RepositoryResult<Vec<Record>>;
    }

    impl HistoryWriter for Store {
        fn append_history(&self, caps: &Capabilities<HistoryField>, assignments: &[Assignment]) -> RepositoryResult<usize>;
    }

    impl AdminDirectory for Store {
        fn find_admin(&self, caps: &Capabilities<AdminField>, id: i64) -> RepositoryResult<Option<Record>>;
    }
}
