use crate::domain::Record;
use crate::domain::admin::AdminField;
use crate::domain::capability::Capabilities;
use crate::domain::value::FieldValue;
use crate::repository::mutation::quote_ident;
use crate::repository::query::RecordQuery;
use crate::repository::{AdminDirectory, DieselRepository, RepositoryResult, required_column};

impl AdminDirectory for DieselRepository {
    fn find_admin(
        &self,
        caps: &Capabilities<AdminField>,
        id: i64,
    ) -> RepositoryResult<Option<Record>> {
        let id_column = required_column(caps, AdminField::Id)?;
        let mut conn = self.conn()?;

        RecordQuery::table(caps.table())?
            .columns(caps.columns())?
            .filter_eq(quote_ident(id_column)?, FieldValue::integer(id))
            .first(&mut conn)
    }
}
