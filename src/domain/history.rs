use crate::domain::capability::LogicalField;
use crate::domain::order::OrderSnapshot;
use crate::domain::value::FieldValue;

/// Maximum number of history entries returned for one order.
pub const HISTORY_LIMIT: i64 = 100;

/// Action label recorded for order updates.
pub const UPDATE_ACTION: &str = "update";

/// Logical columns of the `order_request_history` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum HistoryField {
    Id,
    OrderId,
    AdminUser,
    Action,
    ChangeSummary,
    PreviousData,
    NewData,
    CreatedAt,
}

impl LogicalField for HistoryField {
    const TABLE: &'static str = "order_request_history";
    const ALL: &'static [Self] = &[
        Self::Id,
        Self::OrderId,
        Self::AdminUser,
        Self::Action,
        Self::ChangeSummary,
        Self::PreviousData,
        Self::NewData,
        Self::CreatedAt,
    ];

    fn candidates(self) -> &'static [&'static str] {
        match self {
            Self::Id => &["id"],
            Self::OrderId => &["order_request_id"],
            Self::AdminUser => &["admin_user"],
            Self::Action => &["action"],
            Self::ChangeSummary => &["change_summary"],
            Self::PreviousData => &["previous_data"],
            Self::NewData => &["new_data"],
            Self::CreatedAt => &["created_at"],
        }
    }
}

/// Audit record appended after an order update that changed tracked fields.
#[derive(Debug, Clone, PartialEq)]
pub struct NewHistoryEntry {
    pub order_id: i64,
    pub admin_user: String,
    pub action: String,
    pub change_summary: String,
    pub previous: OrderSnapshot,
    pub current: OrderSnapshot,
}

impl NewHistoryEntry {
    /// Logical values to insert. `created_at` is left to the column default.
    pub fn values(&self) -> Result<Vec<(HistoryField, FieldValue)>, serde_json::Error> {
        let previous = serde_json::to_string(&self.previous)?;
        let current = serde_json::to_string(&self.current)?;

        Ok(vec![
            (HistoryField::OrderId, FieldValue::integer(self.order_id)),
            (HistoryField::AdminUser, FieldValue::text(self.admin_user.as_str())),
            (HistoryField::Action, FieldValue::text(self.action.as_str())),
            (
                HistoryField::ChangeSummary,
                FieldValue::text(self.change_summary.as_str()),
            ),
            (HistoryField::PreviousData, FieldValue::text(previous)),
            (HistoryField::NewData, FieldValue::text(current)),
        ])
    }
}
