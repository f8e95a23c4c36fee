use serde_json::Value;

use crate::domain::Record;
use crate::domain::capability::{Capabilities, LogicalField};

/// Name recorded when neither the session nor the directory knows the admin.
pub const FALLBACK_ADMIN_NAME: &str = "admin";

/// Logical columns of the `admin_users` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum AdminField {
    Id,
    Name,
    FullName,
    DisplayName,
    FirstName,
    LastName,
}

impl LogicalField for AdminField {
    const TABLE: &'static str = "admin_users";
    const ALL: &'static [Self] = &[
        Self::Id,
        Self::Name,
        Self::FullName,
        Self::DisplayName,
        Self::FirstName,
        Self::LastName,
    ];

    fn candidates(self) -> &'static [&'static str] {
        match self {
            Self::Id => &["id"],
            Self::Name => &["name"],
            Self::FullName => &["full_name"],
            Self::DisplayName => &["display_name"],
            Self::FirstName => &["first_name"],
            Self::LastName => &["last_name"],
        }
    }
}

/// Picks the first non-blank of `name`, `full_name`, `display_name`, then
/// falls back to `first_name last_name`.
pub fn display_name_from_record(caps: &Capabilities<AdminField>, row: &Record) -> Option<String> {
    let text = |field: AdminField| -> String {
        match caps.column(field).and_then(|column| row.get(column)) {
            Some(Value::String(text)) => text.trim().to_string(),
            _ => String::new(),
        }
    };

    let named = [AdminField::Name, AdminField::FullName, AdminField::DisplayName]
        .into_iter()
        .map(text)
        .find(|name| !name.is_empty());
    if named.is_some() {
        return named;
    }

    let combined = format!("{} {}", text(AdminField::FirstName), text(AdminField::LastName))
        .trim()
        .to_string();
    (!combined.is_empty()).then_some(combined)
}
