use crate::domain::capability::LogicalField;

/// Logical columns of the `add_ons` table.
///
/// Several deployments name the same concept differently, so most fields
/// carry more than one candidate column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum AddOnField {
    Id,
    Name,
    Price,
    Description,
    PerDay,
    SortOrder,
}

impl LogicalField for AddOnField {
    const TABLE: &'static str = "add_ons";
    const ALL: &'static [Self] = &[
        Self::Id,
        Self::Name,
        Self::Price,
        Self::Description,
        Self::PerDay,
        Self::SortOrder,
    ];

    fn candidates(self) -> &'static [&'static str] {
        match self {
            Self::Id => &["id", "addon_id"],
            Self::Name => &["name", "title"],
            Self::Price => &["cost", "price_USD", "price", "amount", "daily_price"],
            Self::Description => &["description", "details", "notes"],
            Self::PerDay => &["fixed_price"],
            Self::SortOrder => &["sort_order"],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::capability::Capabilities;

    #[test]
    fn legacy_columns_resolve_by_priority() {
        let caps = Capabilities::<AddOnField>::from_columns(&[
            "addon_id",
            "title",
            "amount",
            "daily_price",
            "notes",
        ]);

        assert_eq!(caps.column(AddOnField::Id), Some("addon_id"));
        assert_eq!(caps.column(AddOnField::Name), Some("title"));
        assert_eq!(caps.column(AddOnField::Price), Some("amount"));
        assert_eq!(caps.column(AddOnField::Description), Some("notes"));
        assert_eq!(caps.column(AddOnField::PerDay), None);
        assert_eq!(caps.column(AddOnField::SortOrder), None);
    }

    #[test]
    fn cost_wins_over_other_price_columns() {
        let caps = Capabilities::<AddOnField>::from_columns(&["id", "price", "cost"]);

        assert_eq!(caps.column(AddOnField::Price), Some("cost"));
    }
}
