use serde::Serialize;
use serde_json::Value;

use crate::domain::Record;
use crate::domain::capability::LogicalField;
use crate::domain::value::{FieldValue, value_as_i64};

/// Slug used when free text normalizes to nothing.
pub const DEFAULT_SLUG: &str = "vehicle";

/// Logical columns of the `vehicles` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum VehicleField {
    Id,
    Name,
    Type,
    Slug,
    BasePriceUsd,
    BasePriceXcd,
    Insurance,
    People,
    Bags,
    Doors,
    Manual,
    Ac,
    FourWd,
    Showing,
    LandingOrder,
    TimesRequested,
}

impl LogicalField for VehicleField {
    const TABLE: &'static str = "vehicles";
    const ALL: &'static [Self] = &[
        Self::Id,
        Self::Name,
        Self::Type,
        Self::Slug,
        Self::BasePriceUsd,
        Self::BasePriceXcd,
        Self::Insurance,
        Self::People,
        Self::Bags,
        Self::Doors,
        Self::Manual,
        Self::Ac,
        Self::FourWd,
        Self::Showing,
        Self::LandingOrder,
        Self::TimesRequested,
    ];

    fn candidates(self) -> &'static [&'static str] {
        match self {
            Self::Id => &["id"],
            Self::Name => &["name"],
            Self::Type => &["type"],
            Self::Slug => &["slug"],
            Self::BasePriceUsd => &["base_price_USD"],
            Self::BasePriceXcd => &["base_price_XCD"],
            Self::Insurance => &["insurance"],
            Self::People => &["people"],
            Self::Bags => &["bags"],
            Self::Doors => &["doors"],
            Self::Manual => &["manual"],
            Self::Ac => &["ac"],
            Self::FourWd => &["4wd"],
            Self::Showing => &["showing"],
            Self::LandingOrder => &["landing_order"],
            Self::TimesRequested => &["times_requested"],
        }
    }
}

impl VehicleField {
    /// Key under which the field appears when joined into an order projection.
    pub fn order_alias(self) -> Option<&'static str> {
        match self {
            Self::Name => Some("vehicle_name"),
            Self::Type => Some("vehicle_type"),
            Self::Slug => Some("vehicle_slug"),
            Self::BasePriceUsd => Some("vehicle_base_price"),
            Self::People => Some("vehicle_people"),
            Self::Bags => Some("vehicle_bags"),
            Self::Doors => Some("vehicle_doors"),
            Self::Manual => Some("vehicle_manual"),
            Self::Ac => Some("vehicle_ac"),
            Self::FourWd => Some("vehicle_4wd"),
            _ => None,
        }
    }
}

/// Validated vehicle attributes ready to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct VehicleDraft {
    pub name: String,
    pub vehicle_type: String,
    pub slug: String,
    pub base_price_usd: f64,
    /// Falls back to the USD price when the XCD column exists.
    pub base_price_xcd: Option<f64>,
    pub insurance: f64,
    pub people: i64,
    pub bags: i64,
    pub doors: i64,
    pub manual: bool,
    pub ac: bool,
    pub four_wd: bool,
    pub showing: bool,
    pub landing_order: Option<i64>,
}

impl VehicleDraft {
    /// Replace the slug, typically with the collision-free allocation.
    pub fn with_slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = slug.into();
        self
    }

    /// Logical values written by the update action.
    pub fn update_values(&self) -> Vec<(VehicleField, FieldValue)> {
        vec![
            (VehicleField::Name, FieldValue::text(self.name.as_str())),
            (VehicleField::Type, FieldValue::text(self.vehicle_type.as_str())),
            (VehicleField::BasePriceUsd, FieldValue::real(self.base_price_usd)),
            (VehicleField::Insurance, FieldValue::real(self.insurance)),
            (VehicleField::People, FieldValue::integer(self.people)),
            (VehicleField::Bags, FieldValue::integer(self.bags)),
            (VehicleField::Doors, FieldValue::integer(self.doors)),
            (VehicleField::Manual, FieldValue::flag(self.manual)),
            (VehicleField::Ac, FieldValue::flag(self.ac)),
            (VehicleField::FourWd, FieldValue::flag(self.four_wd)),
            (VehicleField::Slug, FieldValue::text(self.slug.as_str())),
            (VehicleField::Showing, FieldValue::flag(self.showing)),
            (
                VehicleField::LandingOrder,
                FieldValue::Integer(self.landing_order),
            ),
            (
                VehicleField::BasePriceXcd,
                FieldValue::real(self.base_price_xcd.unwrap_or(self.base_price_usd)),
            ),
        ]
    }

    /// Logical values written by the create action.
    pub fn create_values(&self) -> Vec<(VehicleField, FieldValue)> {
        let mut values = self.update_values();
        values.push((VehicleField::TimesRequested, FieldValue::integer(0)));
        values
    }
}

/// Lower-cases `text`, replaces every run of characters outside `[a-z0-9_-]`
/// with one underscore and trims underscores from both ends.
///
/// The result may be empty; see [`normalize_slug`] for the defaulting form.
pub fn sanitize_slug(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());

    for ch in text.trim().to_ascii_lowercase().chars() {
        let allowed = ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '-' || ch == '_';
        let next = if allowed { ch } else { '_' };
        if next == '_' && slug.ends_with('_') {
            continue;
        }
        slug.push(next);
    }

    slug.trim_matches('_').to_string()
}

/// Normalizes free text into a URL-safe slug, defaulting to [`DEFAULT_SLUG`].
pub fn normalize_slug(text: &str) -> String {
    let slug = sanitize_slug(text);
    if slug.is_empty() {
        DEFAULT_SLUG.to_string()
    } else {
        slug
    }
}

/// Candidate probed on the `attempt`-th try: `base`, `base_2`, `base_3`, ...
pub fn slug_candidate(base: &str, attempt: u32) -> String {
    if attempt <= 1 {
        base.to_string()
    } else {
        format!("{base}_{attempt}")
    }
}

/// Counters shown above the fleet list.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct FleetStats {
    pub total: usize,
    pub showing: usize,
    pub landing: usize,
}

impl FleetStats {
    pub fn from_records(vehicles: &[Record]) -> Self {
        let showing = vehicles
            .iter()
            .filter(|vehicle| vehicle.get("showing").and_then(value_as_i64) == Some(1))
            .count();
        let landing = vehicles
            .iter()
            .filter(|vehicle| match vehicle.get("landing_order") {
                None | Some(Value::Null) => false,
                Some(Value::String(text)) => !text.is_empty(),
                Some(_) => true,
            })
            .count();

        Self {
            total: vehicles.len(),
            showing,
            landing,
        }
    }
}

/// Vehicle list together with its counters.
#[derive(Debug, Clone, Serialize)]
pub struct FleetOverview {
    pub vehicles: Vec<Record>,
    pub stats: FleetStats,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn draft() -> VehicleDraft {
        VehicleDraft {
            name: "Jimny".to_string(),
            vehicle_type: "suv".to_string(),
            slug: "jimny".to_string(),
            base_price_usd: 55.0,
            base_price_xcd: None,
            insurance: 10.0,
            people: 4,
            bags: 1,
            doors: 3,
            manual: true,
            ac: true,
            four_wd: true,
            showing: true,
            landing_order: None,
        }
    }

    #[test]
    fn sanitize_slug_collapses_and_trims() {
        assert_eq!(sanitize_slug("Keys Car Rental!!"), "keys_car_rental");
        assert_eq!(sanitize_slug("  __Mini   Cooper__ "), "mini_cooper");
        assert_eq!(sanitize_slug("a-b_c"), "a-b_c");
        assert_eq!(sanitize_slug("!!!"), "");
        assert_eq!(sanitize_slug("İstanbul"), "stanbul");
    }

    #[test]
    fn normalize_slug_defaults_when_empty() {
        assert_eq!(normalize_slug("Keys Car Rental!!"), "keys_car_rental");
        assert_eq!(normalize_slug("   "), DEFAULT_SLUG);
        assert_eq!(normalize_slug("%%%"), DEFAULT_SLUG);
    }

    #[test]
    fn slug_candidates_append_numeric_suffix() {
        assert_eq!(slug_candidate("sedan", 1), "sedan");
        assert_eq!(slug_candidate("sedan", 2), "sedan_2");
        assert_eq!(slug_candidate("sedan", 3), "sedan_3");
    }

    #[test]
    fn xcd_price_falls_back_to_usd() {
        let values = draft().update_values();

        let xcd = values
            .iter()
            .find(|(field, _)| *field == VehicleField::BasePriceXcd)
            .map(|(_, value)| value.clone());

        assert_eq!(xcd, Some(FieldValue::real(55.0)));
    }

    #[test]
    fn create_values_reset_request_counter() {
        let values = draft().create_values();

        assert!(values.contains(&(VehicleField::TimesRequested, FieldValue::integer(0))));
        assert!(
            !draft()
                .update_values()
                .iter()
                .any(|(field, _)| *field == VehicleField::TimesRequested)
        );
    }

    #[test]
    fn fleet_stats_count_showing_and_landing() {
        let vehicles: Vec<Record> = [
            json!({"showing": 1, "landing_order": 1}),
            json!({"showing": 0, "landing_order": null}),
            json!({"showing": "1", "landing_order": ""}),
        ]
        .into_iter()
        .filter_map(|value| value.as_object().cloned())
        .collect();

        let stats = FleetStats::from_records(&vehicles);

        assert_eq!(
            stats,
            FleetStats {
                total: 3,
                showing: 2,
                landing: 1
            }
        );
    }
}
