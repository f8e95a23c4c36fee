//! Domain types shared by the repository, service and route layers.

pub mod addon;
pub mod admin;
pub mod capability;
pub mod discount;
pub mod history;
pub mod order;
pub mod value;
pub mod vehicle;

/// A row projected to a JSON object, keyed by column (or alias) name.
pub type Record = serde_json::Map<String, serde_json::Value>;
