//! Row shapes returned by the raw SQL queries of the repository layer, plus
//! runtime settings shared through the app state.

pub mod config;
pub mod introspection;
pub mod record;
