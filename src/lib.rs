pub mod domain;
pub mod forms;
pub mod models;
pub mod repository;
pub mod routes;
pub mod services;

/// Role required for every back-office operation.
pub const SERVICE_ACCESS_ROLE: &str = "admin";
