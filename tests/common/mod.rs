//! Helpers for integration tests.
#![allow(dead_code)]

use diesel::RunQueryDsl;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use pushkind_common::db::{DbPool, establish_connection_pool};
use pushkind_common::domain::auth::AuthenticatedUser;

use fleet_admin::SERVICE_ACCESS_ROLE;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

/// Temporary database with the baseline fleet schema applied.
pub struct TestDb {
    filename: String,
    pool: DbPool,
}

impl TestDb {
    pub fn new(filename: &str) -> Self {
        std::fs::remove_file(filename).ok(); // Clean up old DB

        let pool =
            establish_connection_pool(filename).expect("Failed to establish SQLite connection.");
        let mut conn = pool
            .get()
            .expect("Failed to get SQLite connection from pool.");
        conn.run_pending_migrations(MIGRATIONS)
            .expect("Migrations failed");
        TestDb {
            filename: filename.to_string(),
            pool,
        }
    }

    pub fn pool(&self) -> DbPool {
        self.pool.clone()
    }

    /// Runs raw SQL, used to seed rows or reshape the schema.
    pub fn execute(&self, sql: &str) {
        let mut conn = self.pool.get().expect("Failed to get SQLite connection.");
        diesel::sql_query(sql)
            .execute(&mut conn)
            .unwrap_or_else(|err| panic!("`{sql}` failed: {err}"));
    }
}

impl Drop for TestDb {
    fn drop(&mut self) {
        std::fs::remove_file(&self.filename).ok();
        std::fs::remove_file(format!("{}-shm", &self.filename)).ok();
        std::fs::remove_file(format!("{}-wal", &self.filename)).ok();
    }
}

/// Session of a back-office user with the access role.
pub fn admin(name: &str) -> AuthenticatedUser {
    AuthenticatedUser {
        sub: "1".to_string(),
        email: "admin@example.com".to_string(),
        hub_id: 1,
        name: name.to_string(),
        roles: vec![SERVICE_ACCESS_ROLE.to_string()],
        exp: 0,
    }
}
