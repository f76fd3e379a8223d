//! Database operations and SQLite management for plans and stages.
//!
//! This module is the persistence collaborator of the progression engine.
//! It handles SQLite connections, schema management, and provides the query
//! interfaces for plans and stages. Every mutation validates first and then
//! applies inside a single transaction, so a plan is always observed in a
//! consistent state.

use std::path::Path;

use rusqlite::Connection;

use crate::error::{DatabaseResultExt, Result};

pub mod migrations;
pub mod plan_queries;
pub mod stage_queries;

/// Database connection and operations handler.
pub struct Database {
    connection: Connection,
}

impl Database {
    /// Creates a new database connection and initializes the schema.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let connection = Connection::open(path).db_context("Failed to open database connection")?;

        let db = Self { connection };
        db.initialize_schema()?;
        Ok(db)
    }
}
