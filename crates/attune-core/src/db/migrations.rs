//! Database schema initialization and migrations.

use crate::error::{DatabaseResultExt, ProgressionError, Result};

impl super::Database {
    /// Initializes the database schema using the embedded SQL file.
    pub(super) fn initialize_schema(&self) -> Result<()> {
        // Enable foreign keys for this connection
        self.connection
            .execute("PRAGMA foreign_keys = ON", [])
            .db_context("Failed to enable foreign keys")?;

        // Execute the schema SQL
        let schema_sql = include_str!("../../assets/schema.sql");
        self.connection
            .execute_batch(schema_sql)
            .db_context("Failed to initialize database schema")?;

        // Apply migrations for existing databases
        self.apply_migrations()?;

        Ok(())
    }

    /// Apply database migrations for existing databases
    fn apply_migrations(&self) -> Result<()> {
        // Check if audio_ref column exists in stages table
        let has_audio_ref_column: bool = self
            .connection
            .query_row(
                "SELECT COUNT(*) FROM pragma_table_info('stages') WHERE name = 'audio_ref'",
                [],
                |row| row.get(0),
            )
            .map(|count: i64| count > 0)
            .unwrap_or(false);

        // Add audio_ref column if it doesn't exist
        if !has_audio_ref_column {
            self.connection
                .execute("ALTER TABLE stages ADD COLUMN audio_ref TEXT", [])
                .map_err(|e| {
                    ProgressionError::database_error(
                        "Failed to add audio_ref column to stages table",
                        e,
                    )
                })?;
        }

        Ok(())
    }
}
