use crate::error::{DatabaseError, DatabaseErrorExt};
use fxhash::FxHashMap;
use remit_migrations::{Migration, builtin_migrations};
use surrealdb::Surreal;
use surrealdb::engine::any::Any;
use surrealdb::types::SurrealValue;

#[derive(Debug, Default)]
pub(crate) struct MigrationReport {
    pub applied: Vec<AppliedMigration>,
    pub skipped: Vec<AppliedMigration>,
}

#[derive(Debug, Clone, SurrealValue)]
pub(crate) struct AppliedMigration {
    pub version: String,
    pub checksum: String,
}

impl From<&Migration> for AppliedMigration {
    fn from(migration: &Migration) -> Self {
        Self { version: migration.version().to_owned(), checksum: migration.checksum().to_owned() }
    }
}

#[derive(Debug)]
pub(crate) struct MigrationRunner {
    db: Surreal<Any>,
}

impl MigrationRunner {
    #[must_use]
    pub(crate) const fn new(db: Surreal<Any>) -> Self {
        Self { db }
    }

    pub(crate) async fn run(&self) -> Result<MigrationReport, DatabaseError> {
        self.run_with(&builtin_migrations()?).await
    }

    pub(crate) async fn run_with(
        &self,
        migrations: &[Migration],
    ) -> Result<MigrationReport, DatabaseError> {
        let mut report = MigrationReport::default();
        let applied_migrations = self.get_migrations_map().await?;

        for migration in migrations {
            if let Some(applied) = applied_migrations.get(migration.version()) {
                ensure_checksum_match(migration, &applied.checksum)?;
                report.skipped.push(migration.into());
                continue;
            }

            self.apply_migration(migration).await?;
            report.applied.push(migration.into());
        }

        Ok(report)
    }

    async fn apply_migration(&self, migration: &Migration) -> Result<(), DatabaseError> {
        let query = format!(
            "BEGIN TRANSACTION;
            {}
            CREATE schema_migration SET version = $version, checksum = $checksum, applied_at = time::now();
            COMMIT TRANSACTION;",
            migration.script(),
        );

        self.db
            .query(&query)
            .bind(("version", migration.version()))
            .bind(("checksum", migration.checksum().to_owned()))
            .await
            .context(format!("SQL execution failed at {}", migration.version()))?
            .check()
            .map_err(surrealdb::Error::from)
            .context(format!("Migration {} was rejected", migration.version()))?;

        Ok(())
    }

    async fn get_migrations_map(
        &self,
    ) -> Result<FxHashMap<String, AppliedMigration>, DatabaseError> {
        let entries = self
            .db
            .query(
                "DEFINE TABLE IF NOT EXISTS schema_migration SCHEMALESS;
                SELECT version, checksum FROM schema_migration;",
            )
            .await
            .context("Loading applied migrations")?
            .take::<Vec<AppliedMigration>>(1)
            .context("Parsing migrations map")?;

        Ok(entries.into_iter().map(|entry| (entry.version.clone(), entry)).collect())
    }
}

fn ensure_checksum_match(migration: &Migration, existing: &str) -> Result<(), DatabaseError> {
    if existing != migration.checksum() {
        return Err(DatabaseError::Migration {
            message: format!(
                "Checksum mismatch for {} (expected {}, got {})",
                migration.version(),
                existing,
                migration.checksum()
            )
            .into(),
            context: Some("Migration already applied with different checksum".into()),
        });
    }
    Ok(())
}
