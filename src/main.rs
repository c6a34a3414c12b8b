use anyhow::Result;
use memex::db::{migrate, Db};
use memex::error::MemexError;
use memex::Config;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().filter_or("RUST_LOG", "info")).init();

    let args: Vec<String> = std::env::args().collect();
    let command = args.get(1).map(|s| s.as_str()).unwrap_or("verify");

    match command {
        "verify" => run_schema_verification().await?,
        other => anyhow::bail!("unknown command: {other} (expected: verify)"),
    }

    Ok(())
}

/// Open the database, apply migrations, and check the resulting schema
async fn run_schema_verification() -> Result<()> {
    log::info!("Starting memex v{}", env!("CARGO_PKG_VERSION"));

    let config = Config::load()?;
    log::info!("Vault: {}", config.vault_path().display());
    log::info!("Database path: {}", config.db_path().display());
    log::info!("Embedding model: {}", config.embeddings.model);

    let db = Db::new(config.db_path());
    db.with_connection(migrate::run_migrations).await?;
    log::info!("Database initialized");

    verify_database_schema(&db).await?;
    log::info!("Ready: run `index` to ingest the vault");
    Ok(())
}

/// Verify that all expected database objects exist
async fn verify_database_schema(db: &Db) -> Result<()> {
    db.with_connection(|conn| {
        let mut stmt =
            conn.prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")?;
        let tables: Vec<String> = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<_>, rusqlite::Error>>()?;

        for table in ["chunks", "documents", "schema_migrations"] {
            if !tables.iter().any(|t| t == table) {
                return Err(MemexError::Config(format!("missing table: {table}")));
            }
            log::debug!("table exists: {table}");
        }

        let applied = migrate::get_applied_migrations(conn)?;
        if applied.is_empty() {
            return Err(MemexError::Config("no migrations applied".to_string()));
        }
        log::debug!("{} migration(s) applied", applied.len());

        let journal_mode: String = conn.query_row("PRAGMA journal_mode", [], |row| row.get(0))?;
        if journal_mode.to_uppercase() != "WAL" {
            return Err(MemexError::Config(format!(
                "journal mode is not WAL: {journal_mode}"
            )));
        }
        log::debug!("journal mode: WAL");

        let integrity: String = conn.query_row("PRAGMA integrity_check", [], |row| row.get(0))?;
        if integrity != "ok" {
            return Err(MemexError::Config(format!(
                "database integrity check failed: {integrity}"
            )));
        }
        log::info!("database integrity: OK");

        Ok(())
    })
    .await?;

    log::info!("schema verification complete");
    Ok(())
}
