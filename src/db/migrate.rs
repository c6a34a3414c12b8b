use crate::error::Result;
use rusqlite::{params, Connection};

/// Migrations embedded at compile time so the library never depends on a
/// runtime migrations directory. Keep this list append-only.
const MIGRATIONS: &[(u32, &str, &str)] = &[(
    1,
    "001_documents_and_chunks",
    include_str!("../../migrations/001_documents_and_chunks.sql"),
)];

/// Create schema_migrations table if it doesn't exist
fn ensure_migrations_table(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            applied_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )?;
    Ok(())
}

/// Get list of applied migrations
pub fn get_applied_migrations(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn.prepare("SELECT name FROM schema_migrations ORDER BY version")?;
    let names: Vec<String> = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<std::result::Result<Vec<_>, rusqlite::Error>>()?;
    Ok(names)
}

/// Run all pending migrations
pub fn run_migrations(conn: &mut Connection) -> Result<()> {
    ensure_migrations_table(conn)?;

    let applied = get_applied_migrations(conn)?;

    for (version, name, sql) in MIGRATIONS {
        if applied.iter().any(|a| a == name) {
            log::debug!("Migration {} already applied, skipping", name);
            continue;
        }

        log::info!("Applying migration: {} (version {})", name, version);

        let tx = conn.transaction()?;
        // execute_batch handles multi-statement migration files
        tx.execute_batch(sql)?;
        tx.execute(
            "INSERT INTO schema_migrations (version, name) VALUES (?1, ?2)",
            params![version, name],
        )?;
        tx.commit()?;
    }

    Ok(())
}
