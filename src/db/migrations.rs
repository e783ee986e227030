use anyhow::Context;
use rusqlite::Connection;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_MIGRATIONS_DIR: &str = "migrations";

/// Finds the migrations directory relative to the working directory, falling back to the
/// crate root so tests and `cargo run` from elsewhere still pick it up.
pub fn resolve_migrations_dir(dir: &str) -> Option<PathBuf> {
    let candidates = [
        PathBuf::from(dir),
        Path::new(env!("CARGO_MANIFEST_DIR")).join(dir),
    ];
    candidates.into_iter().find(|p| p.is_dir())
}

/// Applies every `*.sql` file in `dir` not yet recorded in `_migrations`, in file-name order.
/// Each file runs in its own transaction together with its bookkeeping row.
pub fn run_migrations(conn: &Connection, dir: &str) -> anyhow::Result<usize> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS _migrations (
            name TEXT PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );",
    )
    .context("failed to create migrations table")?;

    let Some(migrations_dir) = resolve_migrations_dir(dir) else {
        tracing::warn!(dir, "migrations directory not found, skipping");
        return Ok(0);
    };

    let mut files: Vec<PathBuf> = fs::read_dir(&migrations_dir)
        .with_context(|| format!("failed to read {}", migrations_dir.display()))?
        .filter_map(|e| e.ok().map(|e| e.path()))
        .filter(|p| p.extension().is_some_and(|ext| ext == "sql"))
        .collect();
    files.sort();

    let mut applied = 0;
    for path in files {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        let done: bool = conn
            .query_row(
                "SELECT COUNT(*) > 0 FROM _migrations WHERE name = ?1",
                [&name],
                |row| row.get(0),
            )
            .context("failed to check migration status")?;
        if done {
            continue;
        }

        let sql = fs::read_to_string(&path)
            .with_context(|| format!("failed to read migration file: {name}"))?;

        let tx = conn
            .unchecked_transaction()
            .context("failed to open migration transaction")?;
        tx.execute_batch(&sql)
            .with_context(|| format!("failed to apply migration: {name}"))?;
        tx.execute("INSERT INTO _migrations (name) VALUES (?1)", [&name])
            .with_context(|| format!("failed to record migration: {name}"))?;
        tx.commit()
            .with_context(|| format!("failed to commit migration: {name}"))?;

        tracing::info!(migration = %name, "applied migration");
        applied += 1;
    }

    Ok(applied)
}
