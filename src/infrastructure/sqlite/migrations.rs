use rusqlite::Connection;

pub fn run_migrations(conn: &Connection) -> Result<(), String> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS frontier (
            url TEXT PRIMARY KEY,
            depth INTEGER NOT NULL,
            status TEXT NOT NULL DEFAULT 'pending',
            discovered_at TEXT NOT NULL,
            fetched_at TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_frontier_status ON frontier(status);
        "
    ).map_err(|e| format!("Migration failed: {e}"))
}
