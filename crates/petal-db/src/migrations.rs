use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |r| r.get(0),
    )?;

    if version < 1 {
        info!("Running migration v1 (bouquets)");
        conn.execute_batch(
            "
            CREATE TABLE bouquets (
                seq             INTEGER PRIMARY KEY AUTOINCREMENT,
                id              TEXT NOT NULL UNIQUE,
                flower          TEXT NOT NULL,
                recipient_name  TEXT NOT NULL DEFAULT '',
                message         TEXT,
                delivery_type   TEXT NOT NULL
                    CHECK (delivery_type IN ('private', 'public', 'timed')),
                delivery_date   TEXT,
                created_at      TEXT NOT NULL,
                CHECK ((delivery_type = 'timed') = (delivery_date IS NOT NULL))
            );

            -- Public feed walks this index newest-first
            CREATE INDEX idx_bouquets_delivery
                ON bouquets(delivery_type, seq);

            INSERT INTO schema_version (version) VALUES (1);
            ",
        )?;
    }

    info!("Database migrations complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run(&conn).unwrap();
        run(&conn).unwrap();

        let versions: i64 = conn
            .query_row("SELECT COUNT(*) FROM schema_version", [], |r| r.get(0))
            .unwrap();
        assert_eq!(versions, 1);
    }

    #[test]
    fn timed_rows_require_a_date() {
        let conn = Connection::open_in_memory().unwrap();
        run(&conn).unwrap();

        let result = conn.execute(
            "INSERT INTO bouquets (id, flower, delivery_type, created_at)
             VALUES ('a', '{}', 'timed', '2026-01-01T00:00:00.000000Z')",
            [],
        );
        assert!(result.is_err());
    }
}
