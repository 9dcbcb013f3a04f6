use rusqlite::{params, Connection, OptionalExtension};

use super::storage::SlotStorage;

const CREATE_SLOTS_TABLE_QUERY: &str = "CREATE TABLE IF NOT EXISTS slots (
  key text not null primary key,
  value text not null
);
";

pub struct SQLiteStorage {
    pub connection: Connection,
}

impl SlotStorage for SQLiteStorage {
    fn get_item(&self, key: &str) -> anyhow::Result<Option<String>> {
        let query = "SELECT value FROM slots WHERE key = ?";
        let mut stmt = self.connection.prepare(query)?;
        let value = stmt
            .query_row(params![key], |row| row.get(0))
            .optional()?;
        Ok(value)
    }

    fn set_item(&self, key: &str, value: &str) -> anyhow::Result<()> {
        let query = r#"INSERT INTO slots (key, value) VALUES (?, ?)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value"#;
        let mut stmt = self.connection.prepare(query)?;
        stmt.execute(params![key, value])?;
        Ok(())
    }

    fn remove_item(&self, key: &str) -> anyhow::Result<()> {
        let query = "DELETE FROM slots WHERE key = ?";
        self.connection.prepare(query)?.execute(params![key])?;
        Ok(())
    }
}

impl SQLiteStorage {
    pub fn new(db_path: &str) -> anyhow::Result<Self> {
        let sql_storage = SQLiteStorage {
            connection: Connection::open(db_path)?,
        };
        sql_storage.create_slots_table()?;
        Ok(sql_storage)
    }

    pub fn create_slots_table(&self) -> anyhow::Result<()> {
        self.connection.execute(CREATE_SLOTS_TABLE_QUERY, ())?;
        Ok(())
    }
}
