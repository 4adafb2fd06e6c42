use super::{merge_fields, Collection, Direction, Document, Op, Query, RecordStore, WriteOp};
use crate::error::{LedgerError, Result};
use crate::model::timestamp;
use rusqlite::types::Value as SqlValue;
use rusqlite::{params_from_iter, Connection, OptionalExtension};
use serde_json::Value;
use std::path::Path;

pub const DB_FILE_NAME: &str = "tuition.sqlite3";

pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Opens (creating if needed) the database inside a workspace directory.
    pub fn open_workspace(workspace: &Path) -> anyhow::Result<Self> {
        std::fs::create_dir_all(workspace)?;
        let conn = Connection::open(workspace.join(DB_FILE_NAME))?;
        Ok(Self::init(conn)?)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS documents(
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                collection TEXT NOT NULL,
                id TEXT NOT NULL,
                body TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                UNIQUE(collection, id)
            )",
            [],
        )?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_documents_collection ON documents(collection)",
            [],
        )?;
        Ok(Self { conn })
    }
}

fn json_path(field: &str) -> SqlValue {
    SqlValue::Text(format!("$.{}", field))
}

/// Maps a JSON literal to what `json_extract` yields for the same value.
fn to_sql(v: &Value) -> SqlValue {
    match v {
        Value::Null => SqlValue::Null,
        Value::Bool(b) => SqlValue::Integer(i64::from(*b)),
        Value::Number(n) => match n.as_i64() {
            Some(i) => SqlValue::Integer(i),
            None => SqlValue::Real(n.as_f64().unwrap_or(0.0)),
        },
        Value::String(s) => SqlValue::Text(s.clone()),
        other => SqlValue::Text(other.to_string()),
    }
}

fn parse_body(collection: Collection, id: &str, text: &str) -> Result<Value> {
    serde_json::from_str(text).map_err(|e| LedgerError::MalformedRecord {
        collection: collection.as_str().to_string(),
        id: id.to_string(),
        reason: e.to_string(),
    })
}

fn now_text() -> String {
    timestamp::format(&chrono::Utc::now())
}

impl RecordStore for SqliteStore {
    fn get(&self, collection: Collection, id: &str) -> Result<Option<Document>> {
        let body: Option<String> = self
            .conn
            .query_row(
                "SELECT body FROM documents WHERE collection = ? AND id = ?",
                (collection.as_str(), id),
                |r| r.get(0),
            )
            .optional()?;
        body.map(|text| {
            Ok(Document {
                id: id.to_string(),
                body: parse_body(collection, id, &text)?,
            })
        })
        .transpose()
    }

    fn query(&self, collection: Collection, query: &Query) -> Result<Vec<Document>> {
        let mut sql = String::from("SELECT id, body FROM documents WHERE collection = ?");
        let mut binds: Vec<SqlValue> = vec![SqlValue::Text(collection.as_str().to_string())];

        for c in &query.conditions {
            let op = match c.op {
                Op::Eq => "=",
                Op::Gte => ">=",
                Op::Lte => "<=",
            };
            sql.push_str(&format!(" AND json_extract(body, ?) {} ?", op));
            binds.push(json_path(&c.field));
            binds.push(to_sql(&c.value));
        }

        match &query.order_by {
            Some((field, dir)) => {
                let d = match dir {
                    Direction::Asc => "ASC",
                    Direction::Desc => "DESC",
                };
                sql.push_str(&format!(" ORDER BY json_extract(body, ?) {d}, seq {d}"));
                binds.push(json_path(field));
            }
            None => sql.push_str(" ORDER BY seq"),
        }

        if let Some(n) = query.limit {
            sql.push_str(" LIMIT ?");
            binds.push(SqlValue::Integer(i64::try_from(n).unwrap_or(i64::MAX)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(binds), |r| {
                Ok((r.get::<_, String>(0)?, r.get::<_, String>(1)?))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(id, text)| {
                let body = parse_body(collection, &id, &text)?;
                Ok(Document { id, body })
            })
            .collect()
    }

    fn batch_write(&mut self, ops: Vec<WriteOp>) -> Result<()> {
        let tx = self.conn.transaction()?;
        let updated_at = now_text();

        for op in ops {
            match op {
                WriteOp::Set {
                    collection,
                    id,
                    body,
                } => {
                    tx.execute(
                        "INSERT INTO documents(collection, id, body, updated_at)
                         VALUES(?, ?, ?, ?)
                         ON CONFLICT(collection, id)
                         DO UPDATE SET body = excluded.body, updated_at = excluded.updated_at",
                        (collection.as_str(), &id, body.to_string(), &updated_at),
                    )?;
                }
                WriteOp::Merge {
                    collection,
                    id,
                    patch,
                } => {
                    let existing: Option<String> = tx
                        .query_row(
                            "SELECT body FROM documents WHERE collection = ? AND id = ?",
                            (collection.as_str(), &id),
                            |r| r.get(0),
                        )
                        .optional()?;
                    let Some(text) = existing else {
                        // Dropping the transaction rolls back earlier ops.
                        return Err(LedgerError::not_found(collection.as_str(), id));
                    };
                    let mut body = parse_body(collection, &id, &text)?;
                    merge_fields(&mut body, &patch);
                    tx.execute(
                        "UPDATE documents SET body = ?, updated_at = ?
                         WHERE collection = ? AND id = ?",
                        (body.to_string(), &updated_at, collection.as_str(), &id),
                    )?;
                }
                WriteOp::Delete { collection, id } => {
                    tx.execute(
                        "DELETE FROM documents WHERE collection = ? AND id = ?",
                        (collection.as_str(), &id),
                    )?;
                }
            }
        }

        tx.commit()?;
        Ok(())
    }
}
