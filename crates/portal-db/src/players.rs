use portal_types::pagination::{PageParams, paginate};
use portal_types::{Error, Result};
use rusqlite::Connection;

use crate::models::PlayerRow;
use crate::{Database, OptionalExt, constraint_to_validation};

const COLUMNS: &str = "account_id, name, job, level, exp";

pub struct NewPlayer<'a> {
    pub account_id: i64,
    pub name: &'a str,
    pub job: i64,
    pub level: i64,
    pub exp: i64,
}

/// Lives in the player store. `account_id` points into the account store
/// and is deliberately unenforced; orphans left by cross-store deletes
/// are ignored rather than cascaded.
pub struct PlayerRepo<'a> {
    db: &'a Database,
}

impl<'a> PlayerRepo<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    pub fn create(&self, new: NewPlayer<'_>) -> Result<PlayerRow> {
        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO player (account_id, name, job, level, exp)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                (new.account_id, new.name, new.job, new.level, new.exp),
            )
            .map_err(|e| constraint_to_validation(e, "player already exists for account"))?;

            query_by_id(conn, new.account_id)?.ok_or(Error::NotFound("player"))
        })
    }

    pub fn get(&self, account_id: i64) -> Result<PlayerRow> {
        self.db
            .with_conn(|conn| query_by_id(conn, account_id))?
            .ok_or(Error::NotFound("player"))
    }

    pub fn update(
        &self,
        account_id: i64,
        name: Option<&str>,
        job: Option<i64>,
        level: Option<i64>,
        exp: Option<i64>,
    ) -> Result<PlayerRow> {
        self.db.with_conn(|conn| {
            let current = query_by_id(conn, account_id)?.ok_or(Error::NotFound("player"))?;

            conn.execute(
                "UPDATE player SET name = ?1, job = ?2, level = ?3, exp = ?4
                 WHERE account_id = ?5",
                (
                    name.unwrap_or(&current.name),
                    job.unwrap_or(current.job),
                    level.unwrap_or(current.level),
                    exp.unwrap_or(current.exp),
                    account_id,
                ),
            )
            .map_err(Error::storage)?;

            query_by_id(conn, account_id)?.ok_or(Error::NotFound("player"))
        })
    }

    pub fn delete(&self, account_id: i64) -> Result<()> {
        self.db.with_conn(|conn| {
            let changed = conn
                .execute("DELETE FROM player WHERE account_id = ?1", [account_id])
                .map_err(Error::storage)?;
            if changed == 0 {
                return Err(Error::NotFound("player"));
            }
            Ok(())
        })
    }

    /// Level descending, ties broken by account_id ascending, so a page
    /// boundary never reorders under concurrent writes.
    pub fn list(&self, params: PageParams) -> Result<(Vec<PlayerRow>, u64)> {
        self.db.with_conn(|conn| {
            let total: i64 = conn
                .query_row("SELECT COUNT(*) FROM player", [], |row| row.get(0))
                .map_err(Error::storage)?;
            let window = paginate(total as u64, params);

            let mut stmt = conn
                .prepare(&format!(
                    "SELECT {COLUMNS} FROM player
                     ORDER BY level DESC, account_id ASC LIMIT ?1 OFFSET ?2"
                ))
                .map_err(Error::storage)?;
            let rows = stmt
                .query_map((window.per_page, window.offset), map_row)
                .map_err(Error::storage)?
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(Error::storage)?;

            Ok((rows, total as u64))
        })
    }

    pub fn list_by_account(&self, account_id: i64) -> Result<Vec<PlayerRow>> {
        self.db.with_conn(|conn| {
            let mut stmt = conn
                .prepare(&format!(
                    "SELECT {COLUMNS} FROM player WHERE account_id = ?1 ORDER BY level DESC"
                ))
                .map_err(Error::storage)?;
            let rows = stmt
                .query_map([account_id], map_row)
                .map_err(Error::storage)?
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(Error::storage)?;
            Ok(rows)
        })
    }
}

fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<PlayerRow> {
    Ok(PlayerRow {
        account_id: row.get(0)?,
        name: row.get(1)?,
        job: row.get(2)?,
        level: row.get(3)?,
        exp: row.get(4)?,
    })
}

fn query_by_id(conn: &Connection, account_id: i64) -> Result<Option<PlayerRow>> {
    let mut stmt = conn
        .prepare(&format!("SELECT {COLUMNS} FROM player WHERE account_id = ?1"))
        .map_err(Error::storage)?;
    stmt.query_row([account_id], map_row).optional()
}
