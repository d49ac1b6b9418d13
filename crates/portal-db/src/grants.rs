use portal_types::pagination::{PageParams, paginate};
use portal_types::{Error, Result};
use rusqlite::Connection;

use crate::models::AdminGrantRow;
use crate::{Database, OptionalExt};

/// The sole authorization record, held in the admin store. An account
/// with no row here sits at authority level 0.
pub struct GrantRepo<'a> {
    db: &'a Database,
}

impl<'a> GrantRepo<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    pub fn get(&self, account_id: i64) -> Result<Option<AdminGrantRow>> {
        self.db.with_conn(|conn| query_by_id(conn, account_id))
    }

    /// Missing grant is level 0, not an error.
    pub fn authority_level(&self, account_id: i64) -> Result<i64> {
        Ok(self.get(account_id)?.map_or(0, |g| g.authority_level))
    }

    pub fn upsert(&self, account_id: i64, authority_level: i64) -> Result<AdminGrantRow> {
        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO admin_grant (account_id, authority_level) VALUES (?1, ?2)
                 ON CONFLICT(account_id) DO UPDATE SET authority_level = excluded.authority_level",
                (account_id, authority_level),
            )
            .map_err(Error::storage)?;
            query_by_id(conn, account_id)?.ok_or(Error::NotFound("admin grant"))
        })
    }

    pub fn delete(&self, account_id: i64) -> Result<()> {
        self.db.with_conn(|conn| {
            let changed = conn
                .execute("DELETE FROM admin_grant WHERE account_id = ?1", [account_id])
                .map_err(Error::storage)?;
            if changed == 0 {
                return Err(Error::NotFound("admin grant"));
            }
            Ok(())
        })
    }

    pub fn list(&self, params: PageParams) -> Result<(Vec<AdminGrantRow>, u64)> {
        self.db.with_conn(|conn| {
            let total: i64 = conn
                .query_row("SELECT COUNT(*) FROM admin_grant", [], |row| row.get(0))
                .map_err(Error::storage)?;
            let window = paginate(total as u64, params);

            let mut stmt = conn
                .prepare(
                    "SELECT account_id, authority_level FROM admin_grant
                     ORDER BY account_id ASC LIMIT ?1 OFFSET ?2",
                )
                .map_err(Error::storage)?;
            let rows = stmt
                .query_map((window.per_page, window.offset), map_row)
                .map_err(Error::storage)?
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(Error::storage)?;

            Ok((rows, total as u64))
        })
    }
}

fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<AdminGrantRow> {
    Ok(AdminGrantRow { account_id: row.get(0)?, authority_level: row.get(1)? })
}

fn query_by_id(conn: &Connection, account_id: i64) -> Result<Option<AdminGrantRow>> {
    let mut stmt = conn
        .prepare("SELECT account_id, authority_level FROM admin_grant WHERE account_id = ?1")
        .map_err(Error::storage)?;
    stmt.query_row([account_id], map_row).optional()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Stores;

    #[test]
    fn missing_grant_is_level_zero() {
        let stores = Stores::open_in_memory().unwrap();
        assert_eq!(stores.grants().authority_level(42).unwrap(), 0);
    }

    #[test]
    fn upsert_inserts_then_overwrites() {
        let stores = Stores::open_in_memory().unwrap();
        let repo = stores.grants();
        repo.upsert(7, 3).unwrap();
        assert_eq!(repo.authority_level(7).unwrap(), 3);

        repo.upsert(7, 5).unwrap();
        assert_eq!(repo.authority_level(7).unwrap(), 5);
    }

    #[test]
    fn delete_revokes() {
        let stores = Stores::open_in_memory().unwrap();
        let repo = stores.grants();
        repo.upsert(7, 5).unwrap();
        repo.delete(7).unwrap();
        assert_eq!(repo.authority_level(7).unwrap(), 0);
        assert!(matches!(repo.delete(7), Err(Error::NotFound(_))));
    }
}
