use portal_types::api::AccountStatus;
use portal_types::pagination::{PageParams, paginate};
use portal_types::{Error, Result};
use rusqlite::Connection;

use crate::models::AccountRow;
use crate::{Database, OptionalExt, constraint_to_validation};

const COLUMNS: &str = "id, login, password, social_id, email, status";

pub struct NewAccount<'a> {
    pub login: &'a str,
    pub password_hash: &'a str,
    pub social_id: &'a str,
    pub email: &'a str,
}

pub struct AccountRepo<'a> {
    db: &'a Database,
}

impl<'a> AccountRepo<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Login uniqueness is case-insensitive; "Alice" collides with "alice".
    pub fn create(&self, new: NewAccount<'_>) -> Result<AccountRow> {
        self.db.with_conn(|conn| {
            if query_by_login(conn, new.login)?.is_some() {
                return Err(Error::validation("login already registered"));
            }
            if query_by_email(conn, new.email)?.is_some() {
                return Err(Error::validation("email already registered"));
            }

            conn.execute(
                "INSERT INTO account (login, password, social_id, email, status)
                 VALUES (?1, ?2, ?3, ?4, 'OK')",
                (new.login, new.password_hash, new.social_id, new.email),
            )
            .map_err(|e| constraint_to_validation(e, "login or email already registered"))?;

            query_by_id(conn, conn.last_insert_rowid())?.ok_or(Error::NotFound("account"))
        })
    }

    pub fn get(&self, id: i64) -> Result<AccountRow> {
        self.db
            .with_conn(|conn| query_by_id(conn, id))?
            .ok_or(Error::NotFound("account"))
    }

    pub fn get_by_login(&self, login: &str) -> Result<Option<AccountRow>> {
        self.db.with_conn(|conn| query_by_login(conn, login))
    }

    pub fn update(
        &self,
        id: i64,
        email: Option<&str>,
        social_id: Option<&str>,
    ) -> Result<AccountRow> {
        self.db.with_conn(|conn| {
            let current = query_by_id(conn, id)?.ok_or(Error::NotFound("account"))?;

            if let Some(email) = email {
                if let Some(other) = query_by_email(conn, email)? {
                    if other.id != id {
                        return Err(Error::validation("email already registered"));
                    }
                }
            }

            conn.execute(
                "UPDATE account SET email = ?1, social_id = ?2 WHERE id = ?3",
                (
                    email.unwrap_or(&current.email),
                    social_id.unwrap_or(&current.social_id),
                    id,
                ),
            )
            .map_err(|e| constraint_to_validation(e, "email already registered"))?;

            query_by_id(conn, id)?.ok_or(Error::NotFound("account"))
        })
    }

    pub fn update_password(&self, id: i64, password_hash: &str) -> Result<()> {
        self.db.with_conn(|conn| {
            let changed = conn
                .execute("UPDATE account SET password = ?1 WHERE id = ?2", (password_hash, id))
                .map_err(Error::storage)?;
            if changed == 0 {
                return Err(Error::NotFound("account"));
            }
            Ok(())
        })
    }

    /// OK <-> BANNED, unconditional. The admin gate lives above this layer.
    pub fn set_status(&self, id: i64, status: AccountStatus) -> Result<AccountRow> {
        self.db.with_conn(|conn| {
            let changed = conn
                .execute("UPDATE account SET status = ?1 WHERE id = ?2", (status.as_str(), id))
                .map_err(Error::storage)?;
            if changed == 0 {
                return Err(Error::NotFound("account"));
            }
            query_by_id(conn, id)?.ok_or(Error::NotFound("account"))
        })
    }

    pub fn delete(&self, id: i64) -> Result<()> {
        self.db.with_conn(|conn| {
            let changed = conn
                .execute("DELETE FROM account WHERE id = ?1", [id])
                .map_err(Error::storage)?;
            if changed == 0 {
                return Err(Error::NotFound("account"));
            }
            Ok(())
        })
    }

    pub fn list(&self, params: PageParams) -> Result<(Vec<AccountRow>, u64)> {
        self.db.with_conn(|conn| {
            let total: i64 = conn
                .query_row("SELECT COUNT(*) FROM account", [], |row| row.get(0))
                .map_err(Error::storage)?;
            let window = paginate(total as u64, params);

            let mut stmt = conn
                .prepare(&format!(
                    "SELECT {COLUMNS} FROM account ORDER BY id ASC LIMIT ?1 OFFSET ?2"
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
}

fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<AccountRow> {
    Ok(AccountRow {
        id: row.get(0)?,
        login: row.get(1)?,
        password: row.get(2)?,
        social_id: row.get(3)?,
        email: row.get(4)?,
        status: row.get(5)?,
    })
}

fn query_by_id(conn: &Connection, id: i64) -> Result<Option<AccountRow>> {
    let mut stmt = conn
        .prepare(&format!("SELECT {COLUMNS} FROM account WHERE id = ?1"))
        .map_err(Error::storage)?;
    stmt.query_row([id], map_row).optional()
}

fn query_by_login(conn: &Connection, login: &str) -> Result<Option<AccountRow>> {
    let mut stmt = conn
        .prepare(&format!("SELECT {COLUMNS} FROM account WHERE login = ?1"))
        .map_err(Error::storage)?;
    stmt.query_row([login], map_row).optional()
}

fn query_by_email(conn: &Connection, email: &str) -> Result<Option<AccountRow>> {
    let mut stmt = conn
        .prepare(&format!("SELECT {COLUMNS} FROM account WHERE email = ?1"))
        .map_err(Error::storage)?;
    stmt.query_row([email], map_row).optional()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Stores;

    fn stores() -> Stores {
        Stores::open_in_memory().unwrap()
    }

    fn new_account<'a>(login: &'a str, email: &'a str) -> NewAccount<'a> {
        NewAccount { login, password_hash: "$argon2$fake", social_id: "1234567", email }
    }

    #[test]
    fn create_then_get_round_trips() {
        let stores = stores();
        let repo = stores.accounts();
        let created = repo.create(new_account("alice", "alice@example.com")).unwrap();
        let fetched = repo.get(created.id).unwrap();
        assert_eq!(fetched.login, "alice");
        assert_eq!(fetched.email, "alice@example.com");
        assert_eq!(fetched.status, "OK");
    }

    #[test]
    fn duplicate_login_rejected_case_insensitively() {
        let stores = stores();
        let repo = stores.accounts();
        repo.create(new_account("Alice", "a@example.com")).unwrap();

        let err = repo.create(new_account("alice", "b@example.com")).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn duplicate_email_rejected() {
        let stores = stores();
        let repo = stores.accounts();
        repo.create(new_account("alice", "same@example.com")).unwrap();

        let err = repo.create(new_account("bob", "same@example.com")).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn update_preserves_unset_fields() {
        let stores = stores();
        let repo = stores.accounts();
        let acc = repo.create(new_account("alice", "a@example.com")).unwrap();

        let updated = repo.update(acc.id, Some("new@example.com"), None).unwrap();
        assert_eq!(updated.email, "new@example.com");
        assert_eq!(updated.social_id, "1234567");
    }

    #[test]
    fn set_status_flips_both_ways() {
        let stores = stores();
        let repo = stores.accounts();
        let acc = repo.create(new_account("alice", "a@example.com")).unwrap();

        let banned = repo.set_status(acc.id, AccountStatus::Banned).unwrap();
        assert_eq!(banned.status, "BANNED");
        let restored = repo.set_status(acc.id, AccountStatus::Ok).unwrap();
        assert_eq!(restored.status, "OK");
    }

    #[test]
    fn listing_pages_by_id_ascending() {
        let stores = stores();
        let repo = stores.accounts();
        repo.create(new_account("alice", "a@example.com")).unwrap();
        repo.create(new_account("bob", "b@example.com")).unwrap();
        repo.create(new_account("carol", "c@example.com")).unwrap();

        let (first, total) = repo.list(PageParams::new(1, 2)).unwrap();
        assert_eq!(total, 3);
        assert_eq!(first.len(), 2);
        assert_eq!(first[0].login, "alice");

        let (second, _) = repo.list(PageParams::new(2, 2)).unwrap();
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].login, "carol");
    }

    #[test]
    fn missing_account_is_not_found() {
        let stores = stores();
        assert!(matches!(stores.accounts().get(999), Err(Error::NotFound(_))));
        assert!(matches!(stores.accounts().delete(999), Err(Error::NotFound(_))));
    }
}
