use portal_types::pagination::{PageParams, paginate};
use portal_types::{Error, Result};
use rusqlite::Connection;

use crate::models::GuildRow;
use crate::{Database, OptionalExt};

const COLUMNS: &str =
    "id, name, master, level, exp, skill_point, skill, win, draw, loss, ladder_point, gold";

pub struct NewGuild<'a> {
    pub name: &'a str,
    pub master: i64,
    pub level: i64,
    pub exp: i64,
    pub skill_point: i64,
    pub skill: Option<&'a str>,
    pub gold: i64,
}

/// Ladder/score fields that change after matches.
#[derive(Default)]
pub struct GuildChanges<'a> {
    pub name: Option<&'a str>,
    pub master: Option<i64>,
    pub level: Option<i64>,
    pub exp: Option<i64>,
    pub skill_point: Option<i64>,
    pub skill: Option<&'a str>,
    pub win: Option<i64>,
    pub draw: Option<i64>,
    pub loss: Option<i64>,
    pub ladder_point: Option<i64>,
    pub gold: Option<i64>,
}

pub struct GuildRepo<'a> {
    db: &'a Database,
}

impl<'a> GuildRepo<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    pub fn create(&self, new: NewGuild<'_>) -> Result<GuildRow> {
        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO guild (name, master, level, exp, skill_point, skill, gold)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                (new.name, new.master, new.level, new.exp, new.skill_point, new.skill, new.gold),
            )
            .map_err(Error::storage)?;

            query_by_id(conn, conn.last_insert_rowid())?.ok_or(Error::NotFound("guild"))
        })
    }

    pub fn get(&self, id: i64) -> Result<GuildRow> {
        self.db
            .with_conn(|conn| query_by_id(conn, id))?
            .ok_or(Error::NotFound("guild"))
    }

    pub fn update(&self, id: i64, changes: GuildChanges<'_>) -> Result<GuildRow> {
        self.db.with_conn(|conn| {
            let cur = query_by_id(conn, id)?.ok_or(Error::NotFound("guild"))?;

            conn.execute(
                "UPDATE guild SET name = ?1, master = ?2, level = ?3, exp = ?4,
                        skill_point = ?5, skill = ?6, win = ?7, draw = ?8,
                        loss = ?9, ladder_point = ?10, gold = ?11
                 WHERE id = ?12",
                (
                    changes.name.unwrap_or(&cur.name),
                    changes.master.unwrap_or(cur.master),
                    changes.level.unwrap_or(cur.level),
                    changes.exp.unwrap_or(cur.exp),
                    changes.skill_point.unwrap_or(cur.skill_point),
                    changes.skill.map(str::to_string).or(cur.skill),
                    changes.win.unwrap_or(cur.win),
                    changes.draw.unwrap_or(cur.draw),
                    changes.loss.unwrap_or(cur.loss),
                    changes.ladder_point.unwrap_or(cur.ladder_point),
                    changes.gold.unwrap_or(cur.gold),
                    id,
                ),
            )
            .map_err(Error::storage)?;

            query_by_id(conn, id)?.ok_or(Error::NotFound("guild"))
        })
    }

    pub fn delete(&self, id: i64) -> Result<()> {
        self.db.with_conn(|conn| {
            let changed = conn
                .execute("DELETE FROM guild WHERE id = ?1", [id])
                .map_err(Error::storage)?;
            if changed == 0 {
                return Err(Error::NotFound("guild"));
            }
            Ok(())
        })
    }

    /// Same ordering contract as players: level descending, id ascending.
    pub fn list(&self, params: PageParams) -> Result<(Vec<GuildRow>, u64)> {
        self.db.with_conn(|conn| {
            let total: i64 = conn
                .query_row("SELECT COUNT(*) FROM guild", [], |row| row.get(0))
                .map_err(Error::storage)?;
            let window = paginate(total as u64, params);

            let mut stmt = conn
                .prepare(&format!(
                    "SELECT {COLUMNS} FROM guild
                     ORDER BY level DESC, id ASC LIMIT ?1 OFFSET ?2"
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

fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<GuildRow> {
    Ok(GuildRow {
        id: row.get(0)?,
        name: row.get(1)?,
        master: row.get(2)?,
        level: row.get(3)?,
        exp: row.get(4)?,
        skill_point: row.get(5)?,
        skill: row.get(6)?,
        win: row.get(7)?,
        draw: row.get(8)?,
        loss: row.get(9)?,
        ladder_point: row.get(10)?,
        gold: row.get(11)?,
    })
}

fn query_by_id(conn: &Connection, id: i64) -> Result<Option<GuildRow>> {
    let mut stmt = conn
        .prepare(&format!("SELECT {COLUMNS} FROM guild WHERE id = ?1"))
        .map_err(Error::storage)?;
    stmt.query_row([id], map_row).optional()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Stores;

    fn guild<'a>(name: &'a str, level: i64) -> NewGuild<'a> {
        NewGuild { name, master: 1, level, exp: 0, skill_point: 0, skill: None, gold: 0 }
    }

    #[test]
    fn crud_round_trip() {
        let stores = Stores::open_in_memory().unwrap();
        let repo = stores.guilds();
        let created = repo.create(guild("Dragons", 30)).unwrap();
        assert_eq!(repo.get(created.id).unwrap().name, "Dragons");

        let changes = GuildChanges { win: Some(3), ladder_point: Some(120), ..Default::default() };
        let updated = repo.update(created.id, changes).unwrap();
        assert_eq!(updated.win, 3);
        assert_eq!(updated.ladder_point, 120);
        assert_eq!(updated.name, "Dragons");

        repo.delete(created.id).unwrap();
        assert!(matches!(repo.get(created.id), Err(Error::NotFound(_))));
    }

    #[test]
    fn listing_orders_by_level_then_id() {
        let stores = Stores::open_in_memory().unwrap();
        let repo = stores.guilds();
        repo.create(guild("low", 5)).unwrap();
        let a = repo.create(guild("tied-a", 40)).unwrap();
        let b = repo.create(guild("tied-b", 40)).unwrap();

        let (rows, total) = repo.list(PageParams::default()).unwrap();
        assert_eq!(total, 3);
        assert_eq!(rows[0].id, a.id);
        assert_eq!(rows[1].id, b.id);
        assert_eq!(rows[2].name, "low");
    }
}
