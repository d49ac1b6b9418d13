use portal_types::pagination::{PageParams, paginate};
use portal_types::{Error, Result};
use rusqlite::Connection;
use uuid::Uuid;

use crate::models::{SiteRow, now_timestamp};
use crate::{Database, OptionalExt, constraint_to_validation};

const COLUMNS: &str = "id, name, slug, initial_level, max_level, rates, facebook_url, \
     facebook_enable, footer_info, footer_menu_enable, footer_info_enable, forum_url, \
     last_online, is_active, maintenance_mode, created_at, updated_at";

pub struct NewSite<'a> {
    pub name: &'a str,
    pub slug: &'a str,
    pub initial_level: &'a str,
    pub max_level: &'a str,
    pub rates: Option<&'a str>,
    pub facebook_url: Option<&'a str>,
    pub facebook_enable: bool,
    pub footer_info: Option<&'a str>,
    pub footer_menu_enable: bool,
    pub footer_info_enable: bool,
    pub forum_url: Option<&'a str>,
    pub last_online: bool,
    pub is_active: bool,
    pub maintenance_mode: bool,
}

#[derive(Default)]
pub struct SiteChanges<'a> {
    pub name: Option<&'a str>,
    pub slug: Option<&'a str>,
    pub initial_level: Option<&'a str>,
    pub max_level: Option<&'a str>,
    pub rates: Option<&'a str>,
    pub facebook_url: Option<&'a str>,
    pub facebook_enable: Option<bool>,
    pub footer_info: Option<&'a str>,
    pub footer_menu_enable: Option<bool>,
    pub footer_info_enable: Option<bool>,
    pub forum_url: Option<&'a str>,
    pub last_online: Option<bool>,
    pub is_active: Option<bool>,
    pub maintenance_mode: Option<bool>,
}

pub struct SiteRepo<'a> {
    db: &'a Database,
}

impl<'a> SiteRepo<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    pub fn create(&self, new: NewSite<'_>) -> Result<SiteRow> {
        self.db.with_conn(|conn| {
            if slug_taken(conn, new.slug, None)? {
                return Err(Error::validation(format!("site slug '{}' already exists", new.slug)));
            }

            let id = Uuid::new_v4().to_string();
            let now = now_timestamp();
            conn.execute(
                "INSERT INTO sites (id, name, slug, initial_level, max_level, rates,
                        facebook_url, facebook_enable, footer_info, footer_menu_enable,
                        footer_info_enable, forum_url, last_online, is_active,
                        maintenance_mode, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?16)",
                rusqlite::params![
                    id,
                    new.name,
                    new.slug,
                    new.initial_level,
                    new.max_level,
                    new.rates,
                    new.facebook_url,
                    new.facebook_enable,
                    new.footer_info,
                    new.footer_menu_enable,
                    new.footer_info_enable,
                    new.forum_url,
                    new.last_online,
                    new.is_active,
                    new.maintenance_mode,
                    now,
                ],
            )
            .map_err(|e| constraint_to_validation(e, "site slug already exists"))?;

            query_by_id(conn, &id)?.ok_or(Error::NotFound("site"))
        })
    }

    pub fn get(&self, id: &str) -> Result<SiteRow> {
        self.db
            .with_conn(|conn| query_by_id(conn, id))?
            .ok_or(Error::NotFound("site"))
    }

    pub fn get_by_slug(&self, slug: &str) -> Result<SiteRow> {
        self.db
            .with_conn(|conn| {
                let mut stmt = conn
                    .prepare(&format!("SELECT {COLUMNS} FROM sites WHERE slug = ?1"))
                    .map_err(Error::storage)?;
                stmt.query_row([slug], map_row).optional()
            })?
            .ok_or(Error::NotFound("site"))
    }

    pub fn update(&self, id: &str, changes: SiteChanges<'_>) -> Result<SiteRow> {
        self.db.with_conn(|conn| {
            let cur = query_by_id(conn, id)?.ok_or(Error::NotFound("site"))?;

            if let Some(slug) = changes.slug {
                if slug_taken(conn, slug, Some(id))? {
                    return Err(Error::validation(format!("site slug '{slug}' already exists")));
                }
            }

            conn.execute(
                "UPDATE sites SET name = ?1, slug = ?2, initial_level = ?3, max_level = ?4,
                        rates = ?5, facebook_url = ?6, facebook_enable = ?7, footer_info = ?8,
                        footer_menu_enable = ?9, footer_info_enable = ?10, forum_url = ?11,
                        last_online = ?12, is_active = ?13, maintenance_mode = ?14,
                        updated_at = ?15
                 WHERE id = ?16",
                rusqlite::params![
                    changes.name.unwrap_or(&cur.name),
                    changes.slug.unwrap_or(&cur.slug),
                    changes.initial_level.unwrap_or(&cur.initial_level),
                    changes.max_level.unwrap_or(&cur.max_level),
                    changes.rates.map(str::to_string).or(cur.rates),
                    changes.facebook_url.map(str::to_string).or(cur.facebook_url),
                    changes.facebook_enable.unwrap_or(cur.facebook_enable),
                    changes.footer_info.map(str::to_string).or(cur.footer_info),
                    changes.footer_menu_enable.unwrap_or(cur.footer_menu_enable),
                    changes.footer_info_enable.unwrap_or(cur.footer_info_enable),
                    changes.forum_url.map(str::to_string).or(cur.forum_url),
                    changes.last_online.unwrap_or(cur.last_online),
                    changes.is_active.unwrap_or(cur.is_active),
                    changes.maintenance_mode.unwrap_or(cur.maintenance_mode),
                    now_timestamp(),
                    id,
                ],
            )
            .map_err(|e| constraint_to_validation(e, "site slug already exists"))?;

            query_by_id(conn, id)?.ok_or(Error::NotFound("site"))
        })
    }

    /// Deletes the site; downloads, images and pages under it go with it
    /// through the store's own ON DELETE CASCADE rule, not application code.
    pub fn delete(&self, id: &str) -> Result<()> {
        self.db.with_conn(|conn| {
            let changed = conn
                .execute("DELETE FROM sites WHERE id = ?1", [id])
                .map_err(Error::storage)?;
            if changed == 0 {
                return Err(Error::NotFound("site"));
            }
            Ok(())
        })
    }

    pub fn set_active(&self, id: &str, active: bool) -> Result<SiteRow> {
        self.set_flag(id, "is_active", active)
    }

    pub fn set_maintenance(&self, id: &str, maintenance: bool) -> Result<SiteRow> {
        self.set_flag(id, "maintenance_mode", maintenance)
    }

    fn set_flag(&self, id: &str, column: &str, value: bool) -> Result<SiteRow> {
        self.db.with_conn(|conn| {
            let changed = conn
                .execute(
                    &format!("UPDATE sites SET {column} = ?1, updated_at = ?2 WHERE id = ?3"),
                    rusqlite::params![value, now_timestamp(), id],
                )
                .map_err(Error::storage)?;
            if changed == 0 {
                return Err(Error::NotFound("site"));
            }
            query_by_id(conn, id)?.ok_or(Error::NotFound("site"))
        })
    }

    /// Optional case-insensitive text search over name, slug and
    /// footer_info; active-only filter composes with AND.
    pub fn list(
        &self,
        active_only: bool,
        search: Option<&str>,
        params: PageParams,
    ) -> Result<(Vec<SiteRow>, u64)> {
        self.db.with_conn(|conn| {
            let mut clauses: Vec<&str> = Vec::new();
            let mut args: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();

            if active_only {
                clauses.push("is_active = 1");
            }
            if let Some(q) = search {
                clauses.push("(name LIKE ?1 OR slug LIKE ?1 OR footer_info LIKE ?1)");
                args.push(Box::new(format!("%{q}%")));
            }
            let where_sql = if clauses.is_empty() {
                String::new()
            } else {
                format!(" WHERE {}", clauses.join(" AND "))
            };

            let count_params: Vec<&dyn rusqlite::types::ToSql> =
                args.iter().map(|a| a.as_ref()).collect();
            let total: i64 = conn
                .query_row(
                    &format!("SELECT COUNT(*) FROM sites{where_sql}"),
                    count_params.as_slice(),
                    |row| row.get(0),
                )
                .map_err(Error::storage)?;
            let window = paginate(total as u64, params);

            args.push(Box::new(window.per_page));
            args.push(Box::new(window.offset));
            let select_params: Vec<&dyn rusqlite::types::ToSql> =
                args.iter().map(|a| a.as_ref()).collect();

            let mut stmt = conn
                .prepare(&format!(
                    "SELECT {COLUMNS} FROM sites{where_sql}
                     ORDER BY created_at DESC, id ASC
                     LIMIT ?{} OFFSET ?{}",
                    args.len() - 1,
                    args.len(),
                ))
                .map_err(Error::storage)?;
            let rows = stmt
                .query_map(select_params.as_slice(), map_row)
                .map_err(Error::storage)?
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(Error::storage)?;

            Ok((rows, total as u64))
        })
    }
}

/// Write-time referential check shared by the app-store repositories
/// whose rows point at a site.
pub(crate) fn site_exists(conn: &Connection, id: &str) -> Result<bool> {
    let mut stmt = conn
        .prepare("SELECT 1 FROM sites WHERE id = ?1")
        .map_err(Error::storage)?;
    Ok(stmt.query_row([id], |_| Ok(())).optional()?.is_some())
}

fn slug_taken(conn: &Connection, slug: &str, exclude_id: Option<&str>) -> Result<bool> {
    let mut stmt = conn
        .prepare("SELECT id FROM sites WHERE slug = ?1")
        .map_err(Error::storage)?;
    let found: Option<String> = stmt.query_row([slug], |row| row.get(0)).optional()?;
    Ok(match (found, exclude_id) {
        (Some(id), Some(excl)) => id != excl,
        (Some(_), None) => true,
        (None, _) => false,
    })
}

fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<SiteRow> {
    Ok(SiteRow {
        id: row.get(0)?,
        name: row.get(1)?,
        slug: row.get(2)?,
        initial_level: row.get(3)?,
        max_level: row.get(4)?,
        rates: row.get(5)?,
        facebook_url: row.get(6)?,
        facebook_enable: row.get(7)?,
        footer_info: row.get(8)?,
        footer_menu_enable: row.get(9)?,
        footer_info_enable: row.get(10)?,
        forum_url: row.get(11)?,
        last_online: row.get(12)?,
        is_active: row.get(13)?,
        maintenance_mode: row.get(14)?,
        created_at: row.get(15)?,
        updated_at: row.get(16)?,
    })
}

fn query_by_id(conn: &Connection, id: &str) -> Result<Option<SiteRow>> {
    let mut stmt = conn
        .prepare(&format!("SELECT {COLUMNS} FROM sites WHERE id = ?1"))
        .map_err(Error::storage)?;
    stmt.query_row([id], map_row).optional()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Stores;

    pub(crate) fn new_site<'a>(name: &'a str, slug: &'a str) -> NewSite<'a> {
        NewSite {
            name,
            slug,
            initial_level: "1",
            max_level: "120",
            rates: None,
            facebook_url: None,
            facebook_enable: false,
            footer_info: None,
            footer_menu_enable: false,
            footer_info_enable: false,
            forum_url: None,
            last_online: false,
            is_active: true,
            maintenance_mode: false,
        }
    }

    #[test]
    fn create_sets_equal_timestamps() {
        let stores = Stores::open_in_memory().unwrap();
        let site = stores.sites().create(new_site("Main", "main")).unwrap();
        assert_eq!(site.created_at, site.updated_at);
    }

    #[test]
    fn duplicate_slug_rejected() {
        let stores = Stores::open_in_memory().unwrap();
        stores.sites().create(new_site("One", "same")).unwrap();
        let err = stores.sites().create(new_site("Two", "same")).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn update_keeps_created_at_and_bumps_updated_at() {
        let stores = Stores::open_in_memory().unwrap();
        let site = stores.sites().create(new_site("Main", "main")).unwrap();

        std::thread::sleep(std::time::Duration::from_millis(2));
        let changes = SiteChanges { name: Some("Renamed"), ..Default::default() };
        let updated = stores.sites().update(&site.id, changes).unwrap();

        assert_eq!(updated.created_at, site.created_at);
        assert!(updated.updated_at > site.updated_at);
        assert_eq!(updated.slug, "main");
    }

    #[test]
    fn update_slug_to_existing_rejected_but_own_slug_allowed() {
        let stores = Stores::open_in_memory().unwrap();
        let a = stores.sites().create(new_site("A", "a")).unwrap();
        stores.sites().create(new_site("B", "b")).unwrap();

        let own = SiteChanges { slug: Some("a"), ..Default::default() };
        stores.sites().update(&a.id, own).unwrap();

        let taken = SiteChanges { slug: Some("b"), ..Default::default() };
        assert!(matches!(stores.sites().update(&a.id, taken), Err(Error::Validation(_))));
    }

    #[test]
    fn slug_lookup_and_flags() {
        let stores = Stores::open_in_memory().unwrap();
        let site = stores.sites().create(new_site("Main", "main")).unwrap();

        assert_eq!(stores.sites().get_by_slug("main").unwrap().id, site.id);

        let off = stores.sites().set_active(&site.id, false).unwrap();
        assert!(!off.is_active);
        let maint = stores.sites().set_maintenance(&site.id, true).unwrap();
        assert!(maint.maintenance_mode);
    }

    #[test]
    fn active_filter_and_search_compose() {
        let stores = Stores::open_in_memory().unwrap();
        let a = stores.sites().create(new_site("Alpha World", "alpha")).unwrap();
        stores.sites().create(new_site("Beta World", "beta")).unwrap();
        stores.sites().set_active(&a.id, false).unwrap();

        let (rows, total) = stores
            .sites()
            .list(true, Some("world"), PageParams::default())
            .unwrap();
        assert_eq!(total, 1);
        assert_eq!(rows[0].slug, "beta");
    }
}
