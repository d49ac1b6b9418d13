use portal_types::pagination::{PageParams, paginate};
use portal_types::{Error, Result};
use rusqlite::Connection;
use rusqlite::types::ToSql;

use crate::models::{PageRow, now_timestamp};
use crate::sites::site_exists;
use crate::{Database, OptionalExt};

const COLUMNS: &str = "id, slug, title, content, published, meta_description, meta_keywords, \
     site_id, created_at, updated_at";

pub struct NewPage<'a> {
    pub slug: &'a str,
    pub title: &'a str,
    pub content: &'a str,
    pub published: bool,
    pub meta_description: Option<&'a str>,
    pub meta_keywords: Option<&'a str>,
    pub site_id: &'a str,
}

#[derive(Default)]
pub struct PageChanges<'a> {
    pub slug: Option<&'a str>,
    pub title: Option<&'a str>,
    pub content: Option<&'a str>,
    pub published: Option<bool>,
    pub meta_description: Option<&'a str>,
    pub meta_keywords: Option<&'a str>,
    pub site_id: Option<&'a str>,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct PageFilter<'a> {
    pub site_id: Option<&'a str>,
    pub published: Option<bool>,
    pub search: Option<&'a str>,
}

pub struct PageRepo<'a> {
    db: &'a Database,
}

impl<'a> PageRepo<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    pub fn create(&self, new: NewPage<'_>) -> Result<PageRow> {
        self.db.with_conn(|conn| {
            if !site_exists(conn, new.site_id)? {
                return Err(Error::validation(format!("site {} not found", new.site_id)));
            }

            let now = now_timestamp();
            conn.execute(
                "INSERT INTO pages (slug, title, content, published, meta_description,
                        meta_keywords, site_id, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)",
                rusqlite::params![
                    new.slug,
                    new.title,
                    new.content,
                    new.published,
                    new.meta_description,
                    new.meta_keywords,
                    new.site_id,
                    now,
                ],
            )
            .map_err(Error::storage)?;

            query_by_id(conn, conn.last_insert_rowid())?.ok_or(Error::NotFound("page"))
        })
    }

    pub fn get(&self, id: i64) -> Result<PageRow> {
        self.db
            .with_conn(|conn| query_by_id(conn, id))?
            .ok_or(Error::NotFound("page"))
    }

    /// Most recently created page wins when slugs collide; page slugs are
    /// not unique, unlike site slugs.
    pub fn get_by_slug(&self, slug: &str) -> Result<PageRow> {
        self.db
            .with_conn(|conn| {
                let mut stmt = conn
                    .prepare(&format!(
                        "SELECT {COLUMNS} FROM pages WHERE slug = ?1 ORDER BY id DESC LIMIT 1"
                    ))
                    .map_err(Error::storage)?;
                stmt.query_row([slug], map_row).optional()
            })?
            .ok_or(Error::NotFound("page"))
    }

    pub fn update(&self, id: i64, changes: PageChanges<'_>) -> Result<PageRow> {
        self.db.with_conn(|conn| {
            let cur = query_by_id(conn, id)?.ok_or(Error::NotFound("page"))?;

            if let Some(site_id) = changes.site_id {
                if !site_exists(conn, site_id)? {
                    return Err(Error::validation(format!("site {site_id} not found")));
                }
            }

            conn.execute(
                "UPDATE pages SET slug = ?1, title = ?2, content = ?3, published = ?4,
                        meta_description = ?5, meta_keywords = ?6, site_id = ?7, updated_at = ?8
                 WHERE id = ?9",
                rusqlite::params![
                    changes.slug.unwrap_or(&cur.slug),
                    changes.title.unwrap_or(&cur.title),
                    changes.content.unwrap_or(&cur.content),
                    changes.published.unwrap_or(cur.published),
                    changes.meta_description.map(str::to_string).or(cur.meta_description),
                    changes.meta_keywords.map(str::to_string).or(cur.meta_keywords),
                    changes.site_id.unwrap_or(&cur.site_id),
                    now_timestamp(),
                    id,
                ],
            )
            .map_err(Error::storage)?;

            query_by_id(conn, id)?.ok_or(Error::NotFound("page"))
        })
    }

    pub fn delete(&self, id: i64) -> Result<()> {
        self.db.with_conn(|conn| {
            let changed = conn
                .execute("DELETE FROM pages WHERE id = ?1", [id])
                .map_err(Error::storage)?;
            if changed == 0 {
                return Err(Error::NotFound("page"));
            }
            Ok(())
        })
    }

    pub fn set_published(&self, id: i64, published: bool) -> Result<PageRow> {
        self.db.with_conn(|conn| {
            let changed = conn
                .execute(
                    "UPDATE pages SET published = ?1, updated_at = ?2 WHERE id = ?3",
                    rusqlite::params![published, now_timestamp(), id],
                )
                .map_err(Error::storage)?;
            if changed == 0 {
                return Err(Error::NotFound("page"));
            }
            query_by_id(conn, id)?.ok_or(Error::NotFound("page"))
        })
    }

    pub fn list(&self, filter: PageFilter<'_>, params: PageParams) -> Result<(Vec<PageRow>, u64)> {
        self.db.with_conn(|conn| {
            let mut clauses: Vec<String> = Vec::new();
            let mut args: Vec<Box<dyn ToSql>> = Vec::new();

            if let Some(site_id) = filter.site_id {
                args.push(Box::new(site_id.to_string()));
                clauses.push(format!("site_id = ?{}", args.len()));
            }
            if let Some(published) = filter.published {
                args.push(Box::new(published));
                clauses.push(format!("published = ?{}", args.len()));
            }
            if let Some(q) = filter.search {
                args.push(Box::new(format!("%{q}%")));
                let n = args.len();
                clauses.push(format!(
                    "(title LIKE ?{n} OR slug LIKE ?{n} OR content LIKE ?{n})"
                ));
            }

            let where_sql = if clauses.is_empty() {
                String::new()
            } else {
                format!(" WHERE {}", clauses.join(" AND "))
            };

            let count_params: Vec<&dyn ToSql> = args.iter().map(|a| a.as_ref()).collect();
            let total: i64 = conn
                .query_row(
                    &format!("SELECT COUNT(*) FROM pages{where_sql}"),
                    count_params.as_slice(),
                    |row| row.get(0),
                )
                .map_err(Error::storage)?;
            let window = paginate(total as u64, params);

            args.push(Box::new(window.per_page));
            args.push(Box::new(window.offset));
            let select_params: Vec<&dyn ToSql> = args.iter().map(|a| a.as_ref()).collect();

            let mut stmt = conn
                .prepare(&format!(
                    "SELECT {COLUMNS} FROM pages{where_sql}
                     ORDER BY id DESC LIMIT ?{} OFFSET ?{}",
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

fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<PageRow> {
    Ok(PageRow {
        id: row.get(0)?,
        slug: row.get(1)?,
        title: row.get(2)?,
        content: row.get(3)?,
        published: row.get(4)?,
        meta_description: row.get(5)?,
        meta_keywords: row.get(6)?,
        site_id: row.get(7)?,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
    })
}

fn query_by_id(conn: &Connection, id: i64) -> Result<Option<PageRow>> {
    let mut stmt = conn
        .prepare(&format!("SELECT {COLUMNS} FROM pages WHERE id = ?1"))
        .map_err(Error::storage)?;
    stmt.query_row([id], map_row).optional()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Stores;
    use crate::testutil::seed_site;

    fn page<'a>(site_id: &'a str, slug: &'a str, published: bool) -> NewPage<'a> {
        NewPage {
            slug,
            title: "Rules",
            content: "be nice",
            published,
            meta_description: None,
            meta_keywords: None,
            site_id,
        }
    }

    #[test]
    fn create_requires_existing_site() {
        let stores = Stores::open_in_memory().unwrap();
        let err = stores.pages().create(page("missing", "rules", true)).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn slug_lookup_returns_newest_match() {
        let stores = Stores::open_in_memory().unwrap();
        let site = seed_site(&stores, "main");
        stores.pages().create(page(&site, "rules", true)).unwrap();
        let newer = stores.pages().create(page(&site, "rules", false)).unwrap();

        assert_eq!(stores.pages().get_by_slug("rules").unwrap().id, newer.id);
    }

    #[test]
    fn published_filter_composes_with_site() {
        let stores = Stores::open_in_memory().unwrap();
        let site_a = seed_site(&stores, "a");
        let site_b = seed_site(&stores, "b");
        let repo = stores.pages();
        let wanted = repo.create(page(&site_a, "one", true)).unwrap();
        repo.create(page(&site_a, "two", false)).unwrap();
        repo.create(page(&site_b, "three", true)).unwrap();

        let filter = PageFilter {
            site_id: Some(&site_a),
            published: Some(true),
            ..Default::default()
        };
        let (rows, total) = repo.list(filter, PageParams::default()).unwrap();
        assert_eq!(total, 1);
        assert_eq!(rows[0].id, wanted.id);
    }

    #[test]
    fn publish_toggle_refreshes_updated_at() {
        let stores = Stores::open_in_memory().unwrap();
        let site = seed_site(&stores, "main");
        let pg = stores.pages().create(page(&site, "rules", false)).unwrap();

        std::thread::sleep(std::time::Duration::from_millis(2));
        let published = stores.pages().set_published(pg.id, true).unwrap();
        assert!(published.published);
        assert!(published.updated_at > pg.updated_at);
        assert_eq!(published.created_at, pg.created_at);
    }
}
