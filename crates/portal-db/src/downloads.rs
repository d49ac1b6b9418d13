use portal_types::pagination::{PageParams, paginate};
use portal_types::{Error, Result};
use rusqlite::Connection;
use rusqlite::types::ToSql;

use crate::models::{DownloadRow, now_timestamp};
use crate::sites::site_exists;
use crate::{Database, OptionalExt};

const COLUMNS: &str =
    "id, provider, size, link, category, published, site_id, created_at, updated_at";

pub struct NewDownload<'a> {
    pub provider: &'a str,
    pub size: &'a str,
    pub link: &'a str,
    pub category: &'a str,
    pub published: bool,
    pub site_id: &'a str,
}

#[derive(Default)]
pub struct DownloadChanges<'a> {
    pub provider: Option<&'a str>,
    pub size: Option<&'a str>,
    pub link: Option<&'a str>,
    pub category: Option<&'a str>,
    pub published: Option<bool>,
    pub site_id: Option<&'a str>,
}

/// All filters compose with AND. `search` is a case-insensitive
/// substring match over provider, category and link.
#[derive(Debug, Default, Clone, Copy)]
pub struct DownloadFilter<'a> {
    pub category: Option<&'a str>,
    pub provider: Option<&'a str>,
    pub site_id: Option<&'a str>,
    pub published_only: bool,
    pub search: Option<&'a str>,
}

pub struct DownloadRepo<'a> {
    db: &'a Database,
}

impl<'a> DownloadRepo<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    pub fn create(&self, new: NewDownload<'_>) -> Result<DownloadRow> {
        self.db.with_conn(|conn| {
            if !site_exists(conn, new.site_id)? {
                return Err(Error::validation(format!("site {} not found", new.site_id)));
            }

            let now = now_timestamp();
            conn.execute(
                "INSERT INTO downloads (provider, size, link, category, published, site_id,
                        created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
                rusqlite::params![
                    new.provider,
                    new.size,
                    new.link,
                    new.category,
                    new.published,
                    new.site_id,
                    now,
                ],
            )
            .map_err(Error::storage)?;

            query_by_id(conn, conn.last_insert_rowid())?.ok_or(Error::NotFound("download"))
        })
    }

    pub fn get(&self, id: i64) -> Result<DownloadRow> {
        self.db
            .with_conn(|conn| query_by_id(conn, id))?
            .ok_or(Error::NotFound("download"))
    }

    pub fn update(&self, id: i64, changes: DownloadChanges<'_>) -> Result<DownloadRow> {
        self.db.with_conn(|conn| {
            let cur = query_by_id(conn, id)?.ok_or(Error::NotFound("download"))?;

            if let Some(site_id) = changes.site_id {
                if !site_exists(conn, site_id)? {
                    return Err(Error::validation(format!("site {site_id} not found")));
                }
            }

            conn.execute(
                "UPDATE downloads SET provider = ?1, size = ?2, link = ?3, category = ?4,
                        published = ?5, site_id = ?6, updated_at = ?7
                 WHERE id = ?8",
                rusqlite::params![
                    changes.provider.unwrap_or(&cur.provider),
                    changes.size.unwrap_or(&cur.size),
                    changes.link.unwrap_or(&cur.link),
                    changes.category.unwrap_or(&cur.category),
                    changes.published.unwrap_or(cur.published),
                    changes.site_id.unwrap_or(&cur.site_id),
                    now_timestamp(),
                    id,
                ],
            )
            .map_err(Error::storage)?;

            query_by_id(conn, id)?.ok_or(Error::NotFound("download"))
        })
    }

    pub fn delete(&self, id: i64) -> Result<()> {
        self.db.with_conn(|conn| {
            let changed = conn
                .execute("DELETE FROM downloads WHERE id = ?1", [id])
                .map_err(Error::storage)?;
            if changed == 0 {
                return Err(Error::NotFound("download"));
            }
            Ok(())
        })
    }

    pub fn set_published(&self, id: i64, published: bool) -> Result<DownloadRow> {
        self.db.with_conn(|conn| {
            let changed = conn
                .execute(
                    "UPDATE downloads SET published = ?1, updated_at = ?2 WHERE id = ?3",
                    rusqlite::params![published, now_timestamp(), id],
                )
                .map_err(Error::storage)?;
            if changed == 0 {
                return Err(Error::NotFound("download"));
            }
            query_by_id(conn, id)?.ok_or(Error::NotFound("download"))
        })
    }

    pub fn list(
        &self,
        filter: DownloadFilter<'_>,
        params: PageParams,
    ) -> Result<(Vec<DownloadRow>, u64)> {
        self.db.with_conn(|conn| {
            let mut clauses: Vec<String> = Vec::new();
            let mut args: Vec<Box<dyn ToSql>> = Vec::new();

            if let Some(category) = filter.category {
                args.push(Box::new(category.to_string()));
                clauses.push(format!("category = ?{}", args.len()));
            }
            if let Some(provider) = filter.provider {
                args.push(Box::new(provider.to_string()));
                clauses.push(format!("provider = ?{}", args.len()));
            }
            if let Some(site_id) = filter.site_id {
                args.push(Box::new(site_id.to_string()));
                clauses.push(format!("site_id = ?{}", args.len()));
            }
            if filter.published_only {
                clauses.push("published = 1".into());
            }
            if let Some(q) = filter.search {
                args.push(Box::new(format!("%{q}%")));
                let n = args.len();
                clauses.push(format!(
                    "(provider LIKE ?{n} OR category LIKE ?{n} OR link LIKE ?{n})"
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
                    &format!("SELECT COUNT(*) FROM downloads{where_sql}"),
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
                    "SELECT {COLUMNS} FROM downloads{where_sql}
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

    pub fn categories(&self) -> Result<Vec<String>> {
        self.distinct("category")
    }

    pub fn providers(&self) -> Result<Vec<String>> {
        self.distinct("provider")
    }

    fn distinct(&self, column: &str) -> Result<Vec<String>> {
        self.db.with_conn(|conn| {
            let mut stmt = conn
                .prepare(&format!(
                    "SELECT DISTINCT {column} FROM downloads ORDER BY {column} ASC"
                ))
                .map_err(Error::storage)?;
            let rows = stmt
                .query_map([], |row| row.get(0))
                .map_err(Error::storage)?
                .collect::<std::result::Result<Vec<String>, _>>()
                .map_err(Error::storage)?;
            Ok(rows)
        })
    }
}

fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<DownloadRow> {
    Ok(DownloadRow {
        id: row.get(0)?,
        provider: row.get(1)?,
        size: row.get(2)?,
        link: row.get(3)?,
        category: row.get(4)?,
        published: row.get(5)?,
        site_id: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

fn query_by_id(conn: &Connection, id: i64) -> Result<Option<DownloadRow>> {
    let mut stmt = conn
        .prepare(&format!("SELECT {COLUMNS} FROM downloads WHERE id = ?1"))
        .map_err(Error::storage)?;
    stmt.query_row([id], map_row).optional()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Stores;
    use crate::testutil::seed_site;

    fn site_fixture(stores: &Stores) -> String {
        seed_site(stores, "main")
    }

    fn download<'a>(site_id: &'a str, provider: &'a str, category: &'a str) -> NewDownload<'a> {
        NewDownload {
            provider,
            size: "1.2 GB",
            link: "https://example.com/client.zip",
            category,
            published: false,
            site_id,
        }
    }

    #[test]
    fn create_requires_existing_site() {
        let stores = Stores::open_in_memory().unwrap();
        let err = stores
            .downloads()
            .create(download("no-such-site", "Mega", "client"))
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn timestamps_behave_across_create_and_update() {
        let stores = Stores::open_in_memory().unwrap();
        let site_id = site_fixture(&stores);
        let dl = stores.downloads().create(download(&site_id, "Mega", "client")).unwrap();
        assert_eq!(dl.created_at, dl.updated_at);

        std::thread::sleep(std::time::Duration::from_millis(2));
        let changes = DownloadChanges { provider: Some("Drive"), ..Default::default() };
        let updated = stores.downloads().update(dl.id, changes).unwrap();
        assert_eq!(updated.created_at, dl.created_at);
        assert!(updated.updated_at > dl.updated_at);
    }

    #[test]
    fn publish_and_unpublish_flip_the_flag() {
        let stores = Stores::open_in_memory().unwrap();
        let site_id = site_fixture(&stores);
        let dl = stores.downloads().create(download(&site_id, "Mega", "client")).unwrap();

        assert!(stores.downloads().set_published(dl.id, true).unwrap().published);
        assert!(!stores.downloads().set_published(dl.id, false).unwrap().published);
    }

    #[test]
    fn filters_compose_with_and() {
        let stores = Stores::open_in_memory().unwrap();
        let site_id = site_fixture(&stores);
        let repo = stores.downloads();
        let a = repo.create(download(&site_id, "Mega", "client")).unwrap();
        repo.create(download(&site_id, "Mega", "patch")).unwrap();
        repo.create(download(&site_id, "Drive", "client")).unwrap();
        repo.set_published(a.id, true).unwrap();

        let filter = DownloadFilter {
            category: Some("client"),
            provider: Some("Mega"),
            published_only: true,
            ..Default::default()
        };
        let (rows, total) = repo.list(filter, PageParams::default()).unwrap();
        assert_eq!(total, 1);
        assert_eq!(rows[0].id, a.id);
    }

    #[test]
    fn search_is_case_insensitive_substring() {
        let stores = Stores::open_in_memory().unwrap();
        let site_id = site_fixture(&stores);
        let repo = stores.downloads();
        repo.create(download(&site_id, "MegaUpload", "client")).unwrap();
        repo.create(download(&site_id, "Drive", "patch")).unwrap();

        let filter = DownloadFilter { search: Some("megaup"), ..Default::default() };
        let (rows, total) = repo.list(filter, PageParams::default()).unwrap();
        assert_eq!(total, 1);
        assert_eq!(rows[0].provider, "MegaUpload");
    }

    #[test]
    fn deleting_site_cascades_to_downloads() {
        let stores = Stores::open_in_memory().unwrap();
        let site_id = site_fixture(&stores);
        let dl = stores.downloads().create(download(&site_id, "Mega", "client")).unwrap();

        stores.sites().delete(&site_id).unwrap();
        assert!(matches!(stores.downloads().get(dl.id), Err(Error::NotFound(_))));
    }

    #[test]
    fn distinct_categories_and_providers() {
        let stores = Stores::open_in_memory().unwrap();
        let site_id = site_fixture(&stores);
        let repo = stores.downloads();
        repo.create(download(&site_id, "Mega", "client")).unwrap();
        repo.create(download(&site_id, "Mega", "patch")).unwrap();
        repo.create(download(&site_id, "Drive", "client")).unwrap();

        assert_eq!(repo.categories().unwrap(), vec!["client", "patch"]);
        assert_eq!(repo.providers().unwrap(), vec!["Drive", "Mega"]);
    }
}
