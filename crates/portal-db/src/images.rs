use portal_types::pagination::{PageParams, paginate};
use portal_types::{Error, Result};
use rusqlite::Connection;
use rusqlite::types::ToSql;

use crate::models::{ImageRow, now_timestamp};
use crate::sites::site_exists;
use crate::{Database, OptionalExt};

const COLUMNS: &str =
    "id, name, path, image_type, alt_text, file_size, site_id, created_at, updated_at";

pub struct NewImage<'a> {
    pub name: &'a str,
    pub path: &'a str,
    pub image_type: &'a str,
    pub alt_text: Option<&'a str>,
    pub file_size: Option<i64>,
    pub site_id: &'a str,
}

#[derive(Default)]
pub struct ImageChanges<'a> {
    pub name: Option<&'a str>,
    pub path: Option<&'a str>,
    pub image_type: Option<&'a str>,
    pub alt_text: Option<&'a str>,
    pub file_size: Option<i64>,
    pub site_id: Option<&'a str>,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ImageFilter<'a> {
    pub site_id: Option<&'a str>,
    pub image_type: Option<&'a str>,
    pub search: Option<&'a str>,
}

pub struct ImageRepo<'a> {
    db: &'a Database,
}

impl<'a> ImageRepo<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    pub fn create(&self, new: NewImage<'_>) -> Result<ImageRow> {
        self.db.with_conn(|conn| {
            if !site_exists(conn, new.site_id)? {
                return Err(Error::validation(format!("site {} not found", new.site_id)));
            }
            if name_taken(conn, new.name, new.site_id, None)? {
                return Err(Error::validation(format!(
                    "image '{}' already exists for this site",
                    new.name
                )));
            }

            let now = now_timestamp();
            conn.execute(
                "INSERT INTO images (name, path, image_type, alt_text, file_size, site_id,
                        created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
                rusqlite::params![
                    new.name,
                    new.path,
                    new.image_type,
                    new.alt_text,
                    new.file_size,
                    new.site_id,
                    now,
                ],
            )
            .map_err(Error::storage)?;

            query_by_id(conn, conn.last_insert_rowid())?.ok_or(Error::NotFound("image"))
        })
    }

    pub fn get(&self, id: i64) -> Result<ImageRow> {
        self.db
            .with_conn(|conn| query_by_id(conn, id))?
            .ok_or(Error::NotFound("image"))
    }

    pub fn update(&self, id: i64, changes: ImageChanges<'_>) -> Result<ImageRow> {
        self.db.with_conn(|conn| {
            let cur = query_by_id(conn, id)?.ok_or(Error::NotFound("image"))?;

            if let Some(site_id) = changes.site_id {
                if !site_exists(conn, site_id)? {
                    return Err(Error::validation(format!("site {site_id} not found")));
                }
            }
            if let Some(name) = changes.name {
                let site_id = changes.site_id.unwrap_or(&cur.site_id);
                if name_taken(conn, name, site_id, Some(id))? {
                    return Err(Error::validation(format!(
                        "image '{name}' already exists for this site"
                    )));
                }
            }

            conn.execute(
                "UPDATE images SET name = ?1, path = ?2, image_type = ?3, alt_text = ?4,
                        file_size = ?5, site_id = ?6, updated_at = ?7
                 WHERE id = ?8",
                rusqlite::params![
                    changes.name.unwrap_or(&cur.name),
                    changes.path.unwrap_or(&cur.path),
                    changes.image_type.unwrap_or(&cur.image_type),
                    changes.alt_text.map(str::to_string).or(cur.alt_text),
                    changes.file_size.or(cur.file_size),
                    changes.site_id.unwrap_or(&cur.site_id),
                    now_timestamp(),
                    id,
                ],
            )
            .map_err(Error::storage)?;

            query_by_id(conn, id)?.ok_or(Error::NotFound("image"))
        })
    }

    pub fn delete(&self, id: i64) -> Result<()> {
        self.db.with_conn(|conn| {
            let changed = conn
                .execute("DELETE FROM images WHERE id = ?1", [id])
                .map_err(Error::storage)?;
            if changed == 0 {
                return Err(Error::NotFound("image"));
            }
            Ok(())
        })
    }

    pub fn list(
        &self,
        filter: ImageFilter<'_>,
        params: PageParams,
    ) -> Result<(Vec<ImageRow>, u64)> {
        self.db.with_conn(|conn| {
            let mut clauses: Vec<String> = Vec::new();
            let mut args: Vec<Box<dyn ToSql>> = Vec::new();

            if let Some(site_id) = filter.site_id {
                args.push(Box::new(site_id.to_string()));
                clauses.push(format!("site_id = ?{}", args.len()));
            }
            if let Some(image_type) = filter.image_type {
                args.push(Box::new(image_type.to_string()));
                clauses.push(format!("image_type = ?{}", args.len()));
            }
            if let Some(q) = filter.search {
                args.push(Box::new(format!("%{q}%")));
                let n = args.len();
                clauses.push(format!(
                    "(name LIKE ?{n} OR path LIKE ?{n} OR alt_text LIKE ?{n})"
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
                    &format!("SELECT COUNT(*) FROM images{where_sql}"),
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
                    "SELECT {COLUMNS} FROM images{where_sql}
                     ORDER BY created_at DESC, id ASC LIMIT ?{} OFFSET ?{}",
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

fn name_taken(
    conn: &Connection,
    name: &str,
    site_id: &str,
    exclude_id: Option<i64>,
) -> Result<bool> {
    let mut stmt = conn
        .prepare("SELECT id FROM images WHERE name = ?1 AND site_id = ?2")
        .map_err(Error::storage)?;
    let found: Option<i64> = stmt.query_row((name, site_id), |row| row.get(0)).optional()?;
    Ok(match (found, exclude_id) {
        (Some(id), Some(excl)) => id != excl,
        (Some(_), None) => true,
        (None, _) => false,
    })
}

fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ImageRow> {
    Ok(ImageRow {
        id: row.get(0)?,
        name: row.get(1)?,
        path: row.get(2)?,
        image_type: row.get(3)?,
        alt_text: row.get(4)?,
        file_size: row.get(5)?,
        site_id: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

fn query_by_id(conn: &Connection, id: i64) -> Result<Option<ImageRow>> {
    let mut stmt = conn
        .prepare(&format!("SELECT {COLUMNS} FROM images WHERE id = ?1"))
        .map_err(Error::storage)?;
    stmt.query_row([id], map_row).optional()
}
