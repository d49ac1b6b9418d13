use portal_types::{Error, Result};
use rusqlite::Connection;
use tracing::debug;

fn run(conn: &Connection, store: &str, ddl: &str) -> Result<()> {
    conn.execute_batch(ddl).map_err(Error::storage)?;
    debug!("{store} store migrations complete");
    Ok(())
}

pub fn account_store(conn: &Connection) -> Result<()> {
    run(
        conn,
        "account",
        "
        CREATE TABLE IF NOT EXISTS account (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            login       TEXT NOT NULL COLLATE NOCASE,
            password    TEXT NOT NULL,
            social_id   TEXT NOT NULL,
            email       TEXT NOT NULL,
            status      TEXT NOT NULL DEFAULT 'OK'
        );

        -- NOCASE collation on the column makes this index reject
        -- logins that differ only in case.
        CREATE UNIQUE INDEX IF NOT EXISTS idx_account_login ON account(login);
        CREATE UNIQUE INDEX IF NOT EXISTS idx_account_email ON account(email);
        CREATE INDEX IF NOT EXISTS idx_account_social ON account(social_id);
        ",
    )
}

pub fn player_store(conn: &Connection) -> Result<()> {
    run(
        conn,
        "player",
        "
        CREATE TABLE IF NOT EXISTS player (
            account_id  INTEGER PRIMARY KEY,
            name        TEXT NOT NULL,
            job         INTEGER NOT NULL DEFAULT 0,
            level       INTEGER NOT NULL DEFAULT 1,
            exp         INTEGER NOT NULL DEFAULT 0
        );

        CREATE INDEX IF NOT EXISTS idx_player_level ON player(level);

        CREATE TABLE IF NOT EXISTS guild (
            id           INTEGER PRIMARY KEY AUTOINCREMENT,
            name         TEXT NOT NULL,
            master       INTEGER NOT NULL,
            level        INTEGER NOT NULL DEFAULT 1,
            exp          INTEGER NOT NULL DEFAULT 0,
            skill_point  INTEGER NOT NULL DEFAULT 0,
            skill        TEXT,
            win          INTEGER NOT NULL DEFAULT 0,
            draw         INTEGER NOT NULL DEFAULT 0,
            loss         INTEGER NOT NULL DEFAULT 0,
            ladder_point INTEGER NOT NULL DEFAULT 0,
            gold         INTEGER NOT NULL DEFAULT 0
        );

        CREATE INDEX IF NOT EXISTS idx_guild_level ON guild(level);
        ",
    )
}

pub fn app_store(conn: &Connection) -> Result<()> {
    run(
        conn,
        "app",
        "
        CREATE TABLE IF NOT EXISTS sites (
            id                 TEXT PRIMARY KEY,
            name               TEXT NOT NULL,
            slug               TEXT NOT NULL UNIQUE,
            initial_level      TEXT NOT NULL,
            max_level          TEXT NOT NULL,
            rates              TEXT,
            facebook_url       TEXT,
            facebook_enable    INTEGER NOT NULL DEFAULT 0,
            footer_info        TEXT,
            footer_menu_enable INTEGER NOT NULL DEFAULT 0,
            footer_info_enable INTEGER NOT NULL DEFAULT 0,
            forum_url          TEXT,
            last_online        INTEGER NOT NULL DEFAULT 0,
            is_active          INTEGER NOT NULL DEFAULT 1,
            maintenance_mode   INTEGER NOT NULL DEFAULT 0,
            created_at         TEXT NOT NULL,
            updated_at         TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_sites_active_slug ON sites(is_active, slug);

        CREATE TABLE IF NOT EXISTS downloads (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            provider    TEXT NOT NULL,
            size        TEXT NOT NULL,
            link        TEXT NOT NULL,
            category    TEXT NOT NULL,
            published   INTEGER NOT NULL DEFAULT 0,
            site_id     TEXT NOT NULL REFERENCES sites(id) ON DELETE CASCADE,
            created_at  TEXT NOT NULL,
            updated_at  TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_downloads_site_published
            ON downloads(site_id, published);
        CREATE INDEX IF NOT EXISTS idx_downloads_category_published
            ON downloads(category, published);

        CREATE TABLE IF NOT EXISTS images (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            name        TEXT NOT NULL,
            path        TEXT NOT NULL,
            image_type  TEXT NOT NULL,
            alt_text    TEXT,
            file_size   INTEGER,
            site_id     TEXT NOT NULL REFERENCES sites(id) ON DELETE CASCADE,
            created_at  TEXT NOT NULL,
            updated_at  TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_images_site_type ON images(site_id, image_type);

        CREATE TABLE IF NOT EXISTS pages (
            id               INTEGER PRIMARY KEY AUTOINCREMENT,
            slug             TEXT NOT NULL,
            title            TEXT NOT NULL,
            content          TEXT NOT NULL,
            published        INTEGER NOT NULL DEFAULT 1,
            meta_description TEXT,
            meta_keywords    TEXT,
            site_id          TEXT NOT NULL REFERENCES sites(id) ON DELETE CASCADE,
            created_at       TEXT NOT NULL,
            updated_at       TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_pages_published_slug ON pages(published, slug);
        ",
    )
}

pub fn admin_store(conn: &Connection) -> Result<()> {
    run(
        conn,
        "admin",
        "
        CREATE TABLE IF NOT EXISTS admin_grant (
            account_id       INTEGER PRIMARY KEY,
            authority_level  INTEGER NOT NULL DEFAULT 0
        );
        ",
    )
}
