pub mod accounts;
pub mod downloads;
pub mod grants;
pub mod guilds;
pub mod images;
pub mod migrations;
pub mod models;
pub mod pages;
pub mod players;
pub mod sites;

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use portal_types::{Error, Result};
use rusqlite::Connection;
use tracing::info;

pub use accounts::AccountRepo;
pub use downloads::DownloadRepo;
pub use grants::GrantRepo;
pub use guilds::GuildRepo;
pub use images::ImageRepo;
pub use pages::PageRepo;
pub use players::PlayerRepo;
pub use sites::SiteRepo;

/// One long-lived handle per backing store. Every repository call takes
/// the connection for its own duration only, so the guard is released on
/// every exit path including errors.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    fn from_conn(conn: Connection, migrate: fn(&Connection) -> Result<()>) -> Result<Self> {
        conn.pragma_update(None, "journal_mode", "WAL")
            .map_err(Error::storage)?;
        conn.pragma_update(None, "foreign_keys", "ON")
            .map_err(Error::storage)?;

        migrate(&conn)?;

        Ok(Self { conn: Mutex::new(conn) })
    }

    fn open(path: &Path, migrate: fn(&Connection) -> Result<()>) -> Result<Self> {
        let conn = Connection::open(path)
            .map_err(|e| Error::Configuration(format!("cannot open store {}: {e}", path.display())))?;
        let db = Self::from_conn(conn, migrate)?;
        info!("store opened at {}", path.display());
        Ok(db)
    }

    pub fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self
            .conn
            .lock()
            .map_err(|e| Error::Storage(format!("store lock poisoned: {e}")))?;
        f(&conn)
    }
}

/// Which store owns an entity type. The assignment is total and fixed at
/// compile time, so a missing mapping is unrepresentable at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Store {
    Account,
    Player,
    App,
    Admin,
}

/// Filesystem location of each store.
#[derive(Debug, Clone)]
pub struct StorePaths {
    pub account: PathBuf,
    pub player: PathBuf,
    pub app: PathBuf,
    pub admin: PathBuf,
}

/// The store router. Owns the four database handles for process lifetime
/// and hands out repositories bound to their owning store. There is no
/// cross-store transaction machinery; each entity lives entirely within
/// one store.
pub struct Stores {
    account: Database,
    player: Database,
    app: Database,
    admin: Database,
}

impl Stores {
    /// Opens and migrates every store. Any failure here is a
    /// `Configuration` error and must abort startup.
    pub fn open(paths: &StorePaths) -> Result<Self> {
        Ok(Self {
            account: Database::open(&paths.account, migrations::account_store)?,
            player: Database::open(&paths.player, migrations::player_store)?,
            app: Database::open(&paths.app, migrations::app_store)?,
            admin: Database::open(&paths.admin, migrations::admin_store)?,
        })
    }

    /// Fully in-memory stores, used by tests.
    pub fn open_in_memory() -> Result<Self> {
        let mem = || Connection::open_in_memory().map_err(Error::storage);
        Ok(Self {
            account: Database::from_conn(mem()?, migrations::account_store)?,
            player: Database::from_conn(mem()?, migrations::player_store)?,
            app: Database::from_conn(mem()?, migrations::app_store)?,
            admin: Database::from_conn(mem()?, migrations::admin_store)?,
        })
    }

    pub fn store_for(&self, store: Store) -> &Database {
        match store {
            Store::Account => &self.account,
            Store::Player => &self.player,
            Store::App => &self.app,
            Store::Admin => &self.admin,
        }
    }

    pub fn accounts(&self) -> AccountRepo<'_> {
        AccountRepo::new(self.store_for(Store::Account))
    }

    pub fn players(&self) -> PlayerRepo<'_> {
        PlayerRepo::new(self.store_for(Store::Player))
    }

    pub fn guilds(&self) -> GuildRepo<'_> {
        GuildRepo::new(self.store_for(Store::Player))
    }

    pub fn downloads(&self) -> DownloadRepo<'_> {
        DownloadRepo::new(self.store_for(Store::App))
    }

    pub fn sites(&self) -> SiteRepo<'_> {
        SiteRepo::new(self.store_for(Store::App))
    }

    pub fn images(&self) -> ImageRepo<'_> {
        ImageRepo::new(self.store_for(Store::App))
    }

    pub fn pages(&self) -> PageRepo<'_> {
        PageRepo::new(self.store_for(Store::App))
    }

    pub fn grants(&self) -> GrantRepo<'_> {
        GrantRepo::new(self.store_for(Store::Admin))
    }
}


/// Extension trait for optional query results.
pub(crate) trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Error::storage(e)),
        }
    }
}

/// Maps a constraint failure to a `Validation` error with the given
/// message; everything else stays a storage error.
pub(crate) fn constraint_to_validation(e: rusqlite::Error, msg: &str) -> Error {
    match &e {
        rusqlite::Error::SqliteFailure(f, _)
            if f.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            Error::validation(msg)
        }
        _ => Error::storage(e),
    }
}
