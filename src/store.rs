use diesel::connection::SimpleConnection;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool};
use diesel::sqlite::SqliteConnection;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

use crate::error::Result;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Handle to the SQLite store, cloned into every request. All statement
/// execution goes through [`Store::with_conn`], which runs on the blocking
/// thread pool since the diesel SQLite backend is synchronous.
#[derive(Clone)]
pub struct Store {
    pool: Pool<ConnectionManager<SqliteConnection>>,
}

/// WAL keeps readers off the writer's back; the busy timeout makes
/// contending write transactions queue instead of failing with SQLITE_BUSY.
/// Foreign keys must be switched off explicitly (diesel enables them at
/// establish): deleting an item strands its logs rather than failing.
#[derive(Debug)]
struct ConnectionPragmas;

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for ConnectionPragmas {
    fn on_acquire(
        &self,
        conn: &mut SqliteConnection,
    ) -> std::result::Result<(), diesel::r2d2::Error> {
        conn.batch_execute(
            "PRAGMA journal_mode = WAL; PRAGMA busy_timeout = 5000; PRAGMA foreign_keys = OFF;",
        )
        .map_err(diesel::r2d2::Error::QueryError)
    }
}

impl Store {
    /// Opens the database file, creating it on first start, and applies any
    /// pending embedded migrations. Later starts find the schema already
    /// recorded and reuse the file unmodified.
    pub fn open(database_path: &str) -> anyhow::Result<Self> {
        let manager = ConnectionManager::<SqliteConnection>::new(database_path);
        let pool = Pool::builder()
            .connection_customizer(Box::new(ConnectionPragmas))
            .build(manager)?;

        let mut conn = pool.get()?;
        conn.run_pending_migrations(MIGRATIONS)
            .map_err(|e| anyhow::anyhow!("migration error: {}", e))?;

        Ok(Self { pool })
    }

    /// Checks a connection out of the pool and runs `f` on the blocking
    /// thread pool. Pool and driver failures surface as `Error::Storage`.
    pub async fn with_conn<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut SqliteConnection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = pool.get()?;
            f(&mut conn)
        })
        .await?
    }
}


#[cfg(test)]
pub(crate) mod testing {
    use tempfile::TempDir;

    use super::Store;

    /// A store backed by a fresh database file in a temp directory. The
    /// directory must be kept alive for the duration of the test.
    pub fn open_temp() -> (Store, TempDir) {
        let dir = TempDir::new().expect("create temp dir");
        let path = dir.path().join("stockroom.db");
        let store = Store::open(path.to_str().expect("utf-8 path")).expect("open store");
        (store, dir)
    }
}
