//! SQLite database with a read pool and a single serialized writer

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use sqlx::pool::PoolConnection;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use tracing::debug;

use crate::config::SqliteDatabaseConfig;
use crate::error::{Error, Result};

/// SQLite database with connection pooling for concurrent reads and exclusive writes.
///
/// ## Architecture
///
/// - **`read_pool`**: read-only connections; page fetches run here
/// - **`write_conn`**: single-connection pool (max_connections=1), so writes are serialized
///
/// WAL journal mode is enabled on the first [`acquire_writer`](Self::acquire_writer)
/// call so readers are not blocked by the writer.
#[derive(Debug)]
pub struct SqliteDatabase {
   read_pool: Pool<Sqlite>,

   write_conn: Pool<Sqlite>,

   /// Set once `PRAGMA journal_mode = WAL` has run on the writer
   wal_initialized: AtomicBool,

   closed: AtomicBool,

   /// Database file path, used by [`remove`](Self::remove)
   path: PathBuf,
}

impl SqliteDatabase {
   /// Open (creating if missing) the database at `path`.
   pub async fn connect(
      path: impl AsRef<Path>,
      config: Option<SqliteDatabaseConfig>,
   ) -> Result<Arc<Self>> {
      let config = config.unwrap_or_default();
      let path = path.as_ref().to_path_buf();

      if let Some(parent) = path.parent()
         && !parent.as_os_str().is_empty()
      {
         tokio::fs::create_dir_all(parent).await?;
      }

      // The writer connects eagerly so the file exists before any reader opens it
      let write_conn = SqlitePoolOptions::new()
         .max_connections(1)
         .idle_timeout(config.idle_timeout)
         .connect_with(
            SqliteConnectOptions::new()
               .filename(&path)
               .create_if_missing(true),
         )
         .await?;

      let read_pool = SqlitePoolOptions::new()
         .max_connections(config.max_read_connections)
         .idle_timeout(config.idle_timeout)
         .connect_lazy_with(SqliteConnectOptions::new().filename(&path).read_only(true));

      debug!(path = %path.display(), "Opened SQLite database");

      Ok(Arc::new(Self {
         read_pool,
         write_conn,
         wal_initialized: AtomicBool::new(false),
         closed: AtomicBool::new(false),
         path,
      }))
   }

   pub fn path(&self) -> &Path {
      &self.path
   }

   pub fn is_closed(&self) -> bool {
      self.closed.load(Ordering::Acquire)
   }

   /// Pool of read-only connections.
   pub fn read_pool(&self) -> Result<&Pool<Sqlite>> {
      if self.is_closed() {
         return Err(Error::DatabaseClosed);
      }
      Ok(&self.read_pool)
   }

   /// Acquire the single writer connection, enabling WAL mode on first use.
   ///
   /// Other writers wait until the returned connection is dropped.
   pub async fn acquire_writer(&self) -> Result<PoolConnection<Sqlite>> {
      if self.is_closed() {
         return Err(Error::DatabaseClosed);
      }

      let mut conn = self.write_conn.acquire().await?;

      if !self.wal_initialized.load(Ordering::Acquire) {
         sqlx::query("PRAGMA journal_mode = WAL")
            .execute(&mut *conn)
            .await?;
         self.wal_initialized.store(true, Ordering::Release);
         debug!(path = %self.path.display(), "Enabled WAL journal mode");
      }

      Ok(conn)
   }

   /// Close both pools. Closing twice is a no-op.
   pub async fn close(&self) -> Result<()> {
      if self.closed.swap(true, Ordering::AcqRel) {
         return Ok(());
      }

      self.read_pool.close().await;
      self.write_conn.close().await;

      debug!(path = %self.path.display(), "Closed SQLite database");
      Ok(())
   }

   /// Close the database and delete its file along with WAL and shared-memory files.
   pub async fn remove(&self) -> Result<()> {
      self.close().await?;

      for suffix in ["", "-wal", "-shm"] {
         let mut file = self.path.clone().into_os_string();
         file.push(suffix);

         match tokio::fs::remove_file(&file).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
         }
      }

      debug!(path = %self.path.display(), "Removed SQLite database");
      Ok(())
   }
}
