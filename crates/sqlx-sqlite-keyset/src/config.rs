//! Configuration for SQLite database connection pools

use std::time::Duration;

/// Configuration for [`crate::SqliteDatabase`] connection pools
///
/// # Examples
///
/// ```
/// use sqlx_sqlite_keyset::SqliteDatabaseConfig;
/// use std::time::Duration;
///
/// let config = SqliteDatabaseConfig {
///    max_read_connections: 2,
///    ..Default::default()
/// };
/// assert_eq!(config.idle_timeout, Duration::from_secs(30));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqliteDatabaseConfig {
   /// Maximum number of concurrent read connections, used by page fetches
   ///
   /// Default: 6
   pub max_read_connections: u32,

   /// Idle timeout for both read and write connections
   ///
   /// Default: 30 seconds
   pub idle_timeout: Duration,
}

impl Default for SqliteDatabaseConfig {
   fn default() -> Self {
      Self {
         max_read_connections: 6,
         idle_timeout: Duration::from_secs(30),
      }
   }
}
