//! Store configuration parsed from environment variables.

pub const DEFAULT_DATABASE_URL: &str = "sqlite://svg-manager.db";
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_IMPORT_MAX_BYTES: usize = 1_000_000;

/// Connection and import limits for an [`SvgStore`](crate::services::store::SvgStore).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// SQLite URL. `sqlite::memory:` gives a throwaway store.
    pub database_url: String,
    /// Pool size for file-backed stores. In-memory stores always use one connection.
    pub max_connections: u32,
    /// Largest backup text accepted by the import pre-check.
    pub max_import_bytes: usize,
}

impl StoreConfig {
    /// Build config from environment variables.
    ///
    /// Optional:
    /// - `SVG_MANAGER_DATABASE_URL`: default `sqlite://svg-manager.db`
    /// - `DB_MAX_CONNECTIONS`: default 5
    /// - `IMPORT_MAX_BYTES`: default 1000000
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            database_url: std::env::var("SVG_MANAGER_DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
            max_connections: env_parse("DB_MAX_CONNECTIONS", DEFAULT_DB_MAX_CONNECTIONS),
            max_import_bytes: env_parse("IMPORT_MAX_BYTES", DEFAULT_IMPORT_MAX_BYTES),
        }
    }

    /// Config for a private in-memory store.
    #[must_use]
    pub fn in_memory() -> Self {
        Self { database_url: "sqlite::memory:".to_string(), ..Self::default() }
    }

    #[must_use]
    pub fn is_in_memory(&self) -> bool {
        self.database_url.contains(":memory:") || self.database_url.contains("mode=memory")
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            max_connections: DEFAULT_DB_MAX_CONNECTIONS,
            max_import_bytes: DEFAULT_IMPORT_MAX_BYTES,
        }
    }
}

pub(crate) fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
