//! Per-account TDLib client configuration.

/// Credentials and storage paths for one Telegram account.
#[derive(Debug, Clone)]
pub struct TdConfig {
    /// Client name for logs and the manager registry.
    pub name: String,
    pub api_id: i32,
    pub api_hash: String,
    pub phone: String,
    /// Local database encryption key.
    pub db_enc_key: String,
    /// Directory for TDLib databases and downloaded files.
    pub files_directory: String,
    /// Path to the `tdjson` shared library.
    pub library_path: String,
}
