//! Account discovery and per-account credential loading.
//!
//! Each account is one `.env`-style file in the accounts folder with
//! `API_ID`, `API_HASH`, `PHONE_NUMBER` and `DB_ENC_KEY`. Missing keys are
//! startup errors, not degraded accounts.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

use tgwarden_tdlib::TdConfig;

/// Monotone counter handing out `account{N}` names for accounts whose file
/// does not carry one. Threaded through call sites explicitly.
#[derive(Debug, Default)]
pub struct NameSequence {
    next: usize,
}

impl NameSequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_name(&mut self) -> String {
        let name = format!("account{}", self.next);
        self.next += 1;
        name
    }
}

/// Lists account credential files in the folder, sorted by file name so
/// assigned names are stable across runs.
pub fn account_files(folder: &str) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(folder)
        .with_context(|| format!("failed to read accounts folder {folder}"))?;

    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && path.extension().map(|e| e == "env").unwrap_or(false))
        .collect();
    files.sort();
    Ok(files)
}

/// Loads one account file into a client config.
pub fn load_account(
    path: &Path,
    names: &mut NameSequence,
    library_path: &str,
) -> Result<TdConfig> {
    let mut api_id = None;
    let mut api_hash = None;
    let mut phone = None;
    let mut db_enc_key = None;
    let mut name = None;

    for item in dotenvy::from_path_iter(path)
        .with_context(|| format!("failed to read account file {}", path.display()))?
    {
        let (key, value) = item?;
        match key.as_str() {
            "API_ID" => api_id = Some(value),
            "API_HASH" => api_hash = Some(value),
            "PHONE_NUMBER" => phone = Some(value),
            "DB_ENC_KEY" => db_enc_key = Some(value),
            "ACCOUNT_NAME" => name = Some(value),
            _ => {}
        }
    }

    let missing = |key: &str| anyhow::anyhow!("{}: {key} not set", path.display());
    let api_id: i32 = api_id
        .ok_or_else(|| missing("API_ID"))?
        .parse()
        .with_context(|| format!("{}: API_ID must be a number", path.display()))?;
    let api_hash = api_hash.ok_or_else(|| missing("API_HASH"))?;
    let phone = phone.ok_or_else(|| missing("PHONE_NUMBER"))?;
    let db_enc_key = db_enc_key.ok_or_else(|| missing("DB_ENC_KEY"))?;
    let name = name.unwrap_or_else(|| names.next_name());

    info!(account = %name, file = %path.display(), "loaded account");

    Ok(TdConfig {
        files_directory: format!("accounts_data/{name}"),
        name,
        api_id,
        api_hash,
        phone,
        db_enc_key,
        library_path: library_path.to_string(),
    })
}
