//! CSV loaders for the monitored user and group lists.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::info;

// The CSV files carry descriptive columns (username, names, title) for the
// humans maintaining them; only the id column is consumed. Extra columns
// are ignored by header-based deserialization.

#[derive(Debug, Deserialize)]
pub struct MonitoredUser {
    pub id: i64,
}

#[derive(Debug, Deserialize)]
pub struct MonitoredGroup {
    pub id: i64,
}

/// Loads the monitored-users CSV. A missing file means no allow-list.
pub fn load_monitored_users(path: &str) -> Result<Option<HashSet<i64>>> {
    if !Path::new(path).exists() {
        info!(path, "no monitored users file, answering everyone");
        return Ok(None);
    }

    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open monitored users file {path}"))?;
    let mut ids = HashSet::new();
    for record in reader.deserialize() {
        let user: MonitoredUser =
            record.with_context(|| format!("bad record in {path}"))?;
        ids.insert(user.id);
    }
    info!(path, count = ids.len(), "loaded monitored users");
    Ok(Some(ids))
}

/// Loads the monitored-groups CSV. A missing file means every group is
/// screened.
pub fn load_monitored_groups(path: &str) -> Result<Option<HashSet<i64>>> {
    if !Path::new(path).exists() {
        info!(path, "no monitored groups file, screening all groups");
        return Ok(None);
    }

    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open monitored groups file {path}"))?;
    let mut ids = HashSet::new();
    for record in reader.deserialize() {
        let group: MonitoredGroup =
            record.with_context(|| format!("bad record in {path}"))?;
        // The eligibility check compares on absolute ids.
        ids.insert(group.id.abs());
    }
    info!(path, count = ids.len(), "loaded monitored groups");
    Ok(Some(ids))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_users() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "id,username,first_name,last_name,phone").unwrap();
        writeln!(file, "101,alice,Alice,Smith,+1000").unwrap();
        writeln!(file, "102,bob,,,").unwrap();

        let ids = load_monitored_users(file.path().to_str().unwrap())
            .unwrap()
            .unwrap();
        assert_eq!(ids, [101, 102].into_iter().collect());
    }

    #[test]
    fn test_load_groups_absolute_ids() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "id,username,title").unwrap();
        writeln!(file, "-4321,,Test Group").unwrap();
        writeln!(file, "998,,Another").unwrap();

        let ids = load_monitored_groups(file.path().to_str().unwrap())
            .unwrap()
            .unwrap();
        assert_eq!(ids, [4321, 998].into_iter().collect());
    }

    #[test]
    fn test_missing_file_is_unrestricted() {
        assert!(load_monitored_users("/nonexistent/users.csv").unwrap().is_none());
        assert!(load_monitored_groups("/nonexistent/groups.csv").unwrap().is_none());
    }

    #[test]
    fn test_malformed_record_is_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "id,username,title").unwrap();
        writeln!(file, "not-a-number,,oops").unwrap();

        assert!(load_monitored_groups(file.path().to_str().unwrap()).is_err());
    }
}
