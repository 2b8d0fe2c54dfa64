//! Text sources for the knowledge base.

use std::path::{Path, PathBuf};

use anyhow::Context;

/// Abstract source of corpus text segments. Implementations may load from
/// plain files, extracted PDFs, databases, etc.
pub trait TextSource: Send + Sync {
    fn exists(&self) -> bool;

    /// Loads all text segments from the source.
    fn load(&self) -> anyhow::Result<Vec<String>>;
}

/// Plain text file source. Each blank-line separated block becomes one
/// segment.
pub struct FileTextSource {
    path: PathBuf,
}

impl FileTextSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TextSource for FileTextSource {
    fn exists(&self) -> bool {
        self.path.is_file()
    }

    fn load(&self) -> anyhow::Result<Vec<String>> {
        let raw = std::fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read source file {}", self.path.display()))?;
        let segments = raw
            .split("\n\n")
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        Ok(segments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_file_source_splits_on_blank_lines() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "first paragraph\nstill first\n\nsecond paragraph\n\n\n").unwrap();

        let source = FileTextSource::new(file.path());
        assert!(source.exists());
        let segments = source.load().unwrap();
        assert_eq!(segments, vec!["first paragraph\nstill first", "second paragraph"]);
    }

    #[test]
    fn test_missing_file_does_not_exist() {
        let source = FileTextSource::new("/definitely/not/here.txt");
        assert!(!source.exists());
        assert!(source.load().is_err());
    }
}
