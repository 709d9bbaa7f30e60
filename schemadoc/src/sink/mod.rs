// Document sinks: where finished documents end up

use crate::error::{Result, SchemaDocError};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Receives finished documents.
pub trait Sink {
    /// Write `contents` to `path`, relative to the publish directory,
    /// replacing any existing document there.
    fn write(&mut self, path: &str, contents: &[u8]) -> Result<()>;
}

/// Writes documents below a publish directory on disk.
#[derive(Debug, Clone)]
pub struct FsSink {
    dir: PathBuf,
}

impl FsSink {
    /// Check the document root and prepare the publish directory below it.
    ///
    /// A missing root is only created when `create_root` is set; the
    /// publish directory itself is always created on demand.
    pub fn open(root: &Path, publish_path: &str, create_root: bool) -> Result<Self> {
        if !root.exists() {
            if !create_root {
                return Err(SchemaDocError::RootNotFound {
                    path: root.display().to_string(),
                });
            }
            log::info!("Creating document root {}", root.display());
            create_dir(root)?;
        } else if !root.is_dir() {
            return Err(SchemaDocError::NotADirectory {
                path: root.display().to_string(),
            });
        }

        let publish_path = publish_path.trim_matches('/');
        let dir = if publish_path.is_empty() {
            root.to_path_buf()
        } else {
            root.join(publish_path)
        };
        ensure_dir(&dir)?;

        Ok(FsSink { dir })
    }

    /// The publish directory every document path is relative to.
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl Sink for FsSink {
    fn write(&mut self, path: &str, contents: &[u8]) -> Result<()> {
        let target = self.dir.join(path);
        let parent = target.parent().unwrap_or(self.dir.as_path()).to_path_buf();
        ensure_dir(&parent)?;

        let write_err = |source: std::io::Error| SchemaDocError::Write {
            path: target.display().to_string(),
            source,
        };

        // Written next to the target and renamed over it, so a reader never
        // sees a half-written document.
        let mut tmp = tempfile::NamedTempFile::new_in(&parent).map_err(write_err)?;
        tmp.write_all(contents).map_err(write_err)?;
        tmp.persist(&target).map_err(|e| write_err(e.error))?;

        log::debug!("Wrote {}", target.display());
        Ok(())
    }
}

/// Create `dir` and its parents if missing; fail if it is something else.
fn ensure_dir(dir: &Path) -> Result<()> {
    if dir.is_dir() {
        return Ok(());
    }
    if dir.exists() {
        return Err(SchemaDocError::NotADirectory {
            path: dir.display().to_string(),
        });
    }
    create_dir(dir)
}

fn create_dir(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir).map_err(|source| SchemaDocError::CreateDir {
        path: dir.display().to_string(),
        source,
    })
}

/// Keeps documents in memory, ordered by path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemorySink {
    documents: BTreeMap<String, Vec<u8>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &str) -> Option<&[u8]> {
        self.documents.get(path).map(Vec::as_slice)
    }

    /// Contents of `path` as text, if present and valid UTF-8.
    pub fn get_str(&self, path: &str) -> Option<&str> {
        self.get(path).and_then(|b| std::str::from_utf8(b).ok())
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.documents.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

impl Sink for MemorySink {
    fn write(&mut self, path: &str, contents: &[u8]) -> Result<()> {
        self.documents.insert(path.to_string(), contents.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_root_is_reported() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("missing");

        let err = FsSink::open(&root, "", false).unwrap_err();
        assert!(matches!(err, SchemaDocError::RootNotFound { .. }));
        assert!(!root.exists());
    }

    #[test]
    fn test_missing_root_created_on_request() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("docs");

        let sink = FsSink::open(&root, "wiki/db/", true).unwrap();
        assert!(root.join("wiki/db").is_dir());
        assert_eq!(sink.dir(), root.join("wiki/db").as_path());
    }

    #[test]
    fn test_root_that_is_a_file() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("file.txt");
        std::fs::write(&root, "x").unwrap();

        let err = FsSink::open(&root, "", true).unwrap_err();
        assert!(matches!(err, SchemaDocError::NotADirectory { .. }));
    }

    #[test]
    fn test_kind_dir_that_is_a_file() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("Tables"), "x").unwrap();

        let mut sink = FsSink::open(tmp.path(), "", false).unwrap();
        let err = sink.write("Tables/Table_users.md", b"# Table").unwrap_err();
        assert!(matches!(err, SchemaDocError::NotADirectory { .. }));
    }

    #[test]
    fn test_write_creates_dirs_and_overwrites() {
        let tmp = TempDir::new().unwrap();
        let mut sink = FsSink::open(tmp.path(), "", false).unwrap();

        sink.write("Tables/Table_users.md", b"first").unwrap();
        sink.write("Tables/Table_users.md", b"second").unwrap();
        sink.write("index.md", b"# Overview").unwrap();

        let table = std::fs::read_to_string(tmp.path().join("Tables/Table_users.md")).unwrap();
        assert_eq!(table, "second");
        assert!(tmp.path().join("index.md").is_file());

        // No temp files left behind
        let entries = std::fs::read_dir(tmp.path().join("Tables")).unwrap().count();
        assert_eq!(entries, 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_unwritable_root_fails_creating_dirs() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = TempDir::new().unwrap();
        let locked = tmp.path().join("locked");
        std::fs::create_dir(&locked).unwrap();
        std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o500)).unwrap();

        // Root ignores permissions; nothing to check then
        let canary = locked.join("canary");
        if std::fs::create_dir(&canary).is_ok() {
            return;
        }

        let err = FsSink::open(&locked, "wiki", false).unwrap_err();
        assert!(matches!(err, SchemaDocError::CreateDir { .. }));

        std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o700)).unwrap();
    }

    #[test]
    fn test_memory_sink() {
        let mut sink = MemorySink::new();
        assert!(sink.is_empty());

        sink.write("b.md", b"B").unwrap();
        sink.write("a.md", b"A").unwrap();
        sink.write("a.md", b"A2").unwrap();

        assert_eq!(sink.len(), 2);
        assert_eq!(sink.get_str("a.md"), Some("A2"));
        assert_eq!(sink.paths().collect::<Vec<_>>(), vec!["a.md", "b.md"]);
        assert_eq!(sink.get("c.md"), None);
    }
}
