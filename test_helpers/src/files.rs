//! A temporary directory with UTF-8 paths for filesystem-touching tests.

use anyhow::{Context, Result, anyhow};
use camino::{Utf8Path, Utf8PathBuf};
use serde_json::Value;
use tempfile::TempDir;

/// Temporary directory removed on drop.
///
/// ```
/// use prefixdb_test_helpers::files::Workspace;
/// use serde_json::json;
///
/// let workspace = Workspace::new()?;
/// let path = workspace.write_json("input.json", &json!({"dataset": []}))?;
/// assert!(path.as_std_path().is_file());
/// # Ok::<_, anyhow::Error>(())
/// ```
#[derive(Debug)]
pub struct Workspace {
    _dir: TempDir,
    root: Utf8PathBuf,
}

impl Workspace {
    /// Create an empty workspace.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or its path is not
    /// valid UTF-8.
    pub fn new() -> Result<Self> {
        let dir = tempfile::tempdir().context("create temporary directory")?;
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf())
            .map_err(|path| anyhow!("temporary path is not UTF-8: {}", path.display()))?;
        Ok(Self { _dir: dir, root })
    }

    /// Root of the workspace.
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Path of `name` inside the workspace; the file need not exist.
    #[must_use]
    pub fn path(&self, name: &str) -> Utf8PathBuf {
        self.root.join(name)
    }

    /// Write `contents` to `name`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn write(&self, name: &str, contents: &str) -> Result<Utf8PathBuf> {
        let path = self.path(name);
        std::fs::write(&path, contents).with_context(|| format!("write {path}"))?;
        Ok(path)
    }

    /// Write `value` as pretty JSON to `name`.
    ///
    /// # Errors
    ///
    /// Returns an error if serialisation or the write fails.
    pub fn write_json(&self, name: &str, value: &Value) -> Result<Utf8PathBuf> {
        let text = serde_json::to_string_pretty(value).context("serialise JSON fixture")?;
        self.write(name, &text)
    }

    /// Read `name` back as a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    pub fn read(&self, name: &str) -> Result<String> {
        let path = self.path(name);
        std::fs::read_to_string(&path).with_context(|| format!("read {path}"))
    }

    /// Read `name` back as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn read_json(&self, name: &str) -> Result<Value> {
        let text = self.read(name)?;
        serde_json::from_str(&text).with_context(|| format!("parse {name} as JSON"))
    }
}
