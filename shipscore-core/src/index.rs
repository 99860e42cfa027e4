//! One-pass filesystem index over a scan workspace.
//!
//! Built once per scan; every scoring rule queries this view instead of
//! re-walking the tree. Content search is capped and short-circuiting, which
//! bounds worst-case cost at the price of potentially missing a signal in a
//! very large tree. Findings are heuristic advisories, so that trade is
//! acceptable.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;

use crate::error::Result;
use crate::fs::FileSystem;

/// One indexed file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileIndexEntry {
    /// Path relative to the workspace root, forward-slash separated.
    pub relative_path: String,
    /// Lowercased extension without the dot; empty when none.
    pub extension: String,
    /// Final path component.
    pub base_name: String,
    /// Number of directories between the root and the file.
    pub depth: usize,
}

/// Declared dependencies and scripts from the package manifest.
///
/// Absent or malformed manifests deserialize to the empty value: a broken
/// `package.json` must never fail the scan.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PackageManifest {
    /// Direct dependencies, name to version requirement.
    #[serde(default)]
    pub dependencies: BTreeMap<String, String>,
    /// Development dependencies.
    #[serde(default, rename = "devDependencies")]
    pub dev_dependencies: BTreeMap<String, String>,
    /// Script names to commands.
    #[serde(default)]
    pub scripts: BTreeMap<String, String>,
}

impl PackageManifest {
    /// Whether `name` is declared as a direct or dev dependency.
    pub fn has_dependency(&self, name: &str) -> bool {
        self.dependencies.contains_key(name) || self.dev_dependencies.contains_key(name)
    }

    /// First of `names` that is declared, in the order given.
    pub fn any_dependency<'a>(&self, names: &'a [&'a str]) -> Option<&'a str> {
        names.iter().copied().find(|name| self.has_dependency(name))
    }

    /// Whether a script with this name is declared.
    pub fn has_script(&self, name: &str) -> bool {
        self.scripts.contains_key(name)
    }

    /// True when nothing at all was declared.
    pub fn is_empty(&self) -> bool {
        self.dependencies.is_empty() && self.dev_dependencies.is_empty() && self.scripts.is_empty()
    }
}

/// Queryable view of one workspace, built by a single recursive descent.
pub struct FileIndex {
    root: PathBuf,
    fs: Arc<dyn FileSystem>,
    entries: Vec<FileIndexEntry>,
    paths: BTreeSet<String>,
    manifest: PackageManifest,
}

impl FileIndex {
    /// Walk `root` once and build the index, parsing the package manifest
    /// along the way.
    pub fn build(fs: Arc<dyn FileSystem>, root: &Path) -> Result<Self> {
        let files = fs.list_files(root)?;
        let mut entries = Vec::with_capacity(files.len());
        let mut paths = BTreeSet::new();

        for path in files {
            let relative = path.strip_prefix(root).unwrap_or(&path);
            let relative_path = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            let extension = path
                .extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| ext.to_lowercase())
                .unwrap_or_default();
            let base_name = path
                .file_name()
                .and_then(|name| name.to_str())
                .unwrap_or_default()
                .to_string();
            let depth = relative.components().count().saturating_sub(1);

            paths.insert(relative_path.clone());
            entries.push(FileIndexEntry {
                relative_path,
                extension,
                base_name,
                depth,
            });
        }

        let mut index = Self {
            root: root.to_path_buf(),
            fs,
            entries,
            paths,
            manifest: PackageManifest::default(),
        };
        let manifest = index.parse_manifest();
        index.manifest = manifest;
        Ok(index)
    }

    fn parse_manifest(&self) -> PackageManifest {
        let Some(contents) = self.read_to_string("package.json") else {
            return PackageManifest::default();
        };
        match serde_json::from_str(&contents) {
            Ok(manifest) => manifest,
            Err(err) => {
                log::warn!("malformed package.json, treating as empty: {err}");
                PackageManifest::default()
            }
        }
    }

    /// Whether a file exists at this exact relative path.
    pub fn exists(&self, relative: &str) -> bool {
        self.paths.contains(relative)
    }

    /// Relative paths of files whose extension is one of `extensions` and,
    /// when a name filter is given, whose base name contains any of the
    /// substrings (case-sensitive). Order follows the walk.
    pub fn find_by_extension_and_name(
        &self,
        extensions: &[&str],
        names: Option<&[&str]>,
    ) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|entry| extensions.contains(&entry.extension.as_str()))
            .filter(|entry| match names {
                Some(names) => names.iter().any(|name| entry.base_name.contains(name)),
                None => true,
            })
            .map(|entry| entry.relative_path.as_str())
            .collect()
    }

    /// Case-insensitive substring search across at most `cap` candidate
    /// files with one of the given extensions, stopping at the first hit.
    pub fn content_contains(&self, term: &str, extensions: &[&str], cap: usize) -> bool {
        let needle = term.to_lowercase();
        self.entries
            .iter()
            .filter(|entry| extensions.contains(&entry.extension.as_str()))
            .take(cap)
            .any(|entry| {
                self.read_to_string(&entry.relative_path)
                    .map(|contents| contents.to_lowercase().contains(&needle))
                    .unwrap_or(false)
            })
    }

    /// Read an indexed file, or `None` when it is absent or unreadable
    /// (binary content included).
    pub fn read_to_string(&self, relative: &str) -> Option<String> {
        if !self.exists(relative) {
            return None;
        }
        self.fs.read_to_string(&self.root.join(relative)).ok()
    }

    /// The parsed package manifest; empty when absent or malformed.
    pub fn manifest(&self) -> &PackageManifest {
        &self.manifest
    }

    /// All indexed entries, in walk order.
    pub fn entries(&self) -> &[FileIndexEntry] {
        &self.entries
    }

    /// Number of indexed files.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the workspace held no indexable files.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{FileIndex, PackageManifest};
    use crate::fs::StdFileSystem;
    use std::path::PathBuf;
    use std::sync::Arc;

    fn build_index(root: &PathBuf) -> FileIndex {
        FileIndex::build(Arc::new(StdFileSystem::new()), root).expect("build index")
    }

    #[test]
    fn indexes_relative_paths_extensions_and_depth() {
        let root = temp_dir();
        std::fs::create_dir_all(root.join("src/routes")).expect("dirs");
        std::fs::write(root.join("index.html"), "<html></html>").expect("html");
        std::fs::write(root.join("src/routes/user.TS"), "export {}").expect("ts");

        let index = build_index(&root);

        assert!(index.exists("index.html"));
        assert!(index.exists("src/routes/user.TS"));
        assert!(!index.exists("missing.js"));

        let entry = index
            .entries()
            .iter()
            .find(|entry| entry.base_name == "user.TS")
            .expect("entry");
        assert_eq!(entry.extension, "ts");
        assert_eq!(entry.depth, 2);

        std::fs::remove_dir_all(&root).expect("cleanup");
    }

    #[test]
    fn find_by_extension_filters_on_base_name_substrings() {
        let root = temp_dir();
        std::fs::write(root.join("server.js"), "x").expect("server");
        std::fs::write(root.join("app.js"), "x").expect("app");
        std::fs::write(root.join("app.css"), "x").expect("css");

        let index = build_index(&root);

        let hits = index.find_by_extension_and_name(&["js"], Some(&["server"]));
        assert_eq!(hits, vec!["server.js"]);

        let all_js = index.find_by_extension_and_name(&["js"], None);
        assert_eq!(all_js.len(), 2);

        // Case-sensitive on the base name.
        let miss = index.find_by_extension_and_name(&["js"], Some(&["Server"]));
        assert!(miss.is_empty());

        std::fs::remove_dir_all(&root).expect("cleanup");
    }

    #[test]
    fn content_contains_is_case_insensitive_and_capped() {
        let root = temp_dir();
        std::fs::write(root.join("a.js"), "nothing here").expect("a");
        std::fs::write(root.join("b.js"), "app.LISTEN(3000)").expect("b");

        let index = build_index(&root);

        assert!(index.content_contains("listen(", &["js"], 50));
        assert!(!index.content_contains("listen(", &["js"], 1));
        assert!(!index.content_contains("listen(", &["css"], 50));

        std::fs::remove_dir_all(&root).expect("cleanup");
    }

    #[test]
    fn malformed_manifest_degrades_to_empty() {
        let root = temp_dir();
        std::fs::write(root.join("package.json"), "{ not json").expect("manifest");

        let index = build_index(&root);

        assert!(index.manifest().is_empty());

        std::fs::remove_dir_all(&root).expect("cleanup");
    }

    #[test]
    fn manifest_exposes_dependencies_and_scripts() {
        let root = temp_dir();
        std::fs::write(
            root.join("package.json"),
            r#"{
                "dependencies": {"react": "^18.0.0"},
                "devDependencies": {"vite": "^5.0.0"},
                "scripts": {"build": "vite build"}
            }"#,
        )
        .expect("manifest");

        let index = build_index(&root);
        let manifest = index.manifest();

        assert!(manifest.has_dependency("react"));
        assert!(manifest.has_dependency("vite"));
        assert!(!manifest.has_dependency("vue"));
        assert_eq!(manifest.any_dependency(&["vue", "react"]), Some("react"));
        assert!(manifest.has_script("build"));

        std::fs::remove_dir_all(&root).expect("cleanup");
    }

    #[test]
    fn missing_manifest_is_empty_not_an_error() {
        let manifest = PackageManifest::default();
        assert!(manifest.is_empty());
        assert_eq!(manifest.any_dependency(&["react"]), None);
    }

    #[test]
    fn build_goes_through_the_filesystem_abstraction() {
        use crate::fs::MockFileSystem;
        use std::path::Path;

        let mut fs = MockFileSystem::new();
        fs.expect_list_files().returning(|root| {
            Ok(vec![root.join("src/main.rs"), root.join("README.md")])
        });

        let index = FileIndex::build(Arc::new(fs), Path::new("/repo")).expect("index");

        assert!(index.exists("src/main.rs"));
        assert!(index.exists("README.md"));
        assert_eq!(index.len(), 2);
        let entry = index
            .entries()
            .iter()
            .find(|entry| entry.base_name == "main.rs")
            .expect("entry");
        assert_eq!(entry.depth, 1);
        assert_eq!(entry.extension, "rs");
    }

    fn temp_dir() -> PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("system time")
            .as_nanos();
        let root = std::env::temp_dir().join(format!("shipscore_index_test_{nanos}"));
        std::fs::create_dir_all(&root).expect("create temp dir");
        root
    }
}
