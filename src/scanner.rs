use crate::error::Error;
use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use log::{debug, warn};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// File scanner for traversing source directories.
///
/// The `FileScanner` recursively walks through a source directory to find the Rust files to
/// enrich. It automatically skips the `target` directory and hidden directories (those
/// starting with `.`). Include patterns select files, exclude patterns remove files and
/// whole directories.
///
/// Patterns are glob patterns matched against the path relative to the root and against the
/// full path; `*` also matches `/`.
///
/// # Example
///
/// ```no_run
/// use schema_enricher::scanner::FileScanner;
/// use std::path::PathBuf;
///
/// let scanner = FileScanner::new(PathBuf::from("./src"))
///     .with_excludes(&["**/generated/**".to_string()])
///     .unwrap();
/// let result = scanner.scan().unwrap();
/// println!("Found {} Rust files", result.rust_files.len());
/// ```
pub struct FileScanner {
    root_path: PathBuf,
    includes: Option<GlobSet>,
    excludes: Option<GlobSet>,
}

/// Result of directory scanning operation.
///
/// Contains the list of discovered Rust files and any warnings encountered during scanning.
pub struct ScanResult {
    /// List of paths to all selected `.rs` files
    pub rust_files: Vec<PathBuf>,
    /// Warning messages for any issues encountered (e.g., inaccessible directories)
    pub warnings: Vec<String>,
}

impl FileScanner {
    /// Creates a new `FileScanner` for the specified root directory.
    ///
    /// # Arguments
    ///
    /// * `root_path` - The root directory to scan for Rust files
    pub fn new(root_path: PathBuf) -> Self {
        Self {
            root_path,
            includes: None,
            excludes: None,
        }
    }

    /// Only files matching one of `patterns` are selected. An empty list selects everything.
    ///
    /// # Errors
    ///
    /// Returns an error if a pattern is not a valid glob.
    pub fn with_includes(mut self, patterns: &[String]) -> Result<Self, Error> {
        self.includes = build_glob_set(patterns)?;
        Ok(self)
    }

    /// Files and directories matching one of `patterns` are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if a pattern is not a valid glob.
    pub fn with_excludes(mut self, patterns: &[String]) -> Result<Self, Error> {
        self.excludes = build_glob_set(patterns)?;
        Ok(self)
    }

    /// Scans the directory tree and collects the selected `.rs` files.
    ///
    /// If any directories or files below the root cannot be accessed, warnings are logged
    /// and added to the result, but scanning continues.
    ///
    /// # Returns
    ///
    /// Returns a `ScanResult` containing the list of selected files, in walk order, and any
    /// warnings.
    ///
    /// # Errors
    ///
    /// Returns an error if the root directory cannot be accessed.
    pub fn scan(&self) -> Result<ScanResult> {
        let mut rust_files = Vec::new();
        let mut warnings = Vec::new();

        for entry in WalkDir::new(&self.root_path)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| {
                // Don't filter the root directory itself
                if e.depth() == 0 {
                    return true;
                }

                // Skip target directory and hidden directories
                let file_name = e.file_name().to_string_lossy();
                let is_hidden = file_name.starts_with('.');
                let is_target = file_name == "target" && e.file_type().is_dir();

                !is_hidden && !is_target && !self.is_excluded(e.path())
            })
        {
            match entry {
                Ok(entry) => {
                    let path = entry.path();

                    if entry.file_type().is_file()
                        && path.extension().and_then(|s| s.to_str()) == Some("rs")
                        && self.is_included(path)
                    {
                        rust_files.push(path.to_path_buf());
                    }
                }
                Err(e) if e.depth() == 0 => {
                    return Err(e).with_context(|| {
                        format!("Failed to access source path {}", self.root_path.display())
                    });
                }
                Err(e) => {
                    // Record warning for inaccessible directories/files
                    let warning = format!("Failed to access path: {}", e);
                    warn!("{}", warning);
                    warnings.push(warning);
                }
            }
        }

        debug!(
            "Selected {} Rust files below {}",
            rust_files.len(),
            self.root_path.display()
        );

        Ok(ScanResult {
            rust_files,
            warnings,
        })
    }

    fn is_included(&self, path: &Path) -> bool {
        match &self.includes {
            Some(includes) => self.matches(includes, path),
            None => true,
        }
    }

    fn is_excluded(&self, path: &Path) -> bool {
        match &self.excludes {
            Some(excludes) => {
                let excluded = self.matches(excludes, path);
                if excluded {
                    debug!("Excluding {}", path.display());
                }
                excluded
            }
            None => false,
        }
    }

    fn matches(&self, set: &GlobSet, path: &Path) -> bool {
        let relative = path.strip_prefix(&self.root_path).unwrap_or(path);
        set.is_match(relative) || set.is_match(path)
    }
}

/// `None` for an empty pattern list.
fn build_glob_set(patterns: &[String]) -> Result<Option<GlobSet>, Error> {
    let patterns: Vec<&str> = patterns
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect();
    if patterns.is_empty() {
        return Ok(None);
    }

    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    Ok(Some(builder.build()?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn file_names(result: &ScanResult, root: &Path) -> Vec<String> {
        result
            .rust_files
            .iter()
            .map(|p| {
                p.strip_prefix(root)
                    .unwrap()
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect()
    }

    fn create_tree(root: &Path) {
        fs::create_dir_all(root.join("model/generated")).unwrap();
        fs::create_dir_all(root.join("web")).unwrap();
        fs::write(root.join("lib.rs"), "pub mod model;").unwrap();
        fs::write(root.join("model/user.rs"), "pub struct User;").unwrap();
        fs::write(root.join("model/role.rs"), "pub enum Role { Admin }").unwrap();
        fs::write(root.join("model/generated/dto.rs"), "pub struct Dto;").unwrap();
        fs::write(root.join("web/routes.rs"), "pub fn routes() {}").unwrap();
    }

    #[test]
    fn test_scan_normal_directory() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        fs::write(root.join("main.rs"), "fn main() {}").unwrap();
        fs::write(root.join("lib.rs"), "pub fn test() {}").unwrap();
        fs::write(root.join("readme.md"), "# README").unwrap();

        let scanner = FileScanner::new(root.to_path_buf());
        let result = scanner.scan().unwrap();

        assert_eq!(file_names(&result, root), vec!["lib.rs", "main.rs"]);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_scan_empty_directory() {
        let temp_dir = TempDir::new().unwrap();

        let scanner = FileScanner::new(temp_dir.path().to_path_buf());
        let result = scanner.scan().unwrap();

        assert!(result.rust_files.is_empty());
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_scan_missing_root_fails() {
        let scanner = FileScanner::new(PathBuf::from("/nonexistent/source/path"));

        assert!(scanner.scan().is_err());
    }

    #[test]
    fn test_scan_skips_target_and_hidden_directories() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        fs::create_dir(root.join("target")).unwrap();
        fs::write(root.join("target/build.rs"), "fn main() {}").unwrap();
        fs::create_dir(root.join(".git")).unwrap();
        fs::write(root.join(".git/config.rs"), "// config").unwrap();
        fs::write(root.join("main.rs"), "fn main() {}").unwrap();

        let scanner = FileScanner::new(root.to_path_buf());
        let result = scanner.scan().unwrap();

        assert_eq!(file_names(&result, root), vec!["main.rs"]);
    }

    #[test]
    fn test_includes_select_files() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        create_tree(root);

        let scanner = FileScanner::new(root.to_path_buf())
            .with_includes(&["model/*.rs".to_string()])
            .unwrap();
        let result = scanner.scan().unwrap();

        // `*` crosses directories
        assert_eq!(
            file_names(&result, root),
            vec!["model/generated/dto.rs", "model/role.rs", "model/user.rs"]
        );
    }

    #[test]
    fn test_excludes_skip_directories_and_files() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        create_tree(root);

        let scanner = FileScanner::new(root.to_path_buf())
            .with_includes(&["model/**".to_string()])
            .unwrap()
            .with_excludes(&["model/generated".to_string(), " **/role.rs ".to_string()])
            .unwrap();
        let result = scanner.scan().unwrap();

        assert_eq!(file_names(&result, root), vec!["model/user.rs"]);
    }

    #[test]
    fn test_invalid_pattern() {
        let result = FileScanner::new(PathBuf::from(".")).with_includes(&["a[".to_string()]);

        assert!(matches!(result, Err(Error::GlobError(_))));
    }
}
