use crate::error::{Error, Result};
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};

const BYTE_ORDER_MARK: char = '\u{feff}';

/// AST (Abstract Syntax Tree) parser for Rust source files.
///
/// The `AstParser` uses the `syn` crate to parse Rust source code into an abstract syntax tree.
/// The original source text is kept next to the tree: the enricher rewrites files by splicing
/// text at token positions, so everything outside the patched attributes survives unchanged.
///
/// # Example
///
/// ```no_run
/// use schema_enricher::parser::AstParser;
/// use std::path::Path;
///
/// let parsed = AstParser::parse_file(Path::new("src/model/user.rs")).unwrap();
/// println!("Parsed {} items", parsed.syntax_tree.items.len());
/// ```
pub struct AstParser;

/// A successfully parsed Rust file with its abstract syntax tree.
#[derive(Debug)]
pub struct ParsedFile {
    /// Path to the source file
    pub path: PathBuf,
    /// Source text the tree was parsed from (without a leading byte order mark)
    pub source: String,
    /// Whether the file on disk started with a byte order mark
    pub has_bom: bool,
    /// The parsed abstract syntax tree
    pub syntax_tree: syn::File,
}

impl AstParser {
    /// Reads and parses a single Rust source file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IoError`] if the file cannot be read and [`Error::ParseError`] if it
    /// contains invalid Rust syntax.
    pub fn parse_file(path: &Path) -> Result<ParsedFile> {
        debug!("Parsing file: {}", path.display());

        let content = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;

        Self::parse_source(path, content)
    }

    /// Parses source text that was already read from `path`.
    pub fn parse_source(path: &Path, content: String) -> Result<ParsedFile> {
        let (source, has_bom) = match content.strip_prefix(BYTE_ORDER_MARK) {
            Some(stripped) => (stripped.to_string(), true),
            None => (content, false),
        };

        let syntax_tree = syn::parse_file(&source).map_err(|e| Error::ParseError {
            file: path.to_path_buf(),
            message: format!(
                "{} (line {}, column {})",
                e,
                e.span().start().line,
                e.span().start().column
            ),
        })?;

        debug!("Successfully parsed file: {}", path.display());

        Ok(ParsedFile {
            path: path.to_path_buf(),
            source,
            has_bom,
            syntax_tree,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Write;
    use tempfile::TempDir;

    /// Helper function to create a temporary file with content
    fn create_temp_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let file_path = dir.path().join(name);
        let mut file = fs::File::create(&file_path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file_path
    }

    #[test]
    fn test_parse_valid_rust_file() {
        let temp_dir = TempDir::new().unwrap();
        let valid_code = r#"
            /// A user.
            pub struct User {
                pub id: u32,
                pub name: String,
            }

            impl User {
                pub fn get_display_name(&self) -> String {
                    self.name.clone()
                }
            }
        "#;

        let file_path = create_temp_file(&temp_dir, "user.rs", valid_code);
        let parsed = AstParser::parse_file(&file_path).unwrap();

        assert_eq!(parsed.path, file_path);
        assert_eq!(parsed.source, valid_code);
        assert!(!parsed.has_bom);
        assert_eq!(parsed.syntax_tree.items.len(), 2);
    }

    #[test]
    fn test_parse_invalid_rust_file() {
        let temp_dir = TempDir::new().unwrap();
        let invalid_code = r#"
            pub struct User {
                pub id: u32
                pub name: String
            }
        "#;

        let file_path = create_temp_file(&temp_dir, "invalid.rs", invalid_code);
        let result = AstParser::parse_file(&file_path);

        match result {
            Err(Error::ParseError { file, .. }) => assert_eq!(file, file_path),
            other => panic!("Expected parse error, got {:?}", other.map(|p| p.path)),
        }
    }

    #[test]
    fn test_parse_nonexistent_file() {
        let result = AstParser::parse_file(Path::new("/nonexistent/file.rs"));

        let err = result.unwrap_err();
        assert!(matches!(err, Error::IoError { .. }));
        assert!(err.to_string().contains("/nonexistent/file.rs"));
    }

    #[test]
    fn test_parse_empty_file() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = create_temp_file(&temp_dir, "empty.rs", "");
        let parsed = AstParser::parse_file(&file_path).unwrap();

        assert!(parsed.syntax_tree.items.is_empty());
    }

    #[test]
    fn test_parse_source_strips_byte_order_mark() {
        let parsed =
            AstParser::parse_source(Path::new("bom.rs"), "\u{feff}pub struct Bom;".to_string())
                .unwrap();

        assert!(parsed.has_bom);
        assert_eq!(parsed.source, "pub struct Bom;");
        assert_eq!(parsed.syntax_tree.items.len(), 1);
    }
}
