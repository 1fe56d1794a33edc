//! Editor configuration
//!
//! Collection names and the user-visible message catalogue. Loaded from
//! YAML; every key is optional and falls back to the built-in defaults.

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::info;

/// Environment variable naming a YAML config file
pub const CONFIG_PATH_ENV: &str = "BOOKSHOP_EDITOR_CONFIG";

/// Root configuration for an editing session
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct EditorConfig {
    pub collections: CollectionNames,
    pub messages: Messages,
}

/// Remote collection names
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct CollectionNames {
    pub authors: String,
    pub books: String,
}

impl Default for CollectionNames {
    fn default() -> Self {
        Self {
            authors: "Authors".to_string(),
            books: "Books".to_string(),
        }
    }
}

/// User-visible notification texts
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct Messages {
    pub author_created: String,
    pub author_updated: String,
    pub author_deleted: String,
    pub book_created: String,
    pub book_updated: String,
    pub book_deleted: String,
    /// Shown when edit/delete fires without exactly one author row selected
    pub select_one_author: String,
    /// Shown when edit/delete fires without exactly one book row selected
    pub select_one_book: String,
    /// Shown when a book create fires with no author selected
    pub select_author_first: String,
    pub confirm_author_delete: String,
    pub confirm_book_delete: String,
}

impl Default for Messages {
    fn default() -> Self {
        Self {
            author_created: "Author created".to_string(),
            author_updated: "Author updated".to_string(),
            author_deleted: "Author deleted".to_string(),
            book_created: "Book created".to_string(),
            book_updated: "Book updated".to_string(),
            book_deleted: "Book deleted".to_string(),
            select_one_author: "Select exactly one author".to_string(),
            select_one_book: "Select exactly one book".to_string(),
            select_author_first: "Select an author first".to_string(),
            confirm_author_delete: "Delete the selected author?".to_string(),
            confirm_book_delete: "Delete the selected book?".to_string(),
        }
    }
}

impl EditorConfig {
    /// Load configuration from a YAML file
    pub fn from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read editor config {}", path))?;
        Self::from_yaml(&content).with_context(|| format!("Invalid editor config {}", path))
    }

    /// Load configuration from a YAML string
    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: EditorConfig =
            serde_yaml::from_str(content).context("Failed to parse editor config YAML")?;
        Ok(config)
    }

    /// Load from the file named by `BOOKSHOP_EDITOR_CONFIG`, or use defaults
    pub fn from_env() -> Result<Self> {
        match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => {
                info!(path = %path, "Loading editor configuration");
                Self::from_file(&path)
            }
            Err(_) => Ok(Self::default()),
        }
    }
}
