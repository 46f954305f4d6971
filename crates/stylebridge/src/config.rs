//! Session configuration.
//!
//! Configuration is plain TOML. Every field is optional:
//!
//! ```toml
//! document_key = "hX1f2"
//! base_selector = "body"
//! global_selectors = ["body", "html", "*", ":root"]
//! links_file = ".stylebridge/links.json"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use stylebridge_style::StylesheetParser;
use stylebridge_style::parser::{DEFAULT_BASE_SELECTOR, DEFAULT_GLOBAL_SELECTORS};

use crate::error::{Error, Result};

/// Default location of the persisted links, relative to the working directory.
pub const DEFAULT_LINKS_FILE: &str = "stylebridge-links.json";

/// Settings shared by one design document and one stylesheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Key of the design document to fetch.
    pub document_key: String,
    /// Selector of the implicit root scope.
    pub base_selector: String,
    /// Selectors whose declarations apply to the root scope.
    pub global_selectors: Vec<String>,
    /// Where links are persisted.
    pub links_file: PathBuf,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            document_key: String::new(),
            base_selector: DEFAULT_BASE_SELECTOR.to_string(),
            global_selectors: DEFAULT_GLOBAL_SELECTORS.iter().map(|s| s.to_string()).collect(),
            links_file: PathBuf::from(DEFAULT_LINKS_FILE),
        }
    }
}

impl SyncConfig {
    /// Configuration for a document, with every other field defaulted.
    pub fn for_document(document_key: impl Into<String>) -> Self {
        Self {
            document_key: document_key.into(),
            ..Self::default()
        }
    }

    /// Parse configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Self::from_toml_str(&text)
    }

    /// A stylesheet parser using this configuration's selectors.
    pub fn parser(&self) -> StylesheetParser {
        StylesheetParser::new()
            .with_base_selector(self.base_selector.clone())
            .with_global_selectors(self.global_selectors.iter().cloned())
    }
}
