//! Persistent links between design layers and stylesheet scopes.
//!
//! A link says "this layer is implemented by this scope". Links are keyed
//! by stable identities on both sides (the layer's `<document>:<node>` id
//! and the scope's full CSS name) so they survive document refreshes and
//! stylesheet edits. A link whose endpoints no longer exist is kept and
//! simply resolves to nothing.

use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::io::{self, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use stylebridge_core::logging::targets;
use stylebridge_design::LayerId;

use crate::error::{Error, Result};

/// Version written into link files.
const LINK_FILE_VERSION: u32 = 1;

/// A layer-to-scope link.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Link {
    /// Layer identity, `<document key>:<node id>`.
    pub layer_id: LayerId,
    /// Full CSS name of the scope, including the base selector.
    pub scope_id: String,
}

impl Link {
    /// Create a link.
    pub fn new(layer_id: LayerId, scope_id: impl Into<String>) -> Self {
        Self {
            layer_id,
            scope_id: scope_id.into(),
        }
    }
}

#[derive(Serialize, Deserialize)]
struct LinkFile {
    version: u32,
    links: Vec<Link>,
}

/// The set of known links.
///
/// Links are kept ordered so saved files are stable across runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkStore {
    links: BTreeSet<Link>,
}

impl LinkStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of links.
    pub fn len(&self) -> usize {
        self.links.len()
    }

    /// Check whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Check whether a link exists.
    pub fn contains(&self, link: &Link) -> bool {
        self.links.contains(link)
    }

    /// Iterate over all links in order.
    pub fn iter(&self) -> impl Iterator<Item = &Link> {
        self.links.iter()
    }

    /// Add a link. Returns `false` if it already existed.
    pub fn add(&mut self, link: Link) -> bool {
        tracing::debug!(target: targets::LINKS, layer = %link.layer_id, scope = %link.scope_id, "link added");
        self.links.insert(link)
    }

    /// Remove a link. Returns `false` if it did not exist.
    pub fn remove(&mut self, link: &Link) -> bool {
        self.links.remove(link)
    }

    /// Remove every link of a layer, returning how many were removed.
    pub fn remove_layer(&mut self, layer_id: &LayerId) -> usize {
        self.remove_where(|link| &link.layer_id == layer_id)
    }

    /// Remove every link of a scope, returning how many were removed.
    pub fn remove_scope(&mut self, scope_id: &str) -> usize {
        self.remove_where(|link| link.scope_id == scope_id)
    }

    /// Remove every link whose layer belongs to a document.
    pub fn remove_document(&mut self, document_key: &str) -> usize {
        self.remove_where(|link| link.layer_id.belongs_to(document_key))
    }

    fn remove_where(&mut self, mut predicate: impl FnMut(&Link) -> bool) -> usize {
        let before = self.links.len();
        self.links.retain(|link| !predicate(link));
        let removed = before - self.links.len();
        if removed > 0 {
            tracing::debug!(target: targets::LINKS, removed, "links removed");
        }
        removed
    }

    /// Scopes linked to a layer.
    pub fn scopes_for_layer(&self, layer_id: &LayerId) -> Vec<&str> {
        self.links
            .iter()
            .filter(|link| &link.layer_id == layer_id)
            .map(|link| link.scope_id.as_str())
            .collect()
    }

    /// Layers linked to a scope.
    pub fn layers_for_scope(&self, scope_id: &str) -> Vec<&LayerId> {
        self.links
            .iter()
            .filter(|link| link.scope_id == scope_id)
            .map(|link| &link.layer_id)
            .collect()
    }

    /// All links grouped by layer.
    pub fn index_by_layer(&self) -> HashMap<&LayerId, Vec<&str>> {
        let mut index: HashMap<&LayerId, Vec<&str>> = HashMap::new();
        for link in &self.links {
            index.entry(&link.layer_id).or_default().push(&link.scope_id);
        }
        index
    }

    /// All links grouped by scope.
    pub fn index_by_scope(&self) -> HashMap<&str, Vec<&LayerId>> {
        let mut index: HashMap<&str, Vec<&LayerId>> = HashMap::new();
        for link in &self.links {
            index.entry(&link.scope_id).or_default().push(&link.layer_id);
        }
        index
    }

    /// Decode links from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        let file: LinkFile = serde_json::from_str(json)?;
        if file.version != LINK_FILE_VERSION {
            tracing::warn!(
                target: targets::LINKS,
                version = file.version,
                "link file has an unknown version; reading it anyway"
            );
        }
        Ok(file.links.into_iter().collect())
    }

    /// Encode links as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        let file = LinkFile {
            version: LINK_FILE_VERSION,
            links: self.links.iter().cloned().collect(),
        };
        Ok(serde_json::to_string_pretty(&file)?)
    }

    /// Load links from a file. A missing file yields an empty store.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(json) => Self::from_json(&json),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(target: targets::LINKS, path = %path.display(), "no link file yet");
                Ok(Self::new())
            }
            Err(e) => Err(Error::io(path, e)),
        }
    }

    /// Save links to a file.
    ///
    /// The JSON is written to a temporary file in the target directory and
    /// renamed over the target, so readers never observe a partial file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = self.to_json()?;
        let dir = path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .unwrap_or(Path::new("."));

        let mut temp = tempfile::NamedTempFile::new_in(dir).map_err(|e| Error::io(dir, e))?;
        temp.write_all(json.as_bytes()).map_err(|e| Error::io(temp.path(), e))?;
        temp.as_file().sync_all().map_err(|e| Error::io(temp.path(), e))?;
        temp.persist(path).map_err(|e| Error::io(path, e.error))?;

        tracing::debug!(target: targets::LINKS, path = %path.display(), links = self.len(), "links saved");
        Ok(())
    }
}

impl FromIterator<Link> for LinkStore {
    fn from_iter<I: IntoIterator<Item = Link>>(iter: I) -> Self {
        Self {
            links: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a LinkStore {
    type Item = &'a Link;
    type IntoIter = std::collections::btree_set::Iter<'a, Link>;

    fn into_iter(self) -> Self::IntoIter {
        self.links.iter()
    }
}
