//! Design source boundary.
//!
//! The network client that talks to the design service lives outside this
//! workspace. It plugs in through [`DesignSource`], returning a versioned
//! [`DesignSnapshot`] as a single-shot [`Pending`] value. [`DesignCache`]
//! keeps the freshness marker used to discard snapshots that bring nothing
//! new, including older snapshots whose fetch settled late.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use stylebridge_core::logging::targets;
use stylebridge_core::{Error as CoreError, Pending};

use crate::Result;
use crate::node::DesignNode;

/// Metadata the design service keeps per component.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComponentMeta {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// One fetched version of a design document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignSnapshot {
    #[serde(default)]
    pub name: String,
    /// Opaque version marker; the only staleness signal.
    pub last_modified: String,
    pub document: DesignNode,
    /// Component metadata keyed by node id.
    #[serde(default)]
    pub components: HashMap<String, ComponentMeta>,
}

impl DesignSnapshot {
    /// Decode a snapshot from the design service's JSON payload.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Something that can fetch design documents by key.
pub trait DesignSource {
    /// Start fetching a document.
    ///
    /// Transport failures reject the returned handle.
    fn fetch(&self, key: &str) -> Pending<DesignSnapshot>;
}

/// In-memory design source, for hosts that already hold the payload.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    documents: HashMap<String, DesignSnapshot>,
}

impl MemorySource {
    /// Create an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a document.
    pub fn insert(&mut self, key: impl Into<String>, snapshot: DesignSnapshot) {
        self.documents.insert(key.into(), snapshot);
    }
}

impl DesignSource for MemorySource {
    fn fetch(&self, key: &str) -> Pending<DesignSnapshot> {
        match self.documents.get(key) {
            Some(snapshot) => Pending::resolved(snapshot.clone()),
            None => Pending::rejected(CoreError::fetch(key, "document not found")),
        }
    }
}

/// Freshness marker of the last accepted snapshot of one document.
#[derive(Debug, Clone, Default)]
pub struct DesignCache {
    last_modified: Option<String>,
}

impl DesignCache {
    /// Create a cache that has accepted nothing yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Version marker of the last accepted snapshot.
    pub fn last_modified(&self) -> Option<&str> {
        self.last_modified.as_deref()
    }

    /// Whether a snapshot is more recent than the cached one.
    ///
    /// Markers are ISO 8601 timestamps in one fixed format, so they order
    /// lexicographically.
    pub fn is_newer(&self, snapshot: &DesignSnapshot) -> bool {
        self.last_modified
            .as_deref()
            .is_none_or(|cached| snapshot.last_modified.as_str() > cached)
    }

    /// Record a snapshot's version.
    ///
    /// Returns `false`, leaving the cache untouched, when the snapshot is
    /// not newer: either unchanged, or an older fetch that settled late.
    /// Callers treat that as a no-op refresh.
    pub fn accept(&mut self, snapshot: &DesignSnapshot) -> bool {
        if !self.is_newer(snapshot) {
            tracing::debug!(
                target: targets::DESIGN,
                last_modified = %snapshot.last_modified,
                cached = ?self.last_modified,
                "design document not newer than cached"
            );
            return false;
        }
        self.last_modified = Some(snapshot.last_modified.clone());
        true
    }

    /// Forget the cached version.
    pub fn clear(&mut self) {
        self.last_modified = None;
    }
}
