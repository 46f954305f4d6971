//! Per-document reconciliation session.
//!
//! A [`Session`] pairs one design document with one stylesheet. Both sides
//! arrive asynchronously: the design through a [`DesignSource`] fetch, the
//! stylesheet through a (possibly deferred) parse. Each side is built in
//! full off to the side and then swapped in, so readers always see a
//! consistent pair of trees. After every swap and every link change the
//! links are re-resolved against the current trees.
//!
//! # Example
//!
//! ```
//! use stylebridge::prelude::*;
//!
//! let snapshot = DesignSnapshot::from_json(r#"{
//!     "lastModified": "2024-03-01T10:00:00Z",
//!     "document": {
//!         "id": "0:0", "name": "Page", "type": "DOCUMENT",
//!         "children": [{
//!             "id": "1:2", "name": "Label", "type": "TEXT",
//!             "style": { "fontSize": 12 }
//!         }]
//!     }
//! }"#).unwrap();
//!
//! let mut session = Session::new(SyncConfig::for_document("doc"));
//! session.apply_design(snapshot);
//! session.parse_stylesheet(".label {\n  color: red;\n}\n").unwrap();
//! session.link(LayerId::new("doc", "1:2"), "body .label");
//!
//! let diagnostics = session.diagnostics();
//! assert_eq!(diagnostics[0].message, "missing font-size: 12px;");
//! ```

use std::fmt;
use std::sync::Arc;

use stylebridge_core::logging::{PerfSpan, targets};
use stylebridge_core::{Pending, TaskQueue};
use stylebridge_design::{
    DesignCache, DesignSnapshot, DesignSource, GeneratedRule, LayerId, LayerKey, LayerTree,
    generate_rules,
};
use stylebridge_style::{Reconciliation, ScopeKey, ScopeTree, SourceRange, StylesheetParser, reconcile};

use crate::config::SyncConfig;
use crate::error::{Error, Result};
use crate::links::{Link, LinkStore};

/// Where a session stands.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SessionStatus {
    /// At least one side has not arrived yet.
    #[default]
    Waiting,
    /// Both a design and a stylesheet are loaded.
    Ready,
    /// The last fetch or parse failed. Previously loaded trees are kept.
    Failed(String),
}

/// Severity of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    /// The stylesheet disagrees with the design.
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Warning => f.write_str("warning"),
        }
    }
}

/// A disagreement between a linked layer and scope, anchored in the stylesheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Stylesheet range to highlight.
    pub range: SourceRange,
    pub severity: Severity,
    /// Suggested declaration, e.g. `missing font-size: 12px;`.
    pub message: String,
    pub layer_id: LayerId,
    pub scope_id: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}: {} ({})", self.range, self.severity, self.message, self.scope_id)
    }
}

/// A link whose endpoints both exist in the current trees.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLink {
    pub link: Link,
    pub layer: LayerKey,
    pub scope: ScopeKey,
}

#[derive(Debug)]
struct DesignState {
    snapshot: Arc<DesignSnapshot>,
    layers: Arc<LayerTree>,
}

/// Reconciliation context for one design document and one stylesheet.
#[derive(Debug)]
pub struct Session {
    config: SyncConfig,
    parser: StylesheetParser,
    cache: DesignCache,
    design: Option<DesignState>,
    scopes: Option<Arc<ScopeTree>>,
    links: LinkStore,
    resolved: Vec<ResolvedLink>,
    status: SessionStatus,
}

impl Session {
    /// Create a session with no links.
    pub fn new(config: SyncConfig) -> Self {
        let parser = config.parser();
        Self {
            config,
            parser,
            cache: DesignCache::new(),
            design: None,
            scopes: None,
            links: LinkStore::new(),
            resolved: Vec::new(),
            status: SessionStatus::Waiting,
        }
    }

    /// Create a session, loading links from the configured links file.
    pub fn open(config: SyncConfig) -> Result<Self> {
        let links = LinkStore::load(&config.links_file)?;
        Ok(Self::new(config).with_links(links))
    }

    /// Replace the session's links.
    pub fn with_links(mut self, links: LinkStore) -> Self {
        self.links = links;
        self.resolve_links();
        self
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn status(&self) -> &SessionStatus {
        &self.status
    }

    /// Current layer tree, if a design has been applied.
    pub fn layers(&self) -> Option<&Arc<LayerTree>> {
        self.design.as_ref().map(|design| &design.layers)
    }

    /// Current design snapshot, if any.
    pub fn snapshot(&self) -> Option<&Arc<DesignSnapshot>> {
        self.design.as_ref().map(|design| &design.snapshot)
    }

    /// Current scope tree, if a stylesheet has been applied.
    pub fn scopes(&self) -> Option<&Arc<ScopeTree>> {
        self.scopes.as_ref()
    }

    pub fn links(&self) -> &LinkStore {
        &self.links
    }

    /// Links whose layer and scope both exist right now.
    pub fn resolved_links(&self) -> &[ResolvedLink] {
        &self.resolved
    }

    /// Swap in a new design snapshot.
    ///
    /// Returns `false` without touching anything when the snapshot's
    /// `lastModified` is not newer than the current one. A fetch that
    /// settles after a more recent one is discarded this way.
    pub fn apply_design(&mut self, snapshot: impl Into<Arc<DesignSnapshot>>) -> bool {
        let snapshot = snapshot.into();
        if !self.cache.accept(&snapshot) {
            return false;
        }

        let layers = {
            let _span = PerfSpan::new("build_layer_tree");
            let layers = LayerTree::build(self.config.document_key.as_str(), &snapshot.document);
            layers.memoize_all();
            layers
        };

        tracing::info!(
            target: targets::SESSION,
            document = %self.config.document_key,
            last_modified = %snapshot.last_modified,
            layers = layers.len(),
            "design tree swapped"
        );

        self.design = Some(DesignState {
            snapshot,
            layers: Arc::new(layers),
        });
        self.after_swap();
        true
    }

    /// Swap in a new scope tree.
    pub fn apply_stylesheet(&mut self, tree: impl Into<Arc<ScopeTree>>) {
        let tree = tree.into();
        tracing::info!(target: targets::SESSION, scopes = tree.len(), "stylesheet tree swapped");
        self.scopes = Some(tree);
        self.after_swap();
    }

    /// Parse stylesheet text synchronously and swap in the result.
    ///
    /// On a parse error the session keeps its previous tree.
    pub fn parse_stylesheet(&mut self, text: &str) -> Result<()> {
        match self.parser.parse(text) {
            Ok(tree) => {
                self.apply_stylesheet(tree);
                Ok(())
            }
            Err(error) => {
                self.fail(error.to_string());
                Err(error.into())
            }
        }
    }

    /// Schedule a parse on a task queue.
    ///
    /// Hand the returned handle to [`Session::receive_stylesheet`] (or
    /// settle it yourself with [`Session::settle_stylesheet`]) once the
    /// queue has run.
    pub fn parse_deferred(&self, text: impl Into<String>, queue: &mut TaskQueue) -> Pending<ScopeTree> {
        self.parser.parse_deferred(text, queue)
    }

    /// Fetch the configured document from a source and apply it.
    ///
    /// Resolves to `true` if the design tree was swapped.
    pub async fn refresh_design<S>(&mut self, source: &S) -> Result<bool>
    where
        S: DesignSource + ?Sized,
    {
        let pending = source.fetch(&self.config.document_key);
        self.receive_design(pending).await
    }

    /// Wait for a design fetch and apply its outcome.
    pub async fn receive_design(&mut self, pending: Pending<DesignSnapshot>) -> Result<bool> {
        let result = pending.await;
        self.settle_design(result)
    }

    /// Wait for a deferred parse and apply its outcome.
    pub async fn receive_stylesheet(&mut self, pending: Pending<ScopeTree>) -> Result<()> {
        let result = pending.await;
        self.settle_stylesheet(result)
    }

    /// Apply the outcome of a design fetch.
    ///
    /// A rejection marks the session failed and leaves both trees as they were.
    pub fn settle_design(&mut self, result: stylebridge_core::Result<Arc<DesignSnapshot>>) -> Result<bool> {
        match result {
            Ok(snapshot) => Ok(self.apply_design(snapshot)),
            Err(error) => {
                self.fail(error.to_string());
                Err(Error::Core(error))
            }
        }
    }

    /// Apply the outcome of a deferred parse.
    pub fn settle_stylesheet(&mut self, result: stylebridge_core::Result<Arc<ScopeTree>>) -> Result<()> {
        match result {
            Ok(tree) => {
                self.apply_stylesheet(tree);
                Ok(())
            }
            Err(error) => {
                self.fail(error.to_string());
                Err(Error::Core(error))
            }
        }
    }

    /// Link a layer to a scope. Returns `false` if the link already existed.
    pub fn link(&mut self, layer_id: LayerId, scope_id: impl Into<String>) -> bool {
        let added = self.links.add(Link::new(layer_id, scope_id));
        self.resolve_links();
        added
    }

    /// Remove one link.
    pub fn unlink(&mut self, link: &Link) -> bool {
        let removed = self.links.remove(link);
        self.resolve_links();
        removed
    }

    /// Remove every link of a layer.
    pub fn unlink_layer(&mut self, layer_id: &LayerId) -> usize {
        let removed = self.links.remove_layer(layer_id);
        self.resolve_links();
        removed
    }

    /// Remove every link of a scope.
    pub fn unlink_scope(&mut self, scope_id: &str) -> usize {
        let removed = self.links.remove_scope(scope_id);
        self.resolve_links();
        removed
    }

    /// Persist links to the configured links file.
    pub fn save_links(&self) -> Result<()> {
        self.links.save(&self.config.links_file)
    }

    /// Compare one resolved link's scope with its layer.
    pub fn reconcile_link(&self, resolved: &ResolvedLink) -> Option<Reconciliation> {
        let layers = self.layers()?;
        let scopes = self.scopes.as_ref()?;
        let computed = scopes.computed_style(resolved.scope);
        Some(reconcile(&computed, layers.derived_style(resolved.layer)))
    }

    /// Diagnostics for every resolved link.
    ///
    /// Missing properties are reported on the scope's selector; mismatched
    /// ones on the declaration that supplies the differing value, falling
    /// back to the selector when that declaration has no recorded range.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        let Some(scopes) = self.scopes.as_ref() else {
            return Vec::new();
        };

        let mut diagnostics = Vec::new();
        for resolved in &self.resolved {
            let Some(result) = self.reconcile_link(resolved) else {
                continue;
            };
            let selector_range = scopes
                .get(resolved.scope)
                .and_then(|scope| scope.selector_range())
                .unwrap_or_default();
            let diagnostic = |range: SourceRange, message: String| Diagnostic {
                range,
                severity: Severity::Warning,
                message,
                layer_id: resolved.link.layer_id.clone(),
                scope_id: resolved.link.scope_id.clone(),
            };

            for (name, value) in result.missing.iter() {
                diagnostics.push(diagnostic(selector_range, format!("missing {name}: {value};")));
            }
            for mismatch in result.mismatched {
                diagnostics.push(diagnostic(
                    mismatch.range.unwrap_or(selector_range),
                    format!("expected {}: {};", mismatch.name, mismatch.expected),
                ));
            }
        }
        diagnostics
    }

    /// LESS rules for the current design's annotated components.
    pub fn generated_rules(&self) -> Vec<GeneratedRule> {
        match &self.design {
            Some(design) => generate_rules(&design.snapshot.document, &design.layers, &design.snapshot.components),
            None => Vec::new(),
        }
    }

    fn fail(&mut self, message: String) {
        tracing::warn!(target: targets::SESSION, error = %message, "keeping previous trees");
        self.status = SessionStatus::Failed(message);
    }

    fn after_swap(&mut self) {
        self.status = if self.design.is_some() && self.scopes.is_some() {
            SessionStatus::Ready
        } else {
            SessionStatus::Waiting
        };
        self.resolve_links();
    }

    fn resolve_links(&mut self) {
        self.resolved.clear();
        let (Some(design), Some(scopes)) = (self.design.as_ref(), self.scopes.as_ref()) else {
            return;
        };

        for link in &self.links {
            match (design.layers.find(&link.layer_id), scopes.get_scope(&link.scope_id)) {
                (Some(layer), Some(scope)) => self.resolved.push(ResolvedLink {
                    link: link.clone(),
                    layer,
                    scope,
                }),
                _ => tracing::debug!(
                    target: targets::LINKS,
                    layer = %link.layer_id,
                    scope = %link.scope_id,
                    "link does not resolve"
                ),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stylebridge_core::Error as CoreError;

    const DESIGN: &str = r#"{
        "name": "Kit",
        "lastModified": "v1",
        "document": {
            "id": "0:0", "name": "Page", "type": "DOCUMENT",
            "children": [{
                "id": "1:2", "name": "Button", "type": "COMPONENT",
                "cornerRadius": 4,
                "children": [{
                    "id": "1:3", "name": "Label", "type": "TEXT",
                    "style": { "fontSize": 12 }
                }]
            }]
        },
        "components": { "1:2": { "name": "Button", "description": "<.button>" } }
    }"#;

    fn snapshot(last_modified: &str) -> DesignSnapshot {
        let mut snapshot = DesignSnapshot::from_json(DESIGN).unwrap();
        snapshot.last_modified = last_modified.to_string();
        snapshot
    }

    fn session() -> Session {
        Session::new(SyncConfig::for_document("doc"))
    }

    #[test]
    fn status_follows_both_sides() {
        let mut session = session();
        assert_eq!(session.status(), &SessionStatus::Waiting);

        assert!(session.apply_design(snapshot("v1")));
        assert_eq!(session.status(), &SessionStatus::Waiting);

        session.parse_stylesheet(".button {}").unwrap();
        assert_eq!(session.status(), &SessionStatus::Ready);
    }

    #[test]
    fn unchanged_design_is_a_no_op() {
        let mut session = session();
        assert!(session.apply_design(snapshot("v1")));
        let first = Arc::clone(session.layers().unwrap());

        assert!(!session.apply_design(snapshot("v1")));
        assert!(Arc::ptr_eq(&first, session.layers().unwrap()));

        assert!(session.apply_design(snapshot("v2")));
        assert!(!Arc::ptr_eq(&first, session.layers().unwrap()));
    }

    #[test]
    fn older_fetch_settling_late_is_discarded() {
        let mut session = session();
        assert!(session.settle_design(Ok(Arc::new(snapshot("2024-05-02T08:00:00Z")))).unwrap());
        let current = Arc::clone(session.layers().unwrap());

        assert!(!session.settle_design(Ok(Arc::new(snapshot("2024-05-01T08:00:00Z")))).unwrap());
        assert!(Arc::ptr_eq(&current, session.layers().unwrap()));
        assert_eq!(session.snapshot().unwrap().last_modified, "2024-05-02T08:00:00Z");
    }

    #[test]
    fn rejected_fetch_keeps_trees() {
        let mut session = session();
        session.apply_design(snapshot("v1"));
        let layers = Arc::clone(session.layers().unwrap());

        let err = session.settle_design(Err(CoreError::fetch("doc", "offline"))).unwrap_err();
        assert!(matches!(err, Error::Core(CoreError::Fetch { .. })));
        assert!(matches!(session.status(), SessionStatus::Failed(message) if message.contains("offline")));
        assert!(Arc::ptr_eq(&layers, session.layers().unwrap()));
    }

    #[test]
    fn parse_error_keeps_previous_stylesheet() {
        let mut session = session();
        session.parse_stylesheet(".a { color: red; }").unwrap();
        let tree = Arc::clone(session.scopes().unwrap());

        assert!(matches!(session.parse_stylesheet(".a { color: red;"), Err(Error::Style(_))));
        assert!(Arc::ptr_eq(&tree, session.scopes().unwrap()));
    }

    #[test]
    fn links_resolve_after_every_change() {
        let mut session = session();
        let layer = LayerId::new("doc", "1:2");
        session.link(layer.clone(), "body .button");
        assert!(session.resolved_links().is_empty());

        session.apply_design(snapshot("v1"));
        session.parse_stylesheet(".button { border-radius: 4px; }").unwrap();
        assert_eq!(session.resolved_links().len(), 1);

        // Stale scope: kept as a link, resolves to nothing.
        session.parse_stylesheet(".btn { border-radius: 4px; }").unwrap();
        assert!(session.resolved_links().is_empty());
        assert_eq!(session.links().len(), 1);

        session.parse_stylesheet(".button { border-radius: 4px; }").unwrap();
        assert_eq!(session.unlink_layer(&layer), 1);
        assert!(session.resolved_links().is_empty());
    }

    #[test]
    fn diagnostics_point_at_selector_and_declaration() {
        let mut session = session();
        session.apply_design(snapshot("v1"));
        session
            .parse_stylesheet(".button {\n  border-radius: 2px;\n}\n.label {\n  color: red;\n}\n")
            .unwrap();
        session.link(LayerId::new("doc", "1:2"), "body .button");
        session.link(LayerId::new("doc", "1:3"), "body .label");

        let diagnostics = session.diagnostics();
        assert_eq!(diagnostics.len(), 2);

        let expected = diagnostics.iter().find(|d| d.scope_id == "body .button").unwrap();
        assert_eq!(expected.message, "expected border-radius: 4px;");
        assert_eq!(expected.range.start.line, 1);
        assert_eq!(expected.severity, Severity::Warning);

        let missing = diagnostics.iter().find(|d| d.scope_id == "body .label").unwrap();
        assert_eq!(missing.message, "missing font-size: 12px;");
        assert_eq!(missing.range.start.line, 3);
    }

    #[test]
    fn generates_rules_for_annotated_components() {
        let mut session = session();
        assert!(session.generated_rules().is_empty());

        session.apply_design(snapshot("v1"));
        let rules = session.generated_rules();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].selector, ".button");
        assert!(rules[0].less.contains("border-radius: 4px;"));
    }
}
