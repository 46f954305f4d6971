//! Layer tree: design nodes decorated with derived style and pruned paths.
//!
//! A [`LayerTree`] is built once per fetched document and never mutated in
//! place. It owns one [`Layer`] per design node in an arena; parent links are
//! arena keys used only for upward walks.
//!
//! # Pruning
//!
//! Inside a component, wrapper layers that carry no style of their own and
//! either have no siblings or wrap exactly one child are structurally
//! irrelevant. They are skipped when iterating children
//! ([`LayerTree::pruned_children`]), walking upward
//! ([`LayerTree::pruned_parent`]) and building breadcrumbs
//! ([`LayerTree::path`]). The underlying node tree is untouched.
//!
//! # Derived style
//!
//! A layer's derived style is its own style when that is non-empty. Otherwise
//! it is the union of its pruned children's derived styles, unless two
//! children disagree on a property, in which case it is empty.

use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use slotmap::{SlotMap, new_key_type};
use stylebridge_core::CssPropertyMap;
use stylebridge_core::logging::targets;

use crate::extract::extract_style;
use crate::node::{DesignNode, NodeType};

new_key_type! {
    /// Arena key of a layer within one [`LayerTree`].
    ///
    /// Keys are only meaningful for the tree that issued them; use
    /// [`LayerId`] to refer to a layer across tree generations.
    pub struct LayerKey;
}

/// Globally unique layer identity: `<document key>:<node id>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerId(String);

impl LayerId {
    /// Compose an id from a document key and a node id.
    pub fn new(document_key: &str, node_id: &str) -> Self {
        Self(format!("{document_key}:{node_id}"))
    }

    /// Wrap an already composed id (for example one read from storage).
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// The composed id string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check whether this layer belongs to the given document.
    pub fn belongs_to(&self, document_key: &str) -> bool {
        self.0
            .strip_prefix(document_key)
            .is_some_and(|rest| rest.starts_with(':'))
    }
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A design node with its parent-relative context.
#[derive(Debug)]
pub struct Layer {
    /// Global identity.
    pub id: LayerId,
    /// Id of the underlying design node.
    pub node_id: String,
    /// Node name.
    pub name: String,
    /// Node type.
    pub node_type: NodeType,
    /// Component id referenced by an instance node.
    pub component_id: Option<String>,
    /// Style derived from this node's own attributes.
    pub own_style: CssPropertyMap,
    parent: Option<LayerKey>,
    children: Vec<LayerKey>,
    in_component: bool,
    derived: OnceLock<CssPropertyMap>,
    pruned: OnceLock<Vec<LayerKey>>,
}

impl Layer {
    /// Unpruned parent.
    pub fn parent(&self) -> Option<LayerKey> {
        self.parent
    }

    /// Unpruned children, in document order.
    pub fn children(&self) -> &[LayerKey] {
        &self.children
    }

    /// Whether a strict ancestor is a component.
    pub fn in_component(&self) -> bool {
        self.in_component
    }
}

/// Arena of layers for one fetched design document.
#[derive(Debug)]
pub struct LayerTree {
    document_key: String,
    layers: SlotMap<LayerKey, Layer>,
    root: LayerKey,
    by_node: HashMap<String, LayerKey>,
}

impl LayerTree {
    /// Build the layer tree of a document.
    pub fn build(document_key: impl Into<String>, root: &DesignNode) -> Self {
        let document_key = document_key.into();
        let mut layers = SlotMap::with_key();
        let mut by_node = HashMap::new();
        let root_key = insert_layer(&document_key, root, None, false, &mut layers, &mut by_node);

        tracing::debug!(
            target: targets::DESIGN,
            document = %document_key,
            layers = layers.len(),
            "built layer tree"
        );

        Self {
            document_key,
            layers,
            root: root_key,
            by_node,
        }
    }

    /// Document key the tree was built for.
    pub fn document_key(&self) -> &str {
        &self.document_key
    }

    /// Root layer.
    pub fn root(&self) -> LayerKey {
        self.root
    }

    /// Number of layers.
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Check if the tree is empty (never true for a built tree).
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Get a layer by key.
    pub fn get(&self, key: LayerKey) -> Option<&Layer> {
        self.layers.get(key)
    }

    /// Find a layer by its design node id.
    pub fn find_node(&self, node_id: &str) -> Option<LayerKey> {
        self.by_node.get(node_id).copied()
    }

    /// Find a layer by global id.
    ///
    /// Ids from another document (or a stale generation whose node has since
    /// disappeared) resolve to `None`.
    pub fn find(&self, id: &LayerId) -> Option<LayerKey> {
        let node_id = id
            .as_str()
            .strip_prefix(self.document_key.as_str())?
            .strip_prefix(':')?;
        self.find_node(node_id)
    }

    /// Iterate over all layers, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (LayerKey, &Layer)> {
        self.layers.iter()
    }

    /// Whether a layer is a structurally redundant wrapper.
    ///
    /// True iff the layer is inside a component, has no own style, and either
    /// has no siblings or has exactly one child.
    pub fn is_unnecessary(&self, key: LayerKey) -> bool {
        let Some(layer) = self.layers.get(key) else {
            return false;
        };
        if !layer.in_component || !layer.own_style.is_empty() {
            return false;
        }
        let has_no_siblings = layer
            .parent
            .and_then(|p| self.layers.get(p))
            .is_none_or(|parent| parent.children.len() == 1);
        has_no_siblings || layer.children.len() == 1
    }

    /// Children with unnecessary layers replaced by their own pruned children.
    pub fn pruned_children(&self, key: LayerKey) -> &[LayerKey] {
        let Some(layer) = self.layers.get(key) else {
            return &[];
        };
        layer.pruned.get_or_init(|| {
            let mut pruned = Vec::with_capacity(layer.children.len());
            for &child in &layer.children {
                if self.is_unnecessary(child) {
                    pruned.extend_from_slice(self.pruned_children(child));
                } else {
                    pruned.push(child);
                }
            }
            pruned
        })
    }

    /// Nearest ancestor that is not an unnecessary layer.
    pub fn pruned_parent(&self, key: LayerKey) -> Option<LayerKey> {
        let mut current = self.layers.get(key)?.parent;
        while let Some(parent) = current {
            if !self.is_unnecessary(parent) {
                return Some(parent);
            }
            current = self.layers.get(parent)?.parent;
        }
        None
    }

    /// Names of the pruned ancestors of a layer, root first.
    pub fn path(&self, key: LayerKey) -> Vec<&str> {
        let mut names = Vec::new();
        let mut current = self.pruned_parent(key);
        while let Some(ancestor) = current {
            if let Some(layer) = self.layers.get(ancestor) {
                names.push(layer.name.as_str());
            }
            current = self.pruned_parent(ancestor);
        }
        names.reverse();
        names
    }

    /// Human-readable location of a layer: pruned path plus its own name.
    pub fn breadcrumb(&self, key: LayerKey) -> String {
        let mut parts = self.path(key);
        if let Some(layer) = self.layers.get(key) {
            parts.push(layer.name.as_str());
        }
        parts.join(" / ")
    }

    /// Derived style of a layer (memoized).
    pub fn derived_style(&self, key: LayerKey) -> &CssPropertyMap {
        static EMPTY: OnceLock<CssPropertyMap> = OnceLock::new();
        let Some(layer) = self.layers.get(key) else {
            return EMPTY.get_or_init(CssPropertyMap::new);
        };
        layer.derived.get_or_init(|| self.compute_derived(key, layer))
    }

    /// Force derivation of every layer's style.
    ///
    /// Called before a tree is published so readers never trigger derivation.
    pub fn memoize_all(&self) {
        for key in self.layers.keys() {
            self.derived_style(key);
        }
    }

    fn compute_derived(&self, key: LayerKey, layer: &Layer) -> CssPropertyMap {
        if !layer.own_style.is_empty() {
            return layer.own_style.clone();
        }

        let mut union = CssPropertyMap::new();
        for &child in self.pruned_children(key) {
            for (name, value) in self.derived_style(child).iter() {
                match union.get(name) {
                    Some(existing) if existing != value => {
                        tracing::warn!(
                            target: targets::DESIGN,
                            layer = %self.breadcrumb(key),
                            property = name,
                            "children disagree on inherited property; deriving no style"
                        );
                        return CssPropertyMap::new();
                    }
                    Some(_) => {}
                    None => {
                        union.insert(name, value);
                    }
                }
            }
        }
        union
    }
}

fn insert_layer(
    document_key: &str,
    node: &DesignNode,
    parent: Option<LayerKey>,
    in_component: bool,
    layers: &mut SlotMap<LayerKey, Layer>,
    by_node: &mut HashMap<String, LayerKey>,
) -> LayerKey {
    let key = layers.insert(Layer {
        id: LayerId::new(document_key, &node.id),
        node_id: node.id.clone(),
        name: node.name.clone(),
        node_type: node.node_type(),
        component_id: node.kind.component_id().map(str::to_string),
        own_style: extract_style(node),
        parent,
        children: Vec::with_capacity(node.children.len()),
        in_component,
        derived: OnceLock::new(),
        pruned: OnceLock::new(),
    });
    by_node.insert(node.id.clone(), key);

    let children_in_component = in_component || node.node_type() == NodeType::Component;
    for child in &node.children {
        let child_key = insert_layer(document_key, child, Some(key), children_in_component, layers, by_node);
        layers[key].children.push(child_key);
    }
    key
}
