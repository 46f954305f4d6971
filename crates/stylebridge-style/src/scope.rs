//! Lexical scope tree of a parsed stylesheet.
//!
//! Every nested selector block of a stylesheet becomes a [`StylesheetScope`]
//! holding its variable bindings, its declared properties (variables already
//! substituted) and the source ranges of everything it declares. Scopes live
//! in an arena owned by the [`ScopeTree`]; parent links are arena keys used
//! for upward lookups only.
//!
//! The tree is built by the stylesheet parser in a single pass and is not
//! mutated afterwards. A new parse produces a new tree.

use std::collections::HashMap;

use slotmap::{SlotMap, new_key_type};
use stylebridge_core::CssPropertyMap;

use crate::shorthand::expand_all;
use crate::source::SourceRange;

/// Range key under which a scope stores the span of its selector.
pub const SELECTOR_RANGE_KEY: &str = "selector";

/// Token standing for the parent selector.
pub const PARENT_REFERENCE: char = '&';

/// Properties whose values flow from a scope into its descendants.
const INHERITED_PROPERTIES: &[&str] = &[
    "color",
    "line-height",
    "letter-spacing",
    "text-align",
    "text-indent",
    "text-transform",
    "cursor",
    "visibility",
    "white-space",
    "word-spacing",
];

/// Check whether a property is inherited by descendant scopes.
pub fn is_inherited(property: &str) -> bool {
    property.starts_with("font") || INHERITED_PROPERTIES.contains(&property)
}

new_key_type! {
    /// Arena key of a scope within one [`ScopeTree`].
    pub struct ScopeKey;
}

/// One nested selector block.
#[derive(Debug, Clone)]
pub struct StylesheetScope {
    selector: String,
    variables: HashMap<String, String>,
    properties: CssPropertyMap,
    ranges: HashMap<String, SourceRange>,
    parent: Option<ScopeKey>,
    children: Vec<ScopeKey>,
}

impl StylesheetScope {
    fn new(selector: impl Into<String>, parent: Option<ScopeKey>) -> Self {
        Self {
            selector: selector.into(),
            variables: HashMap::new(),
            properties: CssPropertyMap::new(),
            ranges: HashMap::new(),
            parent,
            children: Vec::new(),
        }
    }

    /// Raw selector as written, possibly containing `&`.
    pub fn selector(&self) -> &str {
        &self.selector
    }

    /// Declared properties with variables substituted.
    pub fn properties(&self) -> &CssPropertyMap {
        &self.properties
    }

    /// Raw value of a variable bound in this scope.
    pub fn variable(&self, name: &str) -> Option<&str> {
        self.variables.get(variable_key(name)).map(String::as_str)
    }

    /// Source range recorded under a key: a property name, `@variable` or
    /// [`SELECTOR_RANGE_KEY`].
    pub fn range(&self, key: &str) -> Option<SourceRange> {
        self.ranges.get(key).copied()
    }

    /// Range of the selector.
    pub fn selector_range(&self) -> Option<SourceRange> {
        self.range(SELECTOR_RANGE_KEY)
    }

    /// Parent scope.
    pub fn parent(&self) -> Option<ScopeKey> {
        self.parent
    }

    /// Child scopes, in document order.
    pub fn children(&self) -> &[ScopeKey] {
        &self.children
    }
}

/// One longhand of a computed style and the declaration that supplied it.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Longhand {
    pub(crate) name: String,
    pub(crate) value: String,
    /// Property name of the declaration, possibly a shorthand.
    pub(crate) declared_by: String,
    pub(crate) range: Option<SourceRange>,
}

/// Properties visible in a scope with the range of the declaring text.
///
/// Shadowing is decided per longhand: a scope's own `font-size` hides the
/// size part of an ancestor's `font`, while the ancestor still supplies the
/// other parts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComputedStyle {
    properties: CssPropertyMap,
    ranges: HashMap<String, SourceRange>,
    longhands: Vec<Longhand>,
}

impl ComputedStyle {
    /// Merge the declarations of one scope that pass `filter`.
    ///
    /// Scopes are merged nearest first, so anything already present wins.
    fn merge(&mut self, scope: &StylesheetScope, filter: impl Fn(&str) -> bool) {
        let declarations = scope.properties.iter().filter(|(name, _)| filter(*name));
        for (name, value, declared_by) in expand_all(declarations) {
            if self.longhands.iter().any(|longhand| longhand.name == name) {
                continue;
            }
            self.longhands.push(Longhand {
                name,
                value,
                declared_by: declared_by.to_string(),
                range: scope.range(declared_by),
            });
        }

        for (name, value) in scope.properties.iter().filter(|(name, _)| filter(*name)) {
            if self.properties.contains(name) {
                continue;
            }
            self.properties.insert(name, value);
            if let Some(range) = scope.range(name) {
                self.ranges.insert(name.to_string(), range);
            }
        }
    }

    /// The visible declarations by property name, nearest first.
    pub fn properties(&self) -> &CssPropertyMap {
        &self.properties
    }

    /// Range of the declaration that supplied a property.
    pub fn range(&self, name: &str) -> Option<SourceRange> {
        self.ranges.get(name).copied()
    }

    /// Effective longhand values.
    pub(crate) fn longhands(&self) -> &[Longhand] {
        &self.longhands
    }
}

/// Arena of scopes for one parsed stylesheet.
#[derive(Debug, Clone)]
pub struct ScopeTree {
    scopes: SlotMap<ScopeKey, StylesheetScope>,
    base: ScopeKey,
}

impl ScopeTree {
    /// Create a tree holding only the base scope.
    pub fn new(base_selector: impl Into<String>) -> Self {
        let mut scopes = SlotMap::with_key();
        let base = scopes.insert(StylesheetScope::new(base_selector, None));
        Self { scopes, base }
    }

    /// The synthetic base scope; it has no parent.
    pub fn base(&self) -> ScopeKey {
        self.base
    }

    /// Number of scopes, base included.
    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    /// Always false: the base scope exists from construction.
    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    /// Get a scope by key.
    pub fn get(&self, key: ScopeKey) -> Option<&StylesheetScope> {
        self.scopes.get(key)
    }

    /// Add a child scope under `parent`.
    ///
    /// Returns `None` when `parent` is not a scope of this tree.
    pub fn add_scope(&mut self, parent: ScopeKey, selector: impl Into<String>) -> Option<ScopeKey> {
        if !self.scopes.contains_key(parent) {
            return None;
        }
        let key = self.scopes.insert(StylesheetScope::new(selector, Some(parent)));
        self.scopes.get_mut(parent)?.children.push(key);
        Some(key)
    }

    /// Bind a variable in a scope.
    ///
    /// The value is stored raw; references inside it are resolved when a
    /// declaration uses the variable.
    pub fn bind_variable(
        &mut self,
        key: ScopeKey,
        name: &str,
        value: impl Into<String>,
        range: Option<SourceRange>,
    ) {
        let Some(scope) = self.scopes.get_mut(key) else {
            return;
        };
        let name = variable_key(name);
        scope.variables.insert(name.to_string(), value.into());
        if let Some(range) = range {
            scope.ranges.insert(format!("@{name}"), range);
        }
    }

    /// Declare a property in a scope, substituting variables visible there
    /// right now.
    pub fn declare(&mut self, key: ScopeKey, name: &str, value: &str, range: Option<SourceRange>) {
        let resolved = self.substitute_variables(key, value);
        let Some(scope) = self.scopes.get_mut(key) else {
            return;
        };
        scope.properties.insert(name, resolved);
        if let Some(range) = range {
            scope.ranges.insert(name.to_string(), range);
        }
    }

    /// Record a range under an arbitrary key.
    pub fn set_range(&mut self, key: ScopeKey, range_key: &str, range: SourceRange) {
        if let Some(scope) = self.scopes.get_mut(key) {
            scope.ranges.insert(range_key.to_string(), range);
        }
    }

    /// Resolve a variable by lexical lookup: the scope itself, then each
    /// ancestor.
    ///
    /// Unknown variables resolve to their literal `@name` so that typos
    /// stay visible.
    ///
    /// # Example
    ///
    /// ```
    /// use stylebridge_style::ScopeTree;
    ///
    /// let mut tree = ScopeTree::new("body");
    /// let base = tree.base();
    /// tree.bind_variable(base, "@gap", "8px", None);
    /// let card = tree.add_scope(base, ".card").unwrap();
    ///
    /// assert_eq!(tree.resolve_variable(card, "@gap"), "8px");
    /// assert_eq!(tree.resolve_variable(card, "@gpa"), "@gpa");
    /// ```
    pub fn resolve_variable(&self, key: ScopeKey, name: &str) -> String {
        let name = variable_key(name);
        let mut current = Some(key);
        while let Some(scope) = current.and_then(|k| self.scopes.get(k)) {
            if let Some(value) = scope.variables.get(name) {
                return value.clone();
            }
            current = scope.parent;
        }
        format!("@{name}")
    }

    /// Replace every `@name` reference in a value.
    ///
    /// Values bound to variables may reference other variables; those are
    /// followed a bounded number of times.
    pub fn substitute_variables(&self, key: ScopeKey, value: &str) -> String {
        let mut current = value.to_string();
        for _ in 0..MAX_VARIABLE_DEPTH {
            let next = self.substitute_once(key, &current);
            if next == current {
                break;
            }
            current = next;
        }
        current
    }

    fn substitute_once(&self, key: ScopeKey, value: &str) -> String {
        let mut out = String::with_capacity(value.len());
        let mut rest = value;
        while let Some(at) = rest.find('@') {
            out.push_str(&rest[..at]);
            let after = &rest[at + 1..];
            let len = after
                .find(|c: char| !(c.is_alphanumeric() || c == '-' || c == '_'))
                .unwrap_or(after.len());
            if len == 0 {
                out.push('@');
            } else {
                out.push_str(&self.resolve_variable(key, &after[..len]));
            }
            rest = &after[len..];
        }
        out.push_str(rest);
        out
    }

    /// Fully composed selector of a scope.
    ///
    /// `&` is replaced by the parent's resolved selector; without `&` the
    /// parent's resolved selector and this one are joined by a space. The
    /// base scope resolves to its own selector.
    pub fn resolved_selector(&self, key: ScopeKey) -> String {
        let Some(scope) = self.scopes.get(key) else {
            return String::new();
        };
        match scope.parent {
            None => scope.selector.clone(),
            Some(parent) => {
                let parent_selector = self.resolved_selector(parent);
                if scope.selector.contains(PARENT_REFERENCE) {
                    scope
                        .selector
                        .replace(PARENT_REFERENCE, &parent_selector)
                } else {
                    format!("{parent_selector} {}", scope.selector)
                }
            }
        }
    }

    /// Name linking a scope to design layers; the resolved selector.
    pub fn css_scope_name(&self, key: ScopeKey) -> String {
        self.resolved_selector(key)
    }

    /// Find a scope by its fully composed selector, depth first.
    pub fn get_scope(&self, css_scope_name: &str) -> Option<ScopeKey> {
        self.preorder()
            .into_iter()
            .find(|&key| self.css_scope_name(key) == css_scope_name)
    }

    /// Composed selectors of every scope, parents before children.
    pub fn all_selectors(&self) -> Vec<String> {
        self.preorder()
            .into_iter()
            .map(|key| self.css_scope_name(key))
            .collect()
    }

    /// Scope keys in document order, parents before children.
    pub fn preorder(&self) -> Vec<ScopeKey> {
        let mut order = Vec::with_capacity(self.scopes.len());
        let mut stack = vec![self.base];
        while let Some(key) = stack.pop() {
            let Some(scope) = self.scopes.get(key) else {
                continue;
            };
            order.push(key);
            stack.extend(scope.children.iter().rev().copied());
        }
        order
    }

    /// Own properties plus the inherited properties of every ancestor.
    ///
    /// A nearer declaration shadows a farther one.
    pub fn computed_style(&self, key: ScopeKey) -> ComputedStyle {
        let mut computed = ComputedStyle::default();
        let Some(scope) = self.scopes.get(key) else {
            return computed;
        };
        computed.merge(scope, |_: &str| true);

        let mut current = scope.parent;
        while let Some(ancestor) = current.and_then(|k| self.scopes.get(k)) {
            computed.merge(ancestor, is_inherited);
            current = ancestor.parent;
        }
        computed
    }
}

const MAX_VARIABLE_DEPTH: usize = 16;

fn variable_key(name: &str) -> &str {
    name.strip_prefix('@').unwrap_or(name)
}
