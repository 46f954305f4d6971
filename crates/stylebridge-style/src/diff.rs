//! Semantic diff between a stylesheet scope and a design layer.
//!
//! Both sides are expanded to longhands first. A layer property is
//! *missing* when any of its longhands is absent from the scope, and
//! *mismatched* when all of its longhands are present but at least one value
//! differs. A property is never both. Results are reported under the layer's
//! original property name and value, which is what a user would type to fix
//! the stylesheet.

use std::borrow::Cow;

use stylebridge_core::CssPropertyMap;

use crate::color::CssColor;
use crate::scope::{ComputedStyle, Longhand};
use crate::shorthand::{expand_all, expand_shorthand};
use crate::source::SourceRange;

/// Compare two values of a property for semantic equality.
///
/// Properties whose name contains `color` compare as RGBA colors, falling
/// back to plain comparison when either side does not parse. Everything
/// else compares trimmed text.
///
/// # Example
///
/// ```
/// use stylebridge_style::values_equal;
///
/// assert!(values_equal("color", "#FFFFFF", "rgb(255, 255, 255)"));
/// assert!(values_equal("background-color", "transparent", "rgba(0,0,0,0)"));
/// assert!(!values_equal("background-color", "transparent", "rgba(10,10,10,0)"));
/// assert!(!values_equal("font-size", "12px", "12.0px"));
/// ```
pub fn values_equal(name: &str, left: &str, right: &str) -> bool {
    let (left, right) = (left.trim(), right.trim());
    if name.contains("color")
        && let (Some(l), Some(r)) = (CssColor::parse(left), CssColor::parse(right))
    {
        return l == r;
    }
    left == right
}

/// A layer property the scope declares with a different value.
#[derive(Debug, Clone, PartialEq)]
pub struct Mismatch {
    /// Property name as the layer states it.
    pub name: String,
    /// The layer's value.
    pub expected: String,
    /// The scope declaration that supplied the first differing longhand.
    pub declared_by: String,
    /// Range of that declaration, when the scope recorded one.
    pub range: Option<SourceRange>,
}

/// Outcome of comparing one scope with one layer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reconciliation {
    /// Layer properties absent from the scope.
    pub missing: CssPropertyMap,
    /// Layer properties whose values differ.
    pub mismatched: Vec<Mismatch>,
}

impl Reconciliation {
    /// Check whether the two sides agree.
    pub fn is_clean(&self) -> bool {
        self.missing.is_empty() && self.mismatched.is_empty()
    }
}

enum Comparison<'s> {
    Missing,
    Mismatched(&'s Longhand),
    Equal,
}

struct ExpandedScope<'a> {
    longhands: Cow<'a, [Longhand]>,
}

impl ExpandedScope<'_> {
    /// Longhands of a flat declaration map, later declarations winning.
    fn from_map(style: &CssPropertyMap) -> Self {
        let longhands = expand_all(style.iter())
            .into_iter()
            .map(|(name, value, declared_by)| Longhand {
                name,
                value,
                declared_by: declared_by.to_string(),
                range: None,
            })
            .collect::<Vec<_>>();
        Self {
            longhands: Cow::Owned(longhands),
        }
    }

    fn get(&self, name: &str) -> Option<&Longhand> {
        self.longhands.iter().find(|longhand| longhand.name == name)
    }

    fn compare(&self, name: &str, value: &str) -> Comparison<'_> {
        let mut mismatch = None;
        for (longhand, expected) in expand_shorthand(name, value) {
            match self.get(&longhand) {
                None => return Comparison::Missing,
                Some(declared) => {
                    if mismatch.is_none() && !values_equal(&longhand, &expected, &declared.value) {
                        mismatch = Some(declared);
                    }
                }
            }
        }
        match mismatch {
            Some(declared) => Comparison::Mismatched(declared),
            None => Comparison::Equal,
        }
    }
}

impl<'a> From<&'a ComputedStyle> for ExpandedScope<'a> {
    fn from(style: &'a ComputedStyle) -> Self {
        Self {
            longhands: Cow::Borrowed(style.longhands()),
        }
    }
}

/// Layer properties with a longhand the scope does not declare.
///
/// # Example
///
/// ```
/// use stylebridge_core::CssPropertyMap;
/// use stylebridge_style::find_missing_properties;
///
/// let scope: CssPropertyMap = [("color", "#FFFFFF")].into_iter().collect();
/// let layer: CssPropertyMap = [("color", "#FFFFFF"), ("font-size", "12px")].into_iter().collect();
///
/// let missing = find_missing_properties(&scope, &layer);
/// assert_eq!(missing, [("font-size", "12px")].into_iter().collect::<CssPropertyMap>());
/// ```
pub fn find_missing_properties(scope: &CssPropertyMap, layer: &CssPropertyMap) -> CssPropertyMap {
    let expanded = ExpandedScope::from_map(scope);
    layer
        .iter()
        .filter(|(name, value)| matches!(expanded.compare(name, value), Comparison::Missing))
        .collect()
}

/// Layer properties the scope fully declares but with a different value.
///
/// Values are the layer's.
pub fn diff_intersecting_properties(scope: &CssPropertyMap, layer: &CssPropertyMap) -> CssPropertyMap {
    let expanded = ExpandedScope::from_map(scope);
    layer
        .iter()
        .filter(|(name, value)| matches!(expanded.compare(name, value), Comparison::Mismatched(_)))
        .collect()
}

/// Compare a scope's computed style with a layer's derived style.
pub fn reconcile(scope: &ComputedStyle, layer: &CssPropertyMap) -> Reconciliation {
    let expanded = ExpandedScope::from(scope);
    let mut result = Reconciliation::default();

    for (name, value) in layer.iter() {
        match expanded.compare(name, value) {
            Comparison::Missing => {
                result.missing.insert(name, value);
            }
            Comparison::Mismatched(declared) => result.mismatched.push(Mismatch {
                name: name.to_string(),
                expected: value.to_string(),
                declared_by: declared.declared_by.clone(),
                range: declared.range,
            }),
            Comparison::Equal => {}
        }
    }

    tracing::trace!(
        target: stylebridge_core::logging::targets::STYLE,
        missing = result.missing.len(),
        mismatched = result.mismatched.len(),
        "reconciled scope with layer"
    );
    result
}
