//! Flat CSS property maps.

use std::fmt;

/// An insertion-ordered map of CSS property name to literal value.
///
/// Keys are unique; setting an existing key replaces its value in place
/// (most recently set wins). Equality ignores ordering.
///
/// # Example
///
/// ```
/// use stylebridge_core::CssPropertyMap;
///
/// let mut style = CssPropertyMap::new();
/// style.insert("color", "#FFFFFF");
/// style.insert("font-size", "12px");
/// style.insert("color", "#000000");
///
/// assert_eq!(style.get("color"), Some("#000000"));
/// assert_eq!(style.len(), 2);
/// ```
#[derive(Debug, Clone, Default, Eq)]
pub struct CssPropertyMap {
    entries: Vec<(String, String)>,
}

impl CssPropertyMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a property, returning the previous value if there was one.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => Some(std::mem::replace(existing, value)),
            None => {
                self.entries.push((name, value));
                None
            }
        }
    }

    /// Get a property value.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Check if a property is set.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(n, _)| n == name)
    }

    /// Remove a property, returning its value.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        let pos = self.entries.iter().position(|(n, _)| n == name)?;
        Some(self.entries.remove(pos).1)
    }

    /// Number of properties.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the map is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(name, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Iterate over property names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }
}

impl PartialEq for CssPropertyMap {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|(n, v)| other.get(n) == Some(v))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for CssPropertyMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}

impl<K: Into<String>, V: Into<String>> Extend<(K, V)> for CssPropertyMap {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (name, value) in iter {
            self.insert(name, value);
        }
    }
}

impl IntoIterator for CssPropertyMap {
    type Item = (String, String);
    type IntoIter = std::vec::IntoIter<(String, String)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Formats the map as a declaration list (`name: value;` per line).
impl fmt::Display for CssPropertyMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, value) in self.iter() {
            writeln!(f, "{name}: {value};")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_replaces_in_place() {
        let mut map = CssPropertyMap::new();
        map.insert("a", "1");
        map.insert("b", "2");
        assert_eq!(map.insert("a", "3"), Some("1".to_string()));

        let names: Vec<_> = map.names().collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(map.get("a"), Some("3"));
    }

    #[test]
    fn equality_ignores_order() {
        let left: CssPropertyMap = [("color", "red"), ("width", "1px")].into_iter().collect();
        let right: CssPropertyMap = [("width", "1px"), ("color", "red")].into_iter().collect();
        assert_eq!(left, right);

        let other: CssPropertyMap = [("width", "2px"), ("color", "red")].into_iter().collect();
        assert_ne!(left, other);
    }

    #[test]
    fn remove_and_display() {
        let mut map: CssPropertyMap = [("color", "red"), ("width", "1px")].into_iter().collect();
        assert_eq!(map.remove("color"), Some("red".to_string()));
        assert!(map.remove("color").is_none());
        assert_eq!(map.to_string(), "width: 1px;\n");
    }
}
