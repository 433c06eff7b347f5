//! Ordered field set.

use serde::{Serialize, Serializer, ser::SerializeMap};

/// Ordered `(name, value)` pairs destined for hidden form inputs.
///
/// Writing a name that is already present replaces its value in place, so
/// the first write fixes the position and the last write fixes the value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldSet {
    fields: Vec<(String, String)>,
}

impl FieldSet {
    /// Creates an empty field set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or overwrites a field.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(existing, _)| *existing == name) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((name, value)),
        }
    }

    /// Returns the value stored under `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.iter().find(|(existing, _)| existing == name).map(|(_, value)| value.as_str())
    }

    /// Returns true if `name` is present.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Iterates fields in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// Returns the number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if no fields are set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FieldSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut set = Self::new();
        for (name, value) in iter {
            set.insert(name, value);
        }
        set
    }
}

impl<K: Into<String>, V: Into<String>> Extend<(K, V)> for FieldSet {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (name, value) in iter {
            self.insert(name, value);
        }
    }
}

impl Serialize for FieldSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overwrite_keeps_position() {
        let mut set = FieldSet::new();
        set.insert("cmd", "_cart");
        set.insert("amount", "10.00");
        set.insert("cmd", "_xclick-subscriptions");

        let names: Vec<_> = set.iter().map(|(name, _)| name).collect();
        assert_eq!(names, ["cmd", "amount"]);
        assert_eq!(set.get("cmd"), Some("_xclick-subscriptions"));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_indexed_names_are_distinct() {
        let set: FieldSet =
            [("item_name_1", "Socks"), ("item_name_2", "Shoes")].into_iter().collect();
        assert_eq!(set.get("item_name_1"), Some("Socks"));
        assert_eq!(set.get("item_name_2"), Some("Shoes"));
    }

    #[test]
    fn test_missing_field() {
        let set = FieldSet::new();
        assert!(set.is_empty());
        assert!(!set.contains("amount"));
        assert_eq!(set.get("amount"), None);
    }

    #[test]
    fn test_extend_overwrites() {
        let mut set: FieldSet = [("currency_code", "USD")].into_iter().collect();
        set.extend([("currency_code", "CAD"), ("invoice", "#1000")]);
        assert_eq!(set.get("currency_code"), Some("CAD"));
        assert_eq!(set.len(), 2);
    }
}
