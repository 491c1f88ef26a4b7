use indexmap::IndexMap;
use serde_json::{Map, Value};

/// Name of the field carrying the signature. Never part of the signed payload.
pub const DIGEST_FIELD: &str = "digest";

/// An ordered list of gateway parameters.
///
/// The digest is computed over the values in insertion order, so this type
/// never reorders entries. Names are indexed, so building a set from a
/// posted body stays linear in the number of fields.
#[derive(Debug, Clone, Default)]
pub struct ParameterSet {
    entries: IndexMap<String, String>,
}

/// Equality is order-sensitive, unlike `IndexMap`'s own.
impl PartialEq for ParameterSet {
    fn eq(&self, other: &Self) -> bool {
        self.entries.iter().eq(other.entries.iter())
    }
}

impl Eq for ParameterSet {}

impl ParameterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a set from raw form pairs.
    ///
    /// A repeated name keeps the position of its first occurrence and the
    /// value of its last one, the same way form data collapses into a map.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut set = Self::new();
        for (name, value) in pairs {
            set.insert(name, value);
        }
        set
    }

    /// Appends a parameter at the end of the set, moving it there if the
    /// name already exists.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        self.entries.shift_remove(&name);
        self.entries.insert(name, value.into());
    }

    /// Replaces the value of an existing parameter in place, or appends it.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    /// Removes a parameter, returning its value. Remaining entries keep their order.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.entries.shift_remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.entries.values().map(String::as_str)
    }

    /// All values joined without separator, in order.
    pub fn concatenated(&self) -> String {
        self.values().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_pairs(self) -> Vec<(String, String)> {
        self.entries.into_iter().collect()
    }

    /// JSON object view used for payment info data and the audit log.
    pub fn to_map(&self) -> Map<String, Value> {
        self.iter()
            .map(|(n, v)| (n.to_string(), Value::String(v.to_string())))
            .collect()
    }
}
