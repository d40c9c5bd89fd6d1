//! Path parameter extraction and storage.
//!
//! Parameters live in a small vector so that matching the common case of a
//! handful of parameters does not allocate.

use std::collections::HashMap;

use smallvec::SmallVec;

/// Maximum number of parameters stored inline (stack allocated).
const INLINE_PARAMS: usize = 4;

/// Extracted path parameters from a route match, in path order.
///
/// # Example
///
/// ```rust
/// use daedalus_router::Params;
///
/// let mut params = Params::new();
/// params.push("orgId", "acme");
/// params.push("id", "1");
///
/// assert_eq!(params.get("id"), Some("1"));
/// assert_eq!(params.get("unknown"), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Params {
    inner: SmallVec<[(String, String); INLINE_PARAMS]>,
}

impl Params {
    /// Creates a new empty parameter set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a parameter to the set.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.inner.push((name.into(), value.into()));
    }

    /// Returns the value for a parameter by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.inner
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Returns true if there are no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Returns the number of parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns an iterator over the parameters.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.inner.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Converts into the map carried by a request.
    #[must_use]
    pub fn into_map(self) -> HashMap<String, String> {
        self.inner.into_iter().collect()
    }
}

impl FromIterator<(String, String)> for Params {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            inner: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_push_and_get() {
        let mut params = Params::new();
        params.push("id", "123");
        params.push("name", "alice");

        assert_eq!(params.get("id"), Some("123"));
        assert_eq!(params.get("name"), Some("alice"));
        assert_eq!(params.get("unknown"), None);
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn test_params_into_map() {
        let params: Params = vec![("id".to_string(), "7".to_string())]
            .into_iter()
            .collect();
        let map = params.into_map();
        assert_eq!(map.get("id").map(String::as_str), Some("7"));
    }

    #[test]
    fn test_params_many_params() {
        let mut params = Params::new();
        for i in 0..10 {
            params.push(format!("key{i}"), format!("value{i}"));
        }

        assert_eq!(params.len(), 10);
        assert_eq!(params.get("key5"), Some("value5"));
    }
}
