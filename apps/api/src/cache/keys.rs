//! Deterministic cache key derivation.
//!
//! Listing keys embed every inbound query parameter verbatim, serialized in
//! sorted key order so that `?a=1&b=2` and `?b=2&a=1` share one entry. All of
//! them sit under the collection's listing prefix, which is what the
//! invalidation sweep deletes.

use std::collections::BTreeMap;

use crate::models::Collection;

/// Key for a listing query: `<listing prefix><canonical JSON of params>`.
pub fn listing_key<'a, I>(collection: Collection, params: I) -> String
where
    I: IntoIterator<Item = (&'a String, &'a String)>,
{
    let canonical: BTreeMap<&str, &str> = params
        .into_iter()
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();
    // Serializing a map of strings cannot fail.
    let encoded = serde_json::to_string(&canonical).unwrap_or_default();
    format!("{}{}", collection.listing_prefix(), encoded)
}

/// Key for a single-record fetch.
pub fn record_key(collection: Collection, id: &str) -> String {
    format!("{}{}", collection.record_prefix(), id)
}

/// Key for the government "results out" view. Lives under the government
/// listing prefix so collection sweeps remove it too.
pub fn results_key() -> String {
    format!("{}results-out", Collection::GovernmentJobs.listing_prefix())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn params(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_parameter_order_does_not_change_key() {
        let a = params(&[("page", "2"), ("category", "Design"), ("q", "ui")]);
        let b = params(&[("q", "ui"), ("page", "2"), ("category", "Design")]);
        let key_a = listing_key(Collection::Jobs, a.iter().map(|(k, v)| (k, v)));
        let key_b = listing_key(Collection::Jobs, b.iter().map(|(k, v)| (k, v)));
        assert_eq!(key_a, key_b);
    }

    #[test]
    fn test_listing_key_encodes_values_verbatim_under_prefix() {
        let mut map = HashMap::new();
        map.insert("location".to_string(), "New Delhi".to_string());
        let key = listing_key(Collection::Jobs, &map);
        assert_eq!(key, r#"jobs:{"location":"New Delhi"}"#);
    }

    #[test]
    fn test_empty_params_key() {
        let map: HashMap<String, String> = HashMap::new();
        assert_eq!(listing_key(Collection::GovernmentJobs, &map), "government-jobs:{}");
    }

    #[test]
    fn test_different_values_produce_different_keys() {
        let a = params(&[("page", "1")]);
        let b = params(&[("page", "2")]);
        assert_ne!(
            listing_key(Collection::Jobs, a.iter().map(|(k, v)| (k, v))),
            listing_key(Collection::Jobs, b.iter().map(|(k, v)| (k, v)))
        );
    }

    #[test]
    fn test_record_and_results_keys() {
        assert_eq!(record_key(Collection::Jobs, "abc"), "job:abc");
        assert_eq!(record_key(Collection::GovernmentJobs, "abc"), "government-job:abc");
        assert!(results_key().starts_with(Collection::GovernmentJobs.listing_prefix()));
    }
}
