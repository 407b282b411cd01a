//! String-keyed metadata carried by types and graphs.
//!
//! Metadata is free-form and flows through generation untouched; backends
//! read well-known keys (e.g. the VHDL primitive markers) and ignore the
//! rest. A `BTreeMap` keeps iteration and serialization deterministic.

use std::collections::BTreeMap;

/// A string-keyed metadata map.
pub type Meta = BTreeMap<String, String>;

/// Renders a metadata map as `[k=v, ...]` for error context and dumps.
pub fn meta_to_string(meta: &Meta) -> String {
    let inner: Vec<String> = meta.iter().map(|(k, v)| format!("{k}={v}")).collect();
    format!("[{}]", inner.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_meta() {
        assert_eq!(meta_to_string(&Meta::new()), "[]");
    }

    #[test]
    fn meta_is_sorted() {
        let mut meta = Meta::new();
        meta.insert("z".to_string(), "1".to_string());
        meta.insert("a".to_string(), "2".to_string());
        assert_eq!(meta_to_string(&meta), "[a=2, z=1]");
    }
}
