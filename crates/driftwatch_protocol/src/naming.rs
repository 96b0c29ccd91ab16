//! Filesystem-safe naming for artifact path components.

/// Returns true if the component is already filesystem-safe.
pub fn is_safe_component(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

/// Canonicalize a table-path component into a filesystem-safe identifier.
///
/// Unsafe names are slugged and suffixed with a short hash to avoid
/// collisions between names that slug to the same string.
pub fn safe_component(name: &str) -> String {
    if is_safe_component(name) {
        return name.to_string();
    }

    let mut slug = String::with_capacity(name.len());
    let mut last_was_underscore = false;
    for ch in name.chars() {
        let mapped = if ch.is_ascii_alphanumeric() {
            ch.to_ascii_lowercase()
        } else {
            '_'
        };

        if mapped == '_' {
            if last_was_underscore {
                continue;
            }
            last_was_underscore = true;
            slug.push('_');
        } else {
            last_was_underscore = false;
            slug.push(mapped);
        }
    }

    let slug = slug.trim_matches('_');
    let slug = if slug.is_empty() { "table" } else { slug };
    let hash = blake3::hash(name.as_bytes()).to_hex();
    format!("{}_{}", slug, &hash[..8])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn safe_component_preserves_safe_names() {
        assert_eq!(safe_component("orders_2024"), "orders_2024");
    }

    #[test]
    fn safe_component_hashes_unsafe_names() {
        let safe = safe_component("Orders/2024");
        assert!(safe.starts_with("orders_2024_"));
        assert!(is_safe_component(&safe));
        assert_ne!(safe, "orders_2024");
    }

    #[test]
    fn safe_component_handles_empty() {
        assert!(is_safe_component(&safe_component("")));
    }

    #[test]
    fn distinct_names_get_distinct_slugs() {
        assert_ne!(safe_component("a b"), safe_component("a-b"));
    }
}
