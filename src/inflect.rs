//! English singularization for plural-tolerant property lookup.

use std::sync::Once;

fn ensure_rules() {
    static INIT: Once = Once::new();
    INIT.call_once(pluralizer::initialize);
}

/// Returns the singular form of `word`, or `word` unchanged when no rule applies.
pub fn singularize(word: &str) -> String {
    if word.is_empty() {
        return String::new();
    }
    ensure_rules();
    pluralizer::pluralize(word, 1, false)
}

/// Singularizes only the last `.`-separated component of a versioned name.
///
/// `v1.Deployments` becomes `v1.Deployment`; the namespace prefix is untouched.
pub fn singularize_versioned_name(name: &str) -> String {
    match name.rsplit_once('.') {
        Some((namespace, last)) => format!("{namespace}.{}", singularize(last)),
        None => singularize(name),
    }
}
