pub const NAMESPACE_SEP: char = '\\';

/// Strip trailing namespace separators so `Acme\Entity\` and `Acme\Entity`
/// address the same lookup scope. An empty prefix is the global scope.
pub fn normalize_prefix(prefix: &str) -> &str {
    prefix.trim_end_matches(NAMESPACE_SEP)
}

pub fn is_global(prefix: &str) -> bool {
    normalize_prefix(prefix).is_empty()
}
