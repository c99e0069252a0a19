//! Pure operations on dotted string keys.
//!
//! Keys are strings of `.`-separated segments (`"Rocket.Sustainer.mass"`).
//! The functions here are the only place the crate reasons about keys as
//! trees; the definition model itself stays a flat map.

/// Returns the level of a key: the number of segments minus one.
///
/// A bare segment is level 0; the empty key is level -1.
///
/// ```
/// assert_eq!(simdef::key::level("Rocket"), 0);
/// assert_eq!(simdef::key::level("Rocket.name"), 1);
/// assert_eq!(simdef::key::level(""), -1);
/// ```
pub fn level(key: &str) -> isize {
    if key.is_empty() {
        -1
    } else {
        key.matches('.').count() as isize
    }
}

/// Returns true if `child` sits anywhere below `parent`.
///
/// Every key is a sub-key of the empty key. A key is not a sub-key of
/// itself.
///
/// ```
/// assert!(simdef::key::is_sub_key("Rocket", "Rocket.name"));
/// assert!(!simdef::key::is_sub_key("SimControl", "Rocket.name"));
/// assert!(simdef::key::is_sub_key("", "Rocket.name"));
/// ```
pub fn is_sub_key(parent: &str, child: &str) -> bool {
    if parent.is_empty() {
        return true;
    }
    child.len() > parent.len()
        && child.starts_with(parent)
        && child.as_bytes()[parent.len()] == b'.'
}

/// Splits `key` after the segment at `prefix_level`, returning the prefix
/// (first `prefix_level + 1` segments) and the remainder.
///
/// ```
/// assert_eq!(simdef::key::split_at_level("Rocket.Sustainer.position", 1),
///            ("Rocket.Sustainer", "position"));
/// assert_eq!(simdef::key::split_at_level("Rocket", 0), ("Rocket", ""));
/// ```
pub fn split_at_level(key: &str, prefix_level: isize) -> (&str, &str) {
    if prefix_level < 0 {
        return ("", key);
    }
    let prefix_segments = prefix_level as usize + 1;
    let mut dots = 0;
    for (i, c) in key.char_indices() {
        if c == '.' {
            dots += 1;
            if dots == prefix_segments {
                return (&key[..i], &key[i + 1..]);
            }
        }
    }
    (key, "")
}

/// Returns the ancestor of `key` at the given level (its first
/// `desired_level + 1` segments).
pub fn parent_at_level(key: &str, desired_level: isize) -> &str {
    split_at_level(key, desired_level).0
}

/// Returns the prefix of `child` one level below `parent`, or `None` when
/// `child` is not a sub-key of `parent`.
///
/// ```
/// assert_eq!(simdef::key::immediate_sub_key("Rocket", "Rocket.Sustainer.name"),
///            Some("Rocket.Sustainer"));
/// ```
pub fn immediate_sub_key<'a>(parent: &str, child: &'a str) -> Option<&'a str> {
    if !is_sub_key(parent, child) {
        return None;
    }
    Some(parent_at_level(child, level(parent) + 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level() {
        assert_eq!(level(""), -1);
        assert_eq!(level("Rocket"), 0);
        assert_eq!(level("Rocket.name"), 1);
        assert_eq!(level("Rocket.Sustainer.Nosecone.mass"), 3);
    }

    #[test]
    fn test_is_sub_key() {
        assert!(is_sub_key("Rocket", "Rocket.name"));
        assert!(is_sub_key("Rocket", "Rocket.Sustainer.Nosecone.mass"));
        assert!(!is_sub_key("SimControl", "Rocket.name"));
        assert!(is_sub_key("", "Rocket.name"));
        assert!(is_sub_key("", ""));
        // A key is not its own sub-key, and segment prefixes don't count.
        assert!(!is_sub_key("Rocket", "Rocket"));
        assert!(!is_sub_key("Rocket", "RocketScience.name"));
    }

    #[test]
    fn test_split_at_level() {
        assert_eq!(split_at_level("Rocket", 0), ("Rocket", ""));
        assert_eq!(split_at_level("Rocket.Sustainer", 0), ("Rocket", "Sustainer"));
        assert_eq!(
            split_at_level("Rocket.Sustainer.position", 1),
            ("Rocket.Sustainer", "position")
        );
        assert_eq!(split_at_level("Rocket.name", -1), ("", "Rocket.name"));
        // Levels past the end keep the whole key as the prefix.
        assert_eq!(split_at_level("Rocket.name", 5), ("Rocket.name", ""));
    }

    #[test]
    fn test_parent_at_level() {
        let key = "Rocket.Sustainer.Nosecone.mass";
        assert_eq!(parent_at_level(key, 0), "Rocket");
        assert_eq!(parent_at_level(key, 1), "Rocket.Sustainer");
        assert_eq!(parent_at_level(key, 2), "Rocket.Sustainer.Nosecone");
    }

    #[test]
    fn test_immediate_sub_key() {
        assert_eq!(
            immediate_sub_key("Rocket", "Rocket.Sustainer.name"),
            Some("Rocket.Sustainer")
        );
        assert_eq!(immediate_sub_key("Rocket", "Rocket.name"), Some("Rocket.name"));
        assert_eq!(immediate_sub_key("", "Rocket.name"), Some("Rocket"));
        assert_eq!(immediate_sub_key("SimControl", "Rocket.name"), None);
    }
}
