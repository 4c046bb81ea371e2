//! Property path syntax: dot-separated keys and bracketed indices,
//! e.g. `a.b[0].c`.

/// Splits a path into its first segment and the remainder.
///
/// A leading `[n]` is unwrapped to `n`. A remainder that starts with a
/// bracket keeps it (`a[0].b` → `a`, `[0].b`). Returns `None` for an empty or
/// malformed leading segment.
pub fn split_path(path: &str) -> Option<(&str, Option<&str>)> {
    let (entry, rest) = if let Some(inner) = path.strip_prefix('[') {
        let close = inner.find(']')?;
        let rest = &inner[close + 1..];
        (&inner[..close], rest.strip_prefix('.').unwrap_or(rest))
    } else {
        match path.find(['.', '[']) {
            Some(at) if path.as_bytes()[at] == b'.' => (&path[..at], &path[at + 1..]),
            Some(at) => (&path[..at], &path[at..]),
            None => (path, ""),
        }
    };

    if entry.is_empty() {
        return None;
    }

    Some((entry, (!rest.is_empty()).then_some(rest)))
}

/// Parses a segment that looks like a non-negative integer.
pub fn parse_index(segment: &str) -> Option<usize> {
    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    segment.parse().ok()
}

/// Path of a child cell under `parent`.
pub(crate) fn child_path(parent: &str, key: &str, indexed: bool) -> String {
    if indexed {
        format!("{parent}[{key}]")
    } else if parent.is_empty() {
        key.to_string()
    } else {
        format!("{parent}.{key}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_dotted_and_bracketed() {
        assert_eq!(split_path("a.b[0].c"), Some(("a", Some("b[0].c"))));
        assert_eq!(split_path("b[0].c"), Some(("b", Some("[0].c"))));
        assert_eq!(split_path("[0].c"), Some(("0", Some("c"))));
        assert_eq!(split_path("[12][3]"), Some(("12", Some("[3]"))));
        assert_eq!(split_path("c"), Some(("c", None)));
    }

    #[test]
    fn test_split_rejects_malformed() {
        assert_eq!(split_path(""), None);
        assert_eq!(split_path(".a"), None);
        assert_eq!(split_path("[0"), None);
        assert_eq!(split_path("[]"), None);
    }

    #[test]
    fn test_parse_index() {
        assert_eq!(parse_index("0"), Some(0));
        assert_eq!(parse_index("42"), Some(42));
        assert_eq!(parse_index("-1"), None);
        assert_eq!(parse_index("+1"), None);
        assert_eq!(parse_index("a1"), None);
        assert_eq!(parse_index(""), None);
    }

    #[test]
    fn test_child_path() {
        assert_eq!(child_path("", "a", false), "a");
        assert_eq!(child_path("a", "b", false), "a.b");
        assert_eq!(child_path("a.b", "0", true), "a.b[0]");
    }
}
