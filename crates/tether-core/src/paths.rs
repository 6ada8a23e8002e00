//! Remote path helpers. Remote paths are always '/'-separated strings,
//! independent of the local platform.

/// Last component of a remote path, ignoring trailing slashes.
///
/// `"/srv/data/r.txt"` → `"r.txt"`, `"/srv/data/"` → `"data"`, `"/"` → `""`.
pub fn remote_basename(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    match trimmed.rfind('/') {
        Some(idx) => &trimmed[idx + 1..],
        None => trimmed,
    }
}

/// Concatenate a destination prefix and a file name.
///
/// Prefixes are joined verbatim: callers include the trailing separator
/// themselves, so `"/x/"` + `"b.txt"` is `"/x/b.txt"` and `"out-"` +
/// `"b.txt"` is `"out-b.txt"`.
pub fn prefixed(prefix: &str, name: &str) -> String {
    let mut s = String::with_capacity(prefix.len() + name.len());
    s.push_str(prefix);
    s.push_str(name);
    s
}

/// Cumulative ancestors of a remote path, shallowest first, used for
/// recursive directory creation.
///
/// `"/a/b/c"` → `["/a", "/a/b", "/a/b/c"]`, `"a/b"` → `["a", "a/b"]`.
pub fn remote_ancestors(path: &str) -> Vec<String> {
    let absolute = path.starts_with('/');
    let mut current = String::new();
    let mut out = Vec::new();

    for part in path.split('/').filter(|s| !s.is_empty()) {
        if absolute || !current.is_empty() {
            current.push('/');
        }
        current.push_str(part);
        out.push(current.clone());
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basename_variants() {
        assert_eq!(remote_basename("/srv/data/r.txt"), "r.txt");
        assert_eq!(remote_basename("r.txt"), "r.txt");
        assert_eq!(remote_basename("/srv/data/"), "data");
        assert_eq!(remote_basename("/"), "");
    }

    #[test]
    fn prefix_is_concatenated_verbatim() {
        assert_eq!(prefixed("/x/", "b.txt"), "/x/b.txt");
        assert_eq!(prefixed("", "b.txt"), "b.txt");
        assert_eq!(prefixed("/x", "b.txt"), "/xb.txt");
    }

    #[test]
    fn ancestors_absolute_and_relative() {
        assert_eq!(remote_ancestors("/a/b/c/"), vec!["/a", "/a/b", "/a/b/c"]);
        assert_eq!(remote_ancestors("a/b"), vec!["a", "a/b"]);
        assert!(remote_ancestors("/").is_empty());
    }
}
