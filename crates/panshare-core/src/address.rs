//! Address scheme: canonical paths and scope tokens.
//!
//! The first path segment picks the scope. `0` is the drive; a segment shaped
//! like `xxxx-yyyy` or `xxxx-yyyy:pwd4` is a shared link; anything else is a
//! drive path with the leading `0` omitted.

use crate::model::ShareScope;
use regex::Regex;
use std::sync::LazyLock;

/// Segment naming the drive scope.
pub const DRIVE_SEGMENT: &str = "0";

/// Canonical path of the drive root.
pub const DRIVE_PATH: &str = "/0";

/// Canonical path of the synthetic root.
pub const ROOT_PATH: &str = "/";

/// Well-known client probes that are never part of the namespace.
const WELL_KNOWN_PROBES: &[&str] = &["favicon.ico"];

static SHARE_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9]{4,}-[A-Za-z0-9]{4,}(?::.{4})?$").expect("share token pattern")
});

/// A normalized path: single leading slash, no trailing slash, no empty segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalPath {
    segments: Vec<String>,
}

impl CanonicalPath {
    /// Normalize an arbitrary, possibly malformed path.
    ///
    /// Repeated and trailing slashes collapse; a missing leading slash is
    /// added; the empty path is the root.
    pub fn parse(raw: &str) -> Self {
        Self {
            segments: raw
                .split('/')
                .filter(|s| !s.is_empty())
                .map(str::to_owned)
                .collect(),
        }
    }

    /// Path segments, root first.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Whether this is the synthetic root.
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// The canonical string form.
    pub fn as_string(&self) -> String {
        prefix(&self.segments, self.segments.len())
    }

    /// Whether this names a well-known non-namespace resource.
    pub fn is_well_known_probe(&self) -> bool {
        matches!(self.segments.as_slice(), [only] if WELL_KNOWN_PROBES.contains(&only.as_str()))
    }

    /// Make the drive scope explicit.
    ///
    /// If the first segment is neither `0` nor a share token, the path lives
    /// under the drive and an implicit `0` segment is prepended.
    pub fn with_explicit_scope(mut self) -> (Self, ScopeToken) {
        let token = self
            .segments
            .first()
            .map_or(ScopeToken::Drive, |first| ScopeToken::classify(first));
        if matches!(token, ScopeToken::Drive)
            && self.segments.first().map(String::as_str) != Some(DRIVE_SEGMENT)
        {
            self.segments.insert(0, DRIVE_SEGMENT.to_string());
        }
        (self, token)
    }
}

/// Canonical path of the first `len` segments.
pub fn prefix(segments: &[String], len: usize) -> String {
    if len == 0 {
        return ROOT_PATH.to_string();
    }
    let mut path = String::new();
    for segment in &segments[..len] {
        path.push('/');
        path.push_str(segment);
    }
    path
}

/// Canonical path of a child named `name` under `parent`.
pub fn join(parent: &str, name: &str) -> String {
    if parent == ROOT_PATH {
        format!("/{name}")
    } else {
        format!("{parent}/{name}")
    }
}

/// Classification of a path's first segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeToken {
    /// The account's own drive.
    Drive,
    /// A shared link.
    Share(ShareScope),
}

impl ScopeToken {
    /// Classify a first path segment.
    pub fn classify(segment: &str) -> Self {
        if !SHARE_TOKEN.is_match(segment) {
            return ScopeToken::Drive;
        }
        let (key, password) = segment.split_once(':').unwrap_or((segment, ""));
        ScopeToken::Share(ShareScope::new(key, password))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_normalize() {
        assert_eq!(CanonicalPath::parse("").as_string(), "/");
        assert_eq!(CanonicalPath::parse("/").as_string(), "/");
        assert_eq!(CanonicalPath::parse("///").as_string(), "/");
        assert_eq!(CanonicalPath::parse("//0//a/").as_string(), "/0/a");
        assert_eq!(CanonicalPath::parse("0/a").as_string(), "/0/a");
        assert_eq!(CanonicalPath::parse("/0/a").as_string(), "/0/a");
    }

    #[test]
    fn test_classify_share() {
        assert_eq!(
            ScopeToken::classify("abcd-wxyz"),
            ScopeToken::Share(ShareScope::new("abcd-wxyz", ""))
        );
        assert_eq!(
            ScopeToken::classify("abcd-wxyz:1234"),
            ScopeToken::Share(ShareScope::new("abcd-wxyz", "1234"))
        );
        assert_eq!(
            ScopeToken::classify("Ab12Cd-XyZ98765"),
            ScopeToken::Share(ShareScope::new("Ab12Cd-XyZ98765", ""))
        );
    }

    #[test]
    fn test_classify_drive() {
        assert_eq!(ScopeToken::classify("0"), ScopeToken::Drive);
        assert_eq!(ScopeToken::classify("ab"), ScopeToken::Drive);
        assert_eq!(ScopeToken::classify("abc-wxyz"), ScopeToken::Drive);
        assert_eq!(ScopeToken::classify("abcd_wxyz"), ScopeToken::Drive);
        // Password must be exactly four characters
        assert_eq!(ScopeToken::classify("abcd-wxyz:123"), ScopeToken::Drive);
        assert_eq!(ScopeToken::classify("abcd-wxyz:12345"), ScopeToken::Drive);
        assert_eq!(ScopeToken::classify("documents"), ScopeToken::Drive);
    }

    #[test]
    fn test_explicit_scope() {
        let (path, token) = CanonicalPath::parse("/ab/c").with_explicit_scope();
        assert_eq!(token, ScopeToken::Drive);
        assert_eq!(path.as_string(), "/0/ab/c");

        let (path, token) = CanonicalPath::parse("/0/ab").with_explicit_scope();
        assert_eq!(token, ScopeToken::Drive);
        assert_eq!(path.as_string(), "/0/ab");

        let (path, token) = CanonicalPath::parse("/abcd-wxyz:1234/x").with_explicit_scope();
        assert!(matches!(token, ScopeToken::Share(_)));
        assert_eq!(path.as_string(), "/abcd-wxyz:1234/x");
    }

    #[test]
    fn test_well_known_probe() {
        assert!(CanonicalPath::parse("/favicon.ico").is_well_known_probe());
        assert!(!CanonicalPath::parse("/0/favicon.ico").is_well_known_probe());
        assert!(!CanonicalPath::parse("/").is_well_known_probe());
    }

    #[test]
    fn test_join() {
        assert_eq!(join("/", "0"), "/0");
        assert_eq!(join("/0", "docs"), "/0/docs");
        assert_eq!(join("/abcd-wxyz:1234/x", "y"), "/abcd-wxyz:1234/x/y");
    }

    #[test]
    fn test_prefix() {
        let path = CanonicalPath::parse("/0/a/b");
        assert_eq!(prefix(path.segments(), 0), "/");
        assert_eq!(prefix(path.segments(), 1), "/0");
        assert_eq!(prefix(path.segments(), 2), "/0/a");
    }

    proptest! {
        #[test]
        fn prop_normalize_is_idempotent(raw in "[a-z0/]{0,24}") {
            let once = CanonicalPath::parse(&raw).as_string();
            let twice = CanonicalPath::parse(&once).as_string();
            prop_assert_eq!(&once, &twice);
            prop_assert!(once.starts_with('/'));
            prop_assert!(once == "/" || !once.ends_with('/'));
            prop_assert!(!once.contains("//"));
        }

        #[test]
        fn prop_extra_slashes_do_not_matter(parts in proptest::collection::vec("[a-z0-9]{1,6}", 0..5)) {
            let plain = parts.join("/");
            let noisy = format!("//{}//", parts.join("///"));
            prop_assert_eq!(
                CanonicalPath::parse(&plain).as_string(),
                CanonicalPath::parse(&noisy).as_string()
            );
        }
    }
}
