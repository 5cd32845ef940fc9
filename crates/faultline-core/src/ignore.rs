//! Ignore-path matching
//!
//! Middleware side effects (logging, metric recording, fault injection)
//! are suppressed for configured paths such as the metrics and control
//! endpoints. The request itself is still served normally.

/// An immutable set of path prefixes exempt from a middleware's side
/// effects.
///
/// Matching semantics, uniform across every pipeline element: an entry
/// matches a path when the path equals the entry exactly, or extends it
/// at a `/` segment boundary. `/delay` matches `/delay` and
/// `/delay/base` but not `/delayed`. The root entry `/` matches only the
/// root path itself.
#[derive(Debug, Clone, Default)]
pub struct IgnoreSet {
    entries: Vec<String>,
}

impl IgnoreSet {
    /// Build an ignore set from path prefixes.
    ///
    /// Trailing slashes are stripped so `/metrics/` and `/metrics` are
    /// the same entry.
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let entries = entries
            .into_iter()
            .map(|e| {
                let e = e.into();
                if e.len() > 1 {
                    e.trim_end_matches('/').to_string()
                } else {
                    e
                }
            })
            .collect();

        Self { entries }
    }

    /// Whether the given request path is exempt.
    pub fn matches(&self, path: &str) -> bool {
        self.entries.iter().any(|entry| {
            if entry == "/" {
                return path == "/";
            }
            path == entry
                || (path.len() > entry.len()
                    && path.starts_with(entry.as_str())
                    && path.as_bytes()[entry.len()] == b'/')
        })
    }

    /// Number of configured entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the set has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
