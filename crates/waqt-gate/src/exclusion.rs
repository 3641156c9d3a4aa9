//! Path prefixes that bypass authentication.

/// Ordered list of path prefixes exempt from authentication.
///
/// Matching is a case-sensitive prefix test; any entry matching is enough.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionList {
    prefixes: Vec<String>,
}

impl ExclusionList {
    /// Build the list, dropping empty prefixes (an empty prefix would
    /// exempt every path).
    pub fn new<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let prefixes = prefixes
            .into_iter()
            .map(|prefix| -> String { prefix.into() })
            .filter(|prefix| {
                if prefix.is_empty() {
                    tracing::warn!("ignoring empty authentication exclusion prefix");
                    false
                } else {
                    true
                }
            })
            .collect();
        Self { prefixes }
    }

    pub fn is_excluded(&self, path: &str) -> bool {
        self.prefixes.iter().any(|prefix| path.starts_with(prefix.as_str()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.prefixes.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.prefixes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prefixes.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for ExclusionList {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter)
    }
}
