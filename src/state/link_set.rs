use indexmap::IndexSet;

/// Insertion-ordered set of canonical book links
///
/// Discovery order is preserved so that truncating to the link limit always
/// keeps the same links for the same catalog pages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkSet {
    links: IndexSet<String>,
}

impl LinkSet {
    /// Creates an empty link set
    pub fn new() -> Self {
        Self::default()
    }

    /// Unions links into the set, returning how many were new
    pub fn extend<I>(&mut self, links: I) -> usize
    where
        I: IntoIterator<Item = String>,
    {
        let before = self.links.len();
        self.links.extend(links);
        self.links.len() - before
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    /// Keeps only the first `limit` links in discovery order
    pub fn truncate(&mut self, limit: usize) {
        self.links.truncate(limit);
    }

    /// Consumes the set, returning links in discovery order
    pub fn into_vec(self) -> Vec<String> {
        self.links.into_iter().collect()
    }
}
