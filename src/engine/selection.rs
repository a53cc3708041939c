/// Marked remote paths, keyed by full path and kept in the order they were
/// first marked.
#[derive(Debug, Clone, Default)]
pub(crate) struct SelectionSet {
    marked: Vec<String>,
}

impl SelectionSet {
    /// Marks `path`, or unmarks it if it is already marked. Returns the new
    /// state.
    pub(crate) fn toggle(&mut self, path: &str) -> bool {
        if let Some(pos) = self.marked.iter().position(|marked| marked == path) {
            self.marked.remove(pos);
            false
        } else {
            self.marked.push(path.to_string());
            true
        }
    }

    pub(crate) fn is_marked(&self, path: &str) -> bool {
        self.marked.iter().any(|marked| marked == path)
    }

    pub(crate) fn all_marked(&self) -> &[String] {
        &self.marked
    }

    pub(crate) fn len(&self) -> usize {
        self.marked.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.marked.is_empty()
    }

    pub(crate) fn clear(&mut self) {
        self.marked.clear();
    }
}
