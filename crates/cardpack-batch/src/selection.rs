use std::collections::HashSet;

use indexmap::IndexSet;

/// Insertion-ordered set of roster ids chosen for export.
///
/// The order ids were first selected in is the order the batch runner
/// processes them in. The selection holds ids only, never roster records:
/// it is a weak reference into the roster and must be re-validated with
/// [`Selection::retain_known`] before a run, since the roster may have
/// changed since the ids were picked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: IndexSet<String>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert the id if absent, remove it if present. Returns whether the
    /// id is selected afterwards.
    pub fn toggle(&mut self, id: &str) -> bool {
        if self.ids.shift_remove(id) {
            false
        } else {
            self.ids.insert(id.to_string());
            true
        }
    }

    /// Replace the selection wholesale.
    pub fn select_all<I, S>(&mut self, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ids = ids.into_iter().map(Into::into).collect();
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }

    /// Drop ids that are no longer present in the roster, keeping the
    /// survivors in their original relative order. Returns the dropped ids.
    pub fn retain_known<'a, I>(&mut self, known: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let known: HashSet<&str> = known.into_iter().collect();
        let dropped = self
            .ids
            .iter()
            .filter(|id| !known.contains(id.as_str()))
            .cloned()
            .collect();
        self.ids.retain(|id| known.contains(id.as_str()));
        dropped
    }
}
