//! Selection cursors
//!
//! Editing front ends keep track of the current group, area and point as
//! plain indices. A [`Cursor`] is one such index that follows the list it
//! points into: removals shift it down, inserts shift it up, and it never
//! points past the end.

use crate::AreaGroup;

/// An optional index into a list that can grow and shrink
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cursor(Option<usize>);

impl Cursor {
    /// A cursor with nothing selected
    pub const NONE: Cursor = Cursor(None);

    pub fn new(index: Option<usize>) -> Self {
        Self(index)
    }

    pub fn get(self) -> Option<usize> {
        self.0
    }

    pub fn is_selected(self) -> bool {
        self.0.is_some()
    }

    /// Selects `index`, clamped to the last element of a list of `len` items
    pub fn select(&mut self, index: usize, len: usize) {
        self.0 = if len == 0 {
            None
        } else {
            Some(index.min(len - 1))
        };
    }

    pub fn clear(&mut self) {
        self.0 = None;
    }

    /// Re-clamps after the list changed length
    pub fn clamp(&mut self, len: usize) {
        if let Some(index) = self.0 {
            self.select(index, len);
        }
    }

    /// Follows the removal of `removed` from a list now `len` long
    pub fn removed(&mut self, removed: usize, len: usize) {
        if let Some(index) = self.0 {
            if removed < index {
                self.0 = Some(index - 1);
            }
            self.clamp(len);
        }
    }

    /// Follows the insertion of an element at `inserted`
    pub fn inserted(&mut self, inserted: usize) {
        if let Some(index) = self.0 {
            if inserted <= index {
                self.0 = Some(index + 1);
            }
        }
    }
}

/// Current group, area and point of an editing session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Selection {
    pub group: Cursor,
    pub area: Cursor,
    pub point: Cursor,
}

impl Selection {
    /// Clamps every level against the current contents.
    ///
    /// A level whose parent is unselected or missing is cleared.
    pub fn clamp_to(&mut self, groups: &[AreaGroup]) {
        self.group.clamp(groups.len());
        let Some(group) = self.group.get().and_then(|g| groups.get(g)) else {
            self.area.clear();
            self.point.clear();
            return;
        };

        self.area.clamp(group.len());
        match self.area.get().and_then(|a| group.area(a)) {
            Some(area) => self.point.clamp(area.len()),
            None => self.point.clear(),
        }
    }
}
