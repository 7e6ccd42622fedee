//! Selection and scroll bookkeeping for a list whose items live elsewhere.

use std::ops::Range;

#[derive(Debug, Default, Clone)]
pub struct ScrollableList {
    len: usize,
    pub selected: usize,
    pub scroll_offset: usize,
}

impl ScrollableList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Update the item count, keeping the selection in range.
    pub fn set_len(&mut self, len: usize) {
        self.len = len;
        if self.selected >= len {
            self.selected = len.saturating_sub(1);
        }
        if self.scroll_offset > self.selected {
            self.scroll_offset = self.selected;
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Index of the selected item, `None` when the list is empty.
    pub fn selected(&self) -> Option<usize> {
        (self.len > 0).then_some(self.selected)
    }

    pub fn select_up(&mut self, n: usize) {
        self.selected = self.selected.saturating_sub(n);
    }

    pub fn select_down(&mut self, n: usize) {
        if self.len == 0 {
            return;
        }
        self.selected = (self.selected + n).min(self.len - 1);
    }

    pub fn select_first(&mut self) {
        self.selected = 0;
        self.scroll_offset = 0;
    }

    pub fn select_last(&mut self) {
        self.selected = self.len.saturating_sub(1);
    }

    pub fn select(&mut self, index: usize) {
        if index < self.len {
            self.selected = index;
        }
    }

    pub fn ensure_visible(&mut self, height: usize) {
        if height == 0 {
            return;
        }
        if self.selected < self.scroll_offset {
            self.scroll_offset = self.selected;
        } else if self.selected >= self.scroll_offset + height {
            self.scroll_offset = self.selected + 1 - height;
        }
    }

    /// Indices to draw in `height` rows.  Call `ensure_visible` first.
    pub fn visible_range(&self, height: usize) -> Range<usize> {
        let start = self.scroll_offset.min(self.len);
        start..(start + height).min(self.len)
    }

    pub fn selected_in_view(&self) -> usize {
        self.selected.saturating_sub(self.scroll_offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_stays_in_bounds() {
        let mut l = ScrollableList::new();
        assert_eq!(l.selected(), None);
        l.select_down(3);
        assert_eq!(l.selected, 0);

        l.set_len(5);
        l.select_down(10);
        assert_eq!(l.selected(), Some(4));
        l.set_len(2);
        assert_eq!(l.selected(), Some(1));
        l.select_up(7);
        assert_eq!(l.selected(), Some(0));
    }

    #[test]
    fn test_scrolls_to_keep_selection_visible() {
        let mut l = ScrollableList::new();
        l.set_len(30);
        l.select(12);
        l.ensure_visible(5);
        assert_eq!(l.visible_range(5), 8..13);
        assert_eq!(l.selected_in_view(), 4);

        l.select_first();
        l.ensure_visible(5);
        assert_eq!(l.visible_range(5), 0..5);

        l.select_last();
        l.ensure_visible(10);
        assert_eq!(l.visible_range(10), 20..30);
    }
}
