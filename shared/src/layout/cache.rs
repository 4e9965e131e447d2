use std::num::NonZeroUsize;

use lru::LruCache;

use super::RowLayout;
use crate::event::RowId;
use crate::model::MaxLines;

/// Content identity, width and measurer fingerprint. Widths compare bitwise.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LayoutKey {
    Review {
        row: RowId,
        max_lines: MaxLines,
        width_bits: u64,
        measurer: u64,
    },
    Summary {
        total_reviews: usize,
        width_bits: u64,
        measurer: u64,
    },
}

impl LayoutKey {
    #[must_use]
    pub fn review(row: RowId, max_lines: MaxLines, width: f64, measurer: u64) -> Self {
        Self::Review {
            row,
            max_lines,
            width_bits: width.to_bits(),
            measurer,
        }
    }

    #[must_use]
    pub fn summary(total_reviews: usize, width: f64, measurer: u64) -> Self {
        Self::Summary {
            total_reviews,
            width_bits: width.to_bits(),
            measurer,
        }
    }

    const fn row(&self) -> Option<RowId> {
        match self {
            Self::Review { row, .. } => Some(*row),
            Self::Summary { .. } => None,
        }
    }
}

pub struct LayoutCache {
    entries: LruCache<LayoutKey, RowLayout>,
}

impl LayoutCache {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: LruCache::new(capacity),
        }
    }

    pub fn get_or_insert_with(
        &mut self,
        key: LayoutKey,
        compute: impl FnOnce() -> RowLayout,
    ) -> RowLayout {
        if let Some(hit) = self.entries.get(&key) {
            return hit.clone();
        }
        let layout = compute();
        self.entries.put(key, layout.clone());
        layout
    }

    /// Drop every entry for `row`, whatever width or line limit it was
    /// computed at.
    pub fn invalidate_row(&mut self, row: RowId) -> usize {
        let stale: Vec<LayoutKey> = self
            .entries
            .iter()
            .filter(|(key, _)| key.row() == Some(row))
            .map(|(key, _)| *key)
            .collect();
        for key in &stale {
            self.entries.pop(key);
        }
        stale.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{Rect, SummaryCellLayout};

    fn summary_layout(height: f64) -> RowLayout {
        RowLayout::Summary(SummaryCellLayout {
            label: Rect::ZERO,
            height,
        })
    }

    #[test]
    fn computes_once_per_key() {
        let mut cache = LayoutCache::new(8);
        let key = LayoutKey::summary(10, 320.0, 0);
        let mut calls = 0;
        for _ in 0..3 {
            cache.get_or_insert_with(key, || {
                calls += 1;
                summary_layout(40.0)
            });
        }
        assert_eq!(calls, 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn width_is_part_of_the_key() {
        let mut cache = LayoutCache::new(8);
        cache.get_or_insert_with(LayoutKey::summary(10, 320.0, 0), || summary_layout(40.0));
        let other =
            cache.get_or_insert_with(LayoutKey::summary(10, 375.0, 0), || summary_layout(42.0));
        assert!((other.height() - 42.0).abs() < f64::EPSILON);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn measurer_is_part_of_the_key() {
        let mut cache = LayoutCache::new(8);
        let row = RowId::generate();
        let small = LayoutKey::review(row, MaxLines::Limited(3), 375.0, 1);
        let large = LayoutKey::review(row, MaxLines::Limited(3), 375.0, 2);
        cache.get_or_insert_with(small, || summary_layout(40.0));
        let relaid = cache.get_or_insert_with(large, || summary_layout(80.0));
        assert!((relaid.height() - 80.0).abs() < f64::EPSILON);
    }

    #[test]
    fn invalidate_row_drops_all_widths() {
        let mut cache = LayoutCache::new(8);
        let row = RowId::generate();
        let other = RowId::generate();
        for width in [320.0, 375.0] {
            let key = LayoutKey::review(row, MaxLines::Limited(3), width, 0);
            cache.get_or_insert_with(key, || summary_layout(1.0));
        }
        let key = LayoutKey::review(other, MaxLines::Limited(3), 320.0, 0);
        cache.get_or_insert_with(key, || summary_layout(1.0));

        assert_eq!(cache.invalidate_row(row), 2);
        assert_eq!(cache.len(), 1);
        cache.clear();
        assert!(cache.is_empty());
    }
}
