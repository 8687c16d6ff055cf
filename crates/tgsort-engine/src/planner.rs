// SPDX-FileCopyrightText: 2026 Tgsort Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pure partitioning of the chat list into classification batches.

use tgsort_core::ChatRecord;

use crate::catalog::Catalog;

/// Splits the ordered chat list into contiguous fixed-size batches.
///
/// Batch order equals input order, so runs are reproducible. The last
/// batch may be shorter. No side effects; planning is pure and the
/// returned iterator is restartable by calling [`BatchPlanner::plan`]
/// again.
#[derive(Debug, Clone, Copy)]
pub struct BatchPlanner {
    batch_size: usize,
}

impl BatchPlanner {
    /// Create a planner. `batch_size` is clamped to at least 1.
    pub fn new(batch_size: usize) -> Self {
        Self {
            batch_size: batch_size.max(1),
        }
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Lazy sequence of contiguous batches over the catalog's chats.
    pub fn plan<'a>(&self, catalog: &'a Catalog) -> impl Iterator<Item = &'a [ChatRecord]> {
        catalog.chats().chunks(self.batch_size)
    }

    /// Number of batches a full plan will yield.
    pub fn batch_count(&self, catalog: &Catalog) -> usize {
        catalog.chat_count().div_ceil(self.batch_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tgsort_core::ChatKind;

    fn catalog(n: i64) -> Catalog {
        let chats = (1..=n)
            .map(|i| ChatRecord::new(i, format!("chat-{i}"), ChatKind::Group))
            .collect();
        Catalog::new(chats, vec![]).unwrap()
    }

    #[test]
    fn five_chats_at_size_two_yield_2_2_1() {
        let catalog = catalog(5);
        let planner = BatchPlanner::new(2);
        let sizes: Vec<usize> = planner.plan(&catalog).map(<[_]>::len).collect();
        assert_eq!(sizes, [2, 2, 1]);
        assert_eq!(planner.batch_count(&catalog), 3);
    }

    #[test]
    fn batches_preserve_input_order() {
        let catalog = catalog(4);
        let planner = BatchPlanner::new(3);
        let ids: Vec<Vec<i64>> = planner
            .plan(&catalog)
            .map(|b| b.iter().map(|c| c.chat_id).collect())
            .collect();
        assert_eq!(ids, [vec![1, 2, 3], vec![4]]);
    }

    #[test]
    fn zero_batch_size_is_clamped() {
        let planner = BatchPlanner::new(0);
        assert_eq!(planner.batch_size(), 1);
        assert_eq!(planner.batch_count(&catalog(3)), 3);
    }

    #[test]
    fn empty_catalog_yields_no_batches() {
        let planner = BatchPlanner::new(10);
        assert_eq!(planner.plan(&catalog(0)).count(), 0);
    }
}
