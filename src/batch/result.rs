//! Aggregated batch outcomes.

use crate::error::BoxError;

/// One permanently failed item.
#[derive(Debug)]
pub struct ItemFailure {
    /// Position of the item in the input list.
    pub index: usize,
    /// Attempts made, including the first.
    pub attempts: u32,
    /// The error from the final attempt.
    pub error: BoxError,
}

/// Index-ordered partition of a batch's outcomes.
///
/// `total` always equals the input length. Items that neither succeeded nor
/// failed (skipped after an abort or cancellation) appear in neither list,
/// so `successful.len() + failed.len() <= total`.
#[derive(Debug)]
pub struct BatchResult<T> {
    total: usize,
    successful: Vec<(usize, T)>,
    failed: Vec<ItemFailure>,
}

impl<T> BatchResult<T> {
    pub(crate) fn new(
        total: usize,
        mut successful: Vec<(usize, T)>,
        mut failed: Vec<ItemFailure>,
    ) -> Self {
        successful.sort_by_key(|(index, _)| *index);
        failed.sort_by_key(|failure| failure.index);
        Self {
            total,
            successful,
            failed,
        }
    }

    /// Number of items in the input list.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Successes as `(original index, value)`, index ascending.
    pub fn successful(&self) -> &[(usize, T)] {
        &self.successful
    }

    /// Permanent failures, index ascending.
    pub fn failed(&self) -> &[ItemFailure] {
        &self.failed
    }

    /// Whether every input item settled (nothing skipped).
    pub fn is_complete(&self) -> bool {
        self.successful.len() + self.failed.len() == self.total
    }

    /// Whether every input item succeeded.
    pub fn all_succeeded(&self) -> bool {
        self.successful.len() == self.total
    }

    /// Indices of the successes, ascending.
    pub fn success_indices(&self) -> Vec<usize> {
        self.successful.iter().map(|(index, _)| *index).collect()
    }

    /// Consume into the success values, index order.
    pub fn into_values(self) -> Vec<T> {
        self.successful.into_iter().map(|(_, value)| value).collect()
    }

    /// Consume into `(successful, failed)`.
    pub fn into_parts(self) -> (Vec<(usize, T)>, Vec<ItemFailure>) {
        (self.successful, self.failed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failure(index: usize) -> ItemFailure {
        ItemFailure {
            index,
            attempts: 1,
            error: "failed".into(),
        }
    }

    #[test]
    fn test_sorts_by_original_index() {
        let result = BatchResult::new(
            5,
            vec![(4, "e"), (0, "a"), (2, "c")],
            vec![failure(3), failure(1)],
        );

        assert_eq!(result.success_indices(), vec![0, 2, 4]);
        assert_eq!(result.successful()[0], (0, "a"));
        assert_eq!(result.failed()[0].index, 1);
        assert_eq!(result.failed()[1].index, 3);
    }

    #[test]
    fn test_completeness_accounting() {
        let complete = BatchResult::new(2, vec![(0, 10)], vec![failure(1)]);
        assert!(complete.is_complete());
        assert!(!complete.all_succeeded());

        let partial: BatchResult<i32> = BatchResult::new(3, vec![(0, 10)], vec![failure(1)]);
        assert!(!partial.is_complete());

        let clean = BatchResult::new(1, vec![(0, 10)], Vec::new());
        assert!(clean.all_succeeded());
    }

    #[test]
    fn test_into_values_keeps_index_order() {
        let result = BatchResult::new(3, vec![(2, "c"), (0, "a"), (1, "b")], Vec::new());
        assert_eq!(result.into_values(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_into_parts() {
        let result = BatchResult::new(2, vec![(0, 1)], vec![failure(1)]);
        let (successful, failed) = result.into_parts();
        assert_eq!(successful, vec![(0, 1)]);
        assert_eq!(failed.len(), 1);
    }
}
