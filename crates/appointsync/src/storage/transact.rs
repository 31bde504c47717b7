use std::sync::Arc;

use appointsync_core::storage::{slice_ranges, ItemStore, TransactItem};

/// Writes large sets of items as consecutive atomic slices.
///
/// Each slice is all-or-nothing; the set as a whole is not. A slice that was
/// applied stays applied even when a later one fails.
#[derive(Clone)]
pub struct TransactionalBatchWriter {
    store: Arc<dyn ItemStore>,
}

impl TransactionalBatchWriter {
    pub fn new(store: Arc<dyn ItemStore>) -> Self {
        Self { store }
    }

    /// Returns `true` when every slice was acknowledged. A failing slice stops the
    /// write; a rejected slice is logged and the remaining slices still run.
    pub async fn write(&self, items: &[TransactItem]) -> bool {
        let ranges = slice_ranges(items.len());
        let slices = ranges.len();
        let mut acknowledged = true;

        for (index, range) in ranges.into_iter().enumerate() {
            let size = range.len();
            match self.store.transact_write(&items[range]).await {
                Ok(true) => {
                    tracing::debug!(slice = index, slices, size, "Transaction slice written");
                }
                Ok(false) => {
                    tracing::warn!(slice = index, slices, size, "Transaction slice rejected");
                    acknowledged = false;
                }
                Err(error) => {
                    tracing::error!(
                        slice = index,
                        slices,
                        size,
                        error = %error,
                        "Transaction slice failed"
                    );
                    return false;
                }
            }
        }

        acknowledged
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::inmemory::InMemoryStore;
    use crate::storage::testing::{Call, ScriptedStore};
    use appointsync_core::item::{Key, KeySchema};
    use appointsync_core::storage::{ScanOptions, StoreError};

    fn puts(count: usize) -> Vec<TransactItem> {
        (0..count)
            .map(|n| TransactItem::Put {
                table: "links".to_string(),
                item: Key::partition("id", format!("{n:04}")).to_item(),
            })
            .collect()
    }

    fn memory() -> InMemoryStore {
        InMemoryStore::with_tables([("links", KeySchema::new("id"))])
    }

    fn sizes(store: &ScriptedStore) -> Vec<usize> {
        store
            .calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::TransactWrite { size } => Some(size),
                _ => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn test_empty_write_issues_no_calls() {
        let store = Arc::new(ScriptedStore::new(memory()));
        let writer = TransactionalBatchWriter::new(store.clone());

        assert!(writer.write(&[]).await);
        assert!(store.calls().is_empty());
    }

    #[tokio::test]
    async fn test_large_write_is_sliced() {
        let store = Arc::new(ScriptedStore::new(memory()));
        let writer = TransactionalBatchWriter::new(store.clone());

        assert!(writer.write(&puts(250)).await);

        assert_eq!(sizes(&store), vec![99, 99, 52]);
        let stored = store.inner().scan("links", &ScanOptions::new()).await.unwrap();
        assert_eq!(stored.count, 250);
    }

    #[tokio::test]
    async fn test_exact_multiple_has_no_trailing_slice() {
        let store = Arc::new(ScriptedStore::new(memory()));
        let writer = TransactionalBatchWriter::new(store.clone());

        assert!(writer.write(&puts(198)).await);
        assert_eq!(sizes(&store), vec![99, 99]);
    }

    #[tokio::test]
    async fn test_rejected_slice_makes_result_false_but_continues() {
        let store = Arc::new(
            ScriptedStore::new(memory()).with_transact_outcomes(vec![Ok(true), Ok(false), Ok(true)]),
        );
        let writer = TransactionalBatchWriter::new(store.clone());

        assert!(!writer.write(&puts(250)).await);
        assert_eq!(sizes(&store).len(), 3);
    }

    #[tokio::test]
    async fn test_failed_slice_stops_write() {
        let store = Arc::new(ScriptedStore::new(memory()).with_transact_outcomes(vec![
            Ok(true),
            Err(StoreError::ConnectionFailed("timeout".to_string())),
        ]));
        let writer = TransactionalBatchWriter::new(store.clone());

        assert!(!writer.write(&puts(250)).await);
        assert_eq!(sizes(&store), vec![99, 99]);
    }
}
