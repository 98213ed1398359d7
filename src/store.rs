use crate::domain::{Transaction, TypeFilter};
use crate::storage::{BlobStore, LoadStatus, StorageAdapter, StorageError};
use tracing::{info, warn};
use uuid::Uuid;

/// The in-memory transaction list plus its persisted mirror.
///
/// Every mutation is written through immediately. A failed write is logged and
/// kept in `last_save_error`; the in-memory list stays authoritative.
pub struct TransactionStore<B: BlobStore> {
    storage: StorageAdapter<B>,
    transactions: Vec<Transaction>,
    load_status: LoadStatus,
    last_save_error: Option<StorageError>,
}

impl<B: BlobStore> TransactionStore<B> {
    pub fn open(storage: StorageAdapter<B>) -> Self {
        let loaded = storage.load();
        Self {
            storage,
            transactions: loaded.transactions,
            load_status: loaded.status,
            last_save_error: None,
        }
    }

    pub fn storage(&self) -> &StorageAdapter<B> {
        &self.storage
    }

    pub fn last_load(&self) -> &LoadStatus {
        &self.load_status
    }

    pub fn last_save_error(&self) -> Option<&StorageError> {
        self.last_save_error.as_ref()
    }

    /// Appends an already-validated transaction.
    pub fn add(&mut self, transaction: Transaction) {
        info!(id = %transaction.id, kind = %transaction.kind, "adding transaction");
        self.transactions.push(transaction);
        self.persist();
    }

    /// Removes the entry with `id`. Returns whether anything was removed.
    pub fn remove(&mut self, id: Uuid) -> bool {
        let removed = match self.transactions.iter().position(|t| t.id == id) {
            Some(idx) => {
                self.transactions.remove(idx);
                true
            }
            None => false,
        };
        self.persist();
        removed
    }

    pub fn all(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn find(&self, id: Uuid) -> Option<&Transaction> {
        self.transactions.iter().find(|t| t.id == id)
    }

    pub fn filter_by_type(&self, filter: TypeFilter) -> Vec<Transaction> {
        self.transactions
            .iter()
            .filter(|t| filter.matches(t.kind))
            .cloned()
            .collect()
    }

    fn persist(&mut self) {
        match self.storage.save(&self.transactions) {
            Ok(()) => self.last_save_error = None,
            Err(err) => {
                warn!(error = %err, "could not persist transactions; keeping in-memory state");
                self.last_save_error = Some(err);
            }
        }
    }
}
