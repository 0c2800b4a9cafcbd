//! Backing record store abstraction
//!
//! The pipeline only needs keyed lookups of one record by collection and id.
//! Implementations adapt a concrete store (Firestore, an in-memory fixture)
//! to that interface so the core never sees store-specific types.

use async_trait::async_trait;

use crate::document::Record;
use crate::error::Result;

pub mod firestore;
pub mod memory;

pub use firestore::FirestoreStore;
pub use memory::MemoryStore;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecordStore: Send + Sync {
  /// Fetch one record. `Ok(None)` means the document does not exist;
  /// `Err` means the store itself could not be reached.
  async fn get(&self, collection: &str, id: &str) -> Result<Option<Record>>;
}
