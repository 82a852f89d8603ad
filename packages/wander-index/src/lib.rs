pub mod catalog;
pub mod index;
pub mod store;
pub mod trie;

mod error;

pub use catalog::TagCatalog;
pub use error::{Error, RecordKind, Result};
pub use index::MultilingualIndex;
pub use store::DestinationStore;
pub use trie::Trie;
