pub mod entry;
pub mod prune;
pub mod retention;
pub mod store;

pub use entry::BackupEntry;
pub use retention::{back_up_identity, back_up_save, PassOutcome, PassReport};
pub use store::{BackupStore, DirStore};
