pub mod backup;
pub mod config;
pub mod cycle;
pub mod discovery;
pub mod error;
pub mod save_file;
pub mod scheduler;

pub use backup::{back_up_save, BackupEntry, BackupStore, DirStore, PassOutcome, PassReport};
pub use config::AppConfig;
pub use cycle::{BackupCycle, CycleSummary};
pub use error::Error;
pub use save_file::SaveIdentity;
pub use scheduler::Scheduler;
