pub mod sync_service;
pub mod scheduler;

pub use sync_service::TaskSyncService;
pub use scheduler::SyncScheduler;
