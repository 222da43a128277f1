pub mod scheduler;

pub use scheduler::ZoneWarmupScheduler;
