// copyguard-core/src/infrastructure/adapters/mod.rs

pub mod failover;
pub mod offline;
pub mod replay;

pub use failover::{ChainLink, FailoverGenerator};
pub use offline::OfflineGenerator;
pub use replay::ReplayGenerator;
