pub mod checkout;
pub mod child;
pub mod chore;
pub mod common;
pub mod family;
pub mod gate;
pub mod init;
pub mod notification;
pub mod plan;
pub mod reward;
pub mod subscription;

// Re-export common types/enums for easier access
pub use common::*;
