pub mod chore_service;
pub mod family_service;
pub mod notification_service;
pub mod payment_service;
pub mod reward_service;
pub mod scheduler;
