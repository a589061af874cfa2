pub mod alert_service;
pub mod attendance_service;
pub mod authz;
pub mod event_bus;
pub mod ingestion_service;
pub mod threshold_service;

pub use event_bus::EventBus;
