pub mod _entities;

pub mod alert;
pub mod attendance;
pub mod compliance;
pub mod device;
pub mod user;
pub mod vital;

pub use alert::{Alert, AlertFilter, AlertType, NewAlert, Severity};
pub use attendance::{AttendanceDay, AttendanceStatus};
pub use compliance::{ComplianceRecord, NewComplianceRecord, RiskLevel};
pub use device::Device;
pub use user::{CreateUserRequest, Role, User};
pub use vital::{NewVital, Vital};
