pub use super::users::Entity as Users;
pub use super::devices::Entity as Devices;
pub use super::vitals::Entity as Vitals;
pub use super::alerts::Entity as Alerts;
pub use super::attendance::Entity as Attendance;
pub use super::compliance_records::Entity as ComplianceRecords;
