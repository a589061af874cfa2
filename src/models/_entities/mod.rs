pub mod prelude;

pub mod users;
pub mod devices;
pub mod vitals;
pub mod alerts;
pub mod attendance;
pub mod compliance_records;
