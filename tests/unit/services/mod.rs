pub mod authz_test;
pub mod event_bus_test;
