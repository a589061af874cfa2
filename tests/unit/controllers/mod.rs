pub mod auth_test;
