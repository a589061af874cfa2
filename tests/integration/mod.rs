pub mod socket_protocol_test;
