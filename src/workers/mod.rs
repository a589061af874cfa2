pub mod attendance_sweep;
pub mod connection_reaper;
