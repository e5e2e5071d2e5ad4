pub mod interval_timer;
pub mod logger;
