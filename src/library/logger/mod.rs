pub mod impl_console;
pub mod impl_tracing;
pub mod interface;
