pub mod controller;
pub mod impl_fake;
pub mod interface;
