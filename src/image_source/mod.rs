#[cfg(test)]
pub mod impl_fake;
pub mod impl_file;
pub mod interface;
