pub mod keep;
pub mod proxy;
