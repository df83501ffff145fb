pub mod app;
pub mod error;
pub mod form;
#[cfg(windows)]
pub mod os;
pub mod util;
