pub mod quote;
pub mod catalog;

pub use quote::*;
pub use catalog::*;
