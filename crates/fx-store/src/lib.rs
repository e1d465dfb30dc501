pub mod config;
pub mod source;
pub mod store;

pub use config::*;
pub use source::*;
pub use store::*;
