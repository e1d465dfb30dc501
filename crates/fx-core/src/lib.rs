pub mod assignments;
pub mod platform;
pub mod time;
pub mod variation;
pub mod wire;

pub use assignments::*;
pub use platform::*;
pub use time::*;
pub use variation::*;
pub use wire::*;
