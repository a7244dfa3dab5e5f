pub mod position;
pub mod registry;
pub mod vault;

pub use position::*;
pub use registry::*;
pub use vault::*;
