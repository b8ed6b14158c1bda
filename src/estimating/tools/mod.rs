pub mod error;
pub mod io;
pub mod model;
pub mod normalize;
pub mod pipeline;
pub mod populate;
pub mod refine;

pub use error::{Result, ToolError};
