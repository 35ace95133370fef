pub mod context;
pub mod error;

pub use context::{AppContext, DataPaths};
pub use error::{NectarError, Result};
