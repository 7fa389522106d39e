pub mod core;
pub mod pool;

pub use self::core::{Catalog, BUILTIN_CATALOG};
pub use pool::{normalize, WordPool};
