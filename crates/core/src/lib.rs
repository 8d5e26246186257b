pub mod color;
pub mod dataset;
pub mod error;
pub mod export;
pub mod hierarchy;
pub mod legend;
pub mod loader;
pub mod logging;
pub mod model;
pub mod search;
pub mod session;
pub mod tooltip;
pub mod treemap;

pub use color::*;
pub use dataset::Dataset;
pub use error::{Error, Result};
pub use model::*;
pub use treemap::{build, Treemap, TreemapLayout};
