pub mod config;
pub mod context;
pub mod error;
pub mod gateway;
pub mod genekey;
pub mod handlers;
pub mod join;
pub mod sequence;
pub mod types;

pub use config::Config;
pub use context::DataContext;
pub use error::{Error, Result};
