pub mod compare;
pub mod config;
pub mod data_loading;
pub mod error;
pub mod filter;
pub mod output;
pub mod scoring;

pub use error::{PipelineError, Result};
pub use filter::FilterSettings;
pub use scoring::Scorecard;
