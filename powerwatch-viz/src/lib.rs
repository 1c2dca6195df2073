pub mod client;
pub mod config;
pub mod error;
pub mod result;

pub use client::{GraphistryClient, PlotSettings};
pub use config::VizConfig;
pub use error::VizError;
pub use result::PlotResult;
