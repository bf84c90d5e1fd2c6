pub mod args;
pub mod config;
pub mod error;
pub mod exclude;
pub mod fofa;
pub mod host;
pub mod pipeline;
pub mod record;
pub mod report;
pub mod utils;
pub mod workbook;

pub use args::Args;
pub use config::Config;
pub use error::{Error, Result};
pub use exclude::{ExclusionSet, LoadWarning};
pub use pipeline::{run, RunOutcome};
pub use record::NormalizedRecord;
pub use report::{Report, Summary};
