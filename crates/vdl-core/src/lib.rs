pub mod config;
pub mod daterange;
pub mod duration;
pub mod engine;
pub mod grammar;
pub mod logging;
pub mod options;
pub mod scheduler;
pub mod source;

#[cfg(test)]
pub(crate) mod test_support;

/// Program name used for config file names, the options sentinel, and log records.
pub const PROG: &str = "VideoDL";
