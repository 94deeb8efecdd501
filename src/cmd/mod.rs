mod output;
mod providers;
mod streams;

pub use providers::cmd_providers;
pub use streams::{cmd_streams, StreamsOptions};
