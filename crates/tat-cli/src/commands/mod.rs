//! CLI subcommand implementations.

pub mod add;
pub mod audit;
pub mod delete;
pub mod history;
pub mod records;
pub mod start;
pub mod status;
pub mod stop;
pub mod summary;
pub mod util;
pub mod watch;
