//! Command handlers behind the CLI subcommands.

mod classpath;
pub mod config;
mod dependents;
mod list;
mod paths;
mod publish;

pub use classpath::classpath;
pub use dependents::dependents;
pub use list::list;
pub use publish::publish;
