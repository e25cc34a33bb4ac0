pub mod runtime;

pub use runtime::{Cli, Commands};
