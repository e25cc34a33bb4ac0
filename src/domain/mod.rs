pub mod command;
pub mod fleet;
pub mod forensics;
pub mod policy;
pub mod state;

pub use command::*;
pub use fleet::*;
pub use forensics::*;
pub use policy::*;
pub use state::*;
