pub mod alerts;
pub mod fleet;
pub mod logs;
pub mod policies;
pub mod system;

pub use alerts::*;
pub use fleet::*;
pub use logs::*;
pub use policies::*;
pub use system::*;
