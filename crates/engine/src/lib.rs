pub mod admission;
pub mod lifecycle;
pub mod ratchet;

pub use admission::*;
pub use lifecycle::*;
pub use ratchet::*;
