pub mod auctioneer;

pub use auctioneer::*;
