pub mod filter;
pub mod handlers;

pub use filter::AuctionFilter;
