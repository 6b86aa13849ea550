pub mod auction;
pub mod bidding;
pub mod clock;
pub mod config;
pub mod data_source;
pub mod error;
pub mod handlers;
pub mod notification;
pub mod query;
pub mod scheduler;
pub mod store;
