pub mod commands;

pub use commands::{
    build_auction, handle_create_auction, handle_place_bid, validate_bid, CreateAuctionCommand,
    PlaceBidCommand,
};
