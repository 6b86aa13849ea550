// region:    --- Imports
use super::filter::AuctionFilter;
use crate::auction::model::{Auction, Bid};
use crate::error::AuctionError;
use crate::scheduler::CountdownDisplay;
use crate::store::AuctionStore;
use tracing::debug;

// endregion: --- Imports

// region:    --- Query Handlers

/// 경매 목록 조회
pub fn list_auctions(store: &AuctionStore, filter: &AuctionFilter) -> Vec<Auction> {
    debug!("{:<12} --> 경매 목록 조회: {:?}", "Query", filter);
    store
        .auctions()
        .iter()
        .filter(|a| filter.matches(a))
        .cloned()
        .collect()
}

/// 경매 조회
pub fn get_auction(store: &AuctionStore, auction_id: &str) -> Result<Auction, AuctionError> {
    debug!("{:<12} --> 경매 조회 id: {}", "Query", auction_id);
    store
        .auction(auction_id)
        .cloned()
        .ok_or_else(|| AuctionError::AuctionNotFound(auction_id.to_string()))
}

/// 입찰 이력 조회 (최신순)
pub fn get_bid_history(store: &AuctionStore, auction_id: &str) -> Result<Vec<Bid>, AuctionError> {
    debug!("{:<12} --> 입찰 이력 조회 id: {}", "Query", auction_id);
    let auction = store
        .auction(auction_id)
        .ok_or_else(|| AuctionError::AuctionNotFound(auction_id.to_string()))?;
    Ok(auction.bids.iter().rev().cloned().collect())
}

/// 최고 입찰가 조회 (입찰이 없으면 None)
pub fn get_highest_bid(store: &AuctionStore, auction_id: &str) -> Result<Option<i64>, AuctionError> {
    debug!("{:<12} --> 최고 입찰가 조회 id: {}", "Query", auction_id);
    let auction = store
        .auction(auction_id)
        .ok_or_else(|| AuctionError::AuctionNotFound(auction_id.to_string()))?;
    Ok(auction.winning_bid().map(|b| b.amount))
}

/// 남은 시간 조회
pub fn get_countdown(
    store: &AuctionStore,
    auction_id: &str,
) -> Result<CountdownDisplay, AuctionError> {
    let auction = store
        .auction(auction_id)
        .ok_or_else(|| AuctionError::AuctionNotFound(auction_id.to_string()))?;
    Ok(CountdownDisplay::at(auction.end_time, store.now()))
}

// endregion: --- Query Handlers
