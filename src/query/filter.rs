use crate::auction::model::{Auction, AuctionStatus};
use serde::Deserialize;

/// 경매 목록 필터 (모든 조건은 AND)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuctionFilter {
    pub status: Option<AuctionStatus>,
    pub make: Option<String>,
    pub min_year: Option<i32>,
    pub max_year: Option<i32>,
    pub max_price: Option<i64>,
    pub watched: Option<bool>,
}

impl AuctionFilter {
    pub fn matches(&self, auction: &Auction) -> bool {
        if let Some(status) = self.status {
            if auction.status != status {
                return false;
            }
        }
        if let Some(make) = &self.make {
            if !auction
                .car
                .make
                .to_lowercase()
                .contains(&make.trim().to_lowercase())
            {
                return false;
            }
        }
        if self.min_year.is_some_and(|min| auction.car.year < min) {
            return false;
        }
        if self.max_year.is_some_and(|max| auction.car.year > max) {
            return false;
        }
        if self.max_price.is_some_and(|max| auction.current_bid > max) {
            return false;
        }
        if self.watched.is_some_and(|watched| auction.is_watched != watched) {
            return false;
        }
        true
    }
}
