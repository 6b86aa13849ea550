/// 메모리 기반 목 데이터 소스
/// 모든 호출은 고정 지연 후 응답한다.
// region:    --- Imports
use super::fixtures::{seed_auctions, seed_cars};
use super::DataSource;
use crate::auction::model::{Auction, AuctionStatus, Bid, Car};
use crate::bidding::commands::{validate_bid, PlaceBidCommand};
use crate::clock::SharedClock;
use crate::error::{AuctionError, ValidationCode};
use async_trait::async_trait;
use tokio::sync::RwLock;
use tokio::time::{sleep, Duration};
use tracing::info;

// endregion: --- Imports

// region:    --- Mock Data Source
pub struct MockDataSource {
    cars: Vec<Car>,
    auctions: RwLock<Vec<Auction>>,
    clock: SharedClock,
    delay: Duration,
}

impl MockDataSource {
    /// 시드 데이터로 생성
    pub fn new(clock: SharedClock, delay: Duration) -> Self {
        let auctions = seed_auctions(clock.now());
        Self {
            cars: seed_cars(),
            auctions: RwLock::new(auctions),
            clock,
            delay,
        }
    }

    async fn simulate_latency(&self) {
        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }
    }
}

#[async_trait]
impl DataSource for MockDataSource {
    async fn fetch_user_cars(&self, user_id: &str) -> Result<Vec<Car>, AuctionError> {
        self.simulate_latency().await;
        Ok(self
            .cars
            .iter()
            .filter(|car| car.owner_id == user_id)
            .cloned()
            .collect())
    }

    async fn fetch_auction(&self, auction_id: &str) -> Result<Auction, AuctionError> {
        self.simulate_latency().await;
        self.auctions
            .read()
            .await
            .iter()
            .find(|a| a.id == auction_id)
            .cloned()
            .ok_or_else(|| AuctionError::AuctionNotFound(auction_id.to_string()))
    }

    async fn fetch_active_auctions(&self) -> Result<Vec<Auction>, AuctionError> {
        self.simulate_latency().await;
        Ok(self
            .auctions
            .read()
            .await
            .iter()
            .filter(|a| a.status == AuctionStatus::Active)
            .cloned()
            .collect())
    }

    async fn fetch_auctions(&self) -> Result<Vec<Auction>, AuctionError> {
        self.simulate_latency().await;
        Ok(self.auctions.read().await.clone())
    }

    async fn create_auction(&self, auction: &Auction) -> Result<Auction, AuctionError> {
        self.simulate_latency().await;

        let mut auctions = self.auctions.write().await;
        if auctions.iter().any(|a| a.id == auction.id) {
            return Err(AuctionError::validation(
                ValidationCode::InvalidAuction,
                format!("Auction {} already exists", auction.id),
            ));
        }
        auctions.push(auction.clone());
        info!(
            "{:<12} --> 목 경매 등록 {}: {}",
            "MockSource",
            auction.id,
            auction.car.title()
        );
        Ok(auction.clone())
    }

    async fn place_bid(&self, cmd: &PlaceBidCommand) -> Result<Bid, AuctionError> {
        self.simulate_latency().await;

        let now = self.clock.now();
        let mut auctions = self.auctions.write().await;
        let auction = auctions
            .iter_mut()
            .find(|a| a.id == cmd.auction_id)
            .ok_or_else(|| AuctionError::AuctionNotFound(cmd.auction_id.clone()))?;
        validate_bid(auction, cmd, now)?;

        let bid = auction.push_winning_bid(Bid {
            id: uuid::Uuid::new_v4().to_string(),
            auction_id: cmd.auction_id.clone(),
            bidder_id: cmd.bidder_id.clone(),
            bidder_name: cmd.display_name(),
            amount: cmd.amount,
            timestamp: now,
            is_winning: false,
        });
        info!(
            "{:<12} --> 목 입찰 확정 {}: {}",
            "MockSource", bid.auction_id, bid.amount
        );
        Ok(bid)
    }
}
// endregion: --- Mock Data Source
