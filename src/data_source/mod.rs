/// 경매 데이터 소스
/// 스토어는 데이터 소스에서 경매를 적재하고, 입찰은 데이터 소스를 거쳐 확정된다.
// region:    --- Imports
use crate::auction::model::{Auction, Bid, Car};
use crate::bidding::commands::PlaceBidCommand;
use crate::error::AuctionError;
use async_trait::async_trait;
use std::sync::Arc;

pub mod fixtures;
pub mod http;
pub mod mock;

pub use http::HttpDataSource;
pub use mock::MockDataSource;

// endregion: --- Imports

// region:    --- Data Source Trait
/// 데이터 소스 트레이트
#[async_trait]
pub trait DataSource: Send + Sync {
    /// 사용자 보유 차량
    async fn fetch_user_cars(&self, user_id: &str) -> Result<Vec<Car>, AuctionError>;

    async fn fetch_auction(&self, auction_id: &str) -> Result<Auction, AuctionError>;

    async fn fetch_active_auctions(&self) -> Result<Vec<Auction>, AuctionError>;

    /// 상태와 무관한 전체 경매 (스토어 적재용)
    async fn fetch_auctions(&self) -> Result<Vec<Auction>, AuctionError>;

    /// 새 경매 등록. 데이터 소스가 확정한 경매를 돌려준다.
    async fn create_auction(&self, auction: &Auction) -> Result<Auction, AuctionError>;

    /// 입찰 확정. 거부 시 사용자에게 보여줄 메시지를 담은 에러
    async fn place_bid(&self, cmd: &PlaceBidCommand) -> Result<Bid, AuctionError>;
}

pub type SharedDataSource = Arc<dyn DataSource>;
// endregion: --- Data Source Trait
