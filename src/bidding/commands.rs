/// 입찰 관련 커맨드 처리
/// 1. 입찰 검증
/// 2. 경매 생성 검증
/// 3. 데이터 소스를 거친 입찰
/// 4. 데이터 소스를 거친 경매 생성
// region:    --- Imports
use crate::auction::model::{format_usd, Auction, AuctionStatus, Bid, Car};
use crate::data_source::DataSource;
use crate::error::{AuctionError, ValidationCode};
use crate::store::SharedStore;
use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
// endregion: --- Imports

// region:    --- Commands
/// 입찰 명령
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PlaceBidCommand {
    pub auction_id: String,
    pub bidder_id: String,
    #[serde(default)]
    pub bidder_name: Option<String>,
    pub amount: i64,
}

impl PlaceBidCommand {
    pub fn new(auction_id: impl Into<String>, amount: i64, bidder_id: impl Into<String>) -> Self {
        Self {
            auction_id: auction_id.into(),
            bidder_id: bidder_id.into(),
            bidder_name: None,
            amount,
        }
    }

    pub fn with_bidder_name(mut self, name: impl Into<String>) -> Self {
        self.bidder_name = Some(name.into());
        self
    }

    pub fn display_name(&self) -> String {
        self.bidder_name
            .clone()
            .unwrap_or_else(|| self.bidder_id.clone())
    }
}

/// 경매 생성 명령
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CreateAuctionCommand {
    pub car: Car,
    pub start_price: i64,
    #[serde(default)]
    pub reserve_price: Option<i64>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub seller_id: String,
    pub seller_name: String,
}

// 최초 자동차 생산 연도
const FIRST_CAR_YEAR: i32 = 1886;
// endregion: --- Commands

// region:    --- Validation
/// 1. 입찰 검증
pub fn validate_bid(
    auction: &Auction,
    cmd: &PlaceBidCommand,
    now: DateTime<Utc>,
) -> Result<(), AuctionError> {
    match auction.status {
        AuctionStatus::Upcoming => {
            return Err(AuctionError::validation(
                ValidationCode::NotActive,
                "Auction has not started yet",
            ))
        }
        AuctionStatus::Ended => {
            return Err(AuctionError::validation(
                ValidationCode::AlreadyEnded,
                "Auction has already ended",
            ))
        }
        AuctionStatus::Active if now >= auction.end_time => {
            return Err(AuctionError::validation(
                ValidationCode::AlreadyEnded,
                "Auction has already ended",
            ))
        }
        AuctionStatus::Active => {}
    }

    if cmd.bidder_id == auction.seller_id {
        return Err(AuctionError::validation(
            ValidationCode::SelfBid,
            "You cannot bid on your own auction",
        ));
    }

    if cmd.amount <= auction.current_bid {
        return Err(AuctionError::validation(
            ValidationCode::LowBid,
            format!("Bid must be greater than {}", format_usd(auction.current_bid)),
        ));
    }

    Ok(())
}

/// 2. 경매 생성 검증
pub fn validate_create(cmd: &CreateAuctionCommand, now: DateTime<Utc>) -> Result<(), AuctionError> {
    let invalid = |message: &str| {
        Err(AuctionError::validation(
            ValidationCode::InvalidAuction,
            message,
        ))
    };

    if cmd.car.make.trim().is_empty() || cmd.car.model.trim().is_empty() {
        return invalid("Car make and model are required");
    }
    if cmd.car.year < FIRST_CAR_YEAR || cmd.car.year > now.year() + 1 {
        return invalid("Car year is out of range");
    }
    if cmd.car.mileage < 0 {
        return invalid("Mileage cannot be negative");
    }
    if cmd.start_price <= 0 {
        return invalid("Starting price must be positive");
    }
    if let Some(reserve) = cmd.reserve_price {
        if reserve < cmd.start_price {
            return invalid("Reserve price cannot be below the starting price");
        }
    }
    if cmd.end_time <= cmd.start_time {
        return invalid("End time must be after start time");
    }
    if cmd.end_time <= now {
        return invalid("End time must be in the future");
    }
    if cmd.seller_id.trim().is_empty() {
        return invalid("Seller is required");
    }
    Ok(())
}

/// 검증 후 새 경매 생성 (초기 상태는 현재 시간 기준으로 결정)
pub fn build_auction(cmd: CreateAuctionCommand, now: DateTime<Utc>) -> Result<Auction, AuctionError> {
    validate_create(&cmd, now)?;
    Ok(Auction {
        id: uuid::Uuid::new_v4().to_string(),
        status: AuctionStatus::at(cmd.start_time, cmd.end_time, now),
        car: cmd.car,
        start_price: cmd.start_price,
        reserve_price: cmd.reserve_price,
        current_bid: cmd.start_price,
        bid_count: 0,
        highest_bidder_id: None,
        highest_bidder_name: None,
        start_time: cmd.start_time,
        end_time: cmd.end_time,
        bids: Vec::new(),
        watchers: 0,
        is_watched: false,
        seller_id: cmd.seller_id,
        seller_name: cmd.seller_name,
    })
}
// endregion: --- Validation

// region:    --- Command Handlers
/// 3. 데이터 소스를 거친 입찰
/// 스토어 락은 데이터 소스 호출 동안 잡지 않는다.
pub async fn handle_place_bid(
    cmd: PlaceBidCommand,
    data_source: &dyn DataSource,
    store: &SharedStore,
) -> Result<Bid, AuctionError> {
    info!("{:<12} --> 입찰 요청 처리 시작: {:?}", "Command", cmd);

    // 로컬 상태로 먼저 검증
    {
        let store = store.read().await;
        let auction = store
            .auction(&cmd.auction_id)
            .ok_or_else(|| AuctionError::AuctionNotFound(cmd.auction_id.clone()))?;
        validate_bid(auction, &cmd, store.now())?;
    }

    let bid = data_source.place_bid(&cmd).await.map_err(|e| {
        warn!("{:<12} --> 데이터 소스 입찰 거부: {}", "Command", e);
        e
    })?;

    // 응답 대기 중 상태가 바뀌었을 수 있으므로 기록 시 재검증
    let mut store = store.write().await;
    store.record_bid(bid.clone()).map_err(|e| {
        warn!(
            "{:<12} --> 데이터 소스는 입찰 {} 을 확정했지만 로컬 기록 실패 {}: {}",
            "Command", bid.id, bid.auction_id, e
        );
        e
    })
}

/// 4. 데이터 소스를 거친 경매 생성
pub async fn handle_create_auction(
    cmd: CreateAuctionCommand,
    data_source: &dyn DataSource,
    store: &SharedStore,
) -> Result<Auction, AuctionError> {
    info!("{:<12} --> 경매 생성 처리 시작: {}", "Command", cmd.car.title());

    let now = store.read().await.now();
    let auction = build_auction(cmd, now)?;

    let auction = data_source.create_auction(&auction).await.map_err(|e| {
        warn!("{:<12} --> 데이터 소스 경매 생성 거부: {}", "Command", e);
        e
    })?;

    store.write().await.insert_auction(auction)
}
// endregion: --- Command Handlers

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auction::model::CarCondition;
    use crate::clock::{Clock, ManualClock};
    use crate::data_source::fixtures::seed_auctions;
    use crate::data_source::MockDataSource;
    use crate::store::AuctionStore;
    use chrono::Duration;
    use std::sync::Arc;

    fn car() -> Car {
        Car {
            id: "car-1".to_string(),
            make: "Porsche".to_string(),
            model: "911 Carrera".to_string(),
            year: 2021,
            mileage: 12_000,
            condition: CarCondition::Excellent,
            images: vec![],
            estimated_value: 95_000,
            owner_id: "3".to_string(),
            owner_name: "Marco Ruiz".to_string(),
        }
    }

    fn active_auction(now: DateTime<Utc>) -> Auction {
        Auction {
            id: "a-1".to_string(),
            car: car(),
            start_price: 75_000,
            reserve_price: Some(85_000),
            current_bid: 82_000,
            bid_count: 0,
            highest_bidder_id: None,
            highest_bidder_name: None,
            start_time: now - Duration::hours(1),
            end_time: now + Duration::hours(1),
            status: AuctionStatus::Active,
            bids: vec![],
            watchers: 0,
            is_watched: false,
            seller_id: "3".to_string(),
            seller_name: "Marco Ruiz".to_string(),
        }
    }

    fn code_of(result: Result<(), AuctionError>) -> ValidationCode {
        match result {
            Err(AuctionError::Validation { code, .. }) => code,
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn low_bid_message_names_current_price() {
        let now = Utc::now();
        let auction = active_auction(now);
        let err = validate_bid(&auction, &PlaceBidCommand::new("a-1", 82_000, "user-9"), now)
            .unwrap_err();
        assert_eq!(err.to_string(), "Bid must be greater than $82,000");
        assert!(validate_bid(&auction, &PlaceBidCommand::new("a-1", 83_000, "user-9"), now).is_ok());
    }

    #[test]
    fn seller_cannot_bid_regardless_of_amount() {
        let now = Utc::now();
        let auction = active_auction(now);
        let result = validate_bid(&auction, &PlaceBidCommand::new("a-1", 90_000, "3"), now);
        assert_eq!(code_of(result), ValidationCode::SelfBid);
    }

    #[test]
    fn inactive_or_expired_auctions_reject() {
        let now = Utc::now();
        let cmd = PlaceBidCommand::new("a-1", 90_000, "user-9");

        let mut upcoming = active_auction(now);
        upcoming.status = AuctionStatus::Upcoming;
        assert_eq!(code_of(validate_bid(&upcoming, &cmd, now)), ValidationCode::NotActive);

        let mut ended = active_auction(now);
        ended.status = AuctionStatus::Ended;
        assert_eq!(code_of(validate_bid(&ended, &cmd, now)), ValidationCode::AlreadyEnded);

        let past_deadline = active_auction(now);
        let later = past_deadline.end_time + Duration::seconds(1);
        assert_eq!(
            code_of(validate_bid(&past_deadline, &cmd, later)),
            ValidationCode::AlreadyEnded
        );
    }

    #[test]
    fn create_rejects_malformed_parameters() {
        let now = Utc::now();
        let valid = CreateAuctionCommand {
            car: car(),
            start_price: 50_000,
            reserve_price: Some(60_000),
            start_time: now,
            end_time: now + Duration::days(3),
            seller_id: "3".to_string(),
            seller_name: "Marco Ruiz".to_string(),
        };
        assert!(validate_create(&valid, now).is_ok());

        let mut low_reserve = valid.clone();
        low_reserve.reserve_price = Some(10_000);
        assert!(validate_create(&low_reserve, now).is_err());

        let mut backwards = valid.clone();
        backwards.end_time = backwards.start_time - Duration::minutes(1);
        assert!(validate_create(&backwards, now).is_err());

        let mut free = valid.clone();
        free.start_price = 0;
        assert!(validate_create(&free, now).is_err());

        let mut nameless = valid;
        nameless.car.make = String::new();
        assert!(validate_create(&nameless, now).is_err());
    }

    // region:    --- Data Source Flow

    fn session(delay: std::time::Duration) -> (Arc<MockDataSource>, SharedStore, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let source = Arc::new(MockDataSource::new(clock.clone(), delay));
        let mut store = AuctionStore::new(clock.clone()).with_viewer("user-9");
        store.hydrate(seed_auctions(clock.now()));
        (source, store.into_shared(), clock)
    }

    #[tokio::test]
    async fn created_auction_accepts_bids_through_data_source() {
        let (source, store, clock) = session(std::time::Duration::ZERO);
        let now = clock.now();
        let cmd = CreateAuctionCommand {
            car: car(),
            start_price: 40_000,
            reserve_price: None,
            start_time: now - Duration::minutes(1),
            end_time: now + Duration::hours(1),
            seller_id: "3".to_string(),
            seller_name: "Marco Ruiz".to_string(),
        };

        let auction = handle_create_auction(cmd, source.as_ref(), &store).await.unwrap();
        assert_eq!(auction.status, AuctionStatus::Active);
        assert_eq!(source.fetch_auction(&auction.id).await.unwrap().id, auction.id);

        let bid = handle_place_bid(
            PlaceBidCommand::new(auction.id.clone(), 45_000, "user-1"),
            source.as_ref(),
            &store,
        )
        .await
        .unwrap();
        assert_eq!(bid.amount, 45_000);
        assert_eq!(store.read().await.auction(&auction.id).unwrap().current_bid, 45_000);
    }

    #[tokio::test]
    async fn invalid_auction_never_reaches_data_source() {
        let (source, store, clock) = session(std::time::Duration::ZERO);
        let now = clock.now();
        let cmd = CreateAuctionCommand {
            car: car(),
            start_price: 0,
            reserve_price: None,
            start_time: now,
            end_time: now + Duration::hours(1),
            seller_id: "3".to_string(),
            seller_name: "Marco Ruiz".to_string(),
        };

        assert!(handle_create_auction(cmd, source.as_ref(), &store).await.is_err());
        assert_eq!(source.fetch_auctions().await.unwrap().len(), 4);
        assert_eq!(store.read().await.auctions().len(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn bid_overtaken_locally_while_source_responds_is_rejected() {
        let (source, store, _) = session(std::time::Duration::from_millis(500));

        let task = {
            let source = source.clone();
            let store = store.clone();
            tokio::spawn(async move {
                handle_place_bid(
                    PlaceBidCommand::new("auction-1", 85_000, "user-11"),
                    source.as_ref(),
                    &store,
                )
                .await
            })
        };

        // 데이터 소스 응답 대기 중 로컬에서 더 높은 입찰
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        store
            .write()
            .await
            .place_bid(PlaceBidCommand::new("auction-1", 90_000, "user-12"))
            .unwrap();

        let err = task.await.unwrap().unwrap_err();
        assert_eq!(err.code(), "LOW_BID");

        let local = store.read().await.auction("auction-1").cloned().unwrap();
        assert_eq!(local.current_bid, 90_000);
        assert_eq!(local.highest_bidder_id.as_deref(), Some("user-12"));
        assert_eq!(source.fetch_auction("auction-1").await.unwrap().current_bid, 85_000);
    }
    // endregion: --- Data Source Flow
}
