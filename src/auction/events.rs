use crate::auction::model::AuctionStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 스토어 변경 이벤트 (구독자에게 브로드캐스트)
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuctionEvent {
    // 스토어 초기 적재
    Hydrated {
        auction_count: usize,
    },
    // 경매 생성
    AuctionCreated {
        auction_id: String,
    },
    // 입찰 이벤트
    BidPlaced {
        auction_id: String,
        bidder_id: String,
        amount: i64,
        timestamp: DateTime<Utc>,
    },
    // 상태 변경
    StatusChanged {
        auction_id: String,
        from: AuctionStatus,
        to: AuctionStatus,
    },
    // 관심 경매 등록/해제
    WatchChanged {
        auction_id: String,
        watched: bool,
    },
    NotificationAdded {
        notification_id: String,
    },
    NotificationRead {
        notification_id: String,
    },
    NotificationsCleared,
}
