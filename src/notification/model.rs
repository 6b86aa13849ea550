// region:    --- Imports
use crate::auction::model::format_usd;
use crate::error::{AuctionError, ValidationCode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// endregion: --- Imports

// region:    --- Notification Kind
/// 알림 우선순위
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

/// 알림 종류 (종류별 필수 필드 포함)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NotificationKind {
    EndingSoon {
        auction_id: String,
        minutes_left: i64,
    },
    Ended {
        auction_id: String,
        final_bid: i64,
        winner_name: Option<String>,
    },
    Outbid {
        auction_id: String,
        amount: i64,
    },
    Won {
        auction_id: String,
        amount: i64,
    },
}

impl NotificationKind {
    pub fn auction_id(&self) -> &str {
        match self {
            NotificationKind::EndingSoon { auction_id, .. }
            | NotificationKind::Ended { auction_id, .. }
            | NotificationKind::Outbid { auction_id, .. }
            | NotificationKind::Won { auction_id, .. } => auction_id,
        }
    }

    /// 같은 종류인지 (필드 값은 무시)
    pub fn same_tag(&self, other: &NotificationKind) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }

    pub fn priority(&self) -> Priority {
        match self {
            NotificationKind::Ended { .. } => Priority::Medium,
            NotificationKind::EndingSoon { .. }
            | NotificationKind::Outbid { .. }
            | NotificationKind::Won { .. } => Priority::High,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            NotificationKind::EndingSoon { .. } => "Auction Ending Soon",
            NotificationKind::Ended { .. } => "Auction Ended",
            NotificationKind::Outbid { .. } => "You Have Been Outbid",
            NotificationKind::Won { .. } => "You Won the Auction",
        }
    }

    /// 사용자에게 보여줄 메시지
    pub fn message(&self, car_title: &str) -> String {
        match self {
            NotificationKind::EndingSoon { minutes_left, .. } => format!(
                "The auction for {} ends in {} minutes",
                car_title, minutes_left
            ),
            NotificationKind::Ended {
                final_bid,
                winner_name: Some(winner),
                ..
            } => format!(
                "The auction for {} has ended. Winning bid: {} by {}",
                car_title,
                format_usd(*final_bid),
                winner
            ),
            NotificationKind::Ended { .. } => {
                format!("The auction for {} has ended without bids", car_title)
            }
            NotificationKind::Outbid { amount, .. } => format!(
                "Someone placed a higher bid of {} on {}",
                format_usd(*amount),
                car_title
            ),
            NotificationKind::Won { amount, .. } => format!(
                "Congratulations! You won {} with a bid of {}",
                car_title,
                format_usd(*amount)
            ),
        }
    }

    /// 생성 시점 검증
    pub fn validate(&self) -> Result<(), AuctionError> {
        if self.auction_id().trim().is_empty() {
            return Err(AuctionError::validation(
                ValidationCode::InvalidNotification,
                "Notification must reference an auction",
            ));
        }
        let amount_ok = match self {
            NotificationKind::EndingSoon { minutes_left, .. } => *minutes_left > 0,
            NotificationKind::Ended { final_bid, .. } => *final_bid >= 0,
            NotificationKind::Outbid { amount, .. } | NotificationKind::Won { amount, .. } => {
                *amount > 0
            }
        };
        if !amount_ok {
            return Err(AuctionError::validation(
                ValidationCode::InvalidNotification,
                "Notification carries an invalid amount",
            ));
        }
        Ok(())
    }
}
// endregion: --- Notification Kind

// region:    --- Notification Model
/// 경매 알림
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuctionNotification {
    pub id: String,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub auction_id: String,
    pub priority: Priority,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

impl AuctionNotification {
    pub fn new(kind: NotificationKind, car_title: &str, created_at: DateTime<Utc>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title: kind.title().to_string(),
            message: kind.message(car_title),
            auction_id: kind.auction_id().to_string(),
            priority: kind.priority(),
            kind,
            read: false,
            created_at,
        }
    }
}
// endregion: --- Notification Model
