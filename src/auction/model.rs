use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// 차량 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CarCondition {
    Excellent,
    Good,
    Fair,
    Poor,
}

// 경매에 포함되는 차량 스냅샷
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Car {
    pub id: String,
    pub make: String,
    pub model: String,
    pub year: i32,
    pub mileage: i64,
    pub condition: CarCondition,
    #[serde(default)]
    pub images: Vec<String>,
    pub estimated_value: i64,
    pub owner_id: String,
    pub owner_name: String,
}

impl Car {
    pub fn title(&self) -> String {
        format!("{} {} {}", self.year, self.make, self.model)
    }
}

// 경매 상태 (upcoming -> active -> ended, 역방향 없음)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuctionStatus {
    Upcoming,
    Active,
    Ended,
}

impl AuctionStatus {
    /// 시작/종료 시간과 현재 시간으로 상태 결정
    pub fn at(start_time: DateTime<Utc>, end_time: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        if now < start_time {
            AuctionStatus::Upcoming
        } else if now >= end_time {
            AuctionStatus::Ended
        } else {
            AuctionStatus::Active
        }
    }

    pub fn can_transition_to(self, next: AuctionStatus) -> bool {
        next >= self
    }
}

impl fmt::Display for AuctionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AuctionStatus::Upcoming => "upcoming",
            AuctionStatus::Active => "active",
            AuctionStatus::Ended => "ended",
        };
        f.write_str(s)
    }
}

// 입찰 모델
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bid {
    pub id: String,
    pub auction_id: String,
    pub bidder_id: String,
    pub bidder_name: String,
    pub amount: i64,
    pub timestamp: DateTime<Utc>,
    pub is_winning: bool,
}

// 경매 모델
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Auction {
    pub id: String,
    pub car: Car,
    pub start_price: i64,
    pub reserve_price: Option<i64>,
    pub current_bid: i64,
    pub bid_count: usize,
    pub highest_bidder_id: Option<String>,
    pub highest_bidder_name: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: AuctionStatus,
    #[serde(default)]
    pub bids: Vec<Bid>,
    pub watchers: u32,
    #[serde(default)]
    pub is_watched: bool,
    pub seller_id: String,
    pub seller_name: String,
}

impl Auction {
    /// 리저브 가격이 없으면 항상 충족
    pub fn reserve_met(&self) -> bool {
        self.reserve_price
            .map_or(true, |reserve| self.current_bid >= reserve)
    }

    pub fn winning_bid(&self) -> Option<&Bid> {
        self.bids.iter().rev().find(|b| b.is_winning)
    }

    /// 입찰 추가: 이전 입찰은 모두 낙찰 플래그 해제
    pub(crate) fn push_winning_bid(&mut self, mut bid: Bid) -> Bid {
        for prior in self.bids.iter_mut() {
            prior.is_winning = false;
        }
        bid.is_winning = true;
        self.current_bid = bid.amount;
        self.highest_bidder_id = Some(bid.bidder_id.clone());
        self.highest_bidder_name = Some(bid.bidder_name.clone());
        self.bids.push(bid.clone());
        self.bid_count = self.bids.len();
        bid
    }
}

/// 달러 표기 ($82,000)
pub fn format_usd(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if amount < 0 {
        format!("-${}", grouped)
    } else {
        format!("${}", grouped)
    }
}
