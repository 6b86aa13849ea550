/// 경매 클라이언트 상태 관리자
/// 세션 동안 경매, 입찰, 관심 경매, 알림을 단독으로 소유한다.
/// 모든 변경은 동기 메서드로만 이뤄지며 변경 내역은 AuctionEvent 로 브로드캐스트된다.
// region:    --- Imports
use crate::auction::events::AuctionEvent;
use crate::auction::model::{Auction, AuctionStatus, Bid};
use crate::bidding::commands::{validate_bid, PlaceBidCommand};
use crate::clock::SharedClock;
use crate::error::{AuctionError, ValidationCode};
use crate::notification::{AuctionNotification, NotificationKind};
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, info};

// endregion: --- Imports

// region:    --- Auction Store
/// 서비스 전체에서 공유하는 스토어 핸들
pub type SharedStore = Arc<RwLock<AuctionStore>>;

// 이벤트 채널 버퍼 크기
const EVENT_CHANNEL_CAPACITY: usize = 256;

pub struct AuctionStore {
    auctions: Vec<Auction>,
    // 최신 알림이 앞쪽
    notifications: Vec<AuctionNotification>,
    viewer_id: Option<String>,
    clock: SharedClock,
    events: broadcast::Sender<AuctionEvent>,
}

impl AuctionStore {
    /// 스토어 생성
    pub fn new(clock: SharedClock) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            auctions: Vec::new(),
            notifications: Vec::new(),
            viewer_id: None,
            clock,
            events,
        }
    }

    /// 현재 세션 사용자 지정 (outbid / won 알림 대상)
    pub fn with_viewer(mut self, viewer_id: impl Into<String>) -> Self {
        self.viewer_id = Some(viewer_id.into());
        self
    }

    pub fn into_shared(self) -> SharedStore {
        Arc::new(RwLock::new(self))
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn viewer_id(&self) -> Option<&str> {
        self.viewer_id.as_deref()
    }

    /// 변경 이벤트 구독
    pub fn subscribe(&self) -> broadcast::Receiver<AuctionEvent> {
        self.events.subscribe()
    }

    fn publish(&self, event: AuctionEvent) {
        // 구독자가 없으면 전송 실패는 무시
        let _ = self.events.send(event);
    }

    // region:    --- Auctions

    /// 데이터 소스에서 받은 경매로 교체 (기존 관심 표시는 유지)
    pub fn hydrate(&mut self, auctions: Vec<Auction>) {
        let watched: HashSet<String> = self
            .auctions
            .iter()
            .filter(|a| a.is_watched)
            .map(|a| a.id.clone())
            .collect();

        self.auctions = auctions
            .into_iter()
            .map(|mut auction| {
                if watched.contains(&auction.id) {
                    auction.is_watched = true;
                }
                auction
            })
            .collect();

        info!(
            "{:<12} --> 경매 {}건 적재 완료",
            "Store",
            self.auctions.len()
        );
        self.publish(AuctionEvent::Hydrated {
            auction_count: self.auctions.len(),
        });
    }

    pub fn auctions(&self) -> &[Auction] {
        &self.auctions
    }

    pub fn auction(&self, auction_id: &str) -> Option<&Auction> {
        self.auctions.iter().find(|a| a.id == auction_id)
    }

    fn auction_mut(&mut self, auction_id: &str) -> Result<&mut Auction, AuctionError> {
        self.auctions
            .iter_mut()
            .find(|a| a.id == auction_id)
            .ok_or_else(|| AuctionError::AuctionNotFound(auction_id.to_string()))
    }

    /// 데이터 소스가 확정한 새 경매 추가
    pub fn insert_auction(&mut self, auction: Auction) -> Result<Auction, AuctionError> {
        if self.auction(&auction.id).is_some() {
            return Err(AuctionError::validation(
                ValidationCode::InvalidAuction,
                format!("Auction {} already exists", auction.id),
            ));
        }

        info!(
            "{:<12} --> 경매 생성: {} ({})",
            "Store", auction.id, auction.status
        );
        self.auctions.push(auction.clone());
        self.publish(AuctionEvent::AuctionCreated {
            auction_id: auction.id.clone(),
        });
        Ok(auction)
    }

    /// 상태 변경. 변경이 일어났으면 true
    pub fn update_auction_status(
        &mut self,
        auction_id: &str,
        status: AuctionStatus,
    ) -> Result<bool, AuctionError> {
        let auction = self.auction_mut(auction_id)?;
        let from = auction.status;
        if from == status {
            return Ok(false);
        }
        if !from.can_transition_to(status) {
            return Err(AuctionError::InvalidTransition { from, to: status });
        }
        auction.status = status;

        info!(
            "{:<12} --> 경매 상태 변경 {}: {} -> {}",
            "Store", auction_id, from, status
        );
        self.publish(AuctionEvent::StatusChanged {
            auction_id: auction_id.to_string(),
            from,
            to: status,
        });
        Ok(true)
    }

    /// 시작 시간이 지난 upcoming 경매를 active 로 전환
    pub fn activate_due_auctions(&mut self, now: DateTime<Utc>) -> Vec<String> {
        let due: Vec<String> = self
            .auctions
            .iter()
            .filter(|a| a.status == AuctionStatus::Upcoming && a.start_time <= now)
            .map(|a| a.id.clone())
            .collect();

        for auction_id in &due {
            // 방금 찾은 id 이고 upcoming -> active 는 항상 허용된다
            let _ = self.update_auction_status(auction_id, AuctionStatus::Active);
        }
        due
    }

    // endregion: --- Auctions

    // region:    --- Bids

    /// 입찰
    pub fn place_bid(&mut self, cmd: PlaceBidCommand) -> Result<Bid, AuctionError> {
        let bid = Bid {
            id: uuid::Uuid::new_v4().to_string(),
            auction_id: cmd.auction_id.clone(),
            bidder_id: cmd.bidder_id.clone(),
            bidder_name: cmd.display_name(),
            amount: cmd.amount,
            timestamp: self.now(),
            is_winning: false,
        };
        self.record_bid(bid)
    }

    /// 이미 만들어진 입찰(데이터 소스 응답 등)을 검증 후 기록
    pub fn record_bid(&mut self, bid: Bid) -> Result<Bid, AuctionError> {
        let now = self.now();
        let cmd = PlaceBidCommand::new(bid.auction_id.clone(), bid.amount, bid.bidder_id.clone());

        let auction = self.auction_mut(&bid.auction_id)?;
        validate_bid(auction, &cmd, now)?;

        let previous_leader = auction.highest_bidder_id.clone();
        let recorded = auction.push_winning_bid(bid);
        debug!(
            "{:<12} --> 입찰 기록 {}: {} (총 {}건)",
            "Store", recorded.auction_id, recorded.amount, auction.bid_count
        );

        self.publish(AuctionEvent::BidPlaced {
            auction_id: recorded.auction_id.clone(),
            bidder_id: recorded.bidder_id.clone(),
            amount: recorded.amount,
            timestamp: recorded.timestamp,
        });

        // 세션 사용자가 최고 입찰자였다가 밀려난 경우
        let viewer_outbid = match (self.viewer_id.as_deref(), previous_leader.as_deref()) {
            (Some(viewer), Some(leader)) => viewer == leader && recorded.bidder_id != viewer,
            _ => false,
        };
        if viewer_outbid {
            self.add_notification(NotificationKind::Outbid {
                auction_id: recorded.auction_id.clone(),
                amount: recorded.amount,
            })?;
        }

        Ok(recorded)
    }

    // endregion: --- Bids

    // region:    --- Watch

    /// 관심 경매 등록. 상태가 바뀌었으면 true
    pub fn watch_auction(&mut self, auction_id: &str) -> Result<bool, AuctionError> {
        self.set_watched(auction_id, true)
    }

    /// 관심 경매 해제. 이미 해제된 경우 no-op
    pub fn unwatch_auction(&mut self, auction_id: &str) -> Result<bool, AuctionError> {
        self.set_watched(auction_id, false)
    }

    fn set_watched(&mut self, auction_id: &str, watched: bool) -> Result<bool, AuctionError> {
        let auction = self.auction_mut(auction_id)?;
        if auction.is_watched == watched {
            return Ok(false);
        }
        auction.is_watched = watched;
        auction.watchers = if watched {
            auction.watchers.saturating_add(1)
        } else {
            auction.watchers.saturating_sub(1)
        };

        self.publish(AuctionEvent::WatchChanged {
            auction_id: auction_id.to_string(),
            watched,
        });
        Ok(true)
    }

    // endregion: --- Watch

    // region:    --- Notifications

    /// 알림 추가 (맨 앞에 삽입)
    pub fn add_notification(
        &mut self,
        kind: NotificationKind,
    ) -> Result<AuctionNotification, AuctionError> {
        kind.validate()?;
        let car_title = self
            .auction(kind.auction_id())
            .map(|a| a.car.title())
            .unwrap_or_else(|| "this vehicle".to_string());

        let notification = AuctionNotification::new(kind, &car_title, self.now());
        debug!(
            "{:<12} --> 알림 추가: {} ({})",
            "Store", notification.title, notification.auction_id
        );
        self.notifications.insert(0, notification.clone());
        self.publish(AuctionEvent::NotificationAdded {
            notification_id: notification.id.clone(),
        });
        Ok(notification)
    }

    /// 같은 종류/같은 경매의 알림이 이미 있는지
    pub fn has_notification(&self, kind: &NotificationKind) -> bool {
        self.notifications
            .iter()
            .any(|n| n.kind.same_tag(kind) && n.auction_id == kind.auction_id())
    }

    /// 종료 알림 (세션 사용자가 최고 입찰자면 낙찰 알림)
    pub fn ended_notification(&self, auction_id: &str) -> Option<NotificationKind> {
        let auction = self.auction(auction_id)?;
        let viewer_won = auction.bid_count > 0
            && auction.highest_bidder_id.is_some()
            && auction.highest_bidder_id.as_deref() == self.viewer_id.as_deref();

        if viewer_won {
            Some(NotificationKind::Won {
                auction_id: auction.id.clone(),
                amount: auction.current_bid,
            })
        } else {
            Some(NotificationKind::Ended {
                auction_id: auction.id.clone(),
                final_bid: auction.current_bid,
                winner_name: auction.highest_bidder_name.clone(),
            })
        }
    }

    pub fn notifications(&self) -> &[AuctionNotification] {
        &self.notifications
    }

    /// 읽음 처리. 이미 읽었거나 없는 id 면 no-op
    pub fn mark_notification_read(&mut self, notification_id: &str) -> bool {
        let Some(notification) = self
            .notifications
            .iter_mut()
            .find(|n| n.id == notification_id && !n.read)
        else {
            return false;
        };
        notification.read = true;
        self.publish(AuctionEvent::NotificationRead {
            notification_id: notification_id.to_string(),
        });
        true
    }

    /// 모두 읽음 처리. 새로 읽음 처리된 개수 반환
    pub fn mark_all_notifications_read(&mut self) -> usize {
        let ids: Vec<String> = self
            .notifications
            .iter()
            .filter(|n| !n.read)
            .map(|n| n.id.clone())
            .collect();
        for id in &ids {
            self.mark_notification_read(id);
        }
        ids.len()
    }

    pub fn clear_notifications(&mut self) {
        self.notifications.clear();
        self.publish(AuctionEvent::NotificationsCleared);
    }

    /// 안 읽은 알림 수 (매 호출마다 계산)
    pub fn unread_count(&self) -> usize {
        self.notifications.iter().filter(|n| !n.read).count()
    }

    // endregion: --- Notifications
}
// endregion: --- Auction Store
