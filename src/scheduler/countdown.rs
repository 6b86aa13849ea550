// region:    --- Imports
use crate::auction::model::AuctionStatus;
use crate::error::AuctionError;
use crate::notification::NotificationKind;
use crate::store::AuctionStore;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

// endregion: --- Imports

// region:    --- Remaining Time
const SECS_PER_MINUTE: i64 = 60;
const SECS_PER_HOUR: i64 = 60 * SECS_PER_MINUTE;
const SECS_PER_DAY: i64 = 24 * SECS_PER_HOUR;

/// 남은 시간 (일/시/분/초)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Remaining {
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
    pub total_seconds: i64,
}

impl Remaining {
    pub fn from_secs(total_seconds: i64) -> Self {
        Self {
            days: total_seconds / SECS_PER_DAY,
            hours: (total_seconds % SECS_PER_DAY) / SECS_PER_HOUR,
            minutes: (total_seconds % SECS_PER_HOUR) / SECS_PER_MINUTE,
            seconds: total_seconds % SECS_PER_MINUTE,
            total_seconds,
        }
    }

    /// 종료까지 남은 시간. 이미 지났으면 None
    pub fn until(end_time: DateTime<Utc>, now: DateTime<Utc>) -> Option<Self> {
        let millis = (end_time - now).num_milliseconds();
        if millis <= 0 {
            return None;
        }
        Some(Self::from_secs(millis / 1000))
    }

    pub fn label(&self) -> String {
        if self.days > 0 {
            format!(
                "{}d {:02}h {:02}m {:02}s",
                self.days, self.hours, self.minutes, self.seconds
            )
        } else {
            format!("{:02}h {:02}m {:02}s", self.hours, self.minutes, self.seconds)
        }
    }
}

/// 카운트다운 표시 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum CountdownDisplay {
    Running(Remaining),
    Expired,
    /// 경매가 스토어에서 사라짐
    Detached,
}

impl CountdownDisplay {
    pub fn at(end_time: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        match Remaining::until(end_time, now) {
            Some(remaining) => CountdownDisplay::Running(remaining),
            None => CountdownDisplay::Expired,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, CountdownDisplay::Running(_))
    }
}
// endregion: --- Remaining Time

// region:    --- Countdown
/// 종료 임박 알림 판정 방식
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndingSoonPolicy {
    /// 남은 시간이 정확히 임계값일 때만 (틱을 건너뛰면 놓친다)
    Exact,
    /// 임계값을 넘어서는 첫 틱
    #[default]
    Crossing,
}

/// 경매 하나에 대한 카운트다운 상태
/// 경매 자체가 아닌 (id, 종료 시간) 만 참조한다.
#[derive(Debug, Clone)]
pub struct Countdown {
    auction_id: String,
    end_time: DateTime<Utc>,
    ending_soon_secs: i64,
    policy: EndingSoonPolicy,
    last_remaining_secs: Option<i64>,
    ending_soon_fired: bool,
    finished: Option<CountdownDisplay>,
}

impl Countdown {
    pub fn new(
        auction_id: impl Into<String>,
        end_time: DateTime<Utc>,
        ending_soon_secs: i64,
        policy: EndingSoonPolicy,
    ) -> Self {
        Self {
            auction_id: auction_id.into(),
            end_time,
            ending_soon_secs,
            policy,
            last_remaining_secs: None,
            ending_soon_fired: false,
            finished: None,
        }
    }

    pub fn auction_id(&self) -> &str {
        &self.auction_id
    }

    pub fn end_time(&self) -> DateTime<Utc> {
        self.end_time
    }

    pub fn is_finished(&self) -> bool {
        self.finished.is_some()
    }

    /// 1초마다 호출되는 틱
    /// 종료 처리와 알림은 카운트다운 하나당 최대 한 번
    pub fn tick(&mut self, now: DateTime<Utc>, store: &mut AuctionStore) -> CountdownDisplay {
        if let Some(done) = self.finished {
            return done;
        }

        if store.auction(&self.auction_id).is_none() {
            debug!(
                "{:<12} --> 경매 {} 없음, 카운트다운 분리",
                "Countdown", self.auction_id
            );
            return self.finish(CountdownDisplay::Detached);
        }

        let Some(remaining) = Remaining::until(self.end_time, now) else {
            self.expire(store);
            return self.finish(CountdownDisplay::Expired);
        };

        if self.should_fire_ending_soon(remaining.total_seconds) {
            self.ending_soon_fired = true;
            let kind = NotificationKind::EndingSoon {
                auction_id: self.auction_id.clone(),
                minutes_left: (self.ending_soon_secs + SECS_PER_MINUTE - 1) / SECS_PER_MINUTE,
            };
            // 다시 마운트된 카운트다운이 같은 알림을 또 만들지 않도록
            if !store.has_notification(&kind) {
                if let Err(e) = store.add_notification(kind) {
                    warn!("{:<12} --> 종료 임박 알림 실패: {}", "Countdown", e);
                }
            }
        }
        self.last_remaining_secs = Some(remaining.total_seconds);

        CountdownDisplay::Running(remaining)
    }

    fn should_fire_ending_soon(&self, remaining_secs: i64) -> bool {
        if self.ending_soon_fired {
            return false;
        }
        match self.policy {
            EndingSoonPolicy::Exact => remaining_secs == self.ending_soon_secs,
            EndingSoonPolicy::Crossing => {
                remaining_secs <= self.ending_soon_secs
                    && match self.last_remaining_secs {
                        Some(previous) => previous > self.ending_soon_secs,
                        None => remaining_secs == self.ending_soon_secs,
                    }
            }
        }
    }

    fn expire(&self, store: &mut AuctionStore) {
        match store.update_auction_status(&self.auction_id, AuctionStatus::Ended) {
            Ok(true) => {
                info!("{:<12} --> 경매 종료: {}", "Countdown", self.auction_id);
                if let Some(kind) = store.ended_notification(&self.auction_id) {
                    if let Err(e) = store.add_notification(kind) {
                        warn!("{:<12} --> 종료 알림 실패: {}", "Countdown", e);
                    }
                }
            }
            // 이미 다른 경로로 종료됨
            Ok(false) => {}
            Err(AuctionError::AuctionNotFound(_)) => {}
            Err(e) => warn!("{:<12} --> 경매 종료 처리 실패: {}", "Countdown", e),
        }
    }

    fn finish(&mut self, display: CountdownDisplay) -> CountdownDisplay {
        self.finished = Some(display);
        display
    }
}
// endregion: --- Countdown

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{Clock, ManualClock};
    use crate::data_source::fixtures::seed_auctions;
    use chrono::Duration;
    use std::sync::Arc;

    const FIVE_MINUTES: i64 = 300;

    fn setup() -> (AuctionStore, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let mut store = AuctionStore::new(clock.clone()).with_viewer("user-9");
        store.hydrate(seed_auctions(clock.now()));
        (store, clock)
    }

    fn ending_soon_count(store: &AuctionStore) -> usize {
        store
            .notifications()
            .iter()
            .filter(|n| matches!(n.kind, NotificationKind::EndingSoon { .. }))
            .count()
    }

    #[test]
    fn remaining_splits_into_fields() {
        let r = Remaining::from_secs(SECS_PER_DAY + 2 * SECS_PER_HOUR + 3 * 60 + 4);
        assert_eq!((r.days, r.hours, r.minutes, r.seconds), (1, 2, 3, 4));
        assert_eq!(r.label(), "1d 02h 03m 04s");
        assert_eq!(Remaining::from_secs(300).label(), "00h 05m 00s");

        let now = Utc::now();
        assert!(Remaining::until(now, now).is_none());
        assert!(Remaining::until(now - Duration::seconds(1), now).is_none());
        assert_eq!(
            Remaining::until(now + Duration::milliseconds(1500), now).map(|r| r.total_seconds),
            Some(1)
        );
    }

    #[test]
    fn past_deadline_expires_once_and_stops() {
        let (mut store, clock) = setup();
        let end = clock.now() - Duration::seconds(1);
        let mut countdown = Countdown::new("auction-1", end, FIVE_MINUTES, EndingSoonPolicy::Crossing);
        let mut events = store.subscribe();

        assert_eq!(countdown.tick(clock.now(), &mut store), CountdownDisplay::Expired);
        assert!(countdown.is_finished());
        assert_eq!(store.auction("auction-1").unwrap().status, AuctionStatus::Ended);
        assert_eq!(store.notifications().len(), 1);
        assert!(matches!(
            store.notifications()[0].kind,
            NotificationKind::Ended { final_bid: 82_000, .. }
        ));

        // 종료 후 틱은 아무것도 하지 않는다
        while events.try_recv().is_ok() {}
        clock.advance(Duration::seconds(1));
        assert_eq!(countdown.tick(clock.now(), &mut store), CountdownDisplay::Expired);
        assert!(events.try_recv().is_err());
        assert_eq!(store.notifications().len(), 1);
    }

    #[test]
    fn already_ended_auction_gets_no_second_notification() {
        let (mut store, clock) = setup();
        let auction = store.auction("auction-4").cloned().unwrap();
        let mut countdown =
            Countdown::new("auction-4", auction.end_time, FIVE_MINUTES, EndingSoonPolicy::Crossing);

        assert_eq!(countdown.tick(clock.now(), &mut store), CountdownDisplay::Expired);
        assert!(store.notifications().is_empty());
    }

    #[test]
    fn missing_auction_detaches_silently() {
        let (mut store, clock) = setup();
        let mut countdown = Countdown::new(
            "gone",
            clock.now() - Duration::seconds(5),
            FIVE_MINUTES,
            EndingSoonPolicy::Crossing,
        );
        assert_eq!(countdown.tick(clock.now(), &mut store), CountdownDisplay::Detached);
        assert!(store.notifications().is_empty());
    }

    #[test]
    fn exact_policy_fires_once_at_five_minutes() {
        let (mut store, clock) = setup();
        let end = clock.now() + Duration::seconds(FIVE_MINUTES + 2);
        let mut countdown = Countdown::new("auction-2", end, FIVE_MINUTES, EndingSoonPolicy::Exact);

        countdown.tick(clock.now(), &mut store);
        clock.advance(Duration::seconds(1));
        countdown.tick(clock.now(), &mut store);
        assert_eq!(ending_soon_count(&store), 0);

        clock.advance(Duration::seconds(1));
        let display = countdown.tick(clock.now(), &mut store);
        assert!(matches!(
            display,
            CountdownDisplay::Running(Remaining { minutes: 5, seconds: 0, .. })
        ));
        assert_eq!(ending_soon_count(&store), 1);

        // 같은 초 안에 다시 그려도 중복 없음
        countdown.tick(clock.now(), &mut store);
        assert_eq!(ending_soon_count(&store), 1);
    }

    #[test]
    fn exact_policy_misses_skipped_tick() {
        let (mut store, clock) = setup();
        let end = clock.now() + Duration::seconds(FIVE_MINUTES + 1);
        let mut countdown = Countdown::new("auction-2", end, FIVE_MINUTES, EndingSoonPolicy::Exact);

        countdown.tick(clock.now(), &mut store);
        clock.advance(Duration::seconds(3));
        countdown.tick(clock.now(), &mut store);
        assert_eq!(ending_soon_count(&store), 0);
    }

    #[test]
    fn crossing_policy_survives_skipped_tick() {
        let (mut store, clock) = setup();
        let end = clock.now() + Duration::seconds(FIVE_MINUTES + 1);
        let mut countdown =
            Countdown::new("auction-2", end, FIVE_MINUTES, EndingSoonPolicy::Crossing);

        countdown.tick(clock.now(), &mut store);
        clock.advance(Duration::seconds(3));
        countdown.tick(clock.now(), &mut store);
        assert_eq!(ending_soon_count(&store), 1);

        clock.advance(Duration::seconds(1));
        countdown.tick(clock.now(), &mut store);
        assert_eq!(ending_soon_count(&store), 1);
    }

    #[test]
    fn crossing_policy_ignores_mount_inside_window() {
        let (mut store, clock) = setup();
        let end = clock.now() + Duration::seconds(120);
        let mut countdown =
            Countdown::new("auction-2", end, FIVE_MINUTES, EndingSoonPolicy::Crossing);
        countdown.tick(clock.now(), &mut store);
        assert_eq!(ending_soon_count(&store), 0);
    }

    #[test]
    fn remounted_countdown_does_not_duplicate() {
        let (mut store, clock) = setup();
        let end = clock.now() + Duration::seconds(FIVE_MINUTES);

        let mut first = Countdown::new("auction-2", end, FIVE_MINUTES, EndingSoonPolicy::Exact);
        first.tick(clock.now(), &mut store);
        let mut second = Countdown::new("auction-2", end, FIVE_MINUTES, EndingSoonPolicy::Exact);
        second.tick(clock.now(), &mut store);

        assert_eq!(ending_soon_count(&store), 1);
    }
}
