/// 경매 타이머 스케줄러
/// 1. 경매별 카운트다운 (남은 시간 계산, 종료 임박 알림, 종료 처리)
/// 2. 시작 시간이 된 upcoming 경매를 active 로 전환하는 1초 주기 루프
// region:    --- Imports
use crate::auction::model::AuctionStatus;
use crate::clock::SharedClock;
use crate::store::SharedStore;
use std::collections::HashMap;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, info};

pub mod countdown;

pub use countdown::{Countdown, CountdownDisplay, EndingSoonPolicy, Remaining};

// endregion: --- Imports

// region:    --- Countdown Driver
/// 카운트다운 설정
#[derive(Debug, Clone, Copy)]
pub struct CountdownSettings {
    pub tick: Duration,
    pub ending_soon_secs: i64,
    pub policy: EndingSoonPolicy,
}

impl Default for CountdownSettings {
    fn default() -> Self {
        Self {
            tick: Duration::from_secs(1),
            ending_soon_secs: 300,
            policy: EndingSoonPolicy::Crossing,
        }
    }
}

/// 실행 중인 카운트다운 핸들
/// 핸들을 drop 하거나 cancel 하면 타이머가 즉시 멈춘다.
pub struct CountdownHandle {
    auction_id: String,
    display: watch::Receiver<CountdownDisplay>,
    task: Option<JoinHandle<()>>,
}

impl CountdownHandle {
    pub fn auction_id(&self) -> &str {
        &self.auction_id
    }

    /// 마지막 틱의 표시 상태
    pub fn display(&self) -> CountdownDisplay {
        *self.display.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<CountdownDisplay> {
        self.display.clone()
    }

    pub fn cancel(&self) {
        if let Some(task) = &self.task {
            task.abort();
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.as_ref().map_or(true, |task| task.is_finished())
    }

    /// 타이머 태스크가 끝날 때까지 대기 (취소 포함)
    pub async fn join(mut self) {
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for CountdownHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// 카운트다운을 tokio 인터벌 위에서 실행
pub fn spawn_countdown(
    store: SharedStore,
    clock: SharedClock,
    mut countdown: Countdown,
    tick: Duration,
) -> CountdownHandle {
    let auction_id = countdown.auction_id().to_string();
    let (tx, rx) = watch::channel(CountdownDisplay::at(countdown.end_time(), clock.now()));

    let task = tokio::spawn(async move {
        let mut interval = interval(tick);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            interval.tick().await;
            let state = {
                let mut store = store.write().await;
                countdown.tick(clock.now(), &mut store)
            };
            let _ = tx.send(state);
            if state.is_terminal() {
                debug!(
                    "{:<12} --> 카운트다운 종료 {}: {:?}",
                    "Countdown",
                    countdown.auction_id(),
                    state
                );
                break;
            }
        }
    });

    CountdownHandle {
        auction_id,
        display: rx,
        task: Some(task),
    }
}
// endregion: --- Countdown Driver

// region:    --- Auction Scheduler
/// 경매 타이머 스케줄러
pub struct AuctionScheduler {
    store: SharedStore,
    clock: SharedClock,
    settings: CountdownSettings,
    countdowns: HashMap<String, CountdownHandle>,
}

impl AuctionScheduler {
    pub fn new(store: SharedStore, clock: SharedClock, settings: CountdownSettings) -> Self {
        Self {
            store,
            clock,
            settings,
            countdowns: HashMap::new(),
        }
    }

    /// 경매 카운트다운 시작. 이미 돌고 있으면 false
    pub async fn mount(&mut self, auction_id: &str) -> bool {
        // 끝난 카운트다운 핸들 정리
        self.countdowns.retain(|_, handle| !handle.is_finished());
        if self.countdowns.contains_key(auction_id) {
            return false;
        }

        let end_time = {
            let store = self.store.read().await;
            match store.auction(auction_id) {
                Some(auction) => auction.end_time,
                None => return false,
            }
        };

        let countdown = Countdown::new(
            auction_id,
            end_time,
            self.settings.ending_soon_secs,
            self.settings.policy,
        );
        let handle = spawn_countdown(
            self.store.clone(),
            self.clock.clone(),
            countdown,
            self.settings.tick,
        );
        self.countdowns.insert(auction_id.to_string(), handle);
        true
    }

    /// 카운트다운 중지
    pub fn unmount(&mut self, auction_id: &str) -> bool {
        match self.countdowns.remove(auction_id) {
            Some(handle) => {
                handle.cancel();
                true
            }
            None => false,
        }
    }

    /// 종료되지 않은 모든 경매에 카운트다운 시작
    pub async fn mount_open_auctions(&mut self) -> usize {
        let open: Vec<String> = {
            let store = self.store.read().await;
            store
                .auctions()
                .iter()
                .filter(|a| a.status != AuctionStatus::Ended)
                .map(|a| a.id.clone())
                .collect()
        };

        let mut mounted = 0;
        for auction_id in &open {
            if self.mount(auction_id).await {
                mounted += 1;
            }
        }
        info!("{:<12} --> 카운트다운 {}개 시작", "Scheduler", mounted);
        mounted
    }

    pub fn display(&self, auction_id: &str) -> Option<CountdownDisplay> {
        self.countdowns.get(auction_id).map(|h| h.display())
    }

    /// 돌고 있는 카운트다운 수 (끝난 핸들은 정리)
    pub fn running(&mut self) -> usize {
        self.countdowns.retain(|_, handle| !handle.is_finished());
        self.countdowns.len()
    }

    /// upcoming -> active 전환 루프 시작
    pub fn start(&self) -> JoinHandle<()> {
        let store = self.store.clone();
        let clock = self.clock.clone();
        let tick = self.settings.tick;
        tokio::spawn(async move {
            let mut interval = interval(tick);
            loop {
                interval.tick().await;
                let activated = store.write().await.activate_due_auctions(clock.now());
                if !activated.is_empty() {
                    info!(
                        "{:<12} --> 경매 시작: {:?}",
                        "Scheduler", activated
                    );
                }
            }
        })
    }
}
// endregion: --- Auction Scheduler
