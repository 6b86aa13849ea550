// region:    --- Imports
use axum::extract::DefaultBodyLimit;
use car_auction_client::clock::{SharedClock, SystemClock};
use car_auction_client::config::Config;
use car_auction_client::data_source::{
    DataSource, HttpDataSource, MockDataSource, SharedDataSource,
};
use car_auction_client::handlers::{self, AppState};
use car_auction_client::scheduler::AuctionScheduler;
use car_auction_client::store::AuctionStore;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};
// endregion: --- Imports

// region:    --- Main
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // logging 초기화
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .without_time()
        .with_target(false)
        .init();

    let config = Config::load();
    let clock: SharedClock = Arc::new(SystemClock);

    // 데이터 소스 선택 (원격 주소가 없으면 목 데이터)
    let data_source: SharedDataSource = match &config.api_url {
        Some(url) => {
            info!("{:<12} --> 원격 데이터 소스: {}", "Main", url);
            Arc::new(HttpDataSource::new(
                url.clone(),
                config.request_timeout,
                config.max_retries,
                config.retry_backoff,
            )?)
        }
        None => {
            info!("{:<12} --> 목 데이터 소스 사용", "Main");
            Arc::new(MockDataSource::new(clock.clone(), config.mock_delay))
        }
    };

    // 세션 스토어 생성 및 적재
    let store = AuctionStore::new(clock.clone())
        .with_viewer(config.viewer_id.clone())
        .into_shared();
    match data_source.fetch_auctions().await {
        Ok(auctions) => store.write().await.hydrate(auctions),
        Err(e) => {
            error!("{:<12} --> 경매 적재 실패: {}", "Main", e);
            return Err(e.into());
        }
    }

    // 카운트다운 및 상태 스케줄러 시작
    let mut scheduler = AuctionScheduler::new(store.clone(), clock, config.countdown_settings());
    scheduler.mount_open_auctions().await;
    let _status_loop = scheduler.start();

    // 테스트 페이지를 위한 cors 설정
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let state = AppState {
        store,
        data_source,
        scheduler: Arc::new(Mutex::new(scheduler)),
    };
    let routes_all = handlers::routes(state)
        .layer(cors)
        .layer(DefaultBodyLimit::max(1024 * 1024));

    let listener = TcpListener::bind(("0.0.0.0", config.port)).await?;
    info!(
        "{:<12} --> Web Server: Listening on {}",
        "Main",
        listener.local_addr()?
    );

    // 서버 실행
    if let Err(err) = axum::serve(listener, routes_all.into_make_service()).await {
        error!("{:<12} --> Server error: {}", "Main", err);
    }
    Ok(())
}
// endregion: --- Main
