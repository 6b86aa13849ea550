// region:    --- Imports
use crate::auction::model::{Auction, Bid, Car};
use crate::bidding::commands::{
    handle_create_auction as create_auction, handle_place_bid, CreateAuctionCommand, PlaceBidCommand,
};
use crate::data_source::{DataSource, SharedDataSource};
use crate::error::AuctionError;
use crate::notification::AuctionNotification;
use crate::query::{self, AuctionFilter};
use crate::scheduler::{AuctionScheduler, CountdownDisplay};
use crate::store::SharedStore;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

// endregion: --- Imports

// region:    --- App State
/// 핸들러 공유 상태
#[derive(Clone)]
pub struct AppState {
    pub store: SharedStore,
    pub data_source: SharedDataSource,
    pub scheduler: Arc<Mutex<AuctionScheduler>>,
}

/// 라우터 설정
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/auctions", get(handle_get_auctions).post(handle_create_auction))
        .route("/auctions/:id", get(handle_get_auction))
        .route("/auctions/:id/bids", get(handle_get_bid_history))
        .route("/auctions/:id/highest-bid", get(handle_get_highest_bid))
        .route("/auctions/:id/countdown", get(handle_get_countdown))
        .route(
            "/auctions/:id/watch",
            post(handle_watch).delete(handle_unwatch),
        )
        .route("/bid", post(handle_bid))
        .route("/cars", get(handle_get_cars))
        .route(
            "/notifications",
            get(handle_get_notifications).delete(handle_clear_notifications),
        )
        .route("/notifications/unread-count", get(handle_get_unread_count))
        .route("/notifications/read-all", post(handle_mark_all_read))
        .route("/notifications/:id/read", post(handle_mark_read))
        .with_state(state)
}
// endregion: --- App State

// region:    --- Command Handlers

/// 입찰 요청 처리
pub async fn handle_bid(
    State(state): State<AppState>,
    Json(cmd): Json<PlaceBidCommand>,
) -> Result<impl IntoResponse, AuctionError> {
    info!("{:<12} --> 입찰 요청: {:?}", "Handler", cmd);
    let bid = handle_place_bid(cmd, state.data_source.as_ref(), &state.store).await?;
    Ok(Json(serde_json::json!({
        "message": "Bid placed successfully",
        "current_bid": bid.amount,
        "bid": bid,
    })))
}

/// 경매 생성
pub async fn handle_create_auction(
    State(state): State<AppState>,
    Json(cmd): Json<CreateAuctionCommand>,
) -> Result<(StatusCode, Json<Auction>), AuctionError> {
    info!("{:<12} --> 경매 생성 요청: {}", "Handler", cmd.car.title());
    let auction = create_auction(cmd, state.data_source.as_ref(), &state.store).await?;
    state.scheduler.lock().await.mount(&auction.id).await;
    Ok((StatusCode::CREATED, Json(auction)))
}

/// 관심 경매 등록
pub async fn handle_watch(
    State(state): State<AppState>,
    Path(auction_id): Path<String>,
) -> Result<impl IntoResponse, AuctionError> {
    let changed = state.store.write().await.watch_auction(&auction_id)?;
    Ok(Json(serde_json::json!({
        "auction_id": auction_id,
        "watched": true,
        "changed": changed,
    })))
}

/// 관심 경매 해제
pub async fn handle_unwatch(
    State(state): State<AppState>,
    Path(auction_id): Path<String>,
) -> Result<impl IntoResponse, AuctionError> {
    let changed = state.store.write().await.unwatch_auction(&auction_id)?;
    Ok(Json(serde_json::json!({
        "auction_id": auction_id,
        "watched": false,
        "changed": changed,
    })))
}

pub async fn handle_mark_read(
    State(state): State<AppState>,
    Path(notification_id): Path<String>,
) -> impl IntoResponse {
    let changed = state
        .store
        .write()
        .await
        .mark_notification_read(&notification_id);
    Json(serde_json::json!({ "changed": changed }))
}

pub async fn handle_mark_all_read(State(state): State<AppState>) -> impl IntoResponse {
    let marked = state.store.write().await.mark_all_notifications_read();
    Json(serde_json::json!({ "marked": marked }))
}

pub async fn handle_clear_notifications(State(state): State<AppState>) -> StatusCode {
    info!("{:<12} --> 알림 전체 삭제", "Handler");
    state.store.write().await.clear_notifications();
    StatusCode::NO_CONTENT
}

// endregion: --- Command Handlers

// region:    --- Query Handlers

/// 경매 목록 조회
pub async fn handle_get_auctions(
    State(state): State<AppState>,
    Query(filter): Query<AuctionFilter>,
) -> Json<Vec<Auction>> {
    let store = state.store.read().await;
    Json(query::handlers::list_auctions(&store, &filter))
}

/// 경매 조회
pub async fn handle_get_auction(
    State(state): State<AppState>,
    Path(auction_id): Path<String>,
) -> Result<Json<Auction>, AuctionError> {
    let store = state.store.read().await;
    Ok(Json(query::handlers::get_auction(&store, &auction_id)?))
}

/// 입찰 이력 조회
pub async fn handle_get_bid_history(
    State(state): State<AppState>,
    Path(auction_id): Path<String>,
) -> Result<Json<Vec<Bid>>, AuctionError> {
    let store = state.store.read().await;
    Ok(Json(query::handlers::get_bid_history(&store, &auction_id)?))
}

/// 최고 입찰가 조회 (입찰이 없으면 null)
pub async fn handle_get_highest_bid(
    State(state): State<AppState>,
    Path(auction_id): Path<String>,
) -> Result<impl IntoResponse, AuctionError> {
    let store = state.store.read().await;
    let highest = query::handlers::get_highest_bid(&store, &auction_id)?;
    Ok(Json(serde_json::json!({
        "auction_id": auction_id,
        "highest_bid": highest,
    })))
}

/// 남은 시간 조회
pub async fn handle_get_countdown(
    State(state): State<AppState>,
    Path(auction_id): Path<String>,
) -> Result<Json<CountdownDisplay>, AuctionError> {
    let store = state.store.read().await;
    Ok(Json(query::handlers::get_countdown(&store, &auction_id)?))
}

#[derive(Debug, Deserialize)]
pub struct CarsQuery {
    pub owner_id: String,
}

/// 사용자 보유 차량 조회 (데이터 소스)
pub async fn handle_get_cars(
    State(state): State<AppState>,
    Query(params): Query<CarsQuery>,
) -> Result<Json<Vec<Car>>, AuctionError> {
    info!("{:<12} --> 보유 차량 조회: {}", "Handler", params.owner_id);
    Ok(Json(state.data_source.fetch_user_cars(&params.owner_id).await?))
}

pub async fn handle_get_notifications(
    State(state): State<AppState>,
) -> Json<Vec<AuctionNotification>> {
    Json(state.store.read().await.notifications().to_vec())
}

pub async fn handle_get_unread_count(State(state): State<AppState>) -> impl IntoResponse {
    let unread = state.store.read().await.unread_count();
    Json(serde_json::json!({ "unread": unread }))
}

// endregion: --- Query Handlers
