/// 원격 백엔드 HTTP 데이터 소스
/// 조회는 선형 백오프로 재시도하고, 입찰은 재시도하지 않는다.
// region:    --- Imports
use super::DataSource;
use crate::auction::model::{Auction, Bid, Car};
use crate::bidding::commands::PlaceBidCommand;
use crate::error::{AuctionError, ValidationCode};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tokio::time::{sleep, Duration};
use tracing::{info, warn};

// endregion: --- Imports

// region:    --- Http Data Source
/// 에러 응답 본문
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
    #[serde(default)]
    code: Option<String>,
}

pub struct HttpDataSource {
    client: Client,
    base_url: String,
    max_retries: u32,
    backoff: Duration,
}

impl HttpDataSource {
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
        max_retries: u32,
        backoff: Duration,
    ) -> Result<Self, AuctionError> {
        let client = Client::builder().timeout(timeout).build()?;
        let base_url: String = base_url.into();
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            max_retries,
            backoff,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_once<T: DeserializeOwned>(&self, url: &str) -> Result<T, reqwest::Error> {
        self.client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json::<T>()
            .await
    }

    /// GET + 재시도 (4xx 는 재시도하지 않음)
    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, reqwest::Error> {
        let url = self.url(path);
        let mut attempt: u32 = 0;
        loop {
            match self.get_once(&url).await {
                Ok(value) => return Ok(value),
                Err(e) if attempt < self.max_retries && !is_client_error(&e) => {
                    attempt += 1;
                    let wait = self.backoff * attempt;
                    warn!(
                        "{:<12} --> 조회 실패, {:?} 후 재시도 ({}/{}): {}",
                        "HttpSource", wait, attempt, self.max_retries, e
                    );
                    sleep(wait).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

fn is_client_error(e: &reqwest::Error) -> bool {
    e.status().map_or(false, |status| status.is_client_error())
}

/// 실패 응답을 에러로 변환 (4xx 는 백엔드 메시지를 그대로 검증 에러로)
async fn rejection(response: reqwest::Response, action: &str) -> AuctionError {
    let status = response.status();
    match response.json::<ErrorBody>().await.ok() {
        Some(body) if status.is_client_error() => {
            let code = body
                .code
                .as_deref()
                .and_then(ValidationCode::from_wire)
                .unwrap_or(ValidationCode::Rejected);
            AuctionError::validation(code, body.error)
        }
        Some(body) => AuctionError::DataSource(body.error),
        None => AuctionError::DataSource(format!("{} failed with status {}", action, status)),
    }
}

#[async_trait]
impl DataSource for HttpDataSource {
    async fn fetch_user_cars(&self, user_id: &str) -> Result<Vec<Car>, AuctionError> {
        Ok(self.get_json(&format!("/users/{}/cars", user_id)).await?)
    }

    async fn fetch_auction(&self, auction_id: &str) -> Result<Auction, AuctionError> {
        self.get_json(&format!("/auctions/{}", auction_id))
            .await
            .map_err(|e| match e.status() {
                Some(status) if status == StatusCode::NOT_FOUND => {
                    AuctionError::AuctionNotFound(auction_id.to_string())
                }
                _ => e.into(),
            })
    }

    async fn fetch_active_auctions(&self) -> Result<Vec<Auction>, AuctionError> {
        Ok(self.get_json("/auctions?status=active").await?)
    }

    async fn fetch_auctions(&self) -> Result<Vec<Auction>, AuctionError> {
        Ok(self.get_json("/auctions").await?)
    }

    async fn create_auction(&self, auction: &Auction) -> Result<Auction, AuctionError> {
        info!("{:<12} --> 원격 경매 등록 요청: {}", "HttpSource", auction.id);
        let response = self
            .client
            .post(self.url("/auctions"))
            .json(auction)
            .send()
            .await?;

        if response.status().is_success() {
            return Ok(response.json::<Auction>().await?);
        }
        Err(rejection(response, "Auction creation").await)
    }

    async fn place_bid(&self, cmd: &PlaceBidCommand) -> Result<Bid, AuctionError> {
        info!("{:<12} --> 원격 입찰 요청: {:?}", "HttpSource", cmd);
        let response = self
            .client
            .post(self.url(&format!("/auctions/{}/bids", cmd.auction_id)))
            .json(cmd)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<Bid>().await?);
        }
        if status == StatusCode::NOT_FOUND {
            return Err(AuctionError::AuctionNotFound(cmd.auction_id.clone()));
        }
        Err(rejection(response, "Bid request").await)
    }
}
// endregion: --- Http Data Source
