// region:    --- Imports
use crate::scheduler::{CountdownSettings, EndingSoonPolicy};
use std::{env, fmt::Display, str::FromStr};
use tokio::time::Duration;
use tracing::{info, warn};

// endregion: --- Imports

// region:    --- Config
/// 환경 변수 기반 설정
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// 없으면 목 데이터 소스 사용
    pub api_url: Option<String>,
    pub viewer_id: String,
    pub request_timeout: Duration,
    pub max_retries: u32,
    pub retry_backoff: Duration,
    pub mock_delay: Duration,
    pub tick: Duration,
    pub ending_soon_secs: i64,
    pub ending_soon_policy: EndingSoonPolicy,
}

impl Config {
    pub fn load() -> Self {
        Self {
            port: try_load("AUCTION_PORT", "3000"),
            api_url: var("AUCTION_API_URL").ok().filter(|url| !url.trim().is_empty()),
            viewer_id: try_load("AUCTION_VIEWER_ID", "user-9"),
            request_timeout: Duration::from_millis(try_load("AUCTION_REQUEST_TIMEOUT_MS", "10000")),
            max_retries: try_load("AUCTION_MAX_RETRIES", "3"),
            retry_backoff: Duration::from_millis(try_load("AUCTION_RETRY_BACKOFF_MS", "1000")),
            mock_delay: Duration::from_millis(try_load("AUCTION_MOCK_DELAY_MS", "500")),
            tick: Duration::from_millis(try_load("AUCTION_TICK_MS", "1000")),
            ending_soon_secs: try_load("AUCTION_ENDING_SOON_SECS", "300"),
            ending_soon_policy: parse_policy(&try_load::<String>(
                "AUCTION_ENDING_SOON_POLICY",
                "crossing",
            )),
        }
    }

    pub fn countdown_settings(&self) -> CountdownSettings {
        CountdownSettings {
            tick: self.tick,
            ending_soon_secs: self.ending_soon_secs,
            policy: self.ending_soon_policy,
        }
    }
}

fn var(key: &str) -> Result<String, ()> {
    env::var(key).map_err(|_| {
        info!("{:<12} --> {} 미설정", "Config", key);
    })
}

/// 값이 없거나 잘못되면 기본값 사용
fn try_load<T>(key: &str, default: &str) -> T
where
    T: FromStr + Default,
    T::Err: Display,
{
    let raw = var(key).unwrap_or_else(|_| default.to_string());
    raw.parse().unwrap_or_else(|e| {
        warn!(
            "{:<12} --> {} 값이 잘못됨 ({}), 기본값 {} 사용",
            "Config", key, e, default
        );
        default.parse().unwrap_or_default()
    })
}

fn parse_policy(raw: &str) -> EndingSoonPolicy {
    match raw.trim().to_lowercase().as_str() {
        "exact" => EndingSoonPolicy::Exact,
        "crossing" => EndingSoonPolicy::Crossing,
        other => {
            warn!(
                "{:<12} --> 알 수 없는 종료 임박 정책 {}, crossing 사용",
                "Config", other
            );
            EndingSoonPolicy::Crossing
        }
    }
}
// endregion: --- Config
