// region:    --- Imports
use crate::auction::model::AuctionStatus;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// endregion: --- Imports

// region:    --- Error Types
/// 검증 실패 코드 (클라이언트에 그대로 전달)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationCode {
    LowBid,
    SelfBid,
    NotActive,
    AlreadyEnded,
    InvalidAuction,
    InvalidNotification,
    /// 원격 백엔드가 이유 코드 없이 거부
    Rejected,
}

impl ValidationCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationCode::LowBid => "LOW_BID",
            ValidationCode::SelfBid => "SELF_BID",
            ValidationCode::NotActive => "NOT_ACTIVE",
            ValidationCode::AlreadyEnded => "ALREADY_ENDED",
            ValidationCode::InvalidAuction => "INVALID_AUCTION",
            ValidationCode::InvalidNotification => "INVALID_NOTIFICATION",
            ValidationCode::Rejected => "REJECTED",
        }
    }

    /// 응답 본문의 코드 문자열 해석
    pub fn from_wire(code: &str) -> Option<Self> {
        serde_json::from_value(serde_json::Value::String(code.to_string())).ok()
    }
}

/// 경매 상태 관리자 에러
#[derive(Error, Debug)]
pub enum AuctionError {
    #[error("{message}")]
    Validation {
        code: ValidationCode,
        message: String,
    },

    #[error("Auction {0} not found")]
    AuctionNotFound(String),

    #[error("Invalid status transition: {from} -> {to}")]
    InvalidTransition {
        from: AuctionStatus,
        to: AuctionStatus,
    },

    #[error("Data source error: {0}")]
    DataSource(String),
}

impl AuctionError {
    pub fn validation(code: ValidationCode, message: impl Into<String>) -> Self {
        AuctionError::Validation {
            code,
            message: message.into(),
        }
    }

    /// 응답 본문에 실리는 에러 코드
    pub fn code(&self) -> &'static str {
        match self {
            AuctionError::Validation { code, .. } => code.as_str(),
            AuctionError::AuctionNotFound(_) => "NOT_FOUND",
            AuctionError::InvalidTransition { .. } => "INVALID_STATUS",
            AuctionError::DataSource(_) => "DATA_SOURCE",
        }
    }
}

impl From<reqwest::Error> for AuctionError {
    fn from(e: reqwest::Error) -> Self {
        AuctionError::DataSource(e.to_string())
    }
}

impl IntoResponse for AuctionError {
    fn into_response(self) -> Response {
        let status = match self {
            AuctionError::Validation { .. } | AuctionError::InvalidTransition { .. } => {
                StatusCode::BAD_REQUEST
            }
            AuctionError::AuctionNotFound(_) => StatusCode::NOT_FOUND,
            AuctionError::DataSource(_) => StatusCode::BAD_GATEWAY,
        };

        (
            status,
            Json(serde_json::json!({
                "error": self.to_string(),
                "code": self.code(),
            })),
        )
            .into_response()
    }
}
// endregion: --- Error Types
