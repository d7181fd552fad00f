use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use log::error;
use snsgrow_engine::{CatalogError, OrderFlowError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An error occurred on the backend of the server. {0}")]
    BackendError(String),
    #[error("Could not read request body: {0}")]
    InvalidRequestBody(String),
    #[error("Could not read request path: {0}")]
    InvalidRequestPath(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("Invalid server configuration. {0}")]
    ConfigurationError(String),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
    #[error("Request is not authorized. {0}")]
    Unauthorized(String),
    #[error("The data was not found. {0}")]
    NoRecordFound(String),
    #[error("The record already exists. {0}")]
    Conflict(String),
    #[error("The order cannot change state. {0}")]
    InvalidStateChange(String),
    #[error("The order cannot be cancelled. {0}")]
    NotCancellable(String),
    #[error("{0}")]
    OrderRejected(String),
    #[error("The fulfilment provider returned an error. {0}")]
    UpstreamError(String),
    #[error("Unknown action: {0}")]
    UnknownAction(String),
}

impl ServerError {
    /// The message shown to storefront users. Technical detail stays in `details` and the logs.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::InvalidRequestBody(_) | Self::InvalidRequestPath(_) => "잘못된 요청입니다.",
            Self::Unauthorized(_) => "인증에 실패했습니다.",
            Self::NoRecordFound(_) => "주문을 찾을 수 없습니다.",
            Self::Conflict(_) => "이미 등록된 주문입니다.",
            Self::InvalidStateChange(_) => "현재 주문 상태에서는 처리할 수 없습니다.",
            Self::NotCancellable(_) => "취소할 수 없는 주문입니다.",
            Self::OrderRejected(_) => "주문 처리에 실패했습니다.",
            Self::UpstreamError(_) => "공급업체 연동 중 오류가 발생했습니다.",
            Self::UnknownAction(_) => "지원하지 않는 작업입니다.",
            Self::InitializeError(_) |
            Self::BackendError(_) |
            Self::IOError(_) |
            Self::ConfigurationError(_) |
            Self::Unspecified(_) => "서버 오류가 발생했습니다. 잠시 후 다시 시도해 주세요.",
        }
    }
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            Self::InvalidRequestPath(_) => StatusCode::BAD_REQUEST,
            Self::OrderRejected(_) => StatusCode::BAD_REQUEST,
            Self::UnknownAction(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::NoRecordFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::InvalidStateChange(_) => StatusCode::CONFLICT,
            Self::NotCancellable(_) => StatusCode::CONFLICT,
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BackendError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ConfigurationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::UpstreamError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let body = if status.is_server_error() {
            error!("💻️ {self}");
            serde_json::json!({ "success": false, "error": self.user_message() })
        } else {
            serde_json::json!({ "success": false, "error": self.user_message(), "details": self.to_string() })
        };
        HttpResponse::build(status).insert_header(ContentType::json()).body(body.to_string())
    }
}

impl From<OrderFlowError> for ServerError {
    fn from(e: OrderFlowError) -> Self {
        match e {
            OrderFlowError::DatabaseError(s) => Self::BackendError(s),
            OrderFlowError::OrderAlreadyExists(_) => Self::Conflict(e.to_string()),
            OrderFlowError::OrderNotFound(_) |
            OrderFlowError::OrderIdNotFound(_) |
            OrderFlowError::NoMatchingOrder(_) |
            OrderFlowError::OrderNotReady(_, _) => Self::NoRecordFound(e.to_string()),
            OrderFlowError::InvalidTransition { .. } => Self::InvalidStateChange(e.to_string()),
            OrderFlowError::NotCancellable(_, _) => Self::NotCancellable(e.to_string()),
            OrderFlowError::Upstream(u) => Self::UpstreamError(u.to_string()),
            OrderFlowError::InvalidRequest(s) => Self::InvalidRequestBody(s),
        }
    }
}

impl From<CatalogError> for ServerError {
    fn from(e: CatalogError) -> Self {
        match e {
            CatalogError::DatabaseError(s) => Self::BackendError(s),
            CatalogError::Upstream(u) => Self::UpstreamError(u.to_string()),
            CatalogError::EmptyCatalogue => Self::UpstreamError(e.to_string()),
        }
    }
}
