//! 请求/应答信封
//!
//! UI 发送 `(route, "action#correlationId", payload)`，后端回复到
//! `route_action#correlationId` 端点，UI 据此把应答对应回原请求。

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{AppError, ErrorTriple};

/// action 与关联 ID 之间的分隔符
pub const CORRELATION_SEPARATOR: char = '#';

/// 拆分 `action#correlationId`；没有分隔符时关联 ID 为空。
/// 多个分隔符时只取前两段，与 UI 侧的拼接方式保持一致。
pub fn split_action_token(token: &str) -> (&str, &str) {
    let mut parts = token.split(CORRELATION_SEPARATOR);
    let action = parts.next().unwrap_or_default();
    let correlation_id = parts.next().unwrap_or_default();
    (action, correlation_id)
}

/// 应答端点：`route_action#correlationId`
pub fn endpoint_for(route: &str, action: &str, correlation_id: &str) -> String {
    format!(
        "{}_{}{}{}",
        route, action, CORRELATION_SEPARATOR, correlation_id
    )
}

/// 入站命令
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandEnvelope {
    pub route: String,
    pub action: String,
    #[serde(default)]
    pub correlation_id: String,
    #[serde(default)]
    pub payload: Value,
}

impl CommandEnvelope {
    pub fn new(
        route: impl Into<String>,
        action: impl Into<String>,
        correlation_id: impl Into<String>,
        payload: Value,
    ) -> Self {
        Self {
            route: route.into(),
            action: action.into(),
            correlation_id: correlation_id.into(),
            payload,
        }
    }

    /// 从线上格式构造：`token` 为 `action#correlationId`
    pub fn from_wire(route: impl Into<String>, token: &str, payload: Value) -> Self {
        let (action, correlation_id) = split_action_token(token);
        Self::new(route, action, correlation_id, payload)
    }

    pub fn endpoint(&self) -> String {
        endpoint_for(&self.route, &self.action, &self.correlation_id)
    }
}

/// handler 失败时的结果；个别 action 需要在报错的同时带上 `data`（例如 `false`）
#[derive(Debug, Clone)]
pub struct Rejection {
    pub error: AppError,
    pub data: Option<Value>,
}

impl Rejection {
    pub fn with_data(error: AppError, data: Value) -> Self {
        Self {
            error,
            data: Some(data),
        }
    }
}

impl From<AppError> for Rejection {
    fn from(error: AppError) -> Self {
        Self { error, data: None }
    }
}

impl From<serde_json::Error> for Rejection {
    fn from(e: serde_json::Error) -> Self {
        AppError::from(e).into()
    }
}

pub type HandlerResult = Result<Value, Rejection>;

/// 出站应答
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    pub endpoint: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorTriple>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl ResponseEnvelope {
    pub fn success(endpoint: String, data: Value) -> Self {
        Self {
            endpoint,
            error: None,
            data: match data {
                Value::Null => None,
                other => Some(other),
            },
        }
    }

    pub fn failure(endpoint: String, rejection: Rejection) -> Self {
        Self {
            endpoint,
            error: Some(rejection.error.to_triple()),
            data: rejection.data,
        }
    }

    pub fn from_outcome(endpoint: String, outcome: HandlerResult) -> Self {
        match outcome {
            Ok(data) => Self::success(endpoint, data),
            Err(rejection) => Self::failure(endpoint, rejection),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}
