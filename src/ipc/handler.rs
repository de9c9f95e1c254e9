use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::{
    envelope::HandlerResult,
    route::{Route, WireAction},
};
use crate::error::{AppError, AppResult};

/// 路由处理器
///
/// 每个路由在启动时注册一次；`Action` 由分发器从线上字符串解析，
/// handler 只需要对自己的枚举做穷尽匹配。
#[async_trait]
pub trait RouteHandler: Send + Sync + 'static {
    type Action: WireAction;

    const ROUTE: Route;

    async fn handle(&self, action: Self::Action, payload: Value) -> HandlerResult;
}

/// 类型擦除后的路由，分发表里存的是它
pub(crate) trait BoundRoute: Send + Sync {
    /// action 不认识时返回 None
    fn bind(&self, action: &str, payload: Value) -> Option<BoxFuture<'static, HandlerResult>>;
}

pub(crate) struct Bound<H>(pub Arc<H>);

impl<H: RouteHandler> BoundRoute for Bound<H> {
    fn bind(&self, action: &str, payload: Value) -> Option<BoxFuture<'static, HandlerResult>> {
        let action = H::Action::from_wire(action)?;
        let handler = Arc::clone(&self.0);
        Some(Box::pin(async move { handler.handle(action, payload).await }))
    }
}

/// 把 payload 解析成 action 专属的参数结构；缺字段、类型不符都按参数错误返回
pub fn parse_payload<T: DeserializeOwned>(payload: Value) -> AppResult<T> {
    let payload = match payload {
        Value::Null => Value::Object(Default::default()),
        other => other,
    };
    serde_json::from_value(payload).map_err(AppError::from)
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;
    use serde_json::json;

    use super::*;

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Probe {
        wallet_id: u32,
        #[serde(default)]
        path: Option<String>,
    }

    #[test]
    fn test_parse_payload_ok_and_missing_field() {
        let p: Probe = parse_payload(json!({ "walletId": 3, "path": "m/0" })).unwrap();
        assert_eq!(p.wallet_id, 3);
        assert_eq!(p.path.as_deref(), Some("m/0"));

        let err = parse_payload::<Probe>(Value::Null).unwrap_err();
        assert_eq!(err.category(), "invalid_parameter");

        let err = parse_payload::<Probe>(json!({ "walletId": "x" })).unwrap_err();
        assert!(err.message.contains("Invalid payload"));
    }
}
