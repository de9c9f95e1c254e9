use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::{
    app_state::AppState,
    ipc::{parse_payload, HandlerResult, QueryAction, Route, RouteHandler},
};

/// 不读设置文件、直接反映链会话状态的参数
const SDK_STATUS: &str = "sdkStatus";

#[derive(Deserialize)]
struct ConfigPayload {
    param: String,
}

#[derive(Deserialize)]
struct GasPricePayload {
    #[serde(rename = "chainType")]
    chain_type: String,
}

/// 配置与链上参数查询
pub struct QueryHandler {
    state: AppState,
}

impl QueryHandler {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

#[async_trait]
impl RouteHandler for QueryHandler {
    type Action = QueryAction;

    const ROUTE: Route = Route::Query;

    async fn handle(&self, action: QueryAction, payload: Value) -> HandlerResult {
        match action {
            QueryAction::Config => {
                let ConfigPayload { param } = parse_payload(payload)?;
                let value = if param == SDK_STATUS {
                    json!(if self.state.is_sdk_ready() { "ready" } else { "init" })
                } else {
                    self.state.settings.get(&param).await?.unwrap_or(Value::Null)
                };

                let mut data = Map::new();
                data.insert(param, value);
                Ok(Value::Object(data))
            }
            QueryAction::GetGasPrice => {
                let p: GasPricePayload = parse_payload(payload)?;
                let wei = self.state.chain.get_gas_price(&p.chain_type).await?;
                Ok(json!(wei.to_string()))
            }
        }
    }
}
