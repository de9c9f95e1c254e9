//! PoS 委托路由
//!
//! `info` 返回聚合后的总览与委托列表；`txHistory` / `txDetail` 只做确认，不带数据。

use async_trait::async_trait;
use serde_json::Value;

use crate::{
    app_state::AppState,
    domain::staking::StakingAccount,
    ipc::{parse_payload, HandlerResult, Route, RouteHandler, StakingAction},
    service::staking_service::DelegateOutRequest,
};

pub struct StakingHandler {
    state: AppState,
}

impl StakingHandler {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

#[async_trait]
impl RouteHandler for StakingHandler {
    type Action = StakingAction;

    const ROUTE: Route = Route::Staking;

    async fn handle(&self, action: StakingAction, payload: Value) -> HandlerResult {
        let staking = &self.state.staking;
        match action {
            StakingAction::Info => {
                // payload 本身就是账户列表
                let accounts: Vec<StakingAccount> = match payload {
                    Value::Null => Vec::new(),
                    other => parse_payload(other)?,
                };
                let info = staking.info(accounts).await?;
                Ok(serde_json::to_value(info)?)
            }
            StakingAction::TxHistory | StakingAction::TxDetail => Ok(Value::Null),
            StakingAction::DelegateIn => Ok(staking.delegate_in(payload).await?),
            StakingAction::DelegateOut => {
                let req: DelegateOutRequest = parse_payload(payload)?;
                Ok(staking.delegate_out(req).await?)
            }
        }
    }
}
