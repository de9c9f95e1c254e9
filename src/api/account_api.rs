use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use super::WalletPathPayload;
use crate::{
    app_state::AppState,
    ipc::{parse_payload, AccountAction, HandlerResult, Route, RouteHandler},
};

#[derive(Deserialize)]
struct AccountMetaPayload {
    #[serde(rename = "walletID")]
    wallet_id: u32,
    path: String,
    #[serde(default)]
    meta: Value,
}

#[derive(Deserialize)]
struct ChainPayload {
    #[serde(rename = "chainID")]
    chain_id: u64,
}

/// 用户账户（派生路径上的名称等元数据）
pub struct AccountHandler {
    state: AppState,
}

impl AccountHandler {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

#[async_trait]
impl RouteHandler for AccountHandler {
    type Action = AccountAction;

    const ROUTE: Route = Route::Account;

    async fn handle(&self, action: AccountAction, payload: Value) -> HandlerResult {
        let keys = &self.state.keys;
        let data = match action {
            AccountAction::Create => {
                let p: AccountMetaPayload = parse_payload(payload)?;
                keys.create_user_account(p.wallet_id, &p.path, p.meta).await?
            }
            AccountAction::Get => {
                let p: WalletPathPayload = parse_payload(payload)?;
                keys.get_user_account(p.wallet_id, &p.path).await?
            }
            AccountAction::GetAll => {
                let p: ChainPayload = parse_payload(payload)?;
                keys.get_user_accounts_for_chain(p.chain_id).await?
            }
            AccountAction::Update => {
                let p: AccountMetaPayload = parse_payload(payload)?;
                keys.update_user_account(p.wallet_id, &p.path, p.meta).await?
            }
            AccountAction::Delete => {
                let p: WalletPathPayload = parse_payload(payload)?;
                keys.delete_user_account(p.wallet_id, &p.path).await?
            }
        };
        Ok(data)
    }
}
