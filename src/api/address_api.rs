//! 地址路由：派生、nonce、余额、格式校验、keystore 导入

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::{
    app_state::AppState,
    error::{AppError, AppResult},
    ipc::{parse_payload, AddressAction, HandlerResult, Rejection, Route, RouteHandler},
};

/// keystore 导入后推送给所有窗口的通知键
pub const KEYFILE_WALLET_COUNT: &str = "keyfilewalletcount";

#[derive(Deserialize)]
struct RangePayload {
    #[serde(rename = "walletID")]
    wallet_id: u32,
    #[serde(rename = "chainType")]
    chain_type: String,
    start: u32,
    end: u32,
}

#[derive(Deserialize)]
struct OnePayload {
    #[serde(rename = "walletID")]
    wallet_id: u32,
    #[serde(rename = "chainType")]
    chain_type: String,
    path: String,
}

#[derive(Deserialize)]
struct NoncePayload {
    addr: String,
    #[serde(rename = "chainType")]
    chain_type: String,
    #[serde(rename = "includePending", default)]
    include_pending: bool,
}

/// 单个地址或地址列表
#[derive(Deserialize)]
#[serde(untagged)]
enum AddressList {
    One(String),
    Many(Vec<String>),
}

#[derive(Deserialize)]
struct BalancePayload {
    addr: AddressList,
}

#[derive(Deserialize)]
struct IsAddressPayload {
    address: String,
}

#[derive(Deserialize, Zeroize, ZeroizeOnDrop)]
struct KeyFilePayload {
    #[serde(rename = "keyFilePwd")]
    key_file_pwd: String,
    #[serde(rename = "hdWalletPwd")]
    hd_wallet_pwd: String,
    #[serde(rename = "keyFilePath")]
    key_file_path: String,
}

/// UI 传来的地址不带 `0x`
fn prefixed(addr: &str) -> String {
    let bare = addr
        .strip_prefix("0x")
        .or_else(|| addr.strip_prefix("0X"))
        .unwrap_or(addr);
    format!("0x{}", bare)
}

pub struct AddressHandler {
    state: AppState,
}

impl AddressHandler {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    /// 余额以最小单位十进制字符串返回，key 为 `0x` 地址
    async fn balance(&self, list: AddressList) -> AppResult<Value> {
        let addresses: Vec<String> = match list {
            AddressList::One(a) => vec![prefixed(&a)],
            AddressList::Many(items) => items.iter().map(|a| prefixed(a)).collect(),
        };

        let balances = match addresses.as_slice() {
            [] => return Err(AppError::invalid_parameter("No address given")),
            [single] => {
                let balance = self.state.chain.get_balance(single).await?;
                BTreeMap::from([(single.clone(), balance)])
            }
            many => self.state.chain.get_balances(many).await?,
        };

        Ok(Value::Object(
            balances
                .into_iter()
                .map(|(addr, wei)| (addr, json!(wei.to_string())))
                .collect(),
        ))
    }

    async fn import_key_file(&self, p: &KeyFilePayload) -> AppResult<u64> {
        let content = tokio::fs::read_to_string(&p.key_file_path)
            .await
            .map_err(|e| {
                AppError::storage(format!("Cannot read key file {}: {}", p.key_file_path, e))
                    .with_errno(e.raw_os_error().map(i64::from))
            })?;

        let chain = &self.state.config.chain;
        self.state
            .keys
            .import_keystore(&chain.bip44_path, &content, &p.key_file_pwd, &p.hd_wallet_pwd)
            .await?;
        let count = self.state.keys.keystore_count(chain.chain_id).await?;

        let notified = self
            .state
            .endpoints
            .broadcast(KEYFILE_WALLET_COUNT, json!(count))
            .await;
        tracing::info!(count, notified, "✅ Keystore imported");
        Ok(count)
    }
}

#[async_trait]
impl RouteHandler for AddressHandler {
    type Action = AddressAction;

    const ROUTE: Route = Route::Address;

    async fn handle(&self, action: AddressAction, payload: Value) -> HandlerResult {
        let keys = &self.state.keys;
        match action {
            AddressAction::Get => {
                let p: RangePayload = parse_payload(payload)?;
                let range = keys
                    .get_addresses(p.wallet_id, &p.chain_type, p.start, p.end)
                    .await?;
                Ok(serde_json::to_value(range)?)
            }
            AddressAction::GetOne => {
                let p: OnePayload = parse_payload(payload)?;
                let address = keys.get_address(p.wallet_id, &p.chain_type, &p.path).await?;
                Ok(serde_json::to_value(address)?)
            }
            AddressAction::GetNonce => {
                let p: NoncePayload = parse_payload(payload)?;
                let nonce = self
                    .state
                    .chain
                    .get_nonce(&prefixed(&p.addr), &p.chain_type, p.include_pending)
                    .await?;
                Ok(json!(nonce))
            }
            AddressAction::Balance => {
                let p: BalancePayload = parse_payload(payload)?;
                Ok(self.balance(p.addr).await?)
            }
            AddressAction::IsWanAddress => {
                let p: IsAddressPayload = parse_payload(payload)?;
                Ok(json!(self.state.chain.is_address(&p.address).await?))
            }
            AddressAction::FromKeyFile => {
                let p: KeyFilePayload = parse_payload(payload)?;
                match self.import_key_file(&p).await {
                    Ok(_) => Ok(json!(true)),
                    Err(e) => Err(Rejection::with_data(e, json!(false))),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefixed() {
        assert_eq!(prefixed("abc"), "0xabc");
        assert_eq!(prefixed("0xabc"), "0xabc");
    }

    #[test]
    fn test_address_list_accepts_string_or_array() {
        let p: BalancePayload = serde_json::from_value(json!({ "addr": "aa" })).unwrap();
        assert!(matches!(p.addr, AddressList::One(_)));
        let p: BalancePayload = serde_json::from_value(json!({ "addr": ["aa", "bb"] })).unwrap();
        assert!(matches!(p.addr, AddressList::Many(ref v) if v.len() == 2));
    }
}
