//! 钱包会话路由
//!
//! - lock / unlock：销毁或重建 HD 钱包与 keystore 钱包
//! - getPubKey / getPubKeyChainId：公钥查询
//! - signTransaction：由 SDK 完成 secp256k1 签名，这里只做格式转换
//! - connectToLedger：硬件钱包

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::WalletPathPayload;
use crate::{
    app_state::AppState,
    error::AppResult,
    ipc::{parse_payload, HandlerResult, Rejection, Route, RouteHandler, WalletAction},
};

#[derive(Deserialize, Zeroize, ZeroizeOnDrop)]
struct UnlockPayload {
    pwd: String,
}

#[derive(Deserialize)]
struct WalletIdPayload {
    #[serde(rename = "walletID")]
    wallet_id: u32,
}

#[derive(Deserialize)]
struct SignPayload {
    #[serde(rename = "walletID")]
    wallet_id: u32,
    path: String,
    #[serde(rename = "rawTx")]
    raw_tx: Value,
}

pub struct WalletHandler {
    state: AppState,
}

impl WalletHandler {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    async fn lock(&self) -> AppResult<()> {
        self.state.keys.delete_hd_wallet().await?;
        self.state.keys.delete_keystore_wallet().await
    }

    async fn unlock(&self, payload: Value) -> AppResult<()> {
        let p: UnlockPayload = parse_payload(payload)?;
        let keys = &self.state.keys;

        let phrase = keys.reveal_mnemonic(&p.pwd).await?;
        keys.initialize_hd_wallet(&phrase).await?;
        keys.new_keystore_wallet(&phrase).await?;

        tracing::info!("✅ Wallet unlocked");
        Ok(())
    }
}

#[async_trait]
impl RouteHandler for WalletHandler {
    type Action = WalletAction;

    const ROUTE: Route = Route::Wallet;

    async fn handle(&self, action: WalletAction, payload: Value) -> HandlerResult {
        let keys = &self.state.keys;
        match action {
            WalletAction::Lock => match self.lock().await {
                Ok(()) => Ok(json!(true)),
                Err(e) => Err(Rejection::with_data(e, json!(false))),
            },
            WalletAction::Unlock => {
                self.unlock(payload).await?;
                Ok(json!(true))
            }
            WalletAction::GetPubKey => {
                let p: WalletPathPayload = parse_payload(payload)?;
                Ok(json!(keys.get_public_key(p.wallet_id, &p.path, false).await?))
            }
            WalletAction::GetPubKeyChainId => {
                let p: WalletPathPayload = parse_payload(payload)?;
                Ok(json!(keys.get_public_key(p.wallet_id, &p.path, true).await?))
            }
            WalletAction::IsConnected => {
                let p: WalletIdPayload = parse_payload(payload)?;
                Ok(json!(keys.is_connected(p.wallet_id).await))
            }
            WalletAction::SignTransaction => {
                let p: SignPayload = parse_payload(payload)?;
                let sig = keys.sign_transaction(p.wallet_id, &p.path, &p.raw_tx).await?;
                Ok(sig.to_hex_json())
            }
            WalletAction::ConnectToLedger => match keys.connect_to_ledger().await {
                Ok(()) => Ok(json!(true)),
                Err(e) => Err(Rejection::with_data(e, json!(false))),
            },
        }
    }
}
