//! 交易路由
//!
//! 普通转账交给跨链引擎（含源链查找），原始交易直接广播；
//! 本地交易记录由链客户端维护。

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
    app_state::AppState,
    error::AppResult,
    infrastructure::log_redact::redact_payload,
    ipc::{parse_payload, HandlerResult, Route, RouteHandler, TransactionAction},
    service::cross_chain::NormalTransferInput,
};

#[derive(Deserialize)]
struct NormalPayload {
    #[serde(rename = "walletID")]
    wallet_id: u32,
    #[serde(rename = "chainType")]
    chain_type: String,
    symbol: String,
    path: String,
    to: String,
    amount: Value,
    #[serde(rename = "gasPrice")]
    gas_price: Value,
    #[serde(rename = "gasLimit")]
    gas_limit: Value,
    #[serde(default)]
    nonce: Option<Value>,
}

#[derive(Deserialize)]
struct RawPayload {
    raw: String,
    #[serde(rename = "chainType")]
    chain_type: String,
}

#[derive(Deserialize)]
struct EstimatePayload {
    #[serde(rename = "chainType")]
    chain_type: String,
    tx: Value,
}

#[derive(Deserialize)]
struct RecordPayload {
    #[serde(rename = "rawTx")]
    raw_tx: Value,
}

pub struct TransactionHandler {
    state: AppState,
}

impl TransactionHandler {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    async fn normal(&self, p: NormalPayload) -> AppResult<Value> {
        let from = self
            .state
            .keys
            .get_address(p.wallet_id, &p.chain_type, &p.path)
            .await?;

        let input = NormalTransferInput {
            symbol: p.symbol,
            from: format!("0x{}", from.address.trim_start_matches("0x")),
            to: p.to,
            amount: p.amount,
            gas_price: p.gas_price,
            gas_limit: p.gas_limit,
            bip44_path: p.path,
            wallet_id: p.wallet_id,
            nonce: p.nonce,
        };

        let src_chain = self
            .state
            .cross_chain
            .src_chain_name(&input.symbol, &p.chain_type)
            .await?;
        self.state
            .cross_chain
            .invoke_normal_transfer(&src_chain, input)
            .await
    }
}

#[async_trait]
impl RouteHandler for TransactionHandler {
    type Action = TransactionAction;

    const ROUTE: Route = Route::Transaction;

    async fn handle(&self, action: TransactionAction, payload: Value) -> HandlerResult {
        let chain = &self.state.chain;
        match action {
            TransactionAction::Normal => {
                let p: NormalPayload = parse_payload(payload)?;
                Ok(self.normal(p).await?)
            }
            TransactionAction::Raw => {
                tracing::info!(payload = %redact_payload(&payload), "Send raw transaction");
                let p: RawPayload = parse_payload(payload)?;
                Ok(json!(chain.send_raw_transaction(&p.raw, &p.chain_type).await?))
            }
            TransactionAction::EstimateGas => {
                let p: EstimatePayload = parse_payload(payload)?;
                Ok(json!(chain.estimate_gas(&p.chain_type, &p.tx).await?))
            }
            TransactionAction::ShowRecords => Ok(Value::Array(chain.normal_records().await?)),
            TransactionAction::InsertTransToDb => {
                let p: RecordPayload = parse_payload(payload)?;
                chain.insert_normal_record(p.raw_tx).await?;
                Ok(json!(true))
            }
        }
    }
}
