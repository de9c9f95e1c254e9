//! 跨链交易引擎接口
//!
//! 普通转账和 PoS 委托都交给引擎执行（锁定/通知/确认/赎回/撤销等多步协议以及重发都在引擎内部），
//! 这里只负责构造输入并转发结果。

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::AppResult;

/// 普通转账输入
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalTransferInput {
    pub symbol: String,
    pub from: String,
    pub to: String,
    pub amount: Value,
    #[serde(rename = "gasPrice")]
    pub gas_price: Value,
    #[serde(rename = "gasLimit")]
    pub gas_limit: Value,
    #[serde(rename = "BIP44Path")]
    pub bip44_path: String,
    #[serde(rename = "walletID")]
    pub wallet_id: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nonce: Option<Value>,
}

/// 解除委托输入
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelegateOutInput {
    pub from: String,
    #[serde(rename = "validatorAddr")]
    pub validator_addr: String,
    pub amount: u64,
    /// gwei
    #[serde(rename = "gasPrice")]
    pub gas_price: String,
    #[serde(rename = "gasLimit")]
    pub gas_limit: u64,
    #[serde(rename = "BIP44Path")]
    pub bip44_path: String,
    #[serde(rename = "walletID")]
    pub wallet_id: u32,
}

#[async_trait]
pub trait CrossChainEngine: Send + Sync {
    /// 按代币合约（或符号）查找源链
    async fn src_chain_name(&self, symbol: &str, chain_type: &str) -> AppResult<String>;

    async fn invoke_normal_transfer(
        &self,
        src_chain: &str,
        input: NormalTransferInput,
    ) -> AppResult<Value>;

    /// 委托：`tx` 为 UI 传入的交易，已补上 gasPrice(gwei) 与 gasLimit
    async fn pos_delegate_in(&self, tx: Value) -> AppResult<Value>;

    async fn pos_delegate_out(&self, input: DelegateOutInput) -> AppResult<Value>;
}
