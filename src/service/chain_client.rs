// 链客户端
// 余额/nonce/gas 查询、原始交易广播、PoS 查询；节点通过 JSON-RPC 访问

use std::{
    collections::BTreeMap,
    sync::atomic::{AtomicU64, Ordering},
    time::Duration,
};

use async_trait::async_trait;
use ethers::types::U256;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tokio::sync::RwLock;

use crate::{
    config::ChainConfig,
    domain::staking::{DelegationRecord, IncentiveRecord, StakerRecord},
    error::{AppError, AppResult},
    infrastructure::rpc_validator,
};

#[async_trait]
pub trait ChainClient: Send + Sync {
    async fn get_balance(&self, address: &str) -> AppResult<U256>;

    /// 批量查询余额，key 为传入的地址
    async fn get_balances(&self, addresses: &[String]) -> AppResult<BTreeMap<String, U256>> {
        let balances =
            futures::future::try_join_all(addresses.iter().map(|a| self.get_balance(a))).await?;
        Ok(addresses.iter().cloned().zip(balances).collect())
    }

    async fn get_nonce(&self, address: &str, chain_type: &str, include_pending: bool)
        -> AppResult<u64>;
    async fn get_gas_price(&self, chain_type: &str) -> AppResult<U256>;
    async fn estimate_gas(&self, chain_type: &str, tx: &Value) -> AppResult<u64>;
    /// 广播已签名交易，返回交易哈希
    async fn send_raw_transaction(&self, raw: &str, chain_type: &str) -> AppResult<String>;
    async fn is_address(&self, address: &str) -> AppResult<bool>;

    // ---- PoS ----
    async fn get_epoch_id(&self, chain: &str) -> AppResult<u64>;
    async fn get_block_number(&self, chain: &str) -> AppResult<u64>;
    async fn get_staker_info(&self, chain: &str, block_number: u64)
        -> AppResult<Vec<StakerRecord>>;
    async fn get_delegator_stake_info(
        &self,
        chain: &str,
        address: &str,
    ) -> AppResult<Vec<DelegationRecord>>;
    async fn get_delegator_incentive(
        &self,
        chain: &str,
        address: &str,
    ) -> AppResult<Vec<IncentiveRecord>>;

    // ---- 本地普通交易记录 ----
    async fn normal_records(&self) -> AppResult<Vec<Value>>;
    async fn insert_normal_record(&self, record: Value) -> AppResult<()>;
}

/// 基于 JSON-RPC 的链客户端
pub struct JsonRpcChainClient {
    http_client: reqwest::Client,
    rpc_url: String,
    /// 支持的链标识（小写）
    chains: Vec<String>,
    next_id: AtomicU64,
    normal_records: RwLock<Vec<Value>>,
}

impl JsonRpcChainClient {
    pub fn new(cfg: &ChainConfig) -> AppResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.rpc_timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build HTTP client: {}", e)))?;

        let mut chains = vec![cfg.chain_type.to_lowercase()];
        let staking = cfg.staking_chain.to_lowercase();
        if !chains.contains(&staking) {
            chains.push(staking);
        }

        Ok(Self {
            http_client,
            rpc_url: cfg.rpc_url.clone(),
            chains,
            next_id: AtomicU64::new(1),
            normal_records: RwLock::new(Vec::new()),
        })
    }

    fn ensure_chain(&self, chain: &str) -> AppResult<()> {
        let chain = chain.to_lowercase();
        if self.chains.contains(&chain) {
            Ok(())
        } else {
            Err(AppError::chain_not_supported(format!(
                "Chain '{}' is not served by this node",
                chain
            )))
        }
    }

    /// 发送一次 JSON-RPC 调用并返回 `result`
    async fn call(&self, method: &str, params: Value) -> AppResult<Value> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let payload = json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": id
        });

        tracing::debug!(method, id, "RPC request");

        let response = self
            .http_client
            .post(&self.rpc_url)
            .header("Content-Type", "application/json")
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AppError::timeout(format!("RPC {} timed out", method))
                } else {
                    AppError::rpc(format!("Failed to send RPC request: {}", e))
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AppError::rpc(format!("Failed to read response body: {}", e)))?;

        if !status.is_success() {
            tracing::warn!(method, status = %status, "RPC request failed");
            return Err(AppError::rpc(format!(
                "RPC request failed with status {}: {}",
                status, body
            )));
        }

        let mut json: Value = serde_json::from_str(&body)
            .map_err(|e| AppError::rpc(format!("Failed to parse JSON response: {}", e)))?;
        rpc_validator::validate_rpc_response(&json)?;

        Ok(json
            .get_mut("result")
            .map(Value::take)
            .unwrap_or(Value::Null))
    }

    /// 结果为列表的 PoS 查询；节点对“无记录”返回 null
    async fn call_list<T: DeserializeOwned>(&self, method: &str, params: Value) -> AppResult<Vec<T>> {
        match self.call(method, params).await? {
            Value::Null => Ok(Vec::new()),
            other => serde_json::from_value(other)
                .map_err(|e| AppError::rpc(format!("Unexpected {} result: {}", method, e))),
        }
    }
}

fn with_prefix(address: &str) -> String {
    if address.starts_with("0x") || address.starts_with("0X") {
        address.to_string()
    } else {
        format!("0x{}", address)
    }
}

#[async_trait]
impl ChainClient for JsonRpcChainClient {
    async fn get_balance(&self, address: &str) -> AppResult<U256> {
        let result = self
            .call("eth_getBalance", json!([with_prefix(address), "latest"]))
            .await?;
        rpc_validator::validate_quantity(&result)
    }

    async fn get_nonce(
        &self,
        address: &str,
        chain_type: &str,
        include_pending: bool,
    ) -> AppResult<u64> {
        self.ensure_chain(chain_type)?;
        let tag = if include_pending { "pending" } else { "latest" };
        let result = self
            .call("eth_getTransactionCount", json!([with_prefix(address), tag]))
            .await?;
        rpc_validator::validate_u64(&result)
    }

    async fn get_gas_price(&self, chain_type: &str) -> AppResult<U256> {
        self.ensure_chain(chain_type)?;
        let result = self.call("eth_gasPrice", json!([])).await?;
        rpc_validator::validate_quantity(&result)
    }

    async fn estimate_gas(&self, chain_type: &str, tx: &Value) -> AppResult<u64> {
        self.ensure_chain(chain_type)?;
        let result = self.call("eth_estimateGas", json!([tx])).await?;
        rpc_validator::validate_u64(&result)
    }

    async fn send_raw_transaction(&self, raw: &str, chain_type: &str) -> AppResult<String> {
        self.ensure_chain(chain_type)?;
        let result = self
            .call("eth_sendRawTransaction", json!([with_prefix(raw)]))
            .await?;
        let tx_hash = rpc_validator::validate_tx_hash(&result)?;
        tracing::info!(tx_hash = %tx_hash, "✅ Raw transaction broadcast");
        Ok(tx_hash)
    }

    async fn is_address(&self, address: &str) -> AppResult<bool> {
        Ok(rpc_validator::is_valid_address(address))
    }

    async fn get_epoch_id(&self, chain: &str) -> AppResult<u64> {
        self.ensure_chain(chain)?;
        let result = self.call("pos_getEpochID", json!([])).await?;
        rpc_validator::validate_u64(&result)
    }

    async fn get_block_number(&self, chain: &str) -> AppResult<u64> {
        self.ensure_chain(chain)?;
        let result = self.call("eth_blockNumber", json!([])).await?;
        rpc_validator::validate_u64(&result)
    }

    async fn get_staker_info(
        &self,
        chain: &str,
        block_number: u64,
    ) -> AppResult<Vec<StakerRecord>> {
        self.ensure_chain(chain)?;
        self.call_list("pos_getStakerInfo", json!([format!("0x{:x}", block_number)]))
            .await
    }

    async fn get_delegator_stake_info(
        &self,
        chain: &str,
        address: &str,
    ) -> AppResult<Vec<DelegationRecord>> {
        self.ensure_chain(chain)?;
        self.call_list("pos_getDelegatorStakeInfo", json!([with_prefix(address)]))
            .await
    }

    async fn get_delegator_incentive(
        &self,
        chain: &str,
        address: &str,
    ) -> AppResult<Vec<IncentiveRecord>> {
        self.ensure_chain(chain)?;
        self.call_list("pos_getDelegatorIncentive", json!([with_prefix(address)]))
            .await
    }

    async fn normal_records(&self) -> AppResult<Vec<Value>> {
        Ok(self.normal_records.read().await.clone())
    }

    async fn insert_normal_record(&self, record: Value) -> AppResult<()> {
        if !record.is_object() {
            return Err(AppError::invalid_parameter(
                "Transaction record must be an object",
            ));
        }
        self.normal_records.write().await.push(record);
        Ok(())
    }
}
