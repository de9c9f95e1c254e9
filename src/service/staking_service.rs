// PoS 委托服务
// 拉取账户的委托/收益快照交给聚合引擎，委托与解除委托转发给跨链引擎

use std::sync::Arc;

use futures::future::{try_join, try_join_all};
use serde::Deserialize;
use serde_json::{json, Value};

use super::{
    chain_client::ChainClient,
    cross_chain::{CrossChainEngine, DelegateOutInput},
};
use crate::{
    config::ChainConfig,
    domain::{
        staking::{AccountDelegations, AccountIncentives, StakingAccount, StakingInfo, StakingSnapshot},
        staking_aggregation::{build_staking_info, AggregationParams},
    },
    error::{AppError, AppResult},
    infrastructure::log_redact::redact_address,
    utils::units::{from_wei, GWEI_DECIMALS},
};

/// 解除委托请求（UI 传入）
#[derive(Debug, Clone, Deserialize)]
pub struct DelegateOutRequest {
    pub from: String,
    pub validator: String,
    pub path: String,
}

pub struct StakingService {
    chain: Arc<dyn ChainClient>,
    cross_chain: Arc<dyn CrossChainEngine>,
    cfg: ChainConfig,
}

impl StakingService {
    pub fn new(
        chain: Arc<dyn ChainClient>,
        cross_chain: Arc<dyn CrossChainEngine>,
        cfg: ChainConfig,
    ) -> Self {
        Self {
            chain,
            cross_chain,
            cfg,
        }
    }

    /// 拉取一次完整快照；账户之间并发查询，结果保持账户顺序
    pub async fn fetch_snapshot(&self, accounts: Vec<StakingAccount>) -> AppResult<StakingSnapshot> {
        let chain = self.cfg.staking_chain.as_str();

        let (current_epoch, block_number) = try_join(
            self.chain.get_epoch_id(chain),
            self.chain.get_block_number(chain),
        )
        .await?;
        let stakers = self.chain.get_staker_info(chain, block_number).await?;

        let per_account = try_join_all(accounts.iter().map(|account| {
            try_join(
                self.chain.get_delegator_stake_info(chain, &account.address),
                self.chain.get_delegator_incentive(chain, &account.address),
            )
        }))
        .await?;

        let mut delegations = Vec::new();
        let mut incentives = Vec::new();
        for (account, (stake, incentive)) in accounts.iter().zip(per_account) {
            tracing::debug!(
                account = %redact_address(&account.address),
                delegations = stake.len(),
                incentives = incentive.len(),
                "Fetched delegator records"
            );
            if !stake.is_empty() {
                delegations.push(AccountDelegations {
                    account: account.clone(),
                    records: stake,
                });
            }
            if !incentive.is_empty() {
                incentives.push(AccountIncentives {
                    account: account.clone(),
                    records: incentive,
                });
            }
        }

        Ok(StakingSnapshot {
            accounts,
            delegations,
            incentives,
            current_epoch,
            stakers,
        })
    }

    pub async fn info(&self, accounts: Vec<StakingAccount>) -> AppResult<StakingInfo> {
        let snapshot = self.fetch_snapshot(accounts).await?;
        build_staking_info(
            &snapshot,
            AggregationParams::from(&self.cfg),
            chrono::Local::now().date_naive(),
        )
    }

    /// 当前 gas price，换算成 gwei
    async fn gas_price_gwei(&self) -> AppResult<String> {
        let wei = self.chain.get_gas_price(&self.cfg.staking_chain).await?;
        Ok(from_wei(wei, GWEI_DECIMALS))
    }

    pub async fn delegate_in(&self, tx: Value) -> AppResult<Value> {
        let mut tx = match tx {
            Value::Object(map) => map,
            _ => return Err(AppError::invalid_parameter("Delegation must be an object")),
        };
        tx.insert("gasPrice".into(), json!(self.gas_price_gwei().await?));
        tx.insert("gasLimit".into(), json!(self.cfg.delegate_gas_limit));

        let result = self.cross_chain.pos_delegate_in(Value::Object(tx)).await?;
        tracing::info!("✅ Delegate-in submitted");
        Ok(result)
    }

    pub async fn delegate_out(&self, req: DelegateOutRequest) -> AppResult<Value> {
        let input = DelegateOutInput {
            from: req.from,
            validator_addr: req.validator,
            amount: 0,
            gas_price: self.gas_price_gwei().await?,
            gas_limit: self.cfg.delegate_gas_limit,
            bip44_path: req.path,
            wallet_id: 1,
        };

        let result = self.cross_chain.pos_delegate_out(input).await?;
        tracing::info!("✅ Delegate-out submitted");
        Ok(result)
    }
}
