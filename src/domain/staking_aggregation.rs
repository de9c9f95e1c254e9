//! 委托收益聚合
//!
//! 输入是一次查询拉取到的只读快照，输出总览和逐条委托列表。
//! 累加全程使用 `U256` 精确加法，只在最后换算成展示单位时做一次舍入。

use std::collections::HashSet;

use chrono::NaiveDate;
use ethers::types::U256;

use super::staking::{
    AccountIncentives, Caption, StakingBase, StakingInfo, StakingListEntry, StakingSnapshot,
    ValidatorLabel,
};
use crate::{
    config::ChainConfig,
    error::{AppError, AppResult},
    utils::units::{checked_sum, from_wei, to_fixed},
};

/// 聚合参数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregationParams {
    /// 链上最小单位的小数位数
    pub decimals: u32,
    /// 1 epoch 持续的天数
    pub epoch_length_days: u64,
}

impl Default for AggregationParams {
    fn default() -> Self {
        Self {
            decimals: 18,
            epoch_length_days: 2,
        }
    }
}

impl From<&ChainConfig> for AggregationParams {
    fn from(cfg: &ChainConfig) -> Self {
        Self {
            decimals: cfg.decimals,
            epoch_length_days: cfg.epoch_length_days,
        }
    }
}

/// 精确合计（最小单位）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StakingTotals {
    pub active: U256,
    pub pending_withdrawal: U256,
    pub reward: U256,
    pub validator_count: usize,
    pub stake_pool: U256,
}

fn add(acc: U256, amount: U256) -> AppResult<U256> {
    acc.checked_add(amount)
        .ok_or_else(|| AppError::amount_overflow("Staking total exceeds 256-bit range"))
}

pub fn compute_totals(snapshot: &StakingSnapshot) -> AppResult<StakingTotals> {
    let mut active = U256::zero();
    let mut pending_withdrawal = U256::zero();
    let mut validators: HashSet<&str> = HashSet::new();

    for record in snapshot.delegations.iter().flat_map(|d| d.records.iter()) {
        active = add(active, record.amount)?;
        if record.is_withdrawing() {
            pending_withdrawal = add(pending_withdrawal, record.amount)?;
        }
        validators.insert(record.validator_address.as_str());
    }

    let reward = checked_sum(
        snapshot
            .incentives
            .iter()
            .flat_map(|i| i.records.iter())
            .map(|r| &r.amount),
    )?;

    let mut stake_pool = U256::zero();
    for staker in &snapshot.stakers {
        stake_pool = add(stake_pool, staker.amount)?;
        for share in staker.clients.iter().chain(staker.partners.iter()) {
            stake_pool = add(stake_pool, share.amount)?;
        }
    }

    Ok(StakingTotals {
        active,
        pending_withdrawal,
        reward,
        validator_count: validators.len(),
        stake_pool,
    })
}

/// 总览：合计、验证人数量、当前 epoch、全网质押池
pub fn build_base_summary(
    snapshot: &StakingSnapshot,
    params: AggregationParams,
    today: NaiveDate,
) -> AppResult<StakingBase> {
    let totals = compute_totals(snapshot)?;
    let d = params.decimals;

    Ok(StakingBase {
        my_stake: to_fixed(totals.active, d, 0),
        my_stake_raw: totals.active.to_string(),
        validator_cnt: format!("In {} validators", totals.validator_count),
        validator_count: totals.validator_count,
        pending_withdrawal: to_fixed(totals.pending_withdrawal, d, 0),
        pending_withdrawal_raw: totals.pending_withdrawal.to_string(),
        epoch_id: format!("Epoch {}", snapshot.current_epoch),
        epoch_id_raw: snapshot.current_epoch,
        current_reward_rate: "N/A %".into(),
        stake_pool: to_fixed(totals.stake_pool, d, 0),
        stake_pool_raw: totals.stake_pool.to_string(),
        current_reward_rate_change: "↑".into(),
        total_distributed_rewards: to_fixed(totals.reward, d, 2),
        total_distributed_rewards_raw: totals.reward.to_string(),
        start_from: format!("From {}", today.format("%a %b %d %Y")),
    })
}

/// 某账户在某验证人上的收益：合计金额与去重升序的 epoch 列表
fn rewards_for(
    incentives: &[AccountIncentives],
    account_address: &str,
    validator_address: &str,
) -> AppResult<(U256, Vec<u64>)> {
    let mut total = U256::zero();
    let mut epochs: Vec<u64> = Vec::new();

    for record in incentives
        .iter()
        .filter(|i| i.account.address == account_address)
        .flat_map(|i| i.records.iter())
        .filter(|r| r.validator_address.eq_ignore_ascii_case(validator_address))
    {
        total = add(total, record.amount)?;
        epochs.push(record.epoch_id);
    }

    epochs.sort_unstable();
    epochs.dedup();
    Ok((total, epochs))
}

/// 委托列表：每条非零委托一行，按快照中的扫描顺序排列
pub fn build_staking_list(
    snapshot: &StakingSnapshot,
    params: AggregationParams,
) -> AppResult<Vec<StakingListEntry>> {
    let mut list = Vec::new();

    for delegation in &snapshot.delegations {
        let account = &delegation.account;
        for record in delegation.records.iter().filter(|r| !r.amount.is_zero()) {
            let (reward, epochs) =
                rewards_for(&snapshot.incentives, &account.address, &record.validator_address)?;

            // 没有收益时不计算距今天数
            let recency_days = epochs.first().map(|earliest| {
                snapshot
                    .current_epoch
                    .saturating_sub(*earliest)
                    .saturating_mul(params.epoch_length_days)
            });
            let bottom = match recency_days {
                Some(days) => format!("{} days ago", days),
                None => "N/A days ago".to_string(),
            };

            list.push(StakingListEntry {
                my_account: account.name.clone(),
                account_address: account.address.clone(),
                my_stake: Caption {
                    title: from_wei(record.amount, params.decimals),
                    bottom,
                },
                my_stake_raw: record.amount.to_string(),
                validator: ValidatorLabel {
                    name: record.validator_address.clone(),
                },
                validator_address: record.validator_address.clone(),
                distribute_rewards: Caption {
                    title: from_wei(reward, params.decimals),
                    bottom: format!("from {} epochs", epochs.len()),
                },
                distribute_rewards_raw: reward.to_string(),
                recency_days,
                reward_epochs: epochs,
                modify_stake: vec!["+".into(), "-".into()],
            });
        }
    }

    Ok(list)
}

pub fn build_staking_info(
    snapshot: &StakingSnapshot,
    params: AggregationParams,
    today: NaiveDate,
) -> AppResult<StakingInfo> {
    Ok(StakingInfo {
        base: build_base_summary(snapshot, params, today)?,
        list: build_staking_list(snapshot, params)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::staking::{
        AccountDelegations, DelegationRecord, IncentiveRecord, StakeShare, StakerRecord,
        StakingAccount,
    };

    fn coins(n: u64) -> U256 {
        U256::from(n) * U256::exp10(18)
    }

    fn account(addr: &str) -> StakingAccount {
        StakingAccount {
            address: addr.into(),
            name: format!("Account {}", addr),
        }
    }

    fn delegation(validator: &str, amount: U256, quit_epoch: u64) -> DelegationRecord {
        DelegationRecord {
            validator_address: validator.into(),
            amount,
            quit_epoch,
        }
    }

    fn incentive(validator: &str, amount: U256, epoch_id: u64) -> IncentiveRecord {
        IncentiveRecord {
            validator_address: validator.into(),
            amount,
            epoch_id,
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 5).unwrap()
    }

    #[test]
    fn test_recency_uses_earliest_epoch() {
        let acc = account("0xAA");
        let snapshot = StakingSnapshot {
            accounts: vec![acc.clone()],
            delegations: vec![AccountDelegations {
                account: acc.clone(),
                records: vec![delegation("0xV1", coins(10), 0)],
            }],
            incentives: vec![AccountIncentives {
                account: acc,
                records: vec![
                    incentive("0xv1", coins(1), 12),
                    incentive("0xV1", coins(1), 5),
                    incentive("0xV1", coins(1), 9),
                    incentive("0xV1", coins(1), 9),
                    incentive("0xV2", coins(7), 1),
                ],
            }],
            current_epoch: 20,
            stakers: vec![],
        };

        let list = build_staking_list(&snapshot, AggregationParams::default()).unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].recency_days, Some(30));
        assert_eq!(list[0].my_stake.bottom, "30 days ago");
        assert_eq!(list[0].reward_epochs, vec![5, 9, 12]);
        assert_eq!(list[0].distribute_rewards.title, "4");
        assert_eq!(list[0].distribute_rewards.bottom, "from 3 epochs");
    }

    #[test]
    fn test_reward_epoch_ahead_of_current_saturates() {
        let acc = account("0xAA");
        let snapshot = StakingSnapshot {
            delegations: vec![AccountDelegations {
                account: acc.clone(),
                records: vec![delegation("0xV1", coins(1), 0)],
            }],
            incentives: vec![AccountIncentives {
                account: acc,
                records: vec![incentive("0xV1", coins(1), 30)],
            }],
            current_epoch: 20,
            ..Default::default()
        };
        let list = build_staking_list(&snapshot, AggregationParams::default()).unwrap();
        assert_eq!(list[0].recency_days, Some(0));
    }

    #[test]
    fn test_rewards_from_other_account_not_counted() {
        let a = account("0xAA");
        let b = account("0xBB");
        let snapshot = StakingSnapshot {
            delegations: vec![AccountDelegations {
                account: a,
                records: vec![delegation("0xV1", coins(1), 0)],
            }],
            incentives: vec![AccountIncentives {
                account: b,
                records: vec![incentive("0xV1", coins(5), 3)],
            }],
            current_epoch: 10,
            ..Default::default()
        };
        let list = build_staking_list(&snapshot, AggregationParams::default()).unwrap();
        assert_eq!(list[0].recency_days, None);
        assert_eq!(list[0].my_stake.bottom, "N/A days ago");
        assert_eq!(list[0].distribute_rewards.title, "0");
        assert_eq!(list[0].distribute_rewards.bottom, "from 0 epochs");
    }

    #[test]
    fn test_zero_delegation_skipped_in_list_but_counted_as_validator() {
        let acc = account("0xAA");
        let snapshot = StakingSnapshot {
            delegations: vec![AccountDelegations {
                account: acc,
                records: vec![
                    delegation("0xV1", U256::zero(), 4),
                    delegation("0xV2", coins(3), 0),
                ],
            }],
            current_epoch: 10,
            ..Default::default()
        };
        let list = build_staking_list(&snapshot, AggregationParams::default()).unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].validator_address, "0xV2");

        let totals = compute_totals(&snapshot).unwrap();
        assert_eq!(totals.validator_count, 2);
    }

    #[test]
    fn test_stake_pool_and_display_rounding() {
        let snapshot = StakingSnapshot {
            stakers: vec![StakerRecord {
                address: "0xV1".into(),
                amount: coins(1000),
                clients: vec![StakeShare {
                    address: "0xC1".into(),
                    amount: coins(250),
                }],
                partners: vec![StakeShare {
                    address: "0xP1".into(),
                    amount: U256::exp10(17) * U256::from(5u64),
                }],
            }],
            incentives: vec![AccountIncentives {
                account: account("0xAA"),
                records: vec![incentive("0xV1", U256::exp10(16) * U256::from(125u64), 1)],
            }],
            current_epoch: 18_000,
            ..Default::default()
        };

        let base = build_base_summary(&snapshot, AggregationParams::default(), today()).unwrap();
        // 1250.5 -> 1251
        assert_eq!(base.stake_pool, "1251");
        assert_eq!(base.stake_pool_raw, "1250500000000000000000");
        // 1.25 -> 1.25
        assert_eq!(base.total_distributed_rewards, "1.25");
        assert_eq!(base.epoch_id, "Epoch 18000");
        assert_eq!(base.epoch_id_raw, 18_000);
        assert_eq!(base.start_from, "From Tue Mar 05 2024");
        assert_eq!(base.validator_cnt, "In 0 validators");
    }

    #[test]
    fn test_overflow_is_reported() {
        let acc = account("0xAA");
        let snapshot = StakingSnapshot {
            delegations: vec![AccountDelegations {
                account: acc,
                records: vec![
                    delegation("0xV1", U256::MAX, 0),
                    delegation("0xV2", U256::one(), 0),
                ],
            }],
            ..Default::default()
        };
        let err = tokio_test::assert_err!(compute_totals(&snapshot));
        assert_eq!(err.category(), "amount_overflow");
    }
}
