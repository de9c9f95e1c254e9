//! PoS 委托相关的领域模型
//!
//! 链上记录（委托、收益、验证人）按节点返回的字段名反序列化；
//! 金额一律是最小单位的 `U256`。展示模型（[`StakingBase`]、[`StakingListEntry`]）
//! 每次查询重新构建，构建后不再修改。

use ethers::types::U256;
use serde::{Deserialize, Serialize};

use crate::utils::units::serde_amount;

/// UI 传入的账户
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakingAccount {
    pub address: String,
    #[serde(default)]
    pub name: String,
}

/// 某账户对某验证人的一条委托
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelegationRecord {
    #[serde(rename = "address")]
    pub validator_address: String,
    #[serde(with = "serde_amount")]
    pub amount: U256,
    /// 0 表示仍在委托中，大于 0 表示在该 epoch 登记了退出
    #[serde(rename = "quitEpoch", default)]
    pub quit_epoch: u64,
}

impl DelegationRecord {
    pub fn is_withdrawing(&self) -> bool {
        self.quit_epoch != 0
    }
}

/// 一次收益发放
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncentiveRecord {
    #[serde(rename = "address")]
    pub validator_address: String,
    #[serde(with = "serde_amount")]
    pub amount: U256,
    #[serde(rename = "epochId")]
    pub epoch_id: u64,
}

/// 验证人名下的委托人或合伙人份额
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakeShare {
    pub address: String,
    #[serde(with = "serde_amount")]
    pub amount: U256,
}

/// 验证人自身质押以及其委托人、合伙人
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakerRecord {
    pub address: String,
    #[serde(with = "serde_amount")]
    pub amount: U256,
    #[serde(default)]
    pub clients: Vec<StakeShare>,
    #[serde(default)]
    pub partners: Vec<StakeShare>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountDelegations {
    pub account: StakingAccount,
    pub records: Vec<DelegationRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountIncentives {
    pub account: StakingAccount,
    pub records: Vec<IncentiveRecord>,
}

/// 一次查询拉取到的全部链上数据，聚合期间只读
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StakingSnapshot {
    pub accounts: Vec<StakingAccount>,
    /// 只包含有委托记录的账户
    pub delegations: Vec<AccountDelegations>,
    /// 只包含有收益记录的账户
    pub incentives: Vec<AccountIncentives>,
    pub current_epoch: u64,
    pub stakers: Vec<StakerRecord>,
}

/// 总览面板
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StakingBase {
    pub my_stake: String,
    pub my_stake_raw: String,
    pub validator_cnt: String,
    pub validator_count: usize,
    pub pending_withdrawal: String,
    pub pending_withdrawal_raw: String,
    #[serde(rename = "epochID")]
    pub epoch_id: String,
    #[serde(rename = "epochIDRaw")]
    pub epoch_id_raw: u64,
    pub current_reward_rate: String,
    pub stake_pool: String,
    pub stake_pool_raw: String,
    pub current_reward_rate_change: String,
    pub total_distributed_rewards: String,
    pub total_distributed_rewards_raw: String,
    pub start_from: String,
}

/// 两行文本：主值 + 副标题
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Caption {
    pub title: String,
    pub bottom: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorLabel {
    pub name: String,
}

/// 委托列表中的一行，对应一个 (账户, 验证人)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StakingListEntry {
    pub my_account: String,
    pub account_address: String,
    pub my_stake: Caption,
    pub my_stake_raw: String,
    pub validator: ValidatorLabel,
    pub validator_address: String,
    pub distribute_rewards: Caption,
    pub distribute_rewards_raw: String,
    /// 最早一次收益距今的天数，没有收益时为空
    pub recency_days: Option<u64>,
    /// 去重并升序排列的收益 epoch
    pub reward_epochs: Vec<u64>,
    pub modify_stake: Vec<String>,
}

/// `staking.info` 的返回值
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakingInfo {
    pub base: StakingBase,
    pub list: Vec<StakingListEntry>,
}
