//! Domain 模块
//!
//! 委托记录与收益总览的纯计算，不做任何 I/O

pub mod staking;
pub mod staking_aggregation;

// 重新导出常用类型
pub use staking::{StakingAccount, StakingInfo, StakingSnapshot};
pub use staking_aggregation::{build_staking_info, AggregationParams};
