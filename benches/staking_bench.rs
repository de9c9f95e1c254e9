//! 委托收益聚合基准测试
//!
//! 测试场景:
//! 1. 不同账户数量下的完整聚合（总览 + 列表）
//! 2. 收益记录很多时的列表构建
//!
//! 金额全部在 U256 上精确累加，这里主要观察扫描与匹配的开销。

use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use ethers::types::U256;
use wandcore::domain::{
    staking::{
        AccountDelegations, AccountIncentives, DelegationRecord, IncentiveRecord, StakeShare,
        StakerRecord, StakingAccount, StakingSnapshot,
    },
    staking_aggregation::{build_staking_info, build_staking_list, AggregationParams},
};

const VALIDATORS_PER_ACCOUNT: usize = 5;
const ACCOUNT_COUNTS: &[usize] = &[1, 10, 50, 200];

// ============ 测试数据 ============

fn snapshot(accounts: usize, incentives_per_validator: u64) -> StakingSnapshot {
    let coin = U256::exp10(18);
    let mut snapshot = StakingSnapshot {
        current_epoch: 18_000,
        ..Default::default()
    };

    for a in 0..accounts {
        let account = StakingAccount {
            address: format!("0x{:040x}", a),
            name: format!("Account{}", a + 1),
        };

        let records = (0..VALIDATORS_PER_ACCOUNT)
            .map(|v| DelegationRecord {
                validator_address: format!("0x{:040X}", 0xA0_u64.wrapping_add(v as u64)),
                amount: coin * U256::from(100 + v as u64),
                quit_epoch: if v == 0 { 17_990 } else { 0 },
            })
            .collect();

        let rewards = (0..VALIDATORS_PER_ACCOUNT)
            .flat_map(|v| {
                (0..incentives_per_validator).map(move |e| IncentiveRecord {
                    validator_address: format!("0x{:040x}", 0xA0_u64.wrapping_add(v as u64)),
                    amount: U256::exp10(15) * U256::from(e + 1),
                    epoch_id: 17_000 + e,
                })
            })
            .collect();

        snapshot.delegations.push(AccountDelegations {
            account: account.clone(),
            records,
        });
        snapshot.incentives.push(AccountIncentives {
            account: account.clone(),
            records: rewards,
        });
        snapshot.accounts.push(account);
    }

    snapshot.stakers = (0..100u64)
        .map(|s| StakerRecord {
            address: format!("0x{:040x}", s),
            amount: coin * U256::from(10_000u64),
            clients: vec![StakeShare {
                address: format!("0x{:040x}", s + 1000),
                amount: coin * U256::from(500u64),
            }],
            partners: Vec::new(),
        })
        .collect();

    snapshot
}

// ============ 基准测试 ============

fn bench_full_aggregation(c: &mut Criterion) {
    let mut group = c.benchmark_group("staking_info");
    let today = NaiveDate::from_ymd_opt(2024, 5, 1).expect("valid date");
    let params = AggregationParams::default();

    for &accounts in ACCOUNT_COUNTS {
        let snap = snapshot(accounts, 20);
        group.throughput(Throughput::Elements(accounts as u64));
        group.bench_with_input(BenchmarkId::from_parameter(accounts), &snap, |b, snap| {
            b.iter(|| build_staking_info(black_box(snap), params, today))
        });
    }

    group.finish();
}

fn bench_list_with_many_rewards(c: &mut Criterion) {
    let mut group = c.benchmark_group("staking_list_rewards");
    let params = AggregationParams::default();

    for incentives in [10u64, 100, 1000] {
        let snap = snapshot(10, incentives);
        group.bench_with_input(BenchmarkId::from_parameter(incentives), &snap, |b, snap| {
            b.iter(|| build_staking_list(black_box(snap), params))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_full_aggregation, bench_list_with_many_rewards);
criterion_main!(benches);
