//! 链上最小单位与展示单位之间的精确换算
//!
//! 所有金额在累加阶段都保持为 `U256`（最小单位），只在返回给 UI 的边界处
//! 用整数除法/取余换算成十进制字符串，全程不经过浮点数。

use ethers::types::U256;
use serde::{Deserialize, Deserializer, Serializer};

use crate::error::{AppError, AppResult};

/// WAN / ETH 类链：1 coin = 10^18 wei
pub const WEI_DECIMALS: u32 = 18;
/// 1 gwei = 10^9 wei
pub const GWEI_DECIMALS: u32 = 9;

/// 解析链上返回的金额字符串，支持十进制和 `0x` 十六进制
pub fn parse_amount(raw: &str) -> AppResult<U256> {
    let s = raw.trim();
    if s.is_empty() {
        return Err(AppError::invalid_parameter("Empty amount"));
    }
    let parsed = if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        if hex.is_empty() {
            return Ok(U256::zero());
        }
        U256::from_str_radix(hex, 16).map_err(|e| format!("{:?}", e))
    } else {
        U256::from_dec_str(s).map_err(|e| format!("{:?}", e))
    };
    parsed.map_err(|e| AppError::invalid_parameter(format!("Invalid amount '{}': {}", raw, e)))
}

/// 精确累加，溢出时报错而不是回绕
pub fn checked_sum<'a, I>(amounts: I) -> AppResult<U256>
where
    I: IntoIterator<Item = &'a U256>,
{
    amounts.into_iter().try_fold(U256::zero(), |acc, v| {
        acc.checked_add(*v)
            .ok_or_else(|| AppError::amount_overflow("Amount sum exceeds 256-bit range"))
    })
}

fn scale(decimals: u32) -> U256 {
    U256::exp10(decimals as usize)
}

/// 最小单位 → 展示单位，保留全部有效小数并去掉末尾的 0
pub fn from_wei(amount: U256, decimals: u32) -> String {
    if decimals == 0 {
        return amount.to_string();
    }
    let (int_part, frac_part) = amount.div_mod(scale(decimals));
    if frac_part.is_zero() {
        return int_part.to_string();
    }
    let frac = format!("{:0>width$}", frac_part.to_string(), width = decimals as usize);
    format!("{}.{}", int_part, frac.trim_end_matches('0'))
}

/// 最小单位 → 固定小数位展示（四舍五入，半数进位）
pub fn to_fixed(amount: U256, decimals: u32, dp: u32) -> String {
    let rounded = if dp >= decimals {
        amount.saturating_mul(scale(dp - decimals))
    } else {
        let unit = scale(decimals - dp);
        let (q, r) = amount.div_mod(unit);
        // r >= unit - r 等价于 2r >= unit，避免乘法溢出
        if r >= unit - r {
            q.saturating_add(U256::one())
        } else {
            q
        }
    };

    if dp == 0 {
        return rounded.to_string();
    }
    let (int_part, frac_part) = rounded.div_mod(scale(dp));
    format!(
        "{}.{:0>width$}",
        int_part,
        frac_part.to_string(),
        width = dp as usize
    )
}

/// 金额字段的 serde 适配：读取十进制/十六进制字符串或整数，写出十进制字符串
pub mod serde_amount {
    use super::*;

    pub fn serialize<S: Serializer>(amount: &U256, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&amount.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<U256, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        match value {
            serde_json::Value::String(s) => parse_amount(&s).map_err(serde::de::Error::custom),
            // 依赖 arbitrary_precision：Number 保留原始文本，超过 u64 的整数不会变成 f64
            serde_json::Value::Number(n) => {
                let raw = n.to_string();
                if !raw.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(serde::de::Error::custom(format!(
                        "Non-integer amount: {}",
                        raw
                    )));
                }
                parse_amount(&raw).map_err(serde::de::Error::custom)
            }
            serde_json::Value::Null => Ok(U256::zero()),
            other => Err(serde::de::Error::custom(format!(
                "Unexpected amount value: {}",
                other
            ))),
        }
    }
}
