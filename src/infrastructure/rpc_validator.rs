// RPC响应校验模块 - 防止链上数据污染

use ethers::types::U256;
use serde_json::Value;

use crate::{
    error::{AppError, AppResult},
    utils::units::parse_amount,
};

/// 检查 JSON-RPC 响应：节点错误原样带上 code，缺少 result 视为协议错误
pub fn validate_rpc_response(json: &Value) -> AppResult<&Value> {
    // 检查是否有error字段
    if let Some(error) = json.get("error").filter(|e| !e.is_null()) {
        let error_code = error.get("code").and_then(|c| c.as_i64());
        let error_msg = error
            .get("message")
            .and_then(|m| m.as_str())
            .unwrap_or("Unknown RPC error");
        return Err(AppError::rpc(error_msg).with_errno(error_code));
    }

    // 检查jsonrpc版本
    if let Some(version) = json.get("jsonrpc") {
        if version.as_str() != Some("2.0") {
            return Err(AppError::rpc(format!(
                "Unsupported JSON-RPC version: {}",
                version
            )));
        }
    }

    json.get("result")
        .ok_or_else(|| AppError::rpc("Missing result field in RPC response"))
}

/// 数量类结果（余额、gas price）：`0x` 十六进制或十进制字符串
pub fn validate_quantity(result: &Value) -> AppResult<U256> {
    match result {
        Value::String(s) => {
            // U256 十进制最多 78 位
            if s.trim_start_matches("0x").len() > 78 {
                return Err(AppError::rpc(format!("Quantity too long: {}", s.len())));
            }
            parse_amount(s).map_err(|e| AppError::rpc(e.message))
        }
        Value::Number(n) => n
            .as_u64()
            .map(U256::from)
            .ok_or_else(|| AppError::rpc(format!("Invalid quantity: {}", n))),
        other => Err(AppError::rpc(format!("Invalid quantity: {}", other))),
    }
}

/// 计数类结果（nonce、块高、epoch、gas）
pub fn validate_u64(result: &Value) -> AppResult<u64> {
    let value = validate_quantity(result)?;
    if value > U256::from(u64::MAX) {
        return Err(AppError::rpc(format!("Value exceeds u64: {}", value)));
    }
    Ok(value.as_u64())
}

/// 验证交易哈希格式
pub fn validate_tx_hash(result: &Value) -> AppResult<String> {
    let tx_hash = result
        .as_str()
        .ok_or_else(|| AppError::rpc("Transaction hash is not a string"))?;
    let hash = tx_hash.trim_start_matches("0x");

    // 交易哈希为32字节 = 64个十六进制字符
    if hash.len() != 64 || !hash.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(AppError::rpc(format!(
            "Invalid transaction hash: {}",
            tx_hash
        )));
    }

    Ok(format!("0x{}", hash))
}

/// 地址格式：20字节 = 40个十六进制字符，`0x` 前缀可选
pub fn is_valid_address(address: &str) -> bool {
    let addr = address
        .strip_prefix("0x")
        .or_else(|| address.strip_prefix("0X"))
        .unwrap_or(address);
    addr.len() == 40 && addr.chars().all(|c| c.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_validate_rpc_response() {
        let ok = json!({ "jsonrpc": "2.0", "id": 1, "result": "0x1" });
        assert_eq!(validate_rpc_response(&ok).unwrap(), &json!("0x1"));

        let err = json!({ "jsonrpc": "2.0", "id": 1, "error": { "code": -32000, "message": "nonce too low" } });
        let e = validate_rpc_response(&err).unwrap_err();
        assert_eq!(e.message, "nonce too low");
        assert_eq!(e.errno, Some(-32000));

        assert!(validate_rpc_response(&json!({ "jsonrpc": "2.0", "id": 1 })).is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert_eq!(
            validate_quantity(&json!("0x1bc16d674ec80000")).unwrap(),
            U256::from(2_000_000_000_000_000_000u64)
        );
        assert_eq!(validate_quantity(&json!("0x0")).unwrap(), U256::zero());
        assert!(validate_quantity(&json!("invalid")).is_err());
        assert_eq!(validate_u64(&json!("0x5")).unwrap(), 5);
        assert_eq!(validate_u64(&json!(18250)).unwrap(), 18250);
    }

    #[test]
    fn test_validate_tx_hash() {
        let hash = "0x1234567890abcdef1234567890abcdef1234567890abcdef1234567890abcdef";
        assert_eq!(validate_tx_hash(&json!(hash)).unwrap(), hash);
        assert!(validate_tx_hash(&json!("invalid")).is_err());
    }

    #[test]
    fn test_is_valid_address() {
        assert!(is_valid_address("0x742d35cc6634c0532925a3b844bc9e7595f0beb6"));
        assert!(is_valid_address("742d35cc6634c0532925a3b844bc9e7595f0beb6"));
        assert!(!is_valid_address("0x123"));
        assert!(!is_valid_address("0xzz2d35cc6634c0532925a3b844bc9e7595f0beb6"));
    }
}
