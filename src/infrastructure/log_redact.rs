//! 日志脱敏
//! 请求 payload 在写入日志前必须经过这里，密码、助记词、签名原文一律不落盘

use serde_json::Value;

/// 需要整体隐藏的字段
const SECRET_KEYS: &[&str] = &["pwd", "phrase", "keyFilePwd", "hdWalletPwd", "password"];

/// 只保留首尾的十六进制字段
const HEX_KEYS: &[&str] = &["raw", "rawTx", "signedTx"];

/// 脱敏十六进制字符串（显示前缀和后缀）
pub fn redact_hex_string(hex: &str, show_chars: usize) -> String {
    if !hex.is_ascii() || hex.len() <= show_chars * 2 {
        return "*".repeat(hex.len());
    }

    let prefix = &hex[..show_chars];
    let suffix = &hex[hex.len() - show_chars..];
    format!("{}...{}", prefix, suffix)
}

/// 脱敏地址（显示前6位和后4位）
pub fn redact_address(address: &str) -> String {
    if !address.is_ascii() || address.len() < 10 {
        return "*".repeat(address.len());
    }

    let prefix = &address[..6];
    let suffix = &address[address.len() - 4..];
    format!("{}...{}", prefix, suffix)
}

/// 递归脱敏 JSON payload
pub fn redact_payload(payload: &Value) -> Value {
    match payload {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| {
                    let redacted = if SECRET_KEYS.contains(&k.as_str()) {
                        Value::String("***".into())
                    } else if HEX_KEYS.contains(&k.as_str()) {
                        match v {
                            Value::String(s) => Value::String(redact_hex_string(s, 10)),
                            // 结构化的未签名交易，只保留字段名
                            Value::Object(inner) => Value::Array(
                                inner.keys().map(|k| Value::String(k.clone())).collect(),
                            ),
                            other => redact_payload(other),
                        }
                    } else {
                        redact_payload(v)
                    };
                    (k.clone(), redacted)
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(redact_payload).collect()),
        other => other.clone(),
    }
}
