//! 统一错误代码标准
//! 错误信封中的数字 `code` 均来自这里，UI 可据此做分类处理

use serde::{Deserialize, Serialize};

/// 标准错误代码
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u32)]
pub enum ErrorCode {
    // 1xxx 请求 / 钱包
    InvalidSignature = 1001,
    WalletLocked = 1002,
    InvalidMnemonic = 1003,
    InvalidWalletPassword = 1004,
    InvalidAddressFormat = 1006,
    InvalidParameter = 1007,
    LedgerUnavailable = 1008, // 硬件钱包未连接或被占用

    // 2xxx 链上
    TransactionReverted = 2004,
    AmountOverflow = 2009, // 金额合计超出 U256

    // 3xxx 本地进程 / 外部依赖
    RpcUnavailable = 3001,
    StorageError = 3002,
    Timeout = 3003,
    InternalServerError = 3004,
    ConfigurationError = 3005,
    ExternalServiceUnavailable = 3006, // 签名 SDK 或跨链引擎未接入

    // 4xxx 业务
    AccountNotFound = 4003,
    UnsupportedChain = 4008,
    CrossChainRejected = 4010,
}

impl ErrorCode {
    /// 数字错误码
    pub fn as_u32(&self) -> u32 {
        *self as u32
    }

    /// 是否可重试（重试策略由 UI 决定，这里只给出提示）
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ErrorCode::RpcUnavailable
                | ErrorCode::ExternalServiceUnavailable
                | ErrorCode::Timeout
                | ErrorCode::InternalServerError
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_values() {
        assert_eq!(ErrorCode::WalletLocked.as_u32(), 1002);
        assert_eq!(ErrorCode::InvalidWalletPassword.as_u32(), 1004);
        assert_eq!(ErrorCode::RpcUnavailable.as_u32(), 3001);
    }

    #[test]
    fn test_retryable() {
        assert!(ErrorCode::RpcUnavailable.is_retryable());
        assert!(ErrorCode::Timeout.is_retryable());
        assert!(!ErrorCode::InvalidWalletPassword.is_retryable());
    }
}
