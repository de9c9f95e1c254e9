//! 统一错误类型
//!
//! 所有 handler 与外部协作方（签名服务、链客户端、跨链引擎）都返回 [`AppError`]，
//! 分发器在边界处把它规整为 `{description, code, category}` 三元组。

use serde::Serialize;
use thiserror::Error;

use crate::utils::error_codes::ErrorCode;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppErrorCode {
    // 请求错误
    InvalidParameter,
    Timeout,
    Internal,

    // 钱包/签名错误
    WalletLocked,
    InvalidPassword,
    InvalidMnemonic,
    InvalidSignature,
    InvalidAddress,
    WalletNotFound,
    AccountNotFound,
    LedgerUnavailable,

    // 链/跨链错误
    RpcError,
    TransactionFailed,
    AmountOverflow,
    ChainNotSupported,
    CrossChainFailed,

    // 本地环境错误
    StorageError,
    ConfigurationError,
    ServiceUnavailable,
}

impl AppErrorCode {
    /// 错误信封中的 `category`
    pub fn as_str(&self) -> &'static str {
        match self {
            AppErrorCode::InvalidParameter => "invalid_parameter",
            AppErrorCode::Timeout => "timeout",
            AppErrorCode::Internal => "internal",

            AppErrorCode::WalletLocked => "wallet_locked",
            AppErrorCode::InvalidPassword => "invalid_password",
            AppErrorCode::InvalidMnemonic => "invalid_mnemonic",
            AppErrorCode::InvalidSignature => "invalid_signature",
            AppErrorCode::InvalidAddress => "invalid_address",
            AppErrorCode::WalletNotFound => "wallet_not_found",
            AppErrorCode::AccountNotFound => "account_not_found",
            AppErrorCode::LedgerUnavailable => "ledger_unavailable",

            AppErrorCode::RpcError => "rpc_error",
            AppErrorCode::TransactionFailed => "transaction_failed",
            AppErrorCode::AmountOverflow => "amount_overflow",
            AppErrorCode::ChainNotSupported => "chain_not_supported",
            AppErrorCode::CrossChainFailed => "cross_chain_failed",

            AppErrorCode::StorageError => "storage_error",
            AppErrorCode::ConfigurationError => "configuration_error",
            AppErrorCode::ServiceUnavailable => "service_unavailable",
        }
    }

    /// 默认数字错误码（外部协作方可以用 [`AppError::with_errno`] 覆盖）
    fn default_errno(&self) -> Option<ErrorCode> {
        match self {
            AppErrorCode::InvalidParameter => Some(ErrorCode::InvalidParameter),
            AppErrorCode::Timeout => Some(ErrorCode::Timeout),
            AppErrorCode::Internal => Some(ErrorCode::InternalServerError),
            AppErrorCode::WalletLocked => Some(ErrorCode::WalletLocked),
            AppErrorCode::InvalidPassword => Some(ErrorCode::InvalidWalletPassword),
            AppErrorCode::InvalidMnemonic => Some(ErrorCode::InvalidMnemonic),
            AppErrorCode::InvalidSignature => Some(ErrorCode::InvalidSignature),
            AppErrorCode::InvalidAddress => Some(ErrorCode::InvalidAddressFormat),
            AppErrorCode::AccountNotFound => Some(ErrorCode::AccountNotFound),
            AppErrorCode::LedgerUnavailable => Some(ErrorCode::LedgerUnavailable),
            AppErrorCode::RpcError => Some(ErrorCode::RpcUnavailable),
            AppErrorCode::TransactionFailed => Some(ErrorCode::TransactionReverted),
            AppErrorCode::AmountOverflow => Some(ErrorCode::AmountOverflow),
            AppErrorCode::ChainNotSupported => Some(ErrorCode::UnsupportedChain),
            AppErrorCode::CrossChainFailed => Some(ErrorCode::CrossChainRejected),
            AppErrorCode::StorageError => Some(ErrorCode::StorageError),
            AppErrorCode::ConfigurationError => Some(ErrorCode::ConfigurationError),
            AppErrorCode::ServiceUnavailable => Some(ErrorCode::ExternalServiceUnavailable),
            AppErrorCode::WalletNotFound => None,
        }
    }
}

#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct AppError {
    pub code: AppErrorCode,
    pub message: String,
    pub errno: Option<i64>,
}

/// 线上错误三元组
#[derive(Debug, Clone, PartialEq, Eq, Serialize, serde::Deserialize)]
pub struct ErrorTriple {
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<i64>,
    pub category: String,
}

impl AppError {
    pub fn new(code: AppErrorCode, msg: impl Into<String>) -> Self {
        Self {
            code,
            message: msg.into(),
            errno: code.default_errno().map(|c| c.as_u32() as i64),
        }
    }

    /// 覆盖数字错误码（外部 SDK 自带 errno 时使用）
    pub fn with_errno(mut self, errno: Option<i64>) -> Self {
        self.errno = errno;
        self
    }

    pub fn category(&self) -> &'static str {
        self.code.as_str()
    }

    /// 提示 UI 该错误是否值得重试
    pub fn is_retryable(&self) -> bool {
        self.code
            .default_errno()
            .map_or(false, |c| c.is_retryable())
    }

    pub fn to_triple(&self) -> ErrorTriple {
        ErrorTriple {
            description: self.message.clone(),
            code: self.errno,
            category: self.category().to_string(),
        }
    }

    pub fn invalid_parameter(msg: impl Into<String>) -> Self {
        Self::new(AppErrorCode::InvalidParameter, msg)
    }

    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::new(AppErrorCode::Timeout, msg)
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(AppErrorCode::Internal, msg)
    }

    pub fn wallet_locked(msg: impl Into<String>) -> Self {
        Self::new(AppErrorCode::WalletLocked, msg)
    }

    pub fn invalid_password(msg: impl Into<String>) -> Self {
        Self::new(AppErrorCode::InvalidPassword, msg)
    }

    pub fn invalid_mnemonic(msg: impl Into<String>) -> Self {
        Self::new(AppErrorCode::InvalidMnemonic, msg)
    }

    pub fn invalid_address(msg: impl Into<String>) -> Self {
        Self::new(AppErrorCode::InvalidAddress, msg)
    }

    pub fn wallet_not_found(msg: impl Into<String>) -> Self {
        Self::new(AppErrorCode::WalletNotFound, msg)
    }

    pub fn account_not_found(msg: impl Into<String>) -> Self {
        Self::new(AppErrorCode::AccountNotFound, msg)
    }

    pub fn ledger_unavailable(msg: impl Into<String>) -> Self {
        Self::new(AppErrorCode::LedgerUnavailable, msg)
    }

    pub fn rpc(msg: impl Into<String>) -> Self {
        Self::new(AppErrorCode::RpcError, msg)
    }

    pub fn transaction_failed(msg: impl Into<String>) -> Self {
        Self::new(AppErrorCode::TransactionFailed, msg)
    }

    pub fn amount_overflow(msg: impl Into<String>) -> Self {
        Self::new(AppErrorCode::AmountOverflow, msg)
    }

    pub fn chain_not_supported(msg: impl Into<String>) -> Self {
        Self::new(AppErrorCode::ChainNotSupported, msg)
    }

    pub fn cross_chain(msg: impl Into<String>) -> Self {
        Self::new(AppErrorCode::CrossChainFailed, msg)
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        Self::new(AppErrorCode::StorageError, msg)
    }

    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::new(AppErrorCode::ConfigurationError, msg)
    }

    pub fn service_unavailable(msg: impl Into<String>) -> Self {
        Self::new(AppErrorCode::ServiceUnavailable, msg)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError::invalid_parameter(format!("Invalid payload: {}", e))
    }
}

impl From<std::io::Error> for AppError {
    fn from(e: std::io::Error) -> Self {
        AppError::storage(e.to_string()).with_errno(e.raw_os_error().map(i64::from))
    }
}

impl From<anyhow::Error> for AppError {
    fn from(e: anyhow::Error) -> Self {
        match e.downcast::<AppError>() {
            Ok(app) => app,
            Err(other) => AppError::internal(format!("{:#}", other)),
        }
    }
}
