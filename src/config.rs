//! 配置管理模块
//! 支持从环境变量和配置文件加载配置

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// 应用配置结构体
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub ipc: IpcConfig,
    #[serde(default)]
    pub chain: ChainConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// 进程间消息分发配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IpcConfig {
    /// 单个请求的处理时限（毫秒），不配置表示不限时
    #[serde(default)]
    pub handler_deadline_ms: Option<u64>,
}

/// 链相关配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainConfig {
    pub rpc_url: String,
    /// 钱包 SDK 使用的链类型，例如 "WAN"
    pub chain_type: String,
    /// PoS 查询使用的链标识，例如 "wan"
    pub staking_chain: String,
    pub chain_id: u64,
    pub bip44_path: String,
    pub decimals: u32,
    /// 1 epoch 持续的天数
    pub epoch_length_days: u64,
    pub delegate_gas_limit: u64,
    pub rpc_timeout_secs: u64,
}

/// 本地存储配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub user_data_path: PathBuf,
    pub settings_file: String,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String, // "json" or "text"
    pub enable_file_logging: bool,
    pub log_file_path: Option<String>,
}

impl Default for IpcConfig {
    fn default() -> Self {
        Self {
            handler_deadline_ms: std::env::var("WAND_HANDLER_DEADLINE_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|v: &u64| *v > 0),
        }
    }
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            rpc_url: std::env::var("WAND_RPC_URL")
                .unwrap_or_else(|_| "https://gwan-ssl.wandevs.org:56891".into()),
            chain_type: std::env::var("WAND_CHAIN_TYPE").unwrap_or_else(|_| "WAN".into()),
            staking_chain: std::env::var("WAND_STAKING_CHAIN").unwrap_or_else(|_| "wan".into()),
            chain_id: std::env::var("WAND_CHAIN_ID")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(5718350),
            bip44_path: std::env::var("WAND_BIP44_PATH")
                .unwrap_or_else(|_| "m/44'/5718350'/0'/0/0".into()),
            decimals: 18,
            epoch_length_days: std::env::var("WAND_EPOCH_LENGTH_DAYS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(2),
            delegate_gas_limit: std::env::var("WAND_DELEGATE_GAS_LIMIT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(200_000),
            rpc_timeout_secs: std::env::var("WAND_RPC_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(30),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            user_data_path: std::env::var("WAND_USER_DATA_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./userData")),
            settings_file: std::env::var("WAND_SETTINGS_FILE")
                .unwrap_or_else(|_| "config.json".into()),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            format: std::env::var("LOG_FORMAT").unwrap_or_else(|_| "text".into()),
            enable_file_logging: std::env::var("LOG_FILE_ENABLED")
                .ok()
                .map(|v| v == "1")
                .unwrap_or(false),
            log_file_path: std::env::var("LOG_FILE_PATH").ok(),
        }
    }
}

impl StorageConfig {
    /// 设置文件的完整路径
    pub fn settings_path(&self) -> PathBuf {
        self.user_data_path.join(&self.settings_file)
    }

    /// 钱包 SDK 本地数据库目录
    pub fn db_path(&self) -> PathBuf {
        self.user_data_path.join("Db")
    }
}

impl Config {
    /// 从环境变量加载配置
    pub fn from_env() -> Result<Self> {
        Ok(Self::default())
    }

    /// 从配置文件加载配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;

        let config: Config =
            toml::from_str(&content).with_context(|| "Failed to parse config file as TOML")?;

        Ok(config)
    }

    /// 从环境变量和配置文件合并加载（配置文件优先级更高）
    pub fn from_env_and_file<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        let mut config = Self::from_env()?;

        if let Some(path) = path {
            if path.as_ref().exists() {
                config = Self::from_file(path)?;
            }
        }

        Ok(config)
    }

    /// 验证配置有效性
    pub fn validate(&self) -> Result<()> {
        if !self.chain.rpc_url.starts_with("http://") && !self.chain.rpc_url.starts_with("https://")
        {
            anyhow::bail!("WAND_RPC_URL must start with http:// or https://");
        }

        if self.chain.epoch_length_days == 0 {
            anyhow::bail!("epoch_length_days must be greater than 0");
        }

        if self.chain.decimals == 0 || self.chain.decimals > 36 {
            anyhow::bail!("chain decimals must be within 1..=36");
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.to_lowercase().as_str()) {
            anyhow::bail!("LOG_LEVEL must be one of: {:?}", valid_levels);
        }

        if self.logging.format != "json" && self.logging.format != "text" {
            anyhow::bail!("LOG_FORMAT must be 'json' or 'text'");
        }

        Ok(())
    }
}
