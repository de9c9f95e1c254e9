pub mod chain_client;
pub mod cross_chain;
pub mod detached; // 未接入外部 SDK 时的占位实现
pub mod key_service;
pub mod settings_store;
pub mod staking_service;

pub use chain_client::{ChainClient, JsonRpcChainClient};
pub use cross_chain::CrossChainEngine;
pub use key_service::KeyService;
pub use settings_store::{JsonFileSettings, SettingsStore};
pub use staking_service::StakingService;
