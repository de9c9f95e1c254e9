use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use crate::{
    config::Config,
    ipc::EndpointRegistry,
    service::{
        chain_client::ChainClient, cross_chain::CrossChainEngine, key_service::KeyService,
        settings_store::SettingsStore, staking_service::StakingService,
    },
};

/// 应用状态
/// 各 handler 共享的外部协作方，在注册路由时注入
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub keys: Arc<dyn KeyService>,
    pub chain: Arc<dyn ChainClient>,
    pub cross_chain: Arc<dyn CrossChainEngine>,
    pub settings: Arc<dyn SettingsStore>,
    pub endpoints: Arc<EndpointRegistry>,
    pub staking: Arc<StakingService>,
    /// 链会话是否已建立（`query.config` 的 `sdkStatus`）
    sdk_ready: Arc<AtomicBool>,
}

impl AppState {
    pub fn new(
        config: Arc<Config>,
        keys: Arc<dyn KeyService>,
        chain: Arc<dyn ChainClient>,
        cross_chain: Arc<dyn CrossChainEngine>,
        settings: Arc<dyn SettingsStore>,
        endpoints: Arc<EndpointRegistry>,
    ) -> Self {
        let staking = Arc::new(StakingService::new(
            Arc::clone(&chain),
            Arc::clone(&cross_chain),
            config.chain.clone(),
        ));

        Self {
            config,
            keys,
            chain,
            cross_chain,
            settings,
            endpoints,
            staking,
            sdk_ready: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn mark_sdk_ready(&self) {
        if !self.sdk_ready.swap(true, Ordering::SeqCst) {
            tracing::info!("✅ Chain session ready");
        }
    }

    pub fn is_sdk_ready(&self) -> bool {
        self.sdk_ready.load(Ordering::SeqCst)
    }
}
