//! wandcore 主入口
//! stdin/stdout 与 UI 进程通信，日志输出到 stderr（可选滚动文件）

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::BufReader;
use wandcore::{
    app_state::AppState,
    config::Config,
    infrastructure::logging,
    ipc::{stdio_bridge, EndpointRegistry},
    service::{
        chain_client::{ChainClient, JsonRpcChainClient},
        detached::{DetachedCrossChain, DetachedKeyService},
        settings_store::JsonFileSettings,
    },
};

#[tokio::main]
async fn main() -> Result<()> {
    // ✅ 1. 加载环境变量
    dotenvy::dotenv().ok();

    // ✅ 2. 加载配置（CONFIG_PATH 指定的文件优先于环境变量）
    let config_path = std::env::var("CONFIG_PATH").ok();
    let config = Config::from_env_and_file(config_path.as_deref())?;
    config.validate().context("Invalid configuration")?;

    // ✅ 3. 初始化日志（guard 需要保留到进程结束）
    let _log_guard = logging::init_logging(&config.logging)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    tracing::info!(
        chain = %config.chain.chain_type,
        rpc = %config.chain.rpc_url,
        "🚀 Starting wandcore"
    );

    // ✅ 4. 外部协作方
    let config = Arc::new(config);
    let chain = Arc::new(JsonRpcChainClient::new(&config.chain)?);
    let settings = Arc::new(JsonFileSettings::load(&config.storage).await?);
    let endpoints = Arc::new(EndpointRegistry::new());

    let state = AppState::new(
        Arc::clone(&config),
        Arc::new(DetachedKeyService),
        chain.clone(),
        Arc::new(DetachedCrossChain),
        settings,
        endpoints,
    );

    // ✅ 5. 探测节点，成功后 sdkStatus 变为 ready
    let probe_state = state.clone();
    let staking_chain = config.chain.staking_chain.clone();
    tokio::spawn(async move {
        match chain.get_block_number(&staking_chain).await {
            Ok(block) => {
                tracing::info!(block, "✅ Chain node reachable");
                probe_state.mark_sdk_ready();
            }
            Err(e) => tracing::warn!("⚠️ Chain node probe failed: {}", e),
        }
    });

    // ✅ 6. 注册路由并运行 IPC 桥
    let dispatcher = Arc::new(wandcore::build_dispatcher(&state)?);
    stdio_bridge::run(
        dispatcher,
        BufReader::new(tokio::io::stdin()),
        tokio::io::stdout(),
    )
    .await?;

    tracing::info!("wandcore stopped");
    Ok(())
}
