//! 路由处理器
//!
//! 每个路由一个 handler，持有注入的 [`AppState`]；payload 在 handler 内按 action 解析。

pub mod account_api;
pub mod address_api;
pub mod phrase_api;
pub mod query_api;
pub mod staking_api;
pub mod transaction_api;
pub mod wallet_api;

use serde::Deserialize;

use crate::{app_state::AppState, error::AppResult, ipc::DispatcherBuilder};

pub use account_api::AccountHandler;
pub use address_api::AddressHandler;
pub use phrase_api::PhraseHandler;
pub use query_api::QueryHandler;
pub use staking_api::StakingHandler;
pub use transaction_api::TransactionHandler;
pub use wallet_api::WalletHandler;

/// 定位一个 HD 钱包下的派生路径
#[derive(Debug, Clone, Deserialize)]
pub struct WalletPathPayload {
    #[serde(rename = "walletID")]
    pub wallet_id: u32,
    pub path: String,
}

/// 注册全部路由
pub fn register_routes(builder: DispatcherBuilder, state: &AppState) -> AppResult<DispatcherBuilder> {
    builder
        .route(PhraseHandler::new(state.clone()))?
        .route(WalletHandler::new(state.clone()))?
        .route(AddressHandler::new(state.clone()))?
        .route(AccountHandler::new(state.clone()))?
        .route(TransactionHandler::new(state.clone()))?
        .route(QueryHandler::new(state.clone()))?
        .route(StakingHandler::new(state.clone()))
}
