//! wandcore - 桌面钱包后端进程
//!
//! UI 进程的所有操作（解锁、派生地址、签名、余额、委托收益）都以带关联 ID 的异步消息
//! 跨进程到达这里，由命令分发器交给对应的路由处理器；密钥与链上协议由外部 SDK 负责。

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod ipc;
pub mod service;
pub mod utils;

use std::{sync::Arc, time::Duration};

// 重新导出常用类型
pub use app_state::AppState;
pub use error::{AppError, AppErrorCode, AppResult};

/// 按配置构建分发器并注册全部路由
pub fn build_dispatcher(state: &AppState) -> AppResult<ipc::Dispatcher> {
    let deadline = state
        .config
        .ipc
        .handler_deadline_ms
        .map(Duration::from_millis);

    let builder = ipc::Dispatcher::builder(Arc::clone(&state.endpoints)).deadline(deadline);
    Ok(api::register_routes(builder, state)?.build())
}

pub mod prelude {
    pub use crate::{
        app_state::AppState,
        error::{AppError, AppErrorCode, AppResult},
        ipc::{CommandEnvelope, Dispatcher, EndpointRegistry, ResponseEnvelope, WindowId},
    };
}
