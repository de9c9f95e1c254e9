//! 跨进程命令通道
//!
//! UI 进程通过 `(route, action#correlationId, payload)` 发起请求，
//! 分发器把请求交给对应的 [`RouteHandler`]，并把唯一一个应答投递回发起窗口。

pub mod dispatcher;
pub mod endpoint;
pub mod envelope;
pub mod handler;
pub mod route;
pub mod stdio_bridge;

pub use dispatcher::{Dispatcher, DispatcherBuilder};
pub use endpoint::{EndpointRegistry, WindowId, WindowMessage};
pub use envelope::{CommandEnvelope, HandlerResult, Rejection, ResponseEnvelope};
pub use handler::{parse_payload, RouteHandler};
pub use route::{
    AccountAction, AddressAction, PhraseAction, QueryAction, Route, StakingAction,
    TransactionAction, WalletAction, WireAction,
};
