// 命令分发器
// 按 (route, action) 把 UI 请求路由到 handler，每个请求独立成任务执行，
// 结果包装成应答信封后投递回发起请求的窗口

use std::{collections::HashMap, panic::AssertUnwindSafe, sync::Arc, time::Duration};

use futures::{future::BoxFuture, FutureExt};
use tokio::task::JoinHandle;
use tracing::Instrument;
use uuid::Uuid;

use super::{
    endpoint::{EndpointRegistry, WindowId, WindowMessage},
    envelope::{CommandEnvelope, HandlerResult, Rejection, ResponseEnvelope},
    handler::{Bound, BoundRoute, RouteHandler},
    route::{Route, WireAction},
};
use crate::{
    error::{AppError, AppResult},
    infrastructure::log_redact::redact_payload,
};

/// 已解析、待执行的请求
struct BoundCall {
    endpoint: String,
    route: String,
    action: String,
    future: BoxFuture<'static, HandlerResult>,
}

pub struct DispatcherBuilder {
    routes: HashMap<Route, Arc<dyn BoundRoute>>,
    endpoints: Arc<EndpointRegistry>,
    deadline: Option<Duration>,
}

impl DispatcherBuilder {
    /// 注册路由处理器；同一路由只能注册一次
    pub fn route<H: RouteHandler>(mut self, handler: H) -> AppResult<Self> {
        if self.routes.contains_key(&H::ROUTE) {
            return Err(AppError::configuration(format!(
                "Route '{}' registered twice",
                H::ROUTE
            )));
        }
        self.routes
            .insert(H::ROUTE, Arc::new(Bound(Arc::new(handler))));
        Ok(self)
    }

    /// 单个请求的处理时限，超时后回复一个 timeout 错误
    pub fn deadline(mut self, deadline: Option<Duration>) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn build(self) -> Dispatcher {
        let missing: Vec<&str> = Route::ALL
            .iter()
            .filter(|r| !self.routes.contains_key(*r))
            .map(|r| r.as_wire())
            .collect();
        if !missing.is_empty() {
            tracing::warn!(?missing, "Dispatcher built without handlers for some routes");
        }

        Dispatcher {
            routes: self.routes,
            endpoints: self.endpoints,
            deadline: self.deadline,
        }
    }
}

pub struct Dispatcher {
    routes: HashMap<Route, Arc<dyn BoundRoute>>,
    endpoints: Arc<EndpointRegistry>,
    deadline: Option<Duration>,
}

impl Dispatcher {
    pub fn builder(endpoints: Arc<EndpointRegistry>) -> DispatcherBuilder {
        DispatcherBuilder {
            routes: HashMap::new(),
            endpoints,
            deadline: None,
        }
    }

    pub fn endpoints(&self) -> &Arc<EndpointRegistry> {
        &self.endpoints
    }

    /// 解析 (route, action)；未注册的组合直接丢弃，不产生应答
    fn bind(&self, envelope: CommandEnvelope) -> Option<BoundCall> {
        let CommandEnvelope {
            route,
            action,
            correlation_id,
            payload,
        } = envelope;

        tracing::debug!(
            route = %route,
            action = %action,
            payload = %redact_payload(&payload),
            "Request received"
        );

        let future = Route::from_wire(&route)
            .and_then(|r| self.routes.get(&r))
            .and_then(|handler| handler.bind(&action, payload));

        match future {
            Some(future) => Some(BoundCall {
                endpoint: super::envelope::endpoint_for(&route, &action, &correlation_id),
                route,
                action,
                future,
            }),
            None => {
                tracing::warn!(
                    route = %route,
                    action = %action,
                    correlation_id = %correlation_id,
                    "No handler for route/action, request dropped"
                );
                None
            }
        }
    }

    /// 执行 handler：捕获 panic、应用时限，保证一定产出一个结果
    async fn run(future: BoxFuture<'static, HandlerResult>, deadline: Option<Duration>) -> HandlerResult {
        let guarded = AssertUnwindSafe(future).catch_unwind();
        let outcome = match deadline {
            Some(limit) => match tokio::time::timeout(limit, guarded).await {
                Ok(outcome) => outcome,
                Err(_) => {
                    return Err(Rejection::from(AppError::timeout(format!(
                        "Handler did not complete within {} ms",
                        limit.as_millis()
                    ))))
                }
            },
            None => guarded.await,
        };

        outcome.unwrap_or_else(|_| Err(AppError::internal("Handler panicked").into()))
    }

    async fn complete(call: BoundCall, deadline: Option<Duration>) -> ResponseEnvelope {
        let outcome = Self::run(call.future, deadline).await;

        if let Err(rejection) = &outcome {
            tracing::error!(
                route = %call.route,
                action = %call.action,
                category = rejection.error.category(),
                retryable = rejection.error.is_retryable(),
                error = %rejection.error,
                "Request failed"
            );
        }

        ResponseEnvelope::from_outcome(call.endpoint, outcome)
    }

    /// 就地处理一个请求并返回应答（不投递）。未知路由返回 None。
    pub async fn process(&self, envelope: CommandEnvelope) -> Option<ResponseEnvelope> {
        let call = self.bind(envelope)?;
        Some(Self::complete(call, self.deadline).await)
    }

    /// 异步处理请求，完成后投递给发起窗口
    ///
    /// 每个请求一个任务，handler 挂起时不会阻塞其他请求。
    /// 返回 None 表示请求未命中任何 handler。
    pub fn dispatch(&self, sender: WindowId, envelope: CommandEnvelope) -> Option<JoinHandle<()>> {
        let call = self.bind(envelope)?;
        let endpoints = Arc::clone(&self.endpoints);
        let deadline = self.deadline;

        let span = tracing::info_span!(
            "ipc_request",
            request_id = %Uuid::new_v4(),
            window_id = %sender,
            endpoint = %call.endpoint,
        );

        Some(tokio::spawn(
            async move {
                tracing::debug!("Dispatching request");
                let response = Self::complete(call, deadline).await;
                let endpoint = response.endpoint.clone();

                if !endpoints
                    .deliver(sender, WindowMessage::Response(response))
                    .await
                {
                    tracing::debug!(endpoint = %endpoint, "Sender window gone, response discarded");
                }
            }
            .instrument(span),
        ))
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use serde_json::{json, Value};

    use super::*;
    use crate::ipc::route::QueryAction;

    struct EchoQuery;

    #[async_trait]
    impl RouteHandler for EchoQuery {
        type Action = QueryAction;

        const ROUTE: Route = Route::Query;

        async fn handle(&self, action: QueryAction, payload: Value) -> HandlerResult {
            match action {
                QueryAction::Config => Ok(payload),
                QueryAction::GetGasPrice => Err(AppError::rpc("node unreachable").into()),
            }
        }
    }

    struct SlowQuery;

    #[async_trait]
    impl RouteHandler for SlowQuery {
        type Action = QueryAction;

        const ROUTE: Route = Route::Query;

        async fn handle(&self, _action: QueryAction, _payload: Value) -> HandlerResult {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(json!(true))
        }
    }

    struct PanickyStaking;

    #[async_trait]
    impl RouteHandler for PanickyStaking {
        type Action = crate::ipc::route::StakingAction;

        const ROUTE: Route = Route::Staking;

        async fn handle(&self, _action: Self::Action, _payload: Value) -> HandlerResult {
            panic!("aggregation bug");
        }
    }

    fn dispatcher() -> Dispatcher {
        Dispatcher::builder(Arc::new(EndpointRegistry::new()))
            .route(EchoQuery)
            .unwrap()
            .build()
    }

    #[tokio::test]
    async fn test_process_success_and_error() {
        let d = dispatcher();

        let resp = d
            .process(CommandEnvelope::from_wire("query", "config#7", json!({ "param": "lang" })))
            .await
            .unwrap();
        assert_eq!(resp.endpoint, "query_config#7");
        assert_eq!(resp.data, Some(json!({ "param": "lang" })));
        assert!(resp.error.is_none());

        let resp = d
            .process(CommandEnvelope::from_wire("query", "getGasPrice#8", Value::Null))
            .await
            .unwrap();
        assert_eq!(resp.endpoint, "query_getGasPrice#8");
        assert_eq!(resp.error.unwrap().category, "rpc_error");
        assert!(resp.data.is_none());
    }

    #[tokio::test]
    async fn test_unknown_route_or_action_is_dropped() {
        let d = dispatcher();
        assert!(d
            .process(CommandEnvelope::from_wire("query", "nope#1", Value::Null))
            .await
            .is_none());
        assert!(d
            .process(CommandEnvelope::from_wire("wallet", "unlock#1", Value::Null))
            .await
            .is_none());
        assert!(d
            .dispatch(WindowId(1), CommandEnvelope::from_wire("bogus", "x#1", Value::Null))
            .is_none());
    }

    #[test]
    fn test_duplicate_route_rejected() {
        let result = Dispatcher::builder(Arc::new(EndpointRegistry::new()))
            .route(EchoQuery)
            .unwrap()
            .route(SlowQuery);
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_deadline_produces_timeout_error() {
        let d = Dispatcher::builder(Arc::new(EndpointRegistry::new()))
            .route(SlowQuery)
            .unwrap()
            .deadline(Some(Duration::from_millis(20)))
            .build();

        let resp = d
            .process(CommandEnvelope::from_wire("query", "config#1", Value::Null))
            .await
            .unwrap();
        assert_eq!(resp.error.unwrap().category, "timeout");
    }

    #[tokio::test]
    async fn test_dispatch_delivers_to_sender() {
        let registry = Arc::new(EndpointRegistry::new());
        let mut rx = registry.open(WindowId(4)).await;
        let d = Dispatcher::builder(registry).route(EchoQuery).unwrap().build();

        let handle = d
            .dispatch(
                WindowId(4),
                CommandEnvelope::from_wire("query", "config#abc", json!({ "param": "mode" })),
            )
            .unwrap();
        handle.await.unwrap();

        match rx.recv().await {
            Some(WindowMessage::Response(resp)) => {
                assert_eq!(resp.endpoint, "query_config#abc");
            }
            other => panic!("unexpected message: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_panicking_handler_answers_internal_error() {
        let d = Dispatcher::builder(Arc::new(EndpointRegistry::new()))
            .route(EchoQuery)
            .unwrap()
            .route(PanickyStaking)
            .unwrap()
            .build();

        let resp = d
            .process(CommandEnvelope::from_wire("staking", "info#2", Value::Null))
            .await
            .unwrap();
        assert_eq!(resp.endpoint, "staking_info#2");
        assert_eq!(resp.error.unwrap().category, "internal");

        // 其他路由不受影响
        let resp = d
            .process(CommandEnvelope::from_wire("query", "config#3", json!(1)))
            .await
            .unwrap();
        assert_eq!(resp.data, Some(json!(1)));
    }
}
