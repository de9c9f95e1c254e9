//! 助记词路由：生成、查询、导出、导入、重置

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::{
    app_state::AppState,
    error::AppError,
    ipc::{parse_payload, HandlerResult, PhraseAction, Rejection, Route, RouteHandler},
};

#[derive(Deserialize, Zeroize, ZeroizeOnDrop)]
struct PasswordPayload {
    pwd: String,
}

#[derive(Deserialize, Zeroize, ZeroizeOnDrop)]
struct ImportPayload {
    phrase: String,
    pwd: String,
}

pub struct PhraseHandler {
    state: AppState,
}

impl PhraseHandler {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    /// 删除钱包 SDK 的本地数据库目录
    async fn reset(&self) -> HandlerResult {
        let db_path = self.state.config.storage.db_path();
        match tokio::fs::remove_dir_all(&db_path).await {
            Ok(()) => {
                tracing::info!(path = %db_path.display(), "Wallet database removed");
                Ok(json!(true))
            }
            Err(e) => Err(Rejection::with_data(AppError::from(e), json!(false))),
        }
    }
}

#[async_trait]
impl RouteHandler for PhraseHandler {
    type Action = PhraseAction;

    const ROUTE: Route = Route::Phrase;

    async fn handle(&self, action: PhraseAction, payload: Value) -> HandlerResult {
        let keys = &self.state.keys;
        match action {
            PhraseAction::Generate => {
                let p: PasswordPayload = parse_payload(payload)?;
                let phrase = keys.generate_mnemonic(&p.pwd).await?;
                Ok(json!(phrase.as_str()))
            }
            PhraseAction::Has => Ok(json!(keys.has_mnemonic().await?)),
            PhraseAction::Reveal => {
                let p: PasswordPayload = parse_payload(payload)?;
                let phrase = keys.reveal_mnemonic(&p.pwd).await?;
                Ok(json!(phrase.as_str()))
            }
            PhraseAction::Import => {
                let p: ImportPayload = parse_payload(payload)?;
                Ok(json!(keys.import_mnemonic(&p.phrase, &p.pwd).await?))
            }
            PhraseAction::Reset => self.reset().await,
        }
    }
}
