//! 本地设置存储
//!
//! 设置保存在用户数据目录下的 JSON 文件中，支持点号路径读写（例如
//! `settings.logout_timeout`）。读取不存在的顶层键时写回默认值。

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use once_cell::sync::Lazy;
use serde_json::{json, Map, Value};
use tokio::sync::RwLock;

use crate::{
    config::StorageConfig,
    error::{AppError, AppResult},
};

pub const APP_NAME: &str = "WAN Wallet";

/// 空闲检测间隔（毫秒）
pub const IDLE_CHECK_INTERVAL_MS: u64 = 60 * 1000;

static DEFAULT_CONFIG: Lazy<Value> = Lazy::new(|| {
    json!({
        "mode": "light",
        "network": "main",
        "lang": "en",
        "settings": {
            "reinput_pwd": false,
            "staking_advance": false,
            "logout_timeout": "5"
        }
    })
});

#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// 读取设置；派生键（`appName`、`autoLockTimeout` 等）在这里计算
    async fn get(&self, key: &str) -> AppResult<Option<Value>>;
    async fn set(&self, key: &str, value: Value) -> AppResult<()>;
    async fn remove(&self, key: &str) -> AppResult<()>;
    /// 在 main / testnet 之间切换，返回切换后的网络
    async fn switch_network(&self) -> AppResult<String>;
}

fn lookup<'a>(doc: &'a Value, key: &str) -> Option<&'a Value> {
    key.split('.').try_fold(doc, |node, part| node.get(part))
}

fn assign(doc: &mut Value, key: &str, value: Value) -> AppResult<()> {
    let parts: Vec<&str> = key.split('.').collect();
    let (last, parents) = parts
        .split_last()
        .ok_or_else(|| AppError::invalid_parameter("Empty settings key"))?;

    let mut node = doc;
    for part in parents {
        let map = node
            .as_object_mut()
            .ok_or_else(|| AppError::invalid_parameter(format!("'{}' is not an object", key)))?;
        node = map
            .entry(part.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
    }

    node.as_object_mut()
        .ok_or_else(|| AppError::invalid_parameter(format!("'{}' is not an object", key)))?
        .insert(last.to_string(), value);
    Ok(())
}

fn unset(doc: &mut Value, key: &str) {
    let (parent, last) = match key.rsplit_once('.') {
        Some((parent, last)) => (
            parent
                .split('.')
                .try_fold(&mut *doc, |node, part| node.get_mut(part)),
            last,
        ),
        None => (Some(doc), key),
    };
    if let Some(Value::Object(map)) = parent {
        map.remove(last);
    }
}

/// lowdb 的取值语义：null/false/空串/0 都按“未设置”处理
fn is_unset(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::Bool(b)) => !b,
        Some(Value::String(s)) => s.is_empty(),
        Some(Value::Number(n)) => n.as_f64() == Some(0.0),
        _ => false,
    }
}

/// JSON 文件实现
pub struct JsonFileSettings {
    path: PathBuf,
    user_data_path: PathBuf,
    doc: RwLock<Value>,
}

impl JsonFileSettings {
    /// 加载设置文件；缺失的 `settings.*` 默认项会补齐并写回
    pub async fn load(storage: &StorageConfig) -> AppResult<Self> {
        let path = storage.settings_path();
        let doc = match tokio::fs::read_to_string(&path).await {
            Ok(content) if !content.trim().is_empty() => serde_json::from_str(&content)
                .map_err(|e| {
                    AppError::storage(format!("Corrupt settings file {}: {}", path.display(), e))
                })?,
            Ok(_) => json!({}),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => json!({}),
            Err(e) => return Err(e.into()),
        };

        let store = Self {
            path,
            user_data_path: storage.user_data_path.clone(),
            doc: RwLock::new(doc),
        };
        store.fill_setting_defaults().await?;

        tracing::info!(path = %store.path.display(), "Settings loaded");
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn fill_setting_defaults(&self) -> AppResult<()> {
        let mut doc = self.doc.write().await;
        if !doc.is_object() {
            *doc = json!({});
        }

        let mut changed = false;
        if let Some(Value::Object(defaults)) = DEFAULT_CONFIG.get("settings") {
            for (item, default) in defaults {
                let key = format!("settings.{}", item);
                if lookup(&doc, &key).is_none() {
                    assign(&mut doc, &key, default.clone())?;
                    changed = true;
                }
            }
        }

        if changed {
            self.persist(&doc).await?;
        }
        Ok(())
    }

    async fn persist(&self, doc: &Value) -> AppResult<()> {
        if let Some(dir) = self.path.parent() {
            tokio::fs::create_dir_all(dir).await?;
        }
        let content = serde_json::to_string_pretty(doc)
            .map_err(|e| AppError::storage(format!("Failed to encode settings: {}", e)))?;
        tokio::fs::write(&self.path, content).await?;
        Ok(())
    }

    async fn get_or_default(&self, key: &str) -> AppResult<Option<Value>> {
        {
            let doc = self.doc.read().await;
            let current = lookup(&doc, key);
            if !is_unset(current) {
                return Ok(current.cloned());
            }
        }

        match lookup(&DEFAULT_CONFIG, key) {
            Some(default) => {
                let mut doc = self.doc.write().await;
                assign(&mut doc, key, default.clone())?;
                self.persist(&doc).await?;
                Ok(Some(default.clone()))
            }
            None => Ok(lookup(&*self.doc.read().await, key).cloned()),
        }
    }

    async fn auto_lock_timeout_ms(&self) -> AppResult<u64> {
        let logout = self
            .get_or_default("settings.logout_timeout")
            .await?
            .and_then(|v| match v {
                Value::String(s) => s.trim().parse::<u64>().ok(),
                Value::Number(n) => n.as_u64(),
                _ => None,
            })
            .unwrap_or(5);
        Ok(logout * 60 * 1000)
    }
}

#[async_trait]
impl SettingsStore for JsonFileSettings {
    async fn get(&self, key: &str) -> AppResult<Option<Value>> {
        match key {
            "appName" => Ok(Some(json!(APP_NAME))),
            "userDataPath" => Ok(Some(json!(self.user_data_path.display().to_string()))),
            "autoLockTimeout" => Ok(Some(json!(self.auto_lock_timeout_ms().await?))),
            "idleCheckInterval" => Ok(Some(json!(IDLE_CHECK_INTERVAL_MS))),
            "language" => self.get_or_default("lang").await,
            other => self.get_or_default(other).await,
        }
    }

    async fn set(&self, key: &str, value: Value) -> AppResult<()> {
        let mut doc = self.doc.write().await;
        assign(&mut doc, key, value)?;
        self.persist(&doc).await
    }

    async fn remove(&self, key: &str) -> AppResult<()> {
        let mut doc = self.doc.write().await;
        unset(&mut doc, key);
        self.persist(&doc).await
    }

    async fn switch_network(&self) -> AppResult<String> {
        let mut doc = self.doc.write().await;
        let current = lookup(&doc, "network")
            .and_then(|v| v.as_str())
            .unwrap_or("main");
        let next = if current == "main" { "testnet" } else { "main" };
        assign(&mut doc, "network", json!(next))?;
        self.persist(&doc).await?;

        tracing::info!(network = next, "Network switched");
        Ok(next.to_string())
    }
}
