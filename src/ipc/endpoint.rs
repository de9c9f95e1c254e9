// UI 端点注册表
// 记录每个存活窗口的投递通道；响应发送时按窗口 ID 解析，窗口已关闭则丢弃

use std::{collections::HashMap, fmt};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::{mpsc, RwLock};

use super::envelope::ResponseEnvelope;

/// 发起请求的 UI 窗口标识
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WindowId(pub u64);

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 投递给窗口的消息
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "channel")]
pub enum WindowMessage {
    /// 请求的应答
    #[serde(rename = "renderer_windowMessage")]
    Response(ResponseEnvelope),
    /// 主动推送，例如 keystore 导入后的钱包计数
    #[serde(rename = "notification")]
    Notification { key: String, value: Value },
}

pub struct EndpointRegistry {
    windows: RwLock<HashMap<WindowId, mpsc::UnboundedSender<WindowMessage>>>,
}

impl Default for EndpointRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl EndpointRegistry {
    pub fn new() -> Self {
        Self {
            windows: RwLock::new(HashMap::new()),
        }
    }

    /// 注册窗口，返回该窗口的接收端；同一 ID 重复注册时替换旧通道
    pub async fn open(&self, id: WindowId) -> mpsc::UnboundedReceiver<WindowMessage> {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut windows = self.windows.write().await;
        if windows.insert(id, tx).is_some() {
            tracing::debug!(window_id = %id, "Window endpoint replaced");
        }
        rx
    }

    /// 注销窗口
    pub async fn close(&self, id: WindowId) -> bool {
        self.windows.write().await.remove(&id).is_some()
    }

    pub async fn is_open(&self, id: WindowId) -> bool {
        self.windows.read().await.contains_key(&id)
    }

    pub async fn len(&self) -> usize {
        self.windows.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.windows.read().await.is_empty()
    }

    /// 投递到指定窗口；窗口不存在或接收端已关闭时返回 false
    pub async fn deliver(&self, id: WindowId, message: WindowMessage) -> bool {
        let sender = match self.windows.read().await.get(&id) {
            Some(sender) => sender.clone(),
            None => return false,
        };

        if sender.send(message).is_ok() {
            return true;
        }

        // 接收端已经释放，清理失效条目（只清理同一条通道，避免误删重新注册的窗口）
        let mut windows = self.windows.write().await;
        if windows
            .get(&id)
            .map(|current| current.same_channel(&sender))
            .unwrap_or(false)
        {
            windows.remove(&id);
        }
        false
    }

    /// 推送到所有存活窗口，返回成功投递的数量
    pub async fn broadcast(&self, key: &str, value: Value) -> usize {
        let targets: Vec<(WindowId, mpsc::UnboundedSender<WindowMessage>)> = self
            .windows
            .read()
            .await
            .iter()
            .map(|(id, tx)| (*id, tx.clone()))
            .collect();

        let mut delivered = 0;
        for (id, tx) in targets {
            let message = WindowMessage::Notification {
                key: key.to_string(),
                value: value.clone(),
            };
            if tx.send(message).is_ok() {
                delivered += 1;
            } else {
                tracing::debug!(window_id = %id, "Broadcast skipped closed window");
            }
        }
        delivered
    }
}
