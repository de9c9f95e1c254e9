// 标准输入/输出桥
// UI 进程与本进程之间按行交换 JSON：
//   入站  {"type":"open","windowId":1}
//         {"type":"request","windowId":1,"route":"wallet","action":"unlock#42","payload":{...}}
//         {"type":"close","windowId":1}
//   出站  {"windowId":1,"channel":"renderer_windowMessage","endpoint":"wallet_unlock#42",...}
// stdout 只有一个写任务，日志走 stderr

use std::{sync::Arc, time::Duration};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::{
    io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt},
    sync::mpsc,
    task::JoinHandle,
};

use super::{
    dispatcher::Dispatcher,
    endpoint::{WindowId, WindowMessage},
    envelope::CommandEnvelope,
};
use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum InboundFrame {
    Open {
        #[serde(rename = "windowId")]
        window_id: WindowId,
    },
    Close {
        #[serde(rename = "windowId")]
        window_id: WindowId,
    },
    Request {
        #[serde(rename = "windowId")]
        window_id: WindowId,
        route: String,
        /// `action#correlationId`
        action: String,
        #[serde(default)]
        payload: Value,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct OutboundFrame {
    #[serde(rename = "windowId")]
    pub window_id: WindowId,
    #[serde(flatten)]
    pub message: WindowMessage,
}

/// 输入结束后等待在途请求的上限，超时的请求被中止
pub const DRAIN_GRACE: Duration = Duration::from_secs(10);

/// 先清理已结束的任务再登记新任务
fn track(handles: &mut Vec<JoinHandle<()>>, handle: JoinHandle<()>) {
    handles.retain(|h| !h.is_finished());
    handles.push(handle);
}

/// 把窗口通道里的消息转交给唯一的写任务
fn spawn_forwarder(
    window_id: WindowId,
    mut rx: mpsc::UnboundedReceiver<WindowMessage>,
    out: mpsc::UnboundedSender<OutboundFrame>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            if out.send(OutboundFrame { window_id, message }).is_err() {
                break;
            }
        }
    })
}

fn spawn_writer<W>(mut writer: W, mut rx: mpsc::UnboundedReceiver<OutboundFrame>) -> JoinHandle<()>
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            let mut line = match serde_json::to_vec(&frame) {
                Ok(line) => line,
                Err(e) => {
                    tracing::error!(error = %e, "Failed to encode outbound frame");
                    continue;
                }
            };
            line.push(b'\n');
            if let Err(e) = writer.write_all(&line).await {
                tracing::error!(error = %e, "UI channel closed, stopping writer");
                break;
            }
            if let Err(e) = writer.flush().await {
                tracing::error!(error = %e, "UI channel closed, stopping writer");
                break;
            }
        }
    })
}

/// 运行桥接直到输入结束；返回前最多等待 [`DRAIN_GRACE`] 让在途请求写出应答
pub async fn run<R, W>(dispatcher: Arc<Dispatcher>, reader: R, writer: W) -> AppResult<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    run_with_drain(dispatcher, reader, writer, DRAIN_GRACE).await
}

pub async fn run_with_drain<R, W>(
    dispatcher: Arc<Dispatcher>,
    reader: R,
    writer: W,
    drain_grace: Duration,
) -> AppResult<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let endpoints = Arc::clone(dispatcher.endpoints());
    let (out_tx, out_rx) = mpsc::unbounded_channel();
    let writer_task = spawn_writer(writer, out_rx);

    let mut forwarders: Vec<JoinHandle<()>> = Vec::new();
    let mut in_flight: Vec<JoinHandle<()>> = Vec::new();
    let mut open_windows: Vec<WindowId> = Vec::new();

    let mut lines = reader.lines();
    while let Some(line) = lines
        .next_line()
        .await
        .map_err(|e| AppError::internal(format!("Failed to read UI channel: {}", e)))?
    {
        if line.trim().is_empty() {
            continue;
        }

        let frame: InboundFrame = match serde_json::from_str(&line) {
            Ok(frame) => frame,
            Err(e) => {
                tracing::warn!(error = %e, "Malformed frame ignored");
                continue;
            }
        };

        match frame {
            InboundFrame::Open { window_id } => {
                let rx = endpoints.open(window_id).await;
                track(&mut forwarders, spawn_forwarder(window_id, rx, out_tx.clone()));
                if !open_windows.contains(&window_id) {
                    open_windows.push(window_id);
                }
                tracing::info!(window_id = %window_id, "Window opened");
            }
            InboundFrame::Close { window_id } => {
                endpoints.close(window_id).await;
                open_windows.retain(|w| *w != window_id);
                tracing::info!(window_id = %window_id, "Window closed");
            }
            InboundFrame::Request {
                window_id,
                route,
                action,
                payload,
            } => {
                let envelope = CommandEnvelope::from_wire(route, &action, payload);
                if let Some(handle) = dispatcher.dispatch(window_id, envelope) {
                    track(&mut in_flight, handle);
                }
            }
        }
    }

    tracing::info!(pending = in_flight.len(), "UI channel closed, draining requests");
    let drained = tokio::time::timeout(
        drain_grace,
        futures::future::join_all(in_flight.iter_mut()),
    )
    .await;
    match drained {
        Ok(results) => {
            for e in results.into_iter().filter_map(Result::err) {
                tracing::error!(error = %e, "Request task aborted");
            }
        }
        Err(_) => {
            let stuck = in_flight.iter().filter(|h| !h.is_finished()).count();
            tracing::warn!(stuck, "Drain deadline reached, aborting requests");
            for handle in &in_flight {
                handle.abort();
            }
        }
    }

    // 关闭全部窗口通道，转发任务随之结束，写任务在最后一个发送端释放后退出
    for window_id in open_windows {
        endpoints.close(window_id).await;
    }
    drop(out_tx);
    for forwarder in forwarders {
        let _ = forwarder.await;
    }
    let _ = writer_task.await;

    Ok(())
}
