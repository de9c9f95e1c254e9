//! 日志初始化
//!
//! stdout 是 UI 通道，控制台日志一律写 stderr；可选按天滚动的文件日志。

use std::path::{Path, PathBuf};

use tracing_appender::{non_blocking::WorkerGuard, rolling};
use tracing_subscriber::{
    fmt::{self, time::ChronoUtc},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer, Registry,
};

use crate::config::LoggingConfig;

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

const LOG_FILE_PREFIX: &str = "wandcore.log";

/// 文件日志所在目录：`log_file_path` 的父目录，缺省为 `./logs`
fn log_dir(config: &LoggingConfig) -> PathBuf {
    config
        .log_file_path
        .as_deref()
        .and_then(|p| Path::new(p).parent())
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("./logs"))
        .to_path_buf()
}

fn console_layer(json: bool) -> BoxedLayer {
    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_timer(ChronoUtc::rfc_3339());
    if json {
        layer.json().boxed()
    } else {
        layer.with_ansi(true).boxed()
    }
}

fn file_layer(
    config: &LoggingConfig,
    json: bool,
) -> Result<(BoxedLayer, WorkerGuard), Box<dyn std::error::Error + Send + Sync>> {
    let dir = log_dir(config);
    std::fs::create_dir_all(&dir)?;

    let (writer, guard) = tracing_appender::non_blocking(rolling::daily(&dir, LOG_FILE_PREFIX));
    let layer = fmt::layer()
        .with_writer(writer)
        .with_timer(ChronoUtc::rfc_3339())
        .with_ansi(false);
    let layer: BoxedLayer = if json { layer.json().boxed() } else { layer.boxed() };

    Ok((layer, guard))
}

/// 初始化全局日志
///
/// 开启文件日志时返回写线程的 guard，调用方持有到进程退出。重复初始化返回错误。
pub fn init_logging(
    config: &LoggingConfig,
) -> Result<Option<WorkerGuard>, Box<dyn std::error::Error + Send + Sync>> {
    let json = config.format == "json";
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let mut layers: Vec<BoxedLayer> = vec![console_layer(json)];
    let mut guard = None;
    if config.enable_file_logging {
        let (layer, g) = file_layer(config, json)?;
        layers.push(layer);
        guard = Some(g);
    }

    Registry::default()
        .with(layers)
        .with(filter)
        .try_init()?;

    Ok(guard)
}
