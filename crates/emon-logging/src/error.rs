use std::path::PathBuf;
use thiserror::Error;

/// 日志落盘错误类型
#[derive(Error, Debug)]
pub enum LogSinkError {
    /// 打开日志文件失败
    #[error("failed to open log file {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    /// 写入失败
    #[error("log write failed: {0}")]
    Write(#[source] std::io::Error),

    /// 刷盘失败
    #[error("log flush failed: {0}")]
    Flush(#[source] std::io::Error),

    /// 轮转失败,stage 标明失败的步骤
    #[error("log rotation failed while {stage}: {source}")]
    Rotate {
        stage: &'static str,
        source: std::io::Error,
    },
}

/// 日志落盘结果类型
pub type Result<T> = std::result::Result<T, LogSinkError>;
