use crate::error::Result;
use crate::record::{LogLevel, LogRecord};
use crate::sink::RotatingFileSink;
use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::error;

/// 可克隆的日志句柄
///
/// 调度器在注册任务时注入,替代全局 logger。记录先按独立的控制台
/// 级别镜像到 tracing,再交给文件 sink。文件写失败只上报到控制台,
/// 记录本身丢弃,绝不拖垮宿主任务。
#[derive(Clone)]
pub struct LogHandle {
    sink: Arc<Mutex<RotatingFileSink>>,
    console_level: LogLevel,
}

impl LogHandle {
    pub fn new(sink: RotatingFileSink, console_level: LogLevel) -> Self {
        Self {
            sink: Arc::new(Mutex::new(sink)),
            console_level,
        }
    }

    pub fn log(&self, level: LogLevel, component: &str, message: impl Into<String>) {
        let record = LogRecord::new(level, component, message.into());

        if record.level >= self.console_level {
            Self::mirror(&record);
        }

        let mut sink = self.lock();
        if let Err(e) = sink.append(&record) {
            error!(
                component = %record.component,
                error = %e,
                "dropping log record after write failure"
            );
        }
    }

    pub fn debug(&self, component: &str, message: impl Into<String>) {
        self.log(LogLevel::Debug, component, message);
    }

    pub fn info(&self, component: &str, message: impl Into<String>) {
        self.log(LogLevel::Info, component, message);
    }

    pub fn warn(&self, component: &str, message: impl Into<String>) {
        self.log(LogLevel::Warn, component, message);
    }

    pub fn error(&self, component: &str, message: impl Into<String>) {
        self.log(LogLevel::Error, component, message);
    }

    /// 把文件 sink 的缓冲刷到持久存储
    pub fn flush(&self) -> Result<()> {
        self.lock().flush()
    }

    /// 门限检查后按需轮转,返回是否发生了轮转
    pub fn rotate_if_due(&self, now: DateTime<Utc>) -> Result<bool> {
        self.lock().rotate_if_due(now)
    }

    pub fn console_level(&self) -> LogLevel {
        self.console_level
    }

    pub fn file_level(&self) -> LogLevel {
        self.lock().level()
    }

    pub fn active_size(&self) -> u64 {
        self.lock().active_size()
    }

    fn lock(&self) -> MutexGuard<'_, RotatingFileSink> {
        match self.sink.lock() {
            Ok(guard) => guard,
            // 持锁 panic 只可能发生在 sink 的纯 I/O 调用里,内部状态仍一致
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn mirror(record: &LogRecord) {
        match record.level {
            LogLevel::Debug => {
                tracing::debug!(component = %record.component, "{}", record.message)
            }
            LogLevel::Info => tracing::info!(component = %record.component, "{}", record.message),
            LogLevel::Warn => tracing::warn!(component = %record.component, "{}", record.message),
            LogLevel::Error => {
                tracing::error!(component = %record.component, "{}", record.message)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::RotationPolicy;
    use std::time::Duration;
    use tempfile::tempdir;

    fn test_handle(dir: &std::path::Path) -> LogHandle {
        let sink = RotatingFileSink::open(
            dir.join("error.log"),
            dir.join("lastLog.log"),
            RotationPolicy {
                max_size_bytes: 1024,
                min_age: Duration::from_secs(3600),
            },
            LogLevel::Error,
        )
        .unwrap();
        LogHandle::new(sink, LogLevel::Debug)
    }

    #[test]
    fn test_handle_writes_through_to_file() {
        let dir = tempdir().unwrap();
        let handle = test_handle(dir.path());

        handle.error("poller", "meter read failed");
        handle.flush().unwrap();

        let content = std::fs::read_to_string(dir.path().join("error.log")).unwrap();
        assert!(content.contains("poller - ERROR - meter read failed"));
    }

    #[test]
    fn test_console_threshold_independent_of_file() {
        let dir = tempdir().unwrap();
        let handle = test_handle(dir.path());

        // 控制台级别 Debug,文件级别 Error:debug 记录只上控制台
        handle.debug("poller", "cycle 12 ok");
        handle.flush().unwrap();

        assert_eq!(handle.file_level(), LogLevel::Error);
        assert_eq!(handle.console_level(), LogLevel::Debug);
        let content = std::fs::read_to_string(dir.path().join("error.log")).unwrap();
        assert!(content.is_empty());
    }

    #[test]
    fn test_clones_share_one_sink() {
        let dir = tempdir().unwrap();
        let handle = test_handle(dir.path());
        let other = handle.clone();

        handle.error("poller", "first");
        other.error("maintenance", "second");
        handle.flush().unwrap();

        let content = std::fs::read_to_string(dir.path().join("error.log")).unwrap();
        assert!(content.contains("first"));
        assert!(content.contains("second"));
    }
}
