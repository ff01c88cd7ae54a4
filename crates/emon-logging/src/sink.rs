use crate::error::{LogSinkError, Result};
use crate::record::{LogLevel, LogRecord};
use chrono::{DateTime, Utc};
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// 日志轮转策略
///
/// 两个门限必须同时越过才轮转:大小门限防止持续写压力下的膨胀,
/// 年龄门限防止短时间内反复轮转冲掉保留代。
#[derive(Debug, Clone)]
pub struct RotationPolicy {
    /// 活动文件大小门限(字节)
    pub max_size_bytes: u64,

    /// 距上次轮转的最短间隔
    pub min_age: Duration,
}

/// 带轮转的文件日志目的地
///
/// 持有一个活动文件,磁盘上最多再保留一个上代文件。
/// 轮转是活动/保留两代之间唯一的状态转换。
pub struct RotatingFileSink {
    active_path: PathBuf,
    retained_path: PathBuf,
    policy: RotationPolicy,
    level: LogLevel,
    file: File,
    /// 本 sink 自开启以来写入的字节数,接在已有文件长度之后
    active_size: u64,
    dirty: bool,
    /// 年龄基线。None 表示尚未建立,首次检查只建立基线不轮转
    last_rotation: Option<DateTime<Utc>>,
}

impl RotatingFileSink {
    /// 打开(或续写)活动日志文件
    pub fn open(
        active_path: impl Into<PathBuf>,
        retained_path: impl Into<PathBuf>,
        policy: RotationPolicy,
        level: LogLevel,
    ) -> Result<Self> {
        let active_path = active_path.into();
        let retained_path = retained_path.into();

        if let Some(parent) = active_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| LogSinkError::Open {
                    path: active_path.clone(),
                    source: e,
                })?;
            }
        }

        let file = Self::open_active(&active_path)?;
        let active_size = file.metadata().map(|m| m.len()).unwrap_or(0);

        Ok(Self {
            active_path,
            retained_path,
            policy,
            level,
            file,
            active_size,
            dirty: false,
            last_rotation: None,
        })
    }

    fn open_active(path: &Path) -> Result<File> {
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| LogSinkError::Open {
                path: path.to_path_buf(),
                source: e,
            })
    }

    /// 追加一条记录
    ///
    /// 低于 sink 级别的记录被静默过滤。写失败向上报告,记录丢弃。
    pub fn append(&mut self, record: &LogRecord) -> Result<()> {
        if record.level < self.level {
            return Ok(());
        }

        let line = record.format_line();
        self.file
            .write_all(line.as_bytes())
            .and_then(|_| self.file.write_all(b"\n"))
            .map_err(LogSinkError::Write)?;

        self.active_size += line.len() as u64 + 1;
        self.dirty = true;
        Ok(())
    }

    /// 把缓冲数据刷到持久存储
    ///
    /// 无脏数据时是廉价空操作,每个调度 tick 调用是安全的。
    pub fn flush(&mut self) -> Result<()> {
        if !self.dirty {
            return Ok(());
        }
        self.file.sync_data().map_err(LogSinkError::Flush)?;
        self.dirty = false;
        Ok(())
    }

    /// 门限检查后按需轮转
    ///
    /// 首次调用只建立年龄基线,永不轮转。之后仅当距基线超过
    /// `min_age` 且活动文件超过 `max_size_bytes` 时才轮转。
    /// 返回本次是否发生了轮转。
    pub fn rotate_if_due(&mut self, now: DateTime<Utc>) -> Result<bool> {
        let Some(last) = self.last_rotation else {
            self.last_rotation = Some(now);
            return Ok(false);
        };

        let age = match now.signed_duration_since(last).to_std() {
            Ok(age) => age,
            Err(_) => {
                // 时钟被回拨,重建基线
                self.last_rotation = Some(now);
                return Ok(false);
            }
        };

        if age <= self.policy.min_age || self.active_size <= self.policy.max_size_bytes {
            return Ok(false);
        }

        // 两个门限都已越过,即使切换失败也推进基线,
        // 避免在坏文件系统上每个 tick 重试
        self.last_rotation = Some(now);
        self.rotate()?;
        Ok(true)
    }

    /// 执行轮转:删除保留代,活动文件改名为保留代,重开新的活动文件
    ///
    /// 级别与格式配置跨轮转保持不变。改名或重开失败时,
    /// 原有句柄仍然有效,sink 继续向其写入。
    pub fn rotate(&mut self) -> Result<()> {
        self.file.sync_data().map_err(|e| LogSinkError::Rotate {
            stage: "flushing the active generation",
            source: e,
        })?;
        self.dirty = false;

        match fs::remove_file(&self.retained_path) {
            Ok(()) => {}
            // 保留代不存在是正常状态,首次轮转即如此
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => {
                return Err(LogSinkError::Rotate {
                    stage: "deleting the retained generation",
                    source: e,
                })
            }
        }

        fs::rename(&self.active_path, &self.retained_path).map_err(|e| LogSinkError::Rotate {
            stage: "renaming the active generation",
            source: e,
        })?;

        self.file = Self::open_active(&self.active_path)?;
        self.active_size = 0;

        debug!(
            active = %self.active_path.display(),
            retained = %self.retained_path.display(),
            "log rotated"
        );
        Ok(())
    }

    pub fn level(&self) -> LogLevel {
        self.level
    }

    pub fn active_size(&self) -> u64 {
        self.active_size
    }

    pub fn active_path(&self) -> &Path {
        &self.active_path
    }

    pub fn retained_path(&self) -> &Path {
        &self.retained_path
    }

    pub fn last_rotation(&self) -> Option<DateTime<Utc>> {
        self.last_rotation
    }
}
