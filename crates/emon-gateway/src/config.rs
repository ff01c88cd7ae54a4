use anyhow::{anyhow, Result};
use config::{Config, File, FileFormat};
use emon_logging::LogLevel;
use emon_meter::MeterConfig;
use emon_publish::EmonCmsConfig;
use serde::Deserialize;
use std::path::Path;

/// 网关配置
#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub meter: MeterConfig,
    #[serde(default)]
    pub publish: EmonCmsConfig,
    #[serde(default)]
    pub poll: PollConfig,
    #[serde(default)]
    pub log: LogConfig,
    #[serde(default)]
    pub timesync: TimeSyncConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PollConfig {
    /// 目标轮询周期(毫秒)
    #[serde(default = "default_poll_interval_ms")]
    pub interval_ms: u64,

    /// 睡眠下限(毫秒),漂移补偿永不低于此值
    #[serde(default = "default_min_sleep_ms")]
    pub min_sleep_ms: u64,

    /// 每 N 个周期发一条心跳记录,0 关闭
    #[serde(default = "default_heartbeat_cycles")]
    pub heartbeat_cycles: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LogConfig {
    /// 日志目录
    #[serde(default = "default_log_directory")]
    pub directory: String,

    /// 活动日志文件名
    #[serde(default = "default_log_file_name")]
    pub file_name: String,

    /// 保留代文件名
    #[serde(default = "default_retained_name")]
    pub retained_name: String,

    /// 轮转的大小门限(字节)
    #[serde(default = "default_max_size_bytes")]
    pub max_size_bytes: u64,

    /// 轮转的年龄门限(秒)
    #[serde(default = "default_rotate_age_secs")]
    pub rotate_age_secs: u64,

    /// 刷盘与轮转检查周期(毫秒)
    #[serde(default = "default_flush_interval_ms")]
    pub flush_interval_ms: u64,

    /// 文件 sink 级别
    #[serde(default = "default_file_level")]
    pub file_level: String,

    /// 控制台镜像级别,通常比文件更宽松
    #[serde(default = "default_console_level")]
    pub console_level: String,
}

impl LogConfig {
    pub fn parsed_file_level(&self) -> Result<LogLevel> {
        LogLevel::from_str(&self.file_level)
            .ok_or_else(|| anyhow!("unknown log.file_level: {}", self.file_level))
    }

    pub fn parsed_console_level(&self) -> Result<LogLevel> {
        LogLevel::from_str(&self.console_level)
            .ok_or_else(|| anyhow!("unknown log.console_level: {}", self.console_level))
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct TimeSyncConfig {
    #[serde(default = "default_timesync_enabled")]
    pub enabled: bool,

    /// 校时周期(秒)
    #[serde(default = "default_timesync_interval_secs")]
    pub interval_secs: u64,
}

// 默认值函数
fn default_poll_interval_ms() -> u64 {
    10_000
}

fn default_min_sleep_ms() -> u64 {
    1
}

fn default_heartbeat_cycles() -> u32 {
    60
}

fn default_log_directory() -> String {
    ".".to_string()
}

fn default_log_file_name() -> String {
    "error.log".to_string()
}

fn default_retained_name() -> String {
    "lastLog.log".to_string()
}

fn default_max_size_bytes() -> u64 {
    500_000
}

fn default_rotate_age_secs() -> u64 {
    24 * 3600
}

fn default_flush_interval_ms() -> u64 {
    1_000
}

fn default_file_level() -> String {
    "error".to_string()
}

fn default_console_level() -> String {
    "debug".to_string()
}

fn default_timesync_enabled() -> bool {
    true
}

fn default_timesync_interval_secs() -> u64 {
    36_000
}

// Default trait 实现
impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_poll_interval_ms(),
            min_sleep_ms: default_min_sleep_ms(),
            heartbeat_cycles: default_heartbeat_cycles(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            directory: default_log_directory(),
            file_name: default_log_file_name(),
            retained_name: default_retained_name(),
            max_size_bytes: default_max_size_bytes(),
            rotate_age_secs: default_rotate_age_secs(),
            flush_interval_ms: default_flush_interval_ms(),
            file_level: default_file_level(),
            console_level: default_console_level(),
        }
    }
}

impl Default for TimeSyncConfig {
    fn default() -> Self {
        Self {
            enabled: default_timesync_enabled(),
            interval_secs: default_timesync_interval_secs(),
        }
    }
}

impl AppConfig {
    /// 加载配置文件,不存在时使用默认配置
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let config = Config::builder()
            .add_source(File::new(
                path.to_str().ok_or_else(|| anyhow!("invalid config path"))?,
                FileFormat::Toml,
            ))
            .build()?;

        Ok(config.try_deserialize()?)
    }

    /// 验证配置
    ///
    /// 配置错误属于启动期故障,进程应当就此停下。
    pub fn validate(&self) -> Result<()> {
        if self.poll.interval_ms == 0 {
            return Err(anyhow!("poll.interval_ms must be greater than 0"));
        }

        if self.poll.min_sleep_ms == 0 {
            return Err(anyhow!(
                "poll.min_sleep_ms must be greater than 0 to guarantee forward progress"
            ));
        }

        if self.poll.min_sleep_ms > self.poll.interval_ms {
            return Err(anyhow!(
                "poll.min_sleep_ms ({}) cannot be greater than poll.interval_ms ({})",
                self.poll.min_sleep_ms,
                self.poll.interval_ms
            ));
        }

        if self.log.max_size_bytes == 0 {
            return Err(anyhow!("log.max_size_bytes must be greater than 0"));
        }

        if self.log.flush_interval_ms == 0 {
            return Err(anyhow!("log.flush_interval_ms must be greater than 0"));
        }

        if self.log.file_name == self.log.retained_name {
            return Err(anyhow!(
                "log.file_name and log.retained_name must differ"
            ));
        }

        self.log.parsed_file_level()?;
        self.log.parsed_console_level()?;

        if self.publish.url.is_empty() {
            return Err(anyhow!("publish.url must not be empty"));
        }

        if self.timesync.enabled && self.timesync.interval_secs == 0 {
            return Err(anyhow!("timesync.interval_secs must be greater than 0"));
        }

        Ok(())
    }
}
