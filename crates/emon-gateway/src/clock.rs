use async_trait::async_trait;
use chrono::Utc;

/// 校时协作者边界
///
/// 同步协议本身在进程之外;核心只拥有周期触发,并依赖墙钟
/// 大致正确来打日志时间戳、做轮转年龄比较。
#[async_trait]
pub trait ClockSource: Send {
    /// 触发一次校时
    async fn resync(&mut self) -> anyhow::Result<()>;
}

/// 墙钟早于此纪元视为尚未同步 (2024-01-01T00:00:00Z)
const SANITY_FLOOR_UNIX: i64 = 1_704_067_200;

/// 依赖系统级 NTP 守护进程的时钟源
///
/// 只验证墙钟已被守护进程设置到可信纪元之后,未同步时上报。
#[derive(Debug, Default)]
pub struct SystemClockSource;

impl SystemClockSource {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ClockSource for SystemClockSource {
    async fn resync(&mut self) -> anyhow::Result<()> {
        let now = Utc::now();
        if now.timestamp() < SANITY_FLOOR_UNIX {
            anyhow::bail!("wall clock not yet synchronized (reads {now})");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_system_clock_passes_on_synced_host() {
        // 测试机的时钟总在纪元下限之后
        let mut source = SystemClockSource::new();
        assert!(source.resync().await.is_ok());
    }
}
