use crate::clock::ClockSource;
use async_trait::async_trait;
use emon_logging::LogHandle;
use emon_scheduler::PeriodicTask;
use std::time::Duration;

const COMPONENT: &str = "timesync";

/// 周期校时任务
///
/// 失败只记日志,绝不致命;时间源不可达时下个周期再试。
pub struct ClockSyncTask {
    source: Box<dyn ClockSource>,
    log: LogHandle,
    period: Duration,
}

impl ClockSyncTask {
    pub fn new(source: Box<dyn ClockSource>, log: LogHandle, period: Duration) -> Self {
        Self {
            source,
            log,
            period,
        }
    }
}

#[async_trait]
impl PeriodicTask for ClockSyncTask {
    fn name(&self) -> &str {
        COMPONENT
    }

    fn period(&self) -> Duration {
        self.period
    }

    async fn tick(&mut self) -> anyhow::Result<()> {
        match self.source.resync().await {
            Ok(()) => self
                .log
                .info(COMPONENT, format!("time verified: {}", chrono::Utc::now())),
            Err(e) => self.log.error(COMPONENT, format!("time sync failed: {e}")),
        }
        Ok(())
    }
}
