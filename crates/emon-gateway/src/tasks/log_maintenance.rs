use async_trait::async_trait;
use chrono::Utc;
use emon_logging::LogHandle;
use emon_scheduler::PeriodicTask;
use std::time::Duration;

const COMPONENT: &str = "log-maintenance";

/// 日志维护任务
///
/// 每个 tick 刷盘一次,再做门限检查,到期就轮转。
/// 刷盘或轮转失败向上抛给调度器的激活故障边界。
pub struct LogMaintenanceTask {
    log: LogHandle,
    period: Duration,
}

impl LogMaintenanceTask {
    pub fn new(log: LogHandle, period: Duration) -> Self {
        Self { log, period }
    }
}

#[async_trait]
impl PeriodicTask for LogMaintenanceTask {
    fn name(&self) -> &str {
        COMPONENT
    }

    fn period(&self) -> Duration {
        self.period
    }

    async fn tick(&mut self) -> anyhow::Result<()> {
        self.log.flush()?;

        if self.log.rotate_if_due(Utc::now())? {
            self.log.info(COMPONENT, "log rotated");
        }

        Ok(())
    }
}
