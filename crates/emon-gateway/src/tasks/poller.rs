use async_trait::async_trait;
use emon_logging::LogHandle;
use emon_meter::{EnergyReading, RegisterSource, INPUT_REGISTER_COUNT};
use emon_publish::TelemetryPublisher;
use emon_scheduler::{drift_corrected_delay, PeriodicTask};
use std::time::Duration;

const COMPONENT: &str = "poller";

/// 漂移补偿的轮询任务
///
/// 每周期:读寄存器批 → 解码成物理量 → 发布 → 记录结果。
/// 读或发布失败只记入日志并跳过周期剩余步骤,排程照旧。
/// 下游调用不设超时,外部调用阻塞期间整个协作调度器停摆。
pub struct PollerTask {
    meter: Box<dyn RegisterSource>,
    publisher: Box<dyn TelemetryPublisher>,
    log: LogHandle,
    start_address: u16,
    target_period: Duration,
    min_sleep: Duration,
    heartbeat_cycles: u32,
    cycle: u64,
}

impl PollerTask {
    pub fn new(
        meter: Box<dyn RegisterSource>,
        publisher: Box<dyn TelemetryPublisher>,
        log: LogHandle,
        start_address: u16,
        target_period: Duration,
        min_sleep: Duration,
        heartbeat_cycles: u32,
    ) -> Self {
        Self {
            meter,
            publisher,
            log,
            start_address,
            target_period,
            min_sleep,
            heartbeat_cycles,
            cycle: 0,
        }
    }
}

#[async_trait]
impl PeriodicTask for PollerTask {
    fn name(&self) -> &str {
        COMPONENT
    }

    fn period(&self) -> Duration {
        self.target_period
    }

    async fn tick(&mut self) -> anyhow::Result<()> {
        self.cycle += 1;

        let words = match self
            .meter
            .read_input_registers(self.start_address, INPUT_REGISTER_COUNT)
            .await
        {
            Ok(words) => words,
            Err(e) => {
                // 本周期跳过变换与发布,下个周期重新尝试读取
                self.log.error(COMPONENT, format!("meter read failed: {e}"));
                return Ok(());
            }
        };

        let reading = match EnergyReading::decode(&words) {
            Ok(reading) => reading,
            Err(e) => {
                self.log
                    .error(COMPONENT, format!("register decode failed: {e}"));
                return Ok(());
            }
        };

        if let Err(e) = self.publisher.publish(&reading).await {
            // 同一周期不重试,不退避
            self.log.error(
                COMPONENT,
                format!("publish to {} failed: {e}", self.publisher.name()),
            );
        } else if self.heartbeat_cycles > 0 && self.cycle % u64::from(self.heartbeat_cycles) == 0 {
            self.log.debug(
                COMPONENT,
                format!(
                    "cycle {} ok, {:.1} V {:.1} W",
                    self.cycle, reading.voltage, reading.power
                ),
            );
        }

        Ok(())
    }

    fn delay_after(&self, elapsed: Duration) -> Duration {
        drift_corrected_delay(self.target_period, elapsed, self.min_sleep)
    }
}
