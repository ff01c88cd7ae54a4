use async_trait::async_trait;
use std::time::Duration;

/// 周期任务
///
/// 启动时注册,进程生命周期内存活,不单独销毁。每次激活运行到
/// 挂起点让出控制权;激活之间严格有序,不会重入。
#[async_trait]
pub trait PeriodicTask: Send {
    /// 任务名,用于日志
    fn name(&self) -> &str;

    /// 目标周期
    fn period(&self) -> Duration;

    /// 执行一次激活
    ///
    /// 返回 Err 只终止本次激活,调度器记录后照常排程下一次。
    async fn tick(&mut self) -> anyhow::Result<()>;

    /// 本次激活耗时 `elapsed` 后,距下次激活应睡多久
    ///
    /// 默认固定周期。需要漂移补偿的任务用 [`drift_corrected_delay`] 覆写。
    fn delay_after(&self, _elapsed: Duration) -> Duration {
        self.period()
    }
}

/// 漂移补偿:用上一周期的实际耗时缩短下一次睡眠,
/// 使长期平均周期收敛到目标值
///
/// `floor` 是正的睡眠下限,周期超支时也保证让出控制权、保证前进。
pub fn drift_corrected_delay(period: Duration, elapsed: Duration, floor: Duration) -> Duration {
    period.saturating_sub(elapsed).max(floor)
}
