use crate::task::PeriodicTask;
use tokio::task::JoinSet;
use tokio::time::{sleep, Instant};
use tracing::{error, info, warn};

/// 区间调度器
///
/// 在单一逻辑控制线程上并发驱动一组独立周期任务。任务只在睡眠点
/// 协作让出,没有抢占;一个从不让出的任务会饿死其余任务,这是
/// 协作模型的已知约束。任务之间不保证任何相对顺序,但同一任务的
/// 相邻激活严格有序且不重叠。
pub struct IntervalScheduler {
    tasks: Vec<Box<dyn PeriodicTask + 'static>>,
}

impl IntervalScheduler {
    pub fn new() -> Self {
        Self { tasks: Vec::new() }
    }

    /// 注册一个任务,必须在 `run` 之前调用
    pub fn register(&mut self, task: impl PeriodicTask + 'static) {
        info!(task = %task.name(), period = ?task.period(), "periodic task registered");
        self.tasks.push(Box::new(task));
    }

    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    /// 驱动所有已注册任务直到进程结束,正常运行下不返回
    ///
    /// 每个任务由独立的驱动循环承载:记录激活起点、执行 tick、
    /// 按任务自己计算的延迟睡眠。tick 返回 Err 只终止该任务的
    /// 本次激活;任务体 panic 只终结该任务的驱动循环,其余任务
    /// 继续运行。
    pub async fn run(self) {
        let mut drivers = JoinSet::new();
        for task in self.tasks {
            drivers.spawn(drive(task));
        }

        while let Some(result) = drivers.join_next().await {
            if let Err(e) = result {
                error!(error = %e, "periodic task driver terminated abnormally");
            }
        }
        warn!("all periodic tasks have terminated, scheduler exiting");
    }
}

impl Default for IntervalScheduler {
    fn default() -> Self {
        Self::new()
    }
}

async fn drive(mut task: Box<dyn PeriodicTask>) {
    let name = task.name().to_string();
    info!(task = %name, period = ?task.period(), "periodic task started");

    loop {
        // 本任务的时钟槽:上一次被允许运行的时刻
        let started = Instant::now();

        if let Err(e) = task.tick().await {
            // 单次激活的故障边界
            warn!(task = %name, error = %e, "task activation failed");
        }

        let elapsed = started.elapsed();
        sleep(task.delay_after(elapsed)).await;
    }
}
