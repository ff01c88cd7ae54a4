use async_trait::async_trait;
use emon_meter::EnergyReading;
use thiserror::Error;

/// 发布错误类型
///
/// 对核心而言两类都是可上报、非致命的周期内故障。
#[derive(Error, Debug)]
pub enum PublishError {
    /// 传输层失败
    #[error("publish transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// 采集端返回非成功状态
    #[error("collector rejected payload: status {status}, body {body:?}")]
    Rejected { status: u16, body: String },
}

/// 发布结果类型
pub type Result<T> = std::result::Result<T, PublishError>;

/// 遥测发布协作者边界
#[async_trait]
pub trait TelemetryPublisher: Send + Sync {
    /// 推送一条读数
    ///
    /// 失败由调用方记录,同一周期内不重试、无退避。
    async fn publish(&self, reading: &EnergyReading) -> Result<()>;

    /// 发布端名称,用于日志
    fn name(&self) -> &str;
}
