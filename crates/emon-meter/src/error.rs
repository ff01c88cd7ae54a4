use thiserror::Error;

/// 电表访问错误类型
#[derive(Error, Debug)]
pub enum MeterError {
    /// 未连接
    #[error("not connected to the meter")]
    NotConnected,

    /// 建链失败
    #[error("failed to connect to meter at {addr}: {source}")]
    Connect {
        addr: String,
        source: std::io::Error,
    },

    /// 现场总线传输错误(超时/CRC/无响应)
    #[error("field bus transport error: {0}")]
    Transport(String),

    /// 从站返回异常码
    #[error("meter exception: {0}")]
    Exception(String),

    /// 寄存器批长度与寄存器表不符
    #[error("register frame length mismatch: expected {expected}, got {got}")]
    FrameLength { expected: usize, got: usize },
}

/// 电表访问结果类型
pub type Result<T> = std::result::Result<T, MeterError>;
