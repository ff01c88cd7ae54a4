use serde::{Deserialize, Serialize};

/// 电表连接配置
///
/// 表计经 RTU/TCP 网关接入,从站号对应串行链路上的仪表地址。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeterConfig {
    /// 网关地址
    pub host: String,

    /// 端口
    pub port: u16,

    /// 从站 ID
    pub slave_id: u8,

    /// 输入寄存器起始地址
    pub start_address: u16,
}

impl Default for MeterConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 502,
            slave_id: 1,
            start_address: 0,
        }
    }
}
