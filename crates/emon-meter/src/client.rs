use crate::error::{MeterError, Result};
use crate::types::MeterConfig;
use async_trait::async_trait;
use tokio::net::TcpStream;
use tokio_modbus::prelude::*;
use tracing::{debug, info};

/// 现场总线协作者边界
///
/// 轮询方只依赖这一个读操作;传输细节(帧、CRC、重连)留在实现里。
#[async_trait]
pub trait RegisterSource: Send {
    /// 读取一批输入寄存器
    async fn read_input_registers(&mut self, addr: u16, count: u16) -> Result<Vec<u16>>;
}

/// Modbus 电表客户端
pub struct ModbusMeterClient {
    config: MeterConfig,
    context: Option<client::Context>,
}

impl ModbusMeterClient {
    /// 创建新的电表客户端,不立即建链
    pub fn new(config: MeterConfig) -> Self {
        Self {
            config,
            context: None,
        }
    }

    /// 连接到 Modbus 网关
    pub async fn connect(&mut self) -> Result<()> {
        let stream = TcpStream::connect((self.config.host.as_str(), self.config.port))
            .await
            .map_err(|e| MeterError::Connect {
                addr: format!("{}:{}", self.config.host, self.config.port),
                source: e,
            })?;
        let slave = Slave(self.config.slave_id);

        self.context = Some(client::tcp::attach_slave(stream, slave));

        info!(
            host = %self.config.host,
            port = %self.config.port,
            slave_id = %self.config.slave_id,
            "connected to meter"
        );
        Ok(())
    }

    /// 断开连接
    pub fn disconnect(&mut self) {
        self.context = None;
        debug!("disconnected from meter");
    }

    /// 检查是否已连接
    pub fn is_connected(&self) -> bool {
        self.context.is_some()
    }

    pub fn config(&self) -> &MeterConfig {
        &self.config
    }
}

#[async_trait]
impl RegisterSource for ModbusMeterClient {
    async fn read_input_registers(&mut self, addr: u16, count: u16) -> Result<Vec<u16>> {
        // 上个周期失败后连接已被丢弃,这里重新建链,
        // 保证每个周期都是一次全新的读取尝试
        if self.context.is_none() {
            self.connect().await?;
        }
        let ctx = self.context.as_mut().ok_or(MeterError::NotConnected)?;

        let result = match ctx.read_input_registers(addr, count).await {
            Ok(inner) => inner,
            Err(e) => {
                self.context = None;
                return Err(MeterError::Transport(format!("{e:?}")));
            }
        };

        let words = result.map_err(|e| MeterError::Exception(format!("{e:?}")))?;

        debug!(addr = %addr, count = %count, "read input registers");
        Ok(words)
    }
}
