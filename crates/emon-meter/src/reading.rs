use crate::error::{MeterError, Result};
use serde::Serialize;

/// PZEM-016 输入寄存器布局
mod reg {
    pub const VOLTAGE: usize = 0;
    pub const CURRENT_LOW: usize = 1;
    pub const CURRENT_HIGH: usize = 2;
    pub const POWER_LOW: usize = 3;
    pub const POWER_HIGH: usize = 4;
    pub const ENERGY_LOW: usize = 5;
    pub const ENERGY_HIGH: usize = 6;
    pub const FREQUENCY: usize = 7;
    pub const POWER_FACTOR: usize = 8;
    pub const COUNT: usize = 9;
}

/// 一次轮询批量读取的寄存器数
pub const INPUT_REGISTER_COUNT: u16 = reg::COUNT as u16;

/// 一个轮询周期解码出的物理量
///
/// 只在周期内存活,发布尝试结束后即丢弃,不做持久化。
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EnergyReading {
    /// 电压 (V)
    pub voltage: f64,

    /// 电流 (A)
    pub current: f64,

    /// 有功功率 (W)
    pub power: f64,

    /// 正向累计电能 (kWh)
    pub energy: f64,

    /// 频率 (Hz)
    pub frequency: f64,

    /// 功率因数
    pub power_factor: f64,
}

/// 单寄存器量: raw × scale
fn scale_single(raw: u16, scale: f64) -> f64 {
    raw as f64 * scale
}

/// 跨两个寄存器的量: (low + high × 65536) × scale,低半字在前
fn scale_pair(low: u16, high: u16, scale: f64) -> f64 {
    (low as f64 + high as f64 * 65536.0) * scale
}

impl EnergyReading {
    /// 从一批原始寄存器字解码
    pub fn decode(words: &[u16]) -> Result<Self> {
        if words.len() != reg::COUNT {
            return Err(MeterError::FrameLength {
                expected: reg::COUNT,
                got: words.len(),
            });
        }

        Ok(Self {
            voltage: scale_single(words[reg::VOLTAGE], 0.1),
            current: scale_pair(words[reg::CURRENT_LOW], words[reg::CURRENT_HIGH], 0.001),
            power: scale_pair(words[reg::POWER_LOW], words[reg::POWER_HIGH], 0.1),
            energy: scale_pair(words[reg::ENERGY_LOW], words[reg::ENERGY_HIGH], 0.001),
            frequency: scale_single(words[reg::FREQUENCY], 0.1),
            power_factor: scale_single(words[reg::POWER_FACTOR], 0.01),
        })
    }
}
