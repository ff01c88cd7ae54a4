use crate::publisher::{PublishError, Result, TelemetryPublisher};
use async_trait::async_trait;
use emon_meter::EnergyReading;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// 上送字段名
///
/// 可按已有 EmonCMS 输入清单改名,避免换固件后丢历史数据。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldNames {
    pub voltage: String,
    pub current: String,
    pub power: String,
    pub energy: String,
    pub frequency: String,
    pub power_factor: String,
}

impl Default for FieldNames {
    fn default() -> Self {
        Self {
            voltage: "voltage".to_string(),
            current: "current".to_string(),
            power: "power".to_string(),
            energy: "energy_forward".to_string(),
            frequency: "frequency".to_string(),
            power_factor: "power_factor".to_string(),
        }
    }
}

/// EmonCMS 发布配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmonCmsConfig {
    /// input/post 端点
    pub url: String,

    /// 数据在 Inputs 页聚合的节点名
    pub node: String,

    /// 写权限 API key
    pub apikey: String,

    /// 字段名映射
    #[serde(default)]
    pub fields: FieldNames,
}

impl Default for EmonCmsConfig {
    fn default() -> Self {
        Self {
            url: "http://emonpi.local/input/post".to_string(),
            node: "emeter".to_string(),
            apikey: String::new(),
            fields: FieldNames::default(),
        }
    }
}

/// EmonCMS HTTP 发布端
///
/// 读数整体放进 `fulljson` 查询参数,非 2xx 状态视为采集端拒收。
pub struct EmonCmsPublisher {
    config: EmonCmsConfig,
    client: reqwest::Client,
}

impl EmonCmsPublisher {
    pub fn new(config: EmonCmsConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    fn build_payload(&self, reading: &EnergyReading) -> Value {
        let names = &self.config.fields;
        let mut fields = serde_json::Map::new();
        fields.insert(names.voltage.clone(), reading.voltage.into());
        fields.insert(names.current.clone(), reading.current.into());
        fields.insert(names.power.clone(), reading.power.into());
        fields.insert(names.energy.clone(), reading.energy.into());
        fields.insert(names.frequency.clone(), reading.frequency.into());
        fields.insert(names.power_factor.clone(), reading.power_factor.into());
        Value::Object(fields)
    }
}

#[async_trait]
impl TelemetryPublisher for EmonCmsPublisher {
    async fn publish(&self, reading: &EnergyReading) -> Result<()> {
        let payload = self.build_payload(reading).to_string();

        // apikey 不进日志
        let response = self
            .client
            .get(&self.config.url)
            .query(&[
                ("node", self.config.node.as_str()),
                ("apikey", self.config.apikey.as_str()),
                ("fulljson", payload.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PublishError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        debug!(node = %self.config.node, power = reading.power, "reading published");
        Ok(())
    }

    fn name(&self) -> &str {
        "emoncms"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_reading() -> EnergyReading {
        EnergyReading {
            voltage: 230.0,
            current: 1.5,
            power: 345.0,
            energy: 123.456,
            frequency: 50.0,
            power_factor: 0.95,
        }
    }

    #[test]
    fn test_payload_uses_default_field_names() {
        let publisher = EmonCmsPublisher::new(EmonCmsConfig::default());
        let payload = publisher.build_payload(&sample_reading());

        assert_eq!(payload["voltage"], 230.0);
        assert_eq!(payload["energy_forward"], 123.456);
        assert_eq!(payload["power_factor"], 0.95);
    }

    #[test]
    fn test_payload_respects_renamed_fields() {
        let config = EmonCmsConfig {
            fields: FieldNames {
                power: "house_power".to_string(),
                ..FieldNames::default()
            },
            ..EmonCmsConfig::default()
        };
        let publisher = EmonCmsPublisher::new(config);
        let payload = publisher.build_payload(&sample_reading());

        assert_eq!(payload["house_power"], 345.0);
        assert!(payload.get("power").is_none());
    }

    #[test]
    fn test_rejected_error_reports_status() {
        let err = PublishError::Rejected {
            status: 406,
            body: "Invalid API key".to_string(),
        };
        let text = err.to_string();
        assert!(text.contains("406"));
        assert!(text.contains("Invalid API key"));
    }
}
