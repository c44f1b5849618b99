use crate::errors::EvalError;
use crate::models::dataset::NetworkType;
use serde::Deserialize;

/// 应用程序配置结构
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RunConfig {
    pub general: GeneralConfig,
    pub parameters: ParametersConfig,
    pub inference: InferenceConfig,
    pub engine: EngineConfig,
    pub plot: PlotConfig,
}

/// 通用配置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub base_dir: String,
    pub network_type: NetworkType,
    pub names: Vec<String>, // 待处理的数据条目
    pub save_segments: bool,
    // 空字符串表示没有可用的人工标注，跳过打分
    #[serde(deserialize_with = "crate::models::utils::deserialize_optional_dir")]
    pub ground_truth_dir: Option<String>,
}

/// 处理参数
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ParametersConfig {
    pub pixel_size: f64,    // um
    pub mean_radius: f64,   // 神经元半径, um
    pub iou_threshold: f64, // 匹配用的 IoU 阈值
    pub dims: [usize; 2],   // 数据的 x, y 尺寸
    pub smoothing: f64,
    pub batch_size: usize,
}

/// 推理引擎配置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InferenceConfig {
    pub program: String,
    pub architecture: String,
    pub template: String,
    pub output: String,
}

/// 数值计算引擎（桥接进程）配置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub program: String,
    pub args: Vec<String>,
}

/// 汇总图配置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlotConfig {
    pub enabled: bool,
    pub bar_color: String,
    pub point_color: String,
    pub error_color: String,
    pub quit_key: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            base_dir: ".".to_string(),
            network_type: NetworkType::Abo,
            names: [
                "501704220", "501836392", "510514474", "504637623", "501271265",
                "502115959", "502205092", "510517131", "540684467", "545446482",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            save_segments: true,
            ground_truth_dir: Some("Markings/ABO/Layer175/Grader1".to_string()),
        }
    }
}

impl Default for ParametersConfig {
    fn default() -> Self {
        Self {
            pixel_size: 0.78,
            mean_radius: 5.85,
            iou_threshold: 0.5,
            dims: [487, 487],
            smoothing: 30.0,
            batch_size: 1,
        }
    }
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            program: "net_segment".to_string(),
            architecture: "net_segment".to_string(),
            template: "demo_config_empty.ini".to_string(),
            output: "config_inf.ini".to_string(),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            program: "stneuro-bridge".to_string(),
            args: Vec::new(),
        }
    }
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            bar_color: "blue".to_string(),
            point_color: "gray".to_string(),
            error_color: "white".to_string(),
            quit_key: "q".to_string(),
        }
    }
}

impl ParametersConfig {
    /// 神经元的平均期望面积（像素），四舍五入为整数
    pub fn avg_area(&self) -> f64 {
        (std::f64::consts::PI * (self.mean_radius / self.pixel_size).powi(2)).round()
    }
}

impl RunConfig {
    /// 检查配置中会让后续阶段产生未定义行为的取值
    pub fn validate(&self) -> Result<(), EvalError> {
        if self.general.names.is_empty() {
            return Err(EvalError::InvalidConfig("general.names must not be empty".into()));
        }
        if let Some(blank) = self.general.names.iter().position(|n| n.trim().is_empty()) {
            return Err(EvalError::InvalidConfig(format!(
                "general.names[{}] is blank",
                blank
            )));
        }
        if self.parameters.pixel_size <= 0.0 {
            return Err(EvalError::InvalidConfig("parameters.pixel_size must be positive".into()));
        }
        if self.parameters.batch_size == 0 {
            return Err(EvalError::InvalidConfig("parameters.batch_size must be at least 1".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_deserialization() {
        let text = r#"
        [general]
        base_dir = "/data/run"
        network_type = "Neurofinder"
        names = ["A", "B"]
        save_segments = false
        ground_truth_dir = ""

        [parameters]
        pixel_size = 1.0
        dims = [512, 512]

        [inference]
        template = "tmpl.ini"

        [plot]
        enabled = false
        "#;

        let config: RunConfig = toml::from_str(text).expect("Failed to deserialize config");

        assert_eq!(config.general.base_dir, "/data/run");
        assert_eq!(config.general.network_type, NetworkType::Neurofinder);
        assert_eq!(config.general.names, vec!["A", "B"]);
        assert!(!config.general.save_segments);
        assert_eq!(config.general.ground_truth_dir, None);
        assert_eq!(config.parameters.pixel_size, 1.0);
        assert_eq!(config.parameters.dims, [512, 512]);
        // 未给出的字段回落到默认值
        assert_eq!(config.parameters.iou_threshold, 0.5);
        assert_eq!(config.inference.template, "tmpl.ini");
        assert_eq!(config.inference.output, "config_inf.ini");
        assert_eq!(config.engine.program, "stneuro-bridge");
        assert!(!config.plot.enabled);
    }

    #[test]
    fn test_empty_document_uses_defaults() {
        let config: RunConfig = toml::from_str("").unwrap();
        assert_eq!(config.general.names.len(), 10);
        assert_eq!(config.general.network_type, NetworkType::Abo);
        assert_eq!(
            config.general.ground_truth_dir.as_deref(),
            Some("Markings/ABO/Layer175/Grader1")
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_avg_area() {
        let params = ParametersConfig::default();
        // round(pi * (5.85 / 0.78)^2) = round(176.71)
        assert_eq!(params.avg_area(), 177.0);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = RunConfig::default();
        config.general.names.clear();
        assert!(matches!(config.validate(), Err(EvalError::InvalidConfig(_))));

        let mut config = RunConfig::default();
        config.general.names.push("  ".to_string());
        assert!(config.validate().is_err());

        let mut config = RunConfig::default();
        config.parameters.batch_size = 0;
        assert!(config.validate().is_err());
    }
}
