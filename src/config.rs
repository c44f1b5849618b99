use crate::models::{NetworkType, RunConfig};
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::info;

pub const DEFAULT_CONFIG_FILE: &str = "stneuro_eval.toml";

pub fn load_config(config_path: &str) -> Result<RunConfig> {
    // 检查配置文件是否存在，如果不存在则创建默认配置
    if !Path::new(config_path).exists() {
        create_default_config(config_path)?;
        info!("Created default config file at {}", config_path);
    }

    // 读取配置文件内容
    let config_content = fs::read_to_string(config_path)
        .with_context(|| format!("Failed to read config file: {}", config_path))?;

    // 解析TOML配置
    let config: RunConfig = toml::from_str(&config_content)
        .with_context(|| format!("Failed to parse config file: {}", config_path))?;

    Ok(config)
}

/// 加载配置并应用命令行覆盖，返回校验过的不可变配置
pub fn load_run_config(config_path: &str, network_type: Option<NetworkType>) -> Result<RunConfig> {
    let mut config = load_config(config_path)?;
    if let Some(network_type) = network_type {
        config.general.network_type = network_type;
    }
    config
        .validate()
        .with_context(|| format!("Invalid settings in {}", config_path))?;
    Ok(config)
}

fn create_default_config(config_path: &str) -> Result<()> {
    let default_config = r#"[general]
base_dir = "."
# ABO, ABO_Neuro or Neurofinder
network_type = "ABO"
names = [
    "501704220", "501836392", "510514474", "504637623", "501271265",
    "502115959", "502205092", "510517131", "540684467", "545446482",
]
save_segments = true
# leave empty to skip scoring against manual markings
ground_truth_dir = "Markings/ABO/Layer175/Grader1"

[parameters]
pixel_size = 0.78
mean_radius = 5.85
iou_threshold = 0.5
dims = [487, 487]
smoothing = 30.0
batch_size = 1

[inference]
program = "net_segment"
architecture = "net_segment"
template = "demo_config_empty.ini"
output = "config_inf.ini"

[engine]
program = "stneuro-bridge"
args = []

[plot]
enabled = true
bar_color = "blue"
point_color = "gray"
error_color = "white"
quit_key = "q"
"#;

    fs::write(config_path, default_config)
        .with_context(|| format!("Failed to create default config file: {}", config_path))?;

    Ok(())
}
