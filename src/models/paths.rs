use crate::models::config::RunConfig;
use std::path::{Path, PathBuf};

/// 预处理后数据文件名中的标记，同时用作推理配置的文件名过滤器
pub const DERIVED_MARKER: &str = "_dsCropped_HomoNorm";
/// 原始数据文件的后缀
pub const SOURCE_SUFFIX: &str = "_processed.nii.gz";
/// 汇总性能文件名
pub const PERFORMANCE_FILE: &str = "Layer175_performance.npz";

/// 一次运行涉及的全部目录，均由基目录拼接固定子路径得到
#[derive(Debug, Clone, PartialEq)]
pub struct RunPaths {
    pub data: PathBuf,        // 原始数据
    pub save_data: PathBuf,   // 预处理后的数据
    pub prob_map: PathBuf,    // 网络输出的概率图
    pub model: PathBuf,       // 模型权重
    pub mask: Option<PathBuf>, // 人工标注
    pub save_mask: PathBuf,   // 分割结果与性能
    pub thresh: PathBuf,      // 阈值文件
}

impl RunPaths {
    pub fn new(config: &RunConfig) -> Self {
        let base = Path::new(&config.general.base_dir);
        let network = config.general.network_type;
        let dataset = network.dataset_config();

        let mut model = base
            .join("models")
            .join(network.as_str())
            .join("Trained Network Weights");
        // 空的子目录不参与拼接
        for part in [dataset.data_type, dataset.end_file] {
            if !part.is_empty() {
                model.push(part);
            }
        }

        Self {
            data: base.join("Dataset").join("ABO"),
            save_data: base.join("Results").join("ABO").join("data"),
            prob_map: base.join("Results").join("ABO").join("Probability map"),
            model,
            mask: config.general.ground_truth_dir.as_ref().map(|d| base.join(d)),
            save_mask: base.join("Results").join("ABO").join("Test Masks"),
            thresh: base.join("Results").join(network.as_str()).join("Thresholds"),
        }
    }

    /// 某条数据预处理后的文件位置
    pub fn derived_artifact(&self, name: &str) -> PathBuf {
        self.save_data.join(format!("{}{}.nii.gz", name, DERIVED_MARKER))
    }

    /// 某条数据的原始文件位置
    pub fn source_artifact(&self, name: &str) -> PathBuf {
        self.data.join(format!("{}{}", name, SOURCE_SUFFIX))
    }

    pub fn threshold_file(&self, config: &RunConfig) -> PathBuf {
        let dataset = config.general.network_type.dataset_config();
        self.thresh.join(format!("{}.npz", dataset.thresh_file))
    }

    pub fn segments_file(&self, name: &str) -> PathBuf {
        self.save_mask.join(format!("{}_neurons.npz", name))
    }

    pub fn performance_file(&self) -> PathBuf {
        self.save_mask.join(PERFORMANCE_FILE)
    }
}
