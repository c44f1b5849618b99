use crate::errors::EvalError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 网络类型，决定使用哪一套训练好的模型与数据约定
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NetworkType {
    #[serde(rename = "ABO")]
    Abo,
    #[serde(rename = "ABO_Neuro")]
    AboNeuro,
    #[serde(rename = "Neurofinder")]
    Neurofinder,
}

/// 每种网络类型对应的数据集配置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetConfig {
    pub data_type: &'static str,  // 模型权重子目录（类别标签）
    pub end_file: &'static str,   // 模型权重目录后缀
    pub thresh_file: &'static str, // 阈值结果文件名（不含扩展名）
    pub area_name: &'static str,  // 最小面积字段名
}

impl NetworkType {
    pub const ALL: [NetworkType; 3] = [
        NetworkType::Abo,
        NetworkType::AboNeuro,
        NetworkType::Neurofinder,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NetworkType::Abo => "ABO",
            NetworkType::AboNeuro => "ABO_Neuro",
            NetworkType::Neurofinder => "Neurofinder",
        }
    }

    /// 选择该网络类型的数据集配置
    pub fn dataset_config(&self) -> DatasetConfig {
        match self {
            NetworkType::Abo => DatasetConfig {
                data_type: "All",
                end_file: "",
                thresh_file: "OptParam_Jaccard_ABO_all275Whitened",
                area_name: "minA",
            },
            NetworkType::AboNeuro => DatasetConfig {
                data_type: "",
                end_file: "",
                thresh_file: "OptParam_Jaccard_AllenNeuro",
                area_name: "minAreaABO",
            },
            NetworkType::Neurofinder => DatasetConfig {
                data_type: "Grader1",
                end_file: "",
                thresh_file: "OptParam_JaccardNew_G1_All",
                area_name: "minA",
            },
        }
    }

    /// Neurofinder 的阈值以微米为单位优化，需要按像素尺寸换算面积
    pub fn area_in_microns(&self) -> bool {
        matches!(self, NetworkType::Neurofinder)
    }
}

impl fmt::Display for NetworkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for NetworkType {
    type Err = EvalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NetworkType::ALL
            .into_iter()
            .find(|t| t.as_str() == s.trim())
            .ok_or_else(|| EvalError::UnknownNetworkType(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dataset_config_per_network_type() {
        let abo = NetworkType::Abo.dataset_config();
        assert_eq!(abo.data_type, "All");
        assert_eq!(abo.thresh_file, "OptParam_Jaccard_ABO_all275Whitened");
        assert_eq!(abo.area_name, "minA");

        let neuro = NetworkType::AboNeuro.dataset_config();
        assert_eq!(neuro.data_type, "");
        assert_eq!(neuro.thresh_file, "OptParam_Jaccard_AllenNeuro");
        assert_eq!(neuro.area_name, "minAreaABO");

        let finder = NetworkType::Neurofinder.dataset_config();
        assert_eq!(finder.data_type, "Grader1");
        assert_eq!(finder.thresh_file, "OptParam_JaccardNew_G1_All");
        assert_eq!(finder.area_name, "minA");

        // 阈值文件和面积字段对所有类型都必须存在
        for t in NetworkType::ALL {
            let cfg = t.dataset_config();
            assert!(!cfg.thresh_file.is_empty());
            assert!(!cfg.area_name.is_empty());
        }
    }

    #[test]
    fn test_parse_network_type() {
        assert_eq!("ABO".parse::<NetworkType>().unwrap(), NetworkType::Abo);
        assert_eq!("ABO_Neuro".parse::<NetworkType>().unwrap(), NetworkType::AboNeuro);
        assert_eq!(" Neurofinder ".parse::<NetworkType>().unwrap(), NetworkType::Neurofinder);

        let err = "abo".parse::<NetworkType>().unwrap_err();
        assert!(matches!(err, EvalError::UnknownNetworkType(ref s) if s == "abo"));
    }

    #[test]
    fn test_display_roundtrips_through_from_str() {
        for t in NetworkType::ALL {
            assert_eq!(t.to_string().parse::<NetworkType>().unwrap(), t);
        }
    }

    #[test]
    fn test_unknown_type_rejected_by_serde() {
        #[derive(Debug, Deserialize)]
        struct Holder {
            network_type: NetworkType,
        }
        let ok: Holder = toml::from_str("network_type = \"ABO_Neuro\"").unwrap();
        assert_eq!(ok.network_type, NetworkType::AboNeuro);
        assert!(toml::from_str::<Holder>("network_type = \"Allen\"").is_err());
    }
}
