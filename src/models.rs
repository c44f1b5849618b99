// models.rs - 作为模块目录入口文件（Rust 2018+ 风格）
// 导出所有子模块
pub mod config;
pub mod dataset;
pub mod paths;
pub mod performance;
pub mod utils;

// 重新导出常用类型，保持API一致性
pub use config::{EngineConfig, InferenceConfig, PlotConfig, RunConfig};
pub use dataset::NetworkType;
pub use paths::{DERIVED_MARKER, RunPaths};
pub use performance::{PerformanceRecord, Scores, SeriesStats};
