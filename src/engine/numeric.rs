use crate::errors::EvalResult;
use crate::results::Segments;
use std::path::Path;

pub const PROC_NORMALIZE: &str = "HomoFilt_Normalize";
pub const PROC_POST_PROCESS: &str = "postProcess";
pub const PROC_PERFORMANCE: &str = "GetPerformance_Jaccard";

/// 后处理调用参数
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PostProcessParams {
    pub dims: [usize; 2],
    pub avg_area: f64,
    pub min_area: f64,
    pub prob_thresh: f64,
}

/// 数值计算引擎提供的过程，所有实际的滤波、分割与打分都在引擎内完成
pub trait NumericEngine {
    /// 同态滤波 + 归一化，结果作为副作用写入 `save_dir`
    fn homo_filt_normalize(
        &mut self,
        source: &Path,
        save_dir: &Path,
        name: &str,
        smoothing: f64,
    ) -> EvalResult<()>;

    /// 将概率图转为带标签的分割结果
    fn post_process(
        &mut self,
        prob_dir: &Path,
        name: &str,
        params: &PostProcessParams,
    ) -> EvalResult<Segments>;

    /// 与人工标注比对，返回 [0, 1] 区间的 (recall, precision, F1)
    fn get_performance(
        &mut self,
        mask_dir: &Path,
        name: &str,
        segments: &Segments,
        iou_threshold: f64,
    ) -> EvalResult<(f64, f64, f64)>;

    /// 结束引擎会话；调用后不得再使用该引擎
    fn terminate(&mut self) -> EvalResult<()>;
}
