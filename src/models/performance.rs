/// 单条数据的打分结果（百分制，已截断到两位小数）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scores {
    pub recall: f64,
    pub precision: f64,
    pub f1: f64,
}

impl Scores {
    /// 由引擎返回的 [0, 1] 原始分数构造，逐项截断
    pub fn from_raw(recall: f64, precision: f64, f1: f64) -> Self {
        Self {
            recall: truncate_score(recall),
            precision: truncate_score(precision),
            f1: truncate_score(f1),
        }
    }
}

/// 转为百分制并截断（不是四舍五入）到两位小数: 0.8675 -> 86.75
pub fn truncate_score(raw: f64) -> f64 {
    (10000.0 * raw).trunc() / 100.0
}

/// 三个指标序列，下标与数据条目列表一一对应
#[derive(Debug, Clone, PartialEq)]
pub struct PerformanceRecord {
    pub recall: Vec<f64>,
    pub precision: Vec<f64>,
    pub f1: Vec<f64>,
}

/// 某个指标的均值与样本标准差
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesStats {
    pub mean: f64,
    pub std: f64, // ddof = 1；少于两个样本时为 0
}

impl PerformanceRecord {
    /// 预先分配与条目数一致的全零序列
    pub fn zeros(len: usize) -> Self {
        Self {
            recall: vec![0.0; len],
            precision: vec![0.0; len],
            f1: vec![0.0; len],
        }
    }

    pub fn len(&self) -> usize {
        self.recall.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recall.is_empty()
    }

    pub fn set(&mut self, index: usize, scores: Scores) {
        self.recall[index] = scores.recall;
        self.precision[index] = scores.precision;
        self.f1[index] = scores.f1;
    }

    /// 按 Recall, Precision, F1 的顺序返回三个序列
    pub fn series(&self) -> [(&'static str, &[f64]); 3] {
        [
            ("Recall", self.recall.as_slice()),
            ("Precision", self.precision.as_slice()),
            ("F1", self.f1.as_slice()),
        ]
    }

    pub fn stats(&self) -> [SeriesStats; 3] {
        self.series().map(|(_, values)| series_stats(values))
    }
}

pub fn series_stats(values: &[f64]) -> SeriesStats {
    if values.is_empty() {
        return SeriesStats { mean: 0.0, std: 0.0 };
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let std = if values.len() < 2 {
        0.0
    } else {
        let ss: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
        (ss / (n - 1.0)).sqrt()
    };
    SeriesStats { mean, std }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_score_is_not_rounding() {
        assert_eq!(truncate_score(0.8675), 86.75);
        assert_eq!(truncate_score(0.86759), 86.75);
        assert_eq!(truncate_score(0.9), 90.0);
        assert_eq!(truncate_score(0.85), 85.0);
        assert_eq!(truncate_score(0.0), 0.0);
        assert_eq!(truncate_score(1.0), 100.0);
    }

    #[test]
    fn test_scores_from_raw() {
        let scores = Scores::from_raw(0.9, 0.8, 0.85);
        assert_eq!(scores.recall, 90.0);
        assert_eq!(scores.precision, 80.0);
        assert_eq!(scores.f1, 85.0);
    }

    #[test]
    fn test_record_keeps_index_alignment() {
        let mut record = PerformanceRecord::zeros(3);
        record.set(1, Scores::from_raw(0.5, 0.25, 0.3333));
        assert_eq!(record.len(), 3);
        assert_eq!(record.recall, vec![0.0, 50.0, 0.0]);
        assert_eq!(record.precision, vec![0.0, 25.0, 0.0]);
        assert_eq!(record.f1, vec![0.0, 33.33, 0.0]);
    }

    #[test]
    fn test_series_stats_sample_std() {
        let stats = series_stats(&[80.0, 90.0, 100.0]);
        assert!((stats.mean - 90.0).abs() < 1e-12);
        assert!((stats.std - 10.0).abs() < 1e-12);

        let single = series_stats(&[42.0]);
        assert_eq!(single, SeriesStats { mean: 42.0, std: 0.0 });
    }

    #[test]
    fn test_record_stats_order() {
        let record = PerformanceRecord {
            recall: vec![90.0, 90.0],
            precision: vec![80.0, 80.0],
            f1: vec![85.0, 85.0],
        };
        let [r, p, f] = record.stats();
        assert_eq!(r.mean, 90.0);
        assert_eq!(p.mean, 80.0);
        assert_eq!(f.mean, 85.0);
        assert_eq!(r.std, 0.0);
    }
}
