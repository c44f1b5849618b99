// src/results.rs
//! 数值结果文件（.npz）的读写：阈值文件、单条数据的分割结果、汇总性能。
use crate::errors::{EvalError, EvalResult};
use crate::models::{PerformanceRecord, RunConfig};
use ndarray::{Array1, ArrayBase, ArrayD, IxDyn, OwnedRepr};
use ndarray_npy::{NpzReader, NpzWriter, ReadNpzError, ReadableElement};
use std::fs::File;
use std::path::Path;

/// 后处理得到的带标签分割结果
pub type Segments = ArrayD<i64>;

pub const PROB_THRESH_FIELD: &str = "ProbThresh";
pub const SEGMENTS_FIELD: &str = "finalSegments";

/// 阈值组：概率阈值与最小面积阈值，运行期间只读
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdBundle {
    pub prob_thresh: f64,
    pub min_area: f64,
}

fn open_npz(path: &Path) -> EvalResult<NpzReader<File>> {
    let file = File::open(path).map_err(|e| EvalError::io(path, e))?;
    NpzReader::new(file).map_err(|e| EvalError::npz(path, e))
}

/// numpy 的 savez 把每个数组存为 `<name>.npy`
fn entry_name(field: &str) -> String {
    format!("{}.npy", field)
}

/// 按字段名读取数组，先找 `<name>.npy`，再找不带后缀的条目
fn read_field<A: ReadableElement>(
    npz: &mut NpzReader<File>,
    name: &str,
) -> Result<ArrayBase<OwnedRepr<A>, IxDyn>, ReadNpzError> {
    npz.by_name::<OwnedRepr<A>, IxDyn>(&entry_name(name))
        .or_else(|_| npz.by_name::<OwnedRepr<A>, IxDyn>(name))
}

/// 读取标量字段；兼容 0 维或 1x1 数组，以及浮点或整数类型
fn read_scalar(npz: &mut NpzReader<File>, path: &Path, name: &str) -> EvalResult<f64> {
    let first = |values: Vec<f64>| {
        values
            .first()
            .copied()
            .ok_or_else(|| EvalError::npz(path, format!("field '{}' is empty", name)))
    };

    if let Ok(arr) = read_field::<f64>(npz, name) {
        return first(arr.iter().copied().collect());
    }
    if let Ok(arr) = read_field::<f32>(npz, name) {
        return first(arr.iter().map(|&v| v as f64).collect());
    }
    if let Ok(arr) = read_field::<i64>(npz, name) {
        return first(arr.iter().map(|&v| v as f64).collect());
    }
    match read_field::<i32>(npz, name) {
        Ok(arr) => first(arr.iter().map(|&v| v as f64).collect()),
        Err(e) => Err(EvalError::npz(path, format!("field '{}': {}", name, e))),
    }
}

/// 按当前数据集配置读取阈值文件
pub fn load_thresholds(path: &Path, config: &RunConfig) -> EvalResult<ThresholdBundle> {
    let network = config.general.network_type;
    let area_name = network.dataset_config().area_name;

    let mut npz = open_npz(path)?;
    let prob_thresh = read_scalar(&mut npz, path, PROB_THRESH_FIELD)?;
    let mut min_area = read_scalar(&mut npz, path, area_name)?;
    if network.area_in_microns() {
        min_area *= config.parameters.pixel_size.powi(2);
    }

    Ok(ThresholdBundle {
        prob_thresh,
        min_area,
    })
}

pub fn save_segments(path: &Path, segments: &Segments) -> EvalResult<()> {
    let file = File::create(path).map_err(|e| EvalError::io(path, e))?;
    let mut npz = NpzWriter::new(file);
    npz.add_array(entry_name(SEGMENTS_FIELD), segments)
        .map_err(|e| EvalError::npz(path, e))?;
    npz.finish().map_err(|e| EvalError::npz(path, e))?;
    Ok(())
}

// 只在校验写出的分割文件时使用
#[cfg(test)]
pub fn load_segments(path: &Path) -> EvalResult<Segments> {
    let mut npz = open_npz(path)?;
    read_field::<i64>(&mut npz, SEGMENTS_FIELD).map_err(|e| EvalError::npz(path, e))
}

pub fn save_performance(path: &Path, record: &PerformanceRecord) -> EvalResult<()> {
    let file = File::create(path).map_err(|e| EvalError::io(path, e))?;
    let mut npz = NpzWriter::new(file);
    for (name, values) in [
        ("recall", &record.recall),
        ("precision", &record.precision),
        ("F1", &record.f1),
    ] {
        npz.add_array(entry_name(name), &Array1::from(values.clone()))
            .map_err(|e| EvalError::npz(path, e))?;
    }
    npz.finish().map_err(|e| EvalError::npz(path, e))?;
    Ok(())
}

pub fn load_performance(path: &Path) -> EvalResult<PerformanceRecord> {
    let mut npz = open_npz(path)?;
    let mut read = |name: &str| -> EvalResult<Vec<f64>> {
        read_field::<f64>(&mut npz, name)
            .map(|arr| arr.iter().copied().collect())
            .map_err(|e| EvalError::npz(path, format!("field '{}': {}", name, e)))
    };
    let record = PerformanceRecord {
        recall: read("recall")?,
        precision: read("precision")?,
        f1: read("F1")?,
    };

    if record.precision.len() != record.recall.len() || record.f1.len() != record.recall.len() {
        return Err(EvalError::npz(path, "performance series differ in length"));
    }
    Ok(record)
}
