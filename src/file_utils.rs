use crate::errors::{EvalError, EvalResult};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use walkdir::{DirEntry, WalkDir};

/// 遍历预处理数据目录，收集文件名中带有 `marker` 的数据条目名称
///
/// 条目名称为文件名中 `marker` 之前的部分，结果去重并排序。
pub fn find_item_names(data_dir: &Path, marker: &str) -> EvalResult<BTreeSet<String>> {
    // 检查目录是否存在
    if !data_dir.is_dir() {
        return Err(EvalError::io(
            data_dir,
            std::io::Error::new(std::io::ErrorKind::NotFound, "not a directory"),
        ));
    }

    let mut names = BTreeSet::new();
    for entry in WalkDir::new(data_dir).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(data_dir).to_path_buf();
            EvalError::io(path, e.into())
        })?;
        if let Some(name) = extract_item_name(&entry, marker) {
            names.insert(name);
        }
    }
    Ok(names)
}

/// 从目录项中提取 `marker` 之前的条目名称
fn extract_item_name(entry: &DirEntry, marker: &str) -> Option<String> {
    let file_name = entry.file_name().to_string_lossy();
    file_name
        .find(marker)
        .map(|pos| file_name[..pos].to_string())
}

/// 目录不存在时创建
pub fn ensure_dir(path: &Path) -> EvalResult<()> {
    if !path.exists() {
        fs::create_dir_all(path).map_err(|e| EvalError::io(path, e))?;
    }
    Ok(())
}
