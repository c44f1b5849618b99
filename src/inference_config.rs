// src/inference_config.rs
//! 推理引擎配置文件（ini 风格）的结构化读写与改写。
//!
//! 文档按行保存原始字节，未改动的行原样写回；`key = value` 形式的行额外记录
//! 键名和值的起始位置，以便只替换值部分。
use crate::errors::{EvalError, EvalResult};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

pub const KEY_SEARCH_PATH: &str = "path_to_search";
pub const KEY_FILENAME_CONTAINS: &str = "filename_contains";
pub const KEY_FILENAME_NOT_CONTAINS: &str = "filename_not_contains";
pub const KEY_SAVE_DIR: &str = "save_seg_dir";
pub const KEY_MODEL_DIR: &str = "model_dir";

/// 文档中的一行
#[derive(Debug, Clone, PartialEq)]
pub enum IniLine {
    /// 节标题、注释、空行或无法识别的内容，原样保留
    Verbatim(String),
    Entry(IniEntry),
}

/// `key = value` 行
#[derive(Debug, Clone, PartialEq)]
pub struct IniEntry {
    pub key: String,
    prefix: String,  // 值之前的全部内容，例如 "path_to_search = "
    value: String,
    newline: String, // "\n"、"\r\n" 或文件末尾的 ""
    modified: bool,
}

impl IniEntry {
    pub fn value(&self) -> &str {
        &self.value
    }

    /// 替换值，保留键和分隔符
    pub fn set_value(&mut self, value: &str) {
        self.value = value.to_string();
        self.modified = true;
    }

    /// 在原有值之后追加内容
    pub fn append_value(&mut self, suffix: &str) {
        self.value.push_str(suffix);
        self.modified = true;
    }

    fn render(&self, out: &mut String) {
        out.push_str(&self.prefix);
        out.push_str(&self.value);
        if self.modified {
            // 改写过的行只以一个换行符结尾
            out.push('\n');
        } else {
            out.push_str(&self.newline);
        }
    }
}

/// 保持行顺序的结构化配置文档
#[derive(Debug, Clone, PartialEq, Default)]
pub struct IniDocument {
    lines: Vec<IniLine>,
}

impl IniDocument {
    pub fn parse(text: &str) -> Self {
        let lines = text.split_inclusive('\n').map(parse_line).collect();
        Self { lines }
    }

    pub fn load(path: &Path) -> EvalResult<Self> {
        let text = fs::read_to_string(path).map_err(|e| EvalError::io(path, e))?;
        Ok(Self::parse(&text))
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// 按键名精确查找唯一的条目；不存在或出现多次都视为错误
    pub fn entry_mut(&mut self, key: &str) -> EvalResult<&mut IniEntry> {
        let mut matches: Vec<&mut IniEntry> = self
            .lines
            .iter_mut()
            .filter_map(|line| match line {
                IniLine::Entry(entry) if entry.key == key => Some(entry),
                _ => None,
            })
            .collect();

        let count = matches.len();
        match (matches.pop(), count) {
            (Some(entry), 1) => Ok(entry),
            (None, _) => Err(EvalError::MarkerNotFound(key.to_string())),
            (Some(_), count) => Err(EvalError::DuplicateMarker {
                key: key.to_string(),
                count,
            }),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.lines.iter().find_map(|line| match line {
            IniLine::Entry(entry) if entry.key == key => Some(entry.value()),
            _ => None,
        })
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        for line in &self.lines {
            match line {
                IniLine::Verbatim(raw) => out.push_str(raw),
                IniLine::Entry(entry) => entry.render(&mut out),
            }
        }
        out
    }
}

fn parse_line(raw: &str) -> IniLine {
    let (body, newline) = split_newline(raw);
    let trimmed = body.trim_start();
    if trimmed.is_empty()
        || trimmed.starts_with('[')
        || trimmed.starts_with('#')
        || trimmed.starts_with(';')
    {
        return IniLine::Verbatim(raw.to_string());
    }

    let Some(eq) = body.find('=') else {
        return IniLine::Verbatim(raw.to_string());
    };
    let key = body[..eq].trim();
    if key.is_empty() {
        return IniLine::Verbatim(raw.to_string());
    }

    // 值从等号后的第一个非空白字符开始；空值时整行都是前缀
    let after = &body[eq + 1..];
    let value_start = after
        .find(|c: char| !c.is_whitespace())
        .map(|offset| eq + 1 + offset)
        .unwrap_or(body.len());

    IniLine::Entry(IniEntry {
        key: key.to_string(),
        prefix: body[..value_start].to_string(),
        value: body[value_start..].to_string(),
        newline: newline.to_string(),
        modified: false,
    })
}

fn split_newline(raw: &str) -> (&str, &str) {
    if let Some(body) = raw.strip_suffix("\r\n") {
        (body, "\r\n")
    } else if let Some(body) = raw.strip_suffix('\n') {
        (body, "\n")
    } else {
        (raw, "")
    }
}

/// 生成推理配置所需的计算值
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesisInputs {
    pub search_path: PathBuf,
    pub filename_contains: String,
    pub exclude: BTreeSet<String>,
    pub save_dir: PathBuf,
    pub model_dir: PathBuf,
}

/// 排除集合 = 目录中能发现的条目 - 配置的条目
pub fn exclusion_set(discovered: &BTreeSet<String>, names: &[String]) -> BTreeSet<String> {
    discovered
        .iter()
        .filter(|d| !names.iter().any(|n| n == *d))
        .cloned()
        .collect()
}

/// 排除列表的文本形式：每个条目后跟一个逗号
pub fn render_exclusion(exclude: &BTreeSet<String>) -> String {
    exclude.iter().map(|name| format!("{},", name)).collect()
}

/// 在模板上写入五个计算值，返回新的文档
pub fn synthesize(template: &IniDocument, inputs: &SynthesisInputs) -> EvalResult<IniDocument> {
    let mut doc = template.clone();

    doc.entry_mut(KEY_SEARCH_PATH)?
        .set_value(&inputs.search_path.to_string_lossy());
    doc.entry_mut(KEY_FILENAME_CONTAINS)?
        .set_value(&inputs.filename_contains);

    // 排除项为空时该行保持原样，但键仍然必须存在
    let exclude_entry = doc.entry_mut(KEY_FILENAME_NOT_CONTAINS)?;
    if !inputs.exclude.is_empty() {
        exclude_entry.append_value(&render_exclusion(&inputs.exclude));
    }

    doc.entry_mut(KEY_SAVE_DIR)?
        .set_value(&inputs.save_dir.to_string_lossy());
    doc.entry_mut(KEY_MODEL_DIR)?
        .set_value(&inputs.model_dir.to_string_lossy());

    Ok(doc)
}

/// 读取模板、改写并写出新的推理配置文件
pub fn write_inference_config(
    template_path: &Path,
    output_path: &Path,
    inputs: &SynthesisInputs,
) -> EvalResult<IniDocument> {
    let template = IniDocument::load(template_path)?;
    let doc = synthesize(&template, inputs)?;
    fs::write(output_path, doc.render()).map_err(|e| EvalError::io(output_path, e))?;
    Ok(doc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const TEMPLATE: &str = "[ABO]\n\
path_to_search = \n\
filename_contains = \n\
filename_not_contains = \n\
spatial_window_size = (144, 144, 120)\n\
interp_order = 3\n\
\n\
[SYSTEM]\n\
cuda_devices = \"\"\n\
model_dir = \n\
\n\
[INFERENCE]\n\
border = (0, 0, 0)\n\
save_seg_dir = \n\
output_interp_order = 0\n";

    fn inputs(exclude: &[&str]) -> SynthesisInputs {
        SynthesisInputs {
            search_path: PathBuf::from("/work/Results/ABO/data"),
            filename_contains: "_dsCropped_HomoNorm".to_string(),
            exclude: exclude.iter().map(|s| s.to_string()).collect(),
            save_dir: PathBuf::from("/work/Results/ABO/Probability map"),
            model_dir: PathBuf::from("/work/models/ABO/Trained Network Weights/All"),
        }
    }

    fn lines_of(text: &str) -> Vec<&str> {
        text.split_inclusive('\n').collect()
    }

    #[test]
    fn test_parse_render_is_identity() {
        let doc = IniDocument::parse(TEMPLATE);
        assert_eq!(doc.render(), TEMPLATE);

        // 无结尾换行、CRLF 和缩进也原样保留
        let odd = "  key =  spaced value \r\nlast = 1";
        assert_eq!(IniDocument::parse(odd).render(), odd);
    }

    #[test]
    fn test_parse_entries() {
        let doc = IniDocument::parse(TEMPLATE);
        assert_eq!(doc.get("interp_order"), Some("3"));
        assert_eq!(doc.get("spatial_window_size"), Some("(144, 144, 120)"));
        assert_eq!(doc.get("path_to_search"), Some(""));
        assert_eq!(doc.get("missing"), None);
        assert!(matches!(doc.lines[0], IniLine::Verbatim(_)));
    }

    #[test]
    fn test_synthesize_preserves_structure() {
        let template = IniDocument::parse(TEMPLATE);
        let doc = synthesize(&template, &inputs(&[])).unwrap();
        let rendered = doc.render();

        let before = lines_of(TEMPLATE);
        let after = lines_of(&rendered);
        assert_eq!(before.len(), after.len());
        assert_eq!(doc.line_count(), template.line_count());

        let marked = [
            KEY_SEARCH_PATH,
            KEY_FILENAME_CONTAINS,
            KEY_SAVE_DIR,
            KEY_MODEL_DIR,
        ];
        for (old, new) in before.iter().zip(after.iter()) {
            let key = old.split('=').next().unwrap().trim();
            if marked.contains(&key) {
                assert!(new.ends_with('\n'));
                assert!(!new.ends_with("\n\n"));
            } else {
                // 未标记的行（包括空排除项）逐字节一致
                assert_eq!(old, new);
            }
        }

        assert!(after.contains(&"path_to_search = /work/Results/ABO/data\n"));
        assert!(after.contains(&"filename_contains = _dsCropped_HomoNorm\n"));
        assert!(after.contains(&"save_seg_dir = /work/Results/ABO/Probability map\n"));
        assert!(after.contains(&"model_dir = /work/models/ABO/Trained Network Weights/All\n"));
        assert!(after.contains(&"filename_not_contains = \n"));
    }

    #[test]
    fn test_exclusion_is_appended_with_trailing_comma() {
        let discovered: BTreeSet<String> =
            ["A", "B", "C"].iter().map(|s| s.to_string()).collect();
        let names = vec!["A".to_string(), "B".to_string()];
        let exclude = exclusion_set(&discovered, &names);
        assert_eq!(render_exclusion(&exclude), "C,");

        let template = IniDocument::parse(TEMPLATE);
        let doc = synthesize(
            &template,
            &SynthesisInputs {
                exclude,
                ..inputs(&[])
            },
        )
        .unwrap();
        assert_eq!(doc.get(KEY_FILENAME_NOT_CONTAINS), Some("C,"));
        assert!(doc.render().contains("filename_not_contains = C,\n"));
    }

    #[test]
    fn test_exclusion_appends_to_existing_value() {
        let template = IniDocument::parse("filename_not_contains = old\npath_to_search = \nfilename_contains = \nsave_seg_dir = \nmodel_dir = \n");
        let doc = synthesize(&template, &inputs(&["X", "Y"])).unwrap();
        assert_eq!(doc.get(KEY_FILENAME_NOT_CONTAINS), Some("oldX,Y,"));
    }

    #[test]
    fn test_set_value_replaces_existing_value() {
        let template = IniDocument::parse("path_to_search = ./old/dir\nfilename_contains = x\nfilename_not_contains = \nsave_seg_dir = a\nmodel_dir = b");
        let doc = synthesize(&template, &inputs(&[])).unwrap();
        let rendered = doc.render();
        assert!(rendered.starts_with("path_to_search = /work/Results/ABO/data\n"));
        // 文件最后一行改写后也以换行结尾
        assert!(rendered.ends_with("model_dir = /work/models/ABO/Trained Network Weights/All\n"));
    }

    #[test]
    fn test_missing_key_is_an_error() {
        let template = IniDocument::parse(&TEMPLATE.replace("model_dir = \n", ""));
        let err = synthesize(&template, &inputs(&[])).unwrap_err();
        assert!(matches!(err, EvalError::MarkerNotFound(ref k) if k == KEY_MODEL_DIR));
    }

    #[test]
    fn test_duplicate_key_is_an_error() {
        let template = IniDocument::parse(&format!("{}save_seg_dir = other\n", TEMPLATE));
        let err = synthesize(&template, &inputs(&[])).unwrap_err();
        assert!(matches!(
            err,
            EvalError::DuplicateMarker { ref key, count: 2 } if key == KEY_SAVE_DIR
        ));
    }

    #[test]
    fn test_keys_are_matched_exactly() {
        // "filename_contains" 不能匹配到 "filename_not_contains"
        let template = IniDocument::parse("path_to_search = \nfilename_not_contains = \nsave_seg_dir = \nmodel_dir = \n");
        let err = synthesize(&template, &inputs(&[])).unwrap_err();
        assert!(matches!(err, EvalError::MarkerNotFound(ref k) if k == KEY_FILENAME_CONTAINS));
    }

    #[test]
    fn test_write_inference_config() {
        let temp_dir = tempdir().unwrap();
        let template_path = temp_dir.path().join("demo_config_empty.ini");
        let output_path = temp_dir.path().join("config_inf.ini");
        fs::write(&template_path, TEMPLATE).unwrap();

        write_inference_config(&template_path, &output_path, &inputs(&["Z"])).unwrap();
        let written = fs::read_to_string(&output_path).unwrap();
        assert!(written.contains("filename_not_contains = Z,\n"));
        assert_eq!(lines_of(&written).len(), lines_of(TEMPLATE).len());
        // 模板本身不被修改
        assert_eq!(fs::read_to_string(&template_path).unwrap(), TEMPLATE);
    }

    #[test]
    fn test_missing_template_is_io_error() {
        let temp_dir = tempdir().unwrap();
        let result = write_inference_config(
            &temp_dir.path().join("none.ini"),
            &temp_dir.path().join("out.ini"),
            &inputs(&[]),
        );
        assert!(matches!(result, Err(EvalError::Io { .. })));
    }
}
