use serde::{Deserialize, Deserializer};

/// 可选的相对目录：缺省、空串或全空白都视为未配置，其余去掉首尾空白
pub fn deserialize_optional_dir<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw
        .map(|dir| dir.trim().to_string())
        .filter(|dir| !dir.is_empty()))
}
