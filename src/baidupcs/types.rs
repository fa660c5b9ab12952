//! 数据类型

use serde::{Deserialize, Deserializer};
use url::Url;

use super::error::ShareError;
use super::parser::extract_share_code;

/// 每一步的结果：成功载荷或带提示信息的失败
pub type RequestOutcome<T> = std::result::Result<T, ShareError>;

/// 分享链接引用：分享码 + 可选提取码
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareReference {
    /// `/s/` 后面的分享码，通常以 `1` 开头
    pub share_code: String,
    pub access_code: Option<String>,
}

impl ShareReference {
    pub fn new(share_code: impl Into<String>, access_code: Option<String>) -> Self {
        Self {
            share_code: share_code.into(),
            access_code: access_code.filter(|c| !c.trim().is_empty()),
        }
    }

    /// 从分享链接（或裸分享码）解析
    ///
    /// 未显式给出提取码时，尝试读取链接里的 `pwd=` 参数。
    pub fn parse(link: &str, access_code: Option<String>) -> Option<Self> {
        let share_code = extract_share_code(link)?;
        let access_code = access_code
            .filter(|c| !c.trim().is_empty())
            .or_else(|| pwd_from_link(link));
        Some(Self::new(share_code, access_code))
    }

    /// share/init 与 verify 接口使用的 surl（去掉开头的 `1`）
    pub fn init_surl(&self) -> &str {
        init_surl(&self.share_code)
    }
}

pub(crate) fn init_surl(share_code: &str) -> &str {
    share_code.strip_prefix('1').unwrap_or(share_code)
}

fn pwd_from_link(link: &str) -> Option<String> {
    let query = link.split_once('?')?.1;
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(k, _)| *k == "pwd")
        .map(|(_, v)| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// 分享页解析出的元数据
#[derive(Debug, Clone)]
pub struct ShareMetadata {
    /// 展示用文件名，多文件时带后缀
    pub filename: String,
    pub fs_ids: Vec<u64>,
    pub shareid: String,
    /// 分享者 uk
    pub uk: String,
    pub bdstoken: String,
    pub transfer_url: Url,
}

impl ShareMetadata {
    /// 转存表单里的 fsidlist，形如 `[1,2,3]`
    pub fn fs_id_list(&self) -> String {
        let joined = self
            .fs_ids
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(",");
        format!("[{}]", joined)
    }
}

/// 查询 / 转存请求方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryMode {
    Get,
    Post,
}

impl QueryMode {
    pub fn method(self) -> reqwest::Method {
        match self {
            QueryMode::Get => reqwest::Method::GET,
            QueryMode::Post => reqwest::Method::POST,
        }
    }
}

/// 百度接口返回的 errno 分类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferErrorCode {
    Ok,
    /// 转存部分失败，具体原因在 info[].errno
    PartialFailure,
    AccessCode,
    AlreadyExists,
    QuotaExceeded,
    Unknown(i64),
}

impl From<i64> for TransferErrorCode {
    fn from(errno: i64) -> Self {
        match errno {
            0 => TransferErrorCode::Ok,
            12 => TransferErrorCode::PartialFailure,
            -9 | -12 => TransferErrorCode::AccessCode,
            -30 => TransferErrorCode::AlreadyExists,
            -33 => TransferErrorCode::QuotaExceeded,
            other => TransferErrorCode::Unknown(other),
        }
    }
}

/// 转存选项
#[derive(Debug, Clone)]
pub struct TransferOptions {
    pub save_path: String,
    /// 转存前先用 GET 查询一次分享项
    pub query_first: bool,
}

impl TransferOptions {
    pub fn new(save_path: impl Into<String>) -> Self {
        Self {
            save_path: save_path.into(),
            query_first: false,
        }
    }
}

/// 转存成功的结果
#[derive(Debug, Clone)]
pub struct TransferReceipt {
    pub share_code: String,
    pub filename: String,
    pub file_count: usize,
    pub save_path: String,
}

/// 字段为 `null` 时按缺省值处理
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// 支持字符串或数字类型的 fsid
pub(crate) fn string_or_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrU64 {
        Str(String),
        Num(u64),
    }

    match StringOrU64::deserialize(deserializer)? {
        StringOrU64::Str(s) => s.parse().map_err(Error::custom),
        StringOrU64::Num(n) => Ok(n),
    }
}

/// 从已解析的 JSON 值里读 errno 之类的整数，兼容字符串
pub(crate) fn value_to_i64(value: &serde_json::Value) -> Option<i64> {
    match value {
        serde_json::Value::Number(n) => n.as_i64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// shareid / uk / bdstoken 统一按字符串保存
pub(crate) fn scalar_to_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => s,
        Some(serde_json::Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_share_link_with_pwd() {
        let share = ShareReference::parse("https://pan.baidu.com/s/1abcDEF?pwd=x7k2", None).unwrap();
        assert_eq!(share.share_code, "1abcDEF");
        assert_eq!(share.access_code.as_deref(), Some("x7k2"));
        assert_eq!(share.init_surl(), "abcDEF");
    }

    #[test]
    fn test_explicit_access_code_wins() {
        let share =
            ShareReference::parse("https://pan.baidu.com/s/1abc?pwd=aaaa", Some("bbbb".into()))
                .unwrap();
        assert_eq!(share.access_code.as_deref(), Some("bbbb"));
    }

    #[test]
    fn test_blank_access_code_is_none() {
        let share = ShareReference::new("1abc", Some("  ".to_string()));
        assert!(share.access_code.is_none());
    }

    #[test]
    fn test_fs_id_list_has_no_trailing_comma() {
        let meta = ShareMetadata {
            filename: "a.txt".into(),
            fs_ids: vec![11, 22],
            shareid: "1".into(),
            uk: "2".into(),
            bdstoken: "t".into(),
            transfer_url: Url::parse("https://pan.baidu.com/share/transfer").unwrap(),
        };
        assert_eq!(meta.fs_id_list(), "[11,22]");
    }

    #[test]
    fn test_error_code_classification() {
        assert_eq!(TransferErrorCode::from(0), TransferErrorCode::Ok);
        assert_eq!(TransferErrorCode::from(12), TransferErrorCode::PartialFailure);
        assert_eq!(TransferErrorCode::from(-30), TransferErrorCode::AlreadyExists);
        assert_eq!(TransferErrorCode::from(-33), TransferErrorCode::QuotaExceeded);
        assert_eq!(TransferErrorCode::from(-9), TransferErrorCode::AccessCode);
        assert_eq!(TransferErrorCode::from(7), TransferErrorCode::Unknown(7));
    }

    #[test]
    fn test_value_to_i64_accepts_numeric_strings_only() {
        assert_eq!(value_to_i64(&serde_json::json!(-9)), Some(-9));
        assert_eq!(value_to_i64(&serde_json::json!(" -30 ")), Some(-30));
        assert_eq!(value_to_i64(&serde_json::json!(null)), None);
        assert_eq!(value_to_i64(&serde_json::json!("ok")), None);
    }
}
