//! 链接与分享页解析

use regex::Regex;
use std::sync::OnceLock;

/// 分享页里标记“分享内容不存在”的 class
const PLATFORM_NON_FOUND_MARKER: &str = "platform-non-found";
/// 通用 404 模板的标记
const ERROR_404_MARKER: &str = "error-404";

/// 从分享链接中提取分享码（`/s/` 后面那段）
///
/// 支持：
/// - https://pan.baidu.com/s/1xxxx
/// - https://pan.baidu.com/share/init?surl=xxxx （补回开头的 `1`）
/// - 裸分享码 1xxxx
pub fn extract_share_code(share_url: &str) -> Option<String> {
    let url = share_url.trim();

    if let Some(pos) = url.find("/s/") {
        return take_code(&url[pos + 3..]);
    }

    if let Some(pos) = url.find("surl=") {
        return take_code(&url[pos + 5..]).map(|surl| format!("1{}", surl));
    }

    if !url.is_empty() && url.chars().all(is_code_char) {
        return Some(url.to_string());
    }

    None
}

fn is_code_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

fn take_code(rest: &str) -> Option<String> {
    let end = rest.find(|c: char| !is_code_char(c)).unwrap_or(rest.len());
    if end > 0 {
        Some(rest[..end].to_string())
    } else {
        None
    }
}

/// 分享页的粗分类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SharePage {
    /// 分享已取消或过期
    NonFound,
    /// 通用 404 页
    NotFound,
    /// 正常页面，需要继续提取内嵌数据
    Normal,
}

/// 按页面里的固定标记判断分享页状态，“分享不存在”优先于 404
pub fn classify_share_page(html: &str) -> SharePage {
    if html.contains(PLATFORM_NON_FOUND_MARKER) {
        SharePage::NonFound
    } else if html.contains(ERROR_404_MARKER) {
        SharePage::NotFound
    } else {
        SharePage::Normal
    }
}

/// 提取分享页内嵌的初始化数据
///
/// 假设百度在 script 标签里以 `yunData.setData({"loginstate":...});` 的形式
/// 注入页面状态，且对象以 `loginstate` 字段开头。页面改版时这里会最先失败。
pub fn extract_metajson(html: &str) -> Option<&str> {
    static SET_DATA_RE: OnceLock<Regex> = OnceLock::new();
    let re = SET_DATA_RE.get_or_init(|| {
        Regex::new(r#"yunData\.setData\((\{"loginstate.+?\})\);"#).expect("invalid setData regex")
    });
    re.captures(html)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}
