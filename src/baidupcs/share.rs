//! 分享页访问、内嵌数据解析与提取码验证
//!
//! 参考 baidupcs-go 实现

use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

use super::client::ShareClient;
use super::error::ShareError;
use super::parser::{classify_share_page, extract_metajson, SharePage};
use super::transport::PanRequest;
use super::types::{
    null_as_default, scalar_to_string, string_or_u64, value_to_i64, RequestOutcome,
    ShareMetadata, TransferErrorCode,
};

/// 分享页 `yunData.setData(...)` 里与转存相关的字段
#[derive(Debug, Deserialize)]
struct ShareMetaJson {
    #[serde(default, deserialize_with = "null_as_default")]
    file_list: FileList,
    #[serde(default, deserialize_with = "scalar_to_string")]
    shareid: String,
    #[serde(default, deserialize_with = "scalar_to_string")]
    uk: String,
    #[serde(default, deserialize_with = "scalar_to_string")]
    bdstoken: String,
}

#[derive(Debug, Default, Deserialize)]
struct FileList {
    #[serde(default, deserialize_with = "null_as_default")]
    list: Vec<FileItem>,
}

#[derive(Debug, Deserialize)]
struct FileItem {
    // 百度接口字段名可能是 fs_id 或 fsid，且值可能是字符串或数字
    #[serde(rename = "fs_id", alias = "fsid", deserialize_with = "string_or_u64")]
    fs_id: u64,
    #[serde(default, deserialize_with = "scalar_to_string")]
    server_filename: String,
}

impl ShareClient {
    /// 访问分享页并取出内嵌的 JSON 数据
    ///
    /// `first` 表示本次会话中第一次访问该分享，决定 Referer。
    pub async fn access_share_page(&self, share_code: &str, first: bool) -> RequestOutcome<String> {
        let url = self.page_url(&format!("/s/{}", share_code));
        let referer = self.share_page_referer(share_code, first);

        info!("🌐 访问分享页面: {}", url);
        debug!("  └─ Referer: {}", referer);

        let html = self
            .transport
            .send(PanRequest::get(url.as_str()).header("Referer", referer))
            .await
            .map_err(|e| {
                warn!("⚠️ 访问分享页失败: {}", e);
                ShareError::PageFetch
            })?;
        debug!("📄 页面长度: {} 字节", html.len());

        match classify_share_page(&html) {
            SharePage::NonFound => return Err(ShareError::ShareExpired),
            SharePage::NotFound => return Err(ShareError::PageNotFound),
            SharePage::Normal => {}
        }

        extract_metajson(&html)
            .map(str::to_string)
            .ok_or(ShareError::PageParse)
    }

    /// 把分享页内嵌数据解析成转存所需的元数据
    pub fn extract_share_info(&self, metajson: &str) -> RequestOutcome<ShareMetadata> {
        // 百度无论成功与否都会注入这段数据，只有文件列表里才会出现 server_filename
        if !metajson.contains("server_filename") {
            return Err(ShareError::ShareDetailMissing);
        }

        let doc: Value = serde_json::from_str(metajson).map_err(|e| {
            warn!("⚠️ 分享页数据解析失败: {}", e);
            ShareError::ShareDetailMissing
        })?;

        // 先看 errno，提取码错误时文件列表不可信，不再往下解析
        if let Some(errno) = doc.pointer("/file_list/errno") {
            if value_to_i64(errno) != Some(0) {
                debug!("file_list.errno={}", errno);
                return Err(ShareError::InvalidAccessCode);
            }
        }

        let meta: ShareMetaJson = serde_json::from_value(doc).map_err(|e| {
            warn!("⚠️ 分享页数据解析失败: {}", e);
            ShareError::ShareDetailMissing
        })?;

        let list = meta.file_list.list;
        let first = list.first().ok_or(ShareError::ShareDetailMissing)?;

        let mut filename = first.server_filename.clone();
        if list.len() > 1 {
            filename = format!("{} 及其他 {} 个文件", filename, list.len() - 1);
        }
        let fs_ids: Vec<u64> = list.iter().map(|f| f.fs_id).collect();

        let mut params = BTreeMap::new();
        params.insert("shareid".to_string(), meta.shareid.clone());
        params.insert("from".to_string(), meta.uk.clone());
        params.insert("bdstoken".to_string(), meta.bdstoken.clone());
        params.insert("filename".to_string(), filename.clone());
        if let Some(ondup) = &self.ondup {
            params.insert("ondup".to_string(), ondup.clone());
        }
        let transfer_url = self.share_query_url("transfer", &params);

        debug!(
            "✅ 提取到: shareid={}, uk={}, fs_ids={:?}",
            meta.shareid, meta.uk, fs_ids
        );

        Ok(ShareMetadata {
            filename,
            fs_ids,
            shareid: meta.shareid,
            uk: meta.uk,
            bdstoken: meta.bdstoken,
            transfer_url,
        })
    }

    /// 提交提取码验证
    ///
    /// `surl` 为去掉开头 `1` 的分享码，用于构造 share/init 的 Referer。
    pub async fn post_share_query(
        &self,
        url: &str,
        surl: &str,
        data: &[(&str, &str)],
    ) -> RequestOutcome<()> {
        let mut request = PanRequest::post(url)
            .header("Referer", self.share_init_referer(surl))
            .header("Origin", self.page_url("/").as_str().trim_end_matches('/'))
            .header("X-Requested-With", "XMLHttpRequest");
        for (key, value) in data {
            request = request.form_field(*key, *value);
        }

        let text = self.transport.send(request).await.map_err(|e| {
            warn!("⚠️ 提交验证请求失败: {}", e);
            ShareError::QueryRequest
        })?;
        debug!("🔑 verify 响应: {}", text);

        let doc: Value = serde_json::from_str(&text).map_err(|e| {
            warn!("⚠️ 解析 verify 响应失败: {}", e);
            ShareError::InvalidAccessCode
        })?;

        // errno 缺失或不是数字同样视为验证失败
        let errno = doc.get("errno").and_then(value_to_i64);
        if errno != Some(0) {
            let err_msg = doc
                .get("err_msg")
                .and_then(Value::as_str)
                .unwrap_or_default();
            let hint = match errno.map(TransferErrorCode::from) {
                Some(TransferErrorCode::AccessCode) => {
                    "提取码错误，或验证请求被百度拒绝（参数/请求头不符合预期、风控）"
                }
                Some(TransferErrorCode::Unknown(-62)) => "验证次数过多，需要输入验证码",
                _ => "验证失败",
            };
            warn!("❌ {} (errno={:?}, err_msg={})", hint, errno, err_msg);
            return Err(ShareError::InvalidAccessCode);
        }

        Ok(())
    }
}
