//! 分享转存客户端
//!
//! 参考 baidupcs-go 的转存流程：
//! 访问分享页 → (验证提取码 → 再次访问) → 解析内嵌数据 → (GET 查询) → POST 转存

use anyhow::{anyhow, Result};
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};
use url::Url;

use super::transport::Transport;
use super::types::{
    init_surl, QueryMode, RequestOutcome, ShareReference, TransferOptions, TransferReceipt,
};
use crate::config::{BaiduConfig, RefererPolicy};

pub struct ShareClient {
    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) base: Url,
    pub(crate) app_id: String,
    pub(crate) referer_policy: RefererPolicy,
    pub(crate) ondup: Option<String>,
}

impl ShareClient {
    pub fn new(transport: Arc<dyn Transport>, config: &BaiduConfig) -> Result<Self> {
        let base = Url::parse(&config.base_url)
            .map_err(|e| anyhow!("base_url 无效: {} ({})", config.base_url, e))?;
        if base.cannot_be_a_base() {
            return Err(anyhow!("base_url 无效: {}", config.base_url));
        }

        Ok(Self {
            transport,
            base,
            app_id: config.app_id.clone(),
            referer_policy: config.referer_policy,
            ondup: config.ondup.clone(),
        })
    }

    /// 生成 `/share/{sub_path}` 接口地址
    ///
    /// 固定带上 app_id / channel / clienttype / web，调用方参数同名时覆盖。
    pub fn share_query_url(&self, sub_path: &str, params: &BTreeMap<String, String>) -> Url {
        let mut query: BTreeMap<&str, &str> = BTreeMap::new();
        query.insert("app_id", &self.app_id);
        query.insert("channel", "chunlei");
        query.insert("clienttype", "0");
        query.insert("web", "1");
        for (key, value) in params {
            query.insert(key, value);
        }

        let mut url = self.base.clone();
        url.set_path(&format!("/share/{}", sub_path));
        url.query_pairs_mut().clear().extend_pairs(query);
        url
    }

    /// 站内页面地址，如 `/s/1xxxx`、`/disk/home`
    pub(crate) fn page_url(&self, path: &str) -> Url {
        let mut url = self.base.clone();
        url.set_path(path);
        url.set_query(None);
        url
    }

    pub(crate) fn share_init_referer(&self, surl: &str) -> String {
        let mut url = self.page_url("/share/init");
        url.query_pairs_mut().append_pair("surl", surl);
        url.to_string()
    }

    pub(crate) fn share_page_referer(&self, share_code: &str, first: bool) -> String {
        let disk_home = || self.page_url("/disk/home").to_string();
        match self.referer_policy {
            RefererPolicy::Navigation if first => disk_home(),
            RefererPolicy::DiskHome => disk_home(),
            _ => self.share_init_referer(init_surl(share_code)),
        }
    }

    /// 完整转存流程，任一步失败即终止
    pub async fn transfer(
        &self,
        share: &ShareReference,
        options: &TransferOptions,
    ) -> RequestOutcome<TransferReceipt> {
        info!("📥 开始处理分享: {}", share.share_code);

        let mut metajson = self.access_share_page(&share.share_code, true).await?;

        if let Some(pwd) = share.access_code.as_deref() {
            info!("🔐 验证提取码...");
            let mut params = BTreeMap::new();
            params.insert("surl".to_string(), share.init_surl().to_string());
            params.insert("t".to_string(), Utc::now().timestamp_millis().to_string());
            if let Some(bdstoken) = page_bdstoken(&metajson) {
                params.insert("bdstoken".to_string(), bdstoken);
            }
            let verify_url = self.share_query_url("verify", &params);

            let data = [("pwd", pwd), ("vcode", ""), ("vcode_str", "")];
            self.post_share_query(verify_url.as_str(), share.init_surl(), &data)
                .await?;
            info!("✅ 提取码验证成功");

            metajson = self.access_share_page(&share.share_code, false).await?;
        }

        let meta = self.extract_share_info(&metajson)?;
        info!("📋 分享内容: {} ({} 个文件)", meta.filename, meta.fs_ids.len());

        let referer = self.page_url(&format!("/s/{}", share.share_code)).to_string();
        let fs_id_list = meta.fs_id_list();

        if options.query_first {
            let queried = self
                .generate_request_query(
                    QueryMode::Get,
                    &referer,
                    meta.transfer_url.as_str(),
                    &fs_id_list,
                    &options.save_path,
                )
                .await?;
            debug!("🔍 查询结果: {}", queried);
        }

        info!("🚀 转存到: {}", options.save_path);
        let filename = self
            .generate_request_query(
                QueryMode::Post,
                &referer,
                meta.transfer_url.as_str(),
                &fs_id_list,
                &options.save_path,
            )
            .await
            .inspect_err(|e| warn!("❌ 转存失败: {}", e))?;

        info!("✅ 转存成功: {}", filename);
        Ok(TransferReceipt {
            share_code: share.share_code.clone(),
            filename,
            file_count: meta.fs_ids.len(),
            save_path: options.save_path.clone(),
        })
    }
}

/// 首次访问（未验证提取码）时页面里已带有 bdstoken
fn page_bdstoken(metajson: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(metajson).ok()?;
    match value.get("bdstoken")? {
        serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}
