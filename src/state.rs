//! 应用状态：Cookie + HTTP client

use anyhow::{anyhow, Context, Result};
use reqwest::{cookie::Jar, Client, Url};
use std::sync::Arc;

use crate::baidupcs::{HttpTransport, ShareClient};
use crate::config::{BaiduConfig, Config};

pub struct AppState {
    pub config: Config,
    pub client: Client,
}

fn validate_cookies(baidu: &BaiduConfig) -> Result<()> {
    if baidu.cookie_bduss.len() < 50 {
        return Err(anyhow!(
            "BDUSS 未配置或长度不足，请在 config.toml 中设置完整的 BDUSS"
        ));
    }
    if baidu.cookie_stoken.len() < 30 {
        return Err(anyhow!(
            "STOKEN 未配置或长度不足，请在 config.toml 中设置完整的 STOKEN"
        ));
    }
    Ok(())
}

/// 按 `base_url` 写入登录 Cookie
///
/// 百度域名下写成 `.baidu.com` 域 Cookie，passport 等子域共用；
/// 其他地址（本地代理、测试服务）只对该主机生效。
pub(crate) fn cookie_jar(baidu: &BaiduConfig) -> Result<Arc<Jar>> {
    let base = Url::parse(&baidu.base_url)
        .with_context(|| format!("base_url 无效: {}", baidu.base_url))?;
    let host = base
        .host_str()
        .ok_or_else(|| anyhow!("base_url 缺少主机名: {}", baidu.base_url))?;

    let domain = if host == "baidu.com" || host.ends_with(".baidu.com") {
        "; Domain=.baidu.com"
    } else {
        ""
    };

    let jar = Arc::new(Jar::default());
    for (name, value) in [
        ("BDUSS", &baidu.cookie_bduss),
        ("STOKEN", &baidu.cookie_stoken),
    ] {
        jar.add_cookie_str(&format!("{}={}{}; Path=/", name, value, domain), &base);
    }
    Ok(jar)
}

impl AppState {
    pub fn new(config: Config) -> Result<Self> {
        validate_cookies(&config.baidu)?;
        let jar = cookie_jar(&config.baidu)?;

        // verify 成功后百度会下发 BDCLND，cookie_provider 负责带到后续请求
        let client = Client::builder()
            .cookie_provider(jar)
            .timeout(std::time::Duration::from_secs(
                config.baidu.http_timeout_secs,
            ))
            .build()?;

        Ok(Self { config, client })
    }

    /// 基于当前 client 构建分享转存客户端
    pub fn share_client(&self) -> Result<ShareClient> {
        let transport = HttpTransport::new(self.client.clone(), &self.config.baidu.user_agent);
        ShareClient::new(Arc::new(transport), &self.config.baidu)
    }
}
