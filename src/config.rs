//! 配置文件加载

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub baidu: BaiduConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BaiduConfig {
    pub cookie_bduss: String,
    pub cookie_stoken: String,
    #[serde(default = "default_save_path")]
    pub save_path: String,
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,
    /// 网盘站点地址，测试时可指向本地 mock
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_app_id")]
    pub app_id: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default)]
    pub referer_policy: RefererPolicy,
    /// 转存重名处理: newcopy / overwrite / fail，不填则由服务端报重名错误
    #[serde(default)]
    pub ondup: Option<String>,
}

/// 访问分享页时 Referer 的选取策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RefererPolicy {
    /// 首次访问用网盘首页，之后用 share/init 页，模拟浏览器跳转
    #[default]
    Navigation,
    DiskHome,
    ShareInit,
}

impl Default for BaiduConfig {
    fn default() -> Self {
        Self {
            cookie_bduss: String::new(),
            cookie_stoken: String::new(),
            save_path: default_save_path(),
            http_timeout_secs: default_http_timeout_secs(),
            base_url: default_base_url(),
            app_id: default_app_id(),
            user_agent: default_user_agent(),
            referer_policy: RefererPolicy::default(),
            ondup: None,
        }
    }
}

fn default_save_path() -> String {
    "/我的资源".to_string()
}

fn default_http_timeout_secs() -> u64 {
    30
}

fn default_base_url() -> String {
    "https://pan.baidu.com".to_string()
}

fn default_app_id() -> String {
    "250528".to_string()
}

fn default_user_agent() -> String {
    Config::browser_ua().to_string()
}

impl Config {
    /// 读取 TOML 配置；文件不存在时改从环境变量读取
    pub fn load(path: &str) -> Result<Self> {
        if !Path::new(path).exists() {
            return Self::from_env();
        }

        let content =
            fs::read_to_string(path).with_context(|| format!("读取配置文件失败: {}", path))?;
        let config: Config =
            toml::from_str(&content).with_context(|| format!("解析配置文件失败: {}", path))?;
        Ok(config)
    }

    /// 从环境变量构建配置: BAIDU_BDUSS / BAIDU_STOKEN / BAIDU_SAVE_PATH
    pub fn from_env() -> Result<Self> {
        let cookie_bduss =
            std::env::var("BAIDU_BDUSS").map_err(|_| anyhow!("未找到配置文件，且未设置 BAIDU_BDUSS"))?;
        let cookie_stoken =
            std::env::var("BAIDU_STOKEN").map_err(|_| anyhow!("未找到配置文件，且未设置 BAIDU_STOKEN"))?;

        let mut baidu = BaiduConfig {
            cookie_bduss,
            cookie_stoken,
            ..BaiduConfig::default()
        };
        if let Ok(save_path) = std::env::var("BAIDU_SAVE_PATH") {
            baidu.save_path = save_path;
        }

        Ok(Self { baidu })
    }

    pub fn browser_ua() -> &'static str {
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
    }
}
