//! 百度网盘分享链接转存
//!
//! 访问分享页 → 解析页面内嵌数据 → (验证提取码) → 提交转存请求。

pub mod baidupcs;
pub mod config;
pub mod state;

pub use baidupcs::{ShareClient, ShareError, ShareReference, TransferOptions, TransferReceipt};
pub use config::Config;
pub use state::AppState;

/// 库版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
