//! 转存流程的错误类型

use thiserror::Error;

/// 分享转存各步骤的失败原因，Display 即面向用户的提示
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShareError {
    #[error("访问分享页失败")]
    PageFetch,

    #[error("页面不存在")]
    PageNotFound,

    #[error("分享链接已失效")]
    ShareExpired,

    #[error("分享页面解析失败")]
    PageParse,

    #[error("获取分享文件详情失败")]
    ShareDetailMissing,

    #[error("提取码错误")]
    InvalidAccessCode,

    #[error("提交分享项查询请求时发生错误")]
    QueryRequest,

    #[error("网络错误")]
    Network,

    #[error("未知错误")]
    UnknownBody,

    #[error("返回json解析错误")]
    ResponseJson,

    #[error("转存文件数{requested}超过当前用户上限, 当前用户单次最大转存数{limit}")]
    QuotaExceeded { requested: i64, limit: i64 },

    #[error("当前目录下已有{filename}同名文件/文件夹")]
    NameCollision { filename: String },

    #[error("未知错误, 错误代码{code}")]
    Unknown { code: i64 },
}

/// 传输层错误：请求未发出 / 响应体读取失败
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("请求发送失败: {0}")]
    Send(String),

    #[error("读取响应失败: {0}")]
    Body(String),
}
