//! 百度网盘转存请求
//!
//! 参考 baidupcs-go 实现

use serde_json::Value;
use tracing::{debug, error, info, warn};

use super::client::ShareClient;
use super::error::{ShareError, TransportError};
use super::transport::PanRequest;
use super::types::{value_to_i64, QueryMode, RequestOutcome, TransferErrorCode};

/// 按 JSON Pointer 读整数，缺失或不是数字时为 0
fn int_at(doc: &Value, pointer: &str) -> i64 {
    doc.pointer(pointer).and_then(value_to_i64).unwrap_or_default()
}

fn str_at<'a>(doc: &'a Value, pointer: &str) -> &'a str {
    doc.pointer(pointer).and_then(Value::as_str).unwrap_or_default()
}

/// 远端路径的最后一段
fn base_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

impl ShareClient {
    /// 查询分享项（GET）或执行转存（POST）
    ///
    /// POST 表单提交 `fsidlist` 与 `path`，成功时返回转存后的文件名。
    pub async fn generate_request_query(
        &self,
        mode: QueryMode,
        referer: &str,
        url: &str,
        fs_id_list: &str,
        path: &str,
    ) -> RequestOutcome<String> {
        let mut request = PanRequest::get(url).header("Referer", referer);
        request.method = mode.method();
        if mode == QueryMode::Post {
            request = request
                .header("Origin", self.page_url("/").as_str().trim_end_matches('/'))
                .header("X-Requested-With", "XMLHttpRequest")
                .form_field("fsidlist", fs_id_list)
                .form_field("path", path);
        }

        debug!("📋 {:?} {}", mode, url);
        debug!("  └─ fsidlist: {}", fs_id_list);
        debug!("  └─ path: {}", path);

        let text = match self.transport.send(request).await {
            Ok(text) => text,
            Err(TransportError::Send(e)) => {
                warn!("⚠️ 请求发送失败: {}", e);
                return Err(ShareError::Network);
            }
            Err(TransportError::Body(e)) => {
                warn!("⚠️ 读取响应失败: {}", e);
                return Err(ShareError::UnknownBody);
            }
        };
        debug!("📨 响应: {}", text);

        // 只有 body 不是合法 JSON 才算解析错误，其余字段按路径宽松读取
        let doc: Value = serde_json::from_str(&text).map_err(|e| {
            warn!("⚠️ 解析响应失败: {}, body: {}", e, text);
            ShareError::ResponseJson
        })?;

        let errno = int_at(&doc, "/errno");
        let info_count = doc
            .get("info")
            .and_then(Value::as_array)
            .map_or(0, Vec::len);
        let first_path = str_at(&doc, "/info/0/path");

        if errno != 0 {
            error!("❌ errno={}, show_msg={}", errno, str_at(&doc, "/show_msg"));

            if mode == QueryMode::Post
                && TransferErrorCode::from(errno) == TransferErrorCode::PartialFailure
            {
                let nested = int_at(&doc, "/info/0/errno");
                return Err(match TransferErrorCode::from(nested) {
                    TransferErrorCode::QuotaExceeded => ShareError::QuotaExceeded {
                        requested: int_at(&doc, "/target_file_nums"),
                        limit: int_at(&doc, "/target_file_nums_limit"),
                    },
                    TransferErrorCode::AlreadyExists => ShareError::NameCollision {
                        filename: base_name(first_path).to_string(),
                    },
                    _ => ShareError::Unknown { code: nested },
                });
            }

            return Err(ShareError::Unknown { code: errno });
        }

        let mut filename = base_name(first_path).to_string();
        if info_count > 1 {
            filename.push_str("等多个文件");
        }

        info!("✅ {:?} 完成: {}", mode, filename);
        Ok(filename)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::baidupcs::testing::scripted_client;

    const URL: &str = "https://pan.baidu.com/share/transfer?shareid=1&from=2";
    const REFERER: &str = "https://pan.baidu.com/s/1abc";

    async fn post(body: Result<String, TransportError>) -> RequestOutcome<String> {
        let (client, _) = scripted_client(vec![body]);
        client
            .generate_request_query(QueryMode::Post, REFERER, URL, "[1,2]", "/dest")
            .await
    }

    #[test]
    fn test_base_name() {
        assert_eq!(base_name("/x/y/dup.txt"), "dup.txt");
        assert_eq!(base_name("plain"), "plain");
        assert_eq!(base_name(""), "");
    }

    #[tokio::test]
    async fn test_success_single_file() {
        let out = post(Ok(r#"{"errno":0,"info":[{"path":"/dest/a.txt","fsid":1}]}"#.into())).await;
        assert_eq!(out.unwrap(), "a.txt");
    }

    #[tokio::test]
    async fn test_success_multiple_files() {
        let out = post(Ok(
            r#"{"errno":0,"info":[{"path":"/dest/a.txt","fsid":1},{"path":"/dest/b.txt","fsid":2}]}"#
                .into(),
        ))
        .await;
        assert_eq!(out.unwrap(), "a.txt等多个文件");
    }

    #[tokio::test]
    async fn test_quota_exceeded() {
        let out = post(Ok(
            r#"{"errno":12,"info":[{"path":"/dest/a.txt","errno":-33}],"target_file_nums":5,"target_file_nums_limit":3}"#
                .into(),
        ))
        .await;
        let err = out.unwrap_err();
        assert_eq!(err, ShareError::QuotaExceeded { requested: 5, limit: 3 });
        assert!(err.to_string().contains('5'));
        assert!(err.to_string().contains('3'));
    }

    #[tokio::test]
    async fn test_name_collision() {
        let out = post(Ok(
            r#"{"errno":12,"info":[{"path":"/x/y/dup.txt","errno":-30}]}"#.into(),
        ))
        .await;
        assert_eq!(
            out.unwrap_err().to_string(),
            "当前目录下已有dup.txt同名文件/文件夹"
        );
    }

    #[tokio::test]
    async fn test_partial_failure_other_nested_code() {
        let out = post(Ok(r#"{"errno":12,"info":[{"path":"/a","errno":-8}]}"#.into())).await;
        assert_eq!(out.unwrap_err(), ShareError::Unknown { code: -8 });
    }

    #[tokio::test]
    async fn test_errno_12_on_get_is_top_level_unknown() {
        let (client, _) = scripted_client(vec![Ok(
            r#"{"errno":12,"info":[{"path":"/a","errno":-30}]}"#.into(),
        )]);
        let err = client
            .generate_request_query(QueryMode::Get, REFERER, URL, "[1]", "/dest")
            .await
            .unwrap_err();
        assert_eq!(err, ShareError::Unknown { code: 12 });
    }

    #[tokio::test]
    async fn test_other_errno() {
        let out = post(Ok(r#"{"errno":"-7"}"#.into())).await;
        assert_eq!(out.unwrap_err().to_string(), "未知错误, 错误代码-7");
    }

    #[tokio::test]
    async fn test_null_show_msg_keeps_error_code() {
        let out = post(Ok(r#"{"errno":-6,"show_msg":null}"#.into())).await;
        assert_eq!(out.unwrap_err(), ShareError::Unknown { code: -6 });
    }

    #[tokio::test]
    async fn test_non_array_info_keeps_error_code() {
        let out = post(Ok(r#"{"errno":4,"info":{}}"#.into())).await;
        assert_eq!(out.unwrap_err().to_string(), "未知错误, 错误代码4");
    }

    #[tokio::test]
    async fn test_partial_failure_with_null_fields() {
        let out = post(Ok(
            r#"{"errno":12,"info":[{"path":null,"errno":"-30"}],"show_msg":null}"#.into(),
        ))
        .await;
        assert_eq!(
            out.unwrap_err(),
            ShareError::NameCollision {
                filename: String::new()
            }
        );
    }

    #[tokio::test]
    async fn test_success_with_null_path() {
        let out = post(Ok(r#"{"errno":0,"info":[{"path":null},{"path":"/dest/b.txt"}]}"#.into())).await;
        assert_eq!(out.unwrap(), "等多个文件");
    }

    #[tokio::test]
    async fn test_transport_failures() {
        assert_eq!(
            post(Err(TransportError::Send("refused".into()))).await.unwrap_err(),
            ShareError::Network
        );
        assert_eq!(
            post(Err(TransportError::Body("reset".into()))).await.unwrap_err(),
            ShareError::UnknownBody
        );
        assert_eq!(
            post(Ok("<html>".into())).await.unwrap_err(),
            ShareError::ResponseJson
        );
    }

    #[tokio::test]
    async fn test_post_sends_form_get_does_not() {
        let (client, transport) = scripted_client(vec![
            Ok(r#"{"errno":0,"info":[]}"#.into()),
            Ok(r#"{"errno":0,"info":[]}"#.into()),
        ]);
        client
            .generate_request_query(QueryMode::Get, REFERER, URL, "[1]", "/dest")
            .await
            .unwrap();
        client
            .generate_request_query(QueryMode::Post, REFERER, URL, "[1]", "/dest")
            .await
            .unwrap();

        let requests = transport.requests();
        assert_eq!(requests[0].method, reqwest::Method::GET);
        assert!(requests[0].form.is_empty());
        assert_eq!(requests[1].method, reqwest::Method::POST);
        assert_eq!(
            requests[1].form,
            vec![
                ("fsidlist".to_string(), "[1]".to_string()),
                ("path".to_string(), "/dest".to_string())
            ]
        );
        assert!(requests
            .iter()
            .all(|r| r.headers.contains(&("Referer", REFERER.to_string()))));
    }
}
