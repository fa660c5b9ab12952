//! 单元测试用的脚本化传输层

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use super::client::ShareClient;
use super::error::TransportError;
use super::transport::{PanRequest, Transport};
use crate::config::BaiduConfig;

/// 按顺序返回预设响应，并记录收到的请求
#[derive(Default)]
pub(crate) struct ScriptedTransport {
    responses: Mutex<VecDeque<Result<String, TransportError>>>,
    requests: Mutex<Vec<PanRequest>>,
}

impl ScriptedTransport {
    pub(crate) fn new(responses: Vec<Result<String, TransportError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn requests(&self) -> Vec<PanRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: PanRequest) -> Result<String, TransportError> {
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Send("no scripted response".into())))
    }
}

pub(crate) fn scripted_client(
    responses: Vec<Result<String, TransportError>>,
) -> (ShareClient, Arc<ScriptedTransport>) {
    let transport = Arc::new(ScriptedTransport::new(responses));
    let client = ShareClient::new(transport.clone(), &BaiduConfig::default()).unwrap();
    (client, transport)
}
