//! テスト用のモックTransport

use std::cell::RefCell;
use std::collections::VecDeque;

use crate::error::{Error, Result};
use crate::gemini::{HttpReply, Transport};

/// 1候補・1パートの成功レスポンス本文
pub fn candidate_body(text: &str) -> String {
    serde_json::json!({
        "candidates": [{"content": {"parts": [{"text": text}]}}]
    })
    .to_string()
}

/// 登録順に応答を返すモック。送信された本文を記録する
#[derive(Default)]
pub struct MockTransport {
    replies: RefCell<VecDeque<Result<HttpReply>>>,
    requests: RefCell<Vec<String>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, status: u16, body: impl Into<String>) -> Self {
        self.replies
            .borrow_mut()
            .push_back(Ok(HttpReply::new(status, body)));
        self
    }

    pub fn fail(self, message: &str) -> Self {
        self.replies
            .borrow_mut()
            .push_back(Err(Error::Network(message.to_string())));
        self
    }

    pub fn call_count(&self) -> usize {
        self.requests.borrow().len()
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.borrow().clone()
    }
}

impl Transport for MockTransport {
    async fn post_json(&self, body: String) -> Result<HttpReply> {
        self.requests.borrow_mut().push(body);
        self.replies
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(Error::Network("no mock reply registered".to_string())))
    }
}
