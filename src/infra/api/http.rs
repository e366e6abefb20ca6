use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

/// HTTPレスポンスの最小表現
///
/// プロバイダごとに成功判定が異なるため、ステータスコードと本文をそのまま返す。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new<B: Into<String>>(status: u16, body: B) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// ステータスが200かどうか
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }
}

/// HTTPクライアントの抽象化トレイト
///
/// このトレイトは、実際のHTTP通信とモック実装の両方を
/// 統一的に扱えるようにするためのインターフェースです。
#[async_trait]
pub trait HttpClient {
    /// 指定されたURLにGETリクエストを送信する
    ///
    /// # Arguments
    /// * `url` - 取得対象のURL
    /// * `timeout_secs` - タイムアウト時間（秒）
    ///
    /// ステータスコードが200以外でも`Ok`を返す。`Err`は通信自体の失敗のみ。
    async fn get(&self, url: &str, timeout_secs: u64) -> Result<HttpResponse>;
}

/// `reqwest` を使用した本番用のHTTPクライアント実装
pub struct ReqwestHttpClient {
    client: Client,
    user_agent: String,
}

impl ReqwestHttpClient {
    /// 固定のUser-Agentを付与するHTTPクライアントを作成
    pub fn new<U: Into<String>>(user_agent: U) -> Self {
        Self {
            client: Client::new(),
            user_agent: user_agent.into(),
        }
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn get(&self, url: &str, timeout_secs: u64) -> Result<HttpResponse> {
        tracing::debug!(url, timeout_secs, "GET");

        let response = self
            .client
            .get(url)
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .timeout(Duration::from_secs(timeout_secs))
            .send()
            .await
            .context(format!("HTTPリクエストの送信に失敗: {}", url))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .context("レスポンステキストの取得に失敗")?;

        tracing::debug!(url, status, bytes = body.len(), "response");
        Ok(HttpResponse { status, body })
    }
}

/// モックのURLごとの応答
#[derive(Debug, Clone)]
enum MockReply {
    Respond(HttpResponse),
    Fail(String),
}

/// テスト用のモックHTTPクライアント
///
/// この実装はテスト時にDIされ、実際のHTTPリクエストを行わずに
/// URLごとに登録されたレスポンスやエラーを返します。
/// 未登録のURLは通信エラーとして扱います。
/// 受け取ったURLは順番に記録され、呼び出し回数の検証に使えます。
#[derive(Default)]
pub struct MockHttpClient {
    replies: HashMap<String, MockReply>,
    requests: Mutex<Vec<String>>,
}

impl MockHttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// 指定URLに対する200レスポンスを登録
    pub fn with_ok(self, url: &str, body: &str) -> Self {
        self.with_status(url, 200, body)
    }

    /// 指定URLに対する任意ステータスのレスポンスを登録
    pub fn with_status(mut self, url: &str, status: u16, body: &str) -> Self {
        self.replies.insert(
            url.to_string(),
            MockReply::Respond(HttpResponse::new(status, body)),
        );
        self
    }

    /// 指定URLに対する通信エラーを登録
    pub fn with_error(mut self, url: &str, error_message: &str) -> Self {
        self.replies
            .insert(url.to_string(), MockReply::Fail(error_message.to_string()));
        self
    }

    /// 受け取ったリクエストURLの一覧
    pub fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .map(|log| log.clone())
            .unwrap_or_default()
    }

    /// 指定URLへのリクエスト回数
    pub fn hits(&self, url: &str) -> usize {
        self.requests().iter().filter(|u| u.as_str() == url).count()
    }
}

#[async_trait]
impl HttpClient for MockHttpClient {
    async fn get(&self, url: &str, _timeout_secs: u64) -> Result<HttpResponse> {
        if let Ok(mut log) = self.requests.lock() {
            log.push(url.to_string());
        }

        match self.replies.get(url) {
            Some(MockReply::Respond(response)) => Ok(response.clone()),
            Some(MockReply::Fail(message)) => {
                Err(anyhow::anyhow!("モックHTTPエラー: {}", message))
            }
            None => Err(anyhow::anyhow!("モックHTTPエラー: 未登録のURL {}", url)),
        }
    }
}
