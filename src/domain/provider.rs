//! 取得元プロバイダ（ミラーAPI / syndication API）のクライアントとレスポンス型
//!
//! 上流のJSONは非公開仕様で形が変わりうるため、全フィールドを`Option`で受け、
//! アクセサでデフォルト値（件数は0、文字列は空文字）を補う。

use crate::infra::api::http::{HttpClient, HttpResponse};
use crate::infra::config::AppConfig;
use crate::types::{FetchError, FetchResult};
use lazy_static::lazy_static;
use regex::{NoExpand, Regex};
use serde::{Deserialize, Deserializer, Serialize};

lazy_static! {
    static ref POST_ORIGIN_RE: Regex =
        Regex::new(r"(?:https?://)?(?:[\w-]+\.)*(?:x|twitter)\.com").unwrap();
}

/// データの取得元
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    FxTwitter,
    Syndication,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::FxTwitter => "fxtwitter",
            Source::Syndication => "syndication",
        }
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `null`を未指定と同じくデフォルト値として読む
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// 配列の`null`は空配列、要素の`null`は読み飛ばす
fn lenient_vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    let items = Option::<Vec<Option<T>>>::deserialize(deserializer)?;
    Ok(items.unwrap_or_default().into_iter().flatten().collect())
}

// ---- ミラーAPI (fxtwitter) ----

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FxTweetResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub tweet: FxTweet,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FxTweet {
    pub text: Option<String>,
    pub author: Option<FxAuthor>,
    pub created_at: Option<String>,
    pub likes: Option<u64>,
    pub retweets: Option<u64>,
    pub views: Option<u64>,
    pub replies: Option<u64>,
    pub bookmarks: Option<u64>,
    pub media: Option<FxMedia>,
    pub article: Option<FxArticle>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FxAuthor {
    pub name: Option<String>,
    pub screen_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FxMedia {
    #[serde(default, deserialize_with = "lenient_vec")]
    pub all: Vec<FxMediaItem>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FxMediaItem {
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FxArticle {
    pub title: Option<String>,
    pub preview_text: Option<String>,
    pub created_at: Option<String>,
    pub modified_at: Option<String>,
    pub cover_media: Option<FxCoverMedia>,
    pub content: Option<FxArticleBody>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FxCoverMedia {
    pub media_info: Option<FxMediaInfo>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FxMediaInfo {
    pub original_img_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FxArticleBody {
    #[serde(default, deserialize_with = "lenient_vec")]
    pub blocks: Vec<ArticleBlock>,
}

/// 長文記事のリッチテキストブロック
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ArticleBlock {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub text: Option<String>,
}

impl ArticleBlock {
    /// ブロック種別（未指定は`unstyled`）
    pub fn kind(&self) -> &str {
        self.kind.as_deref().unwrap_or("unstyled")
    }

    pub fn text(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }
}

impl FxTweet {
    pub fn text(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }

    /// 表示名（無ければ空文字）
    pub fn author_name(&self) -> &str {
        self.author
            .as_ref()
            .and_then(|a| a.name.as_deref())
            .unwrap_or("")
    }

    /// スクリーンネーム（無ければ空文字）
    pub fn author_screen_name(&self) -> &str {
        self.author
            .as_ref()
            .and_then(|a| a.screen_name.as_deref())
            .unwrap_or("")
    }

    pub fn created_at(&self) -> &str {
        self.created_at.as_deref().unwrap_or("")
    }

    pub fn likes(&self) -> u64 {
        self.likes.unwrap_or(0)
    }

    pub fn retweets(&self) -> u64 {
        self.retweets.unwrap_or(0)
    }

    pub fn views(&self) -> u64 {
        self.views.unwrap_or(0)
    }

    pub fn replies(&self) -> u64 {
        self.replies.unwrap_or(0)
    }

    pub fn bookmarks(&self) -> u64 {
        self.bookmarks.unwrap_or(0)
    }

    /// URLを持つメディアのみ、元の順序で返す
    pub fn media_urls(&self) -> Vec<String> {
        self.media
            .as_ref()
            .map(|m| m.all.iter().filter_map(|item| item.url.clone()).collect())
            .unwrap_or_default()
    }
}

impl FxArticle {
    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or("")
    }

    pub fn preview_text(&self) -> &str {
        self.preview_text.as_deref().unwrap_or("")
    }

    pub fn created_at(&self) -> &str {
        self.created_at.as_deref().unwrap_or("")
    }

    pub fn modified_at(&self) -> &str {
        self.modified_at.as_deref().unwrap_or("")
    }

    /// カバー画像のURL（無ければNone）
    pub fn cover_image(&self) -> Option<String> {
        self.cover_media
            .as_ref()
            .and_then(|c| c.media_info.as_ref())
            .and_then(|info| info.original_img_url.clone())
    }

    pub fn blocks(&self) -> &[ArticleBlock] {
        self.content
            .as_ref()
            .map(|c| c.blocks.as_slice())
            .unwrap_or(&[])
    }
}

// ---- syndication API ----

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SyndicationTweet {
    pub id_str: Option<String>,
    pub id: Option<u64>,
    pub text: Option<String>,
    pub user: Option<SyndicationUser>,
    pub created_at: Option<String>,
    pub favorite_count: Option<u64>,
    pub retweet_count: Option<u64>,
    #[serde(rename = "mediaDetails", default, deserialize_with = "lenient_vec")]
    pub media_details: Vec<SyndicationMedia>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SyndicationUser {
    pub name: Option<String>,
    pub screen_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SyndicationMedia {
    pub media_url_https: Option<String>,
}

impl SyndicationTweet {
    /// 投稿ID（`id_str`優先、無ければ数値の`id`、どちらも無ければ空文字）
    pub fn id(&self) -> String {
        match (&self.id_str, self.id) {
            (Some(id), _) => id.clone(),
            (None, Some(id)) => id.to_string(),
            (None, None) => String::new(),
        }
    }

    pub fn text(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }

    pub fn user_name(&self) -> &str {
        self.user
            .as_ref()
            .and_then(|u| u.name.as_deref())
            .unwrap_or("")
    }

    pub fn user_screen_name(&self) -> &str {
        self.user
            .as_ref()
            .and_then(|u| u.screen_name.as_deref())
            .unwrap_or("")
    }

    pub fn created_at(&self) -> &str {
        self.created_at.as_deref().unwrap_or("")
    }

    pub fn favorite_count(&self) -> u64 {
        self.favorite_count.unwrap_or(0)
    }

    pub fn retweet_count(&self) -> u64 {
        self.retweet_count.unwrap_or(0)
    }

    pub fn media_urls(&self) -> Vec<String> {
        self.media_details
            .iter()
            .filter_map(|m| m.media_url_https.clone())
            .collect()
    }
}

/// プロバイダから取得した正規化前のレスポンス
#[derive(Debug, Clone)]
pub enum RawProviderResponse {
    FxTwitter(FxTweetResponse),
    Syndication(SyndicationTweet),
}

impl RawProviderResponse {
    pub fn source(&self) -> Source {
        match self {
            RawProviderResponse::FxTwitter(_) => Source::FxTwitter,
            RawProviderResponse::Syndication(_) => Source::Syndication,
        }
    }
}

/// 投稿URLのドメイン部分をミラーAPIのベースURLに置き換える
///
/// 例: `https://x.com/alice/status/42` → `https://api.fxtwitter.com/alice/status/42`
pub fn primary_api_url(post_url: &str, api_base: &str) -> String {
    POST_ORIGIN_RE
        .replace(post_url, NoExpand(api_base.trim_end_matches('/')))
        .into_owned()
}

/// syndicationエンドポイントのURLを生成
pub fn syndication_url(base: &str, post_id: &str, token: &str) -> String {
    format!(
        "{}/tweet-result?id={}&token={}",
        base.trim_end_matches('/'),
        post_id,
        token
    )
}

/// GETして200であることを確認し、本文をJSONとして返す
async fn get_json<H: HttpClient>(
    client: &H,
    url: &str,
    timeout_secs: u64,
) -> FetchResult<serde_json::Value> {
    let HttpResponse { status, body } = client
        .get(url, timeout_secs)
        .await
        .map_err(|e| FetchError::transport(url, format!("{:#}", e)))?;

    if status != 200 {
        return Err(FetchError::status(url, status));
    }

    serde_json::from_str(&body).map_err(|e| FetchError::parse(url, e))
}

/// ミラーAPI（一次取得先）から投稿を取得する
///
/// 成功条件: ステータス200かつ、空でない`tweet`オブジェクトを含むJSON。
pub async fn fetch_primary<H: HttpClient>(
    client: &H,
    config: &AppConfig,
    post_url: &str,
) -> FetchResult<RawProviderResponse> {
    let url = primary_api_url(post_url, &config.fxtwitter_base);
    let value = get_json(client, &url, config.primary_timeout_secs).await?;

    let has_tweet = value
        .get("tweet")
        .and_then(|t| t.as_object())
        .is_some_and(|t| !t.is_empty());
    if !has_tweet {
        return Err(FetchError::empty_payload(Source::FxTwitter.as_str()));
    }

    let response: FxTweetResponse =
        serde_json::from_value(value).map_err(|e| FetchError::parse(Source::FxTwitter.as_str(), e))?;
    Ok(RawProviderResponse::FxTwitter(response))
}

/// syndication API（二次取得先）から投稿を取得する
///
/// 成功条件: ステータス200かつ、空でない`text`を含むJSON。
pub async fn fetch_syndication<H: HttpClient>(
    client: &H,
    config: &AppConfig,
    post_id: &str,
) -> FetchResult<RawProviderResponse> {
    let url = syndication_url(&config.syndication_base, post_id, &config.syndication_token);
    let value = get_json(client, &url, config.syndication_timeout_secs).await?;

    let has_text = value
        .get("text")
        .and_then(|t| t.as_str())
        .is_some_and(|t| !t.is_empty());
    if !has_text {
        return Err(FetchError::empty_payload(Source::Syndication.as_str()));
    }

    let tweet: SyndicationTweet = serde_json::from_value(value)
        .map_err(|e| FetchError::parse(Source::Syndication.as_str(), e))?;
    Ok(RawProviderResponse::Syndication(tweet))
}

/// syndication APIの生JSONを取得する（返信収集用）
pub async fn fetch_syndication_value<H: HttpClient>(
    client: &H,
    config: &AppConfig,
    post_id: &str,
) -> FetchResult<serde_json::Value> {
    let url = syndication_url(&config.syndication_base, post_id, &config.syndication_token);
    get_json(client, &url, config.syndication_timeout_secs).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::api::http::MockHttpClient;

    const FX_URL: &str = "https://api.fxtwitter.com/alice/status/42";
    const SYN_URL: &str = "https://cdn.syndication.twimg.com/tweet-result?id=42&token=0";

    #[test]
    fn test_primary_api_url() {
        let base = "https://api.fxtwitter.com";
        assert_eq!(primary_api_url("https://x.com/alice/status/42", base), FX_URL);
        assert_eq!(
            primary_api_url("https://twitter.com/alice/status/42?s=20", base),
            "https://api.fxtwitter.com/alice/status/42?s=20"
        );
        assert_eq!(
            primary_api_url("https://mobile.twitter.com/alice/status/42", base),
            FX_URL
        );
        assert_eq!(
            primary_api_url("x.com/alice/status/42", "http://127.0.0.1:8080/"),
            "http://127.0.0.1:8080/alice/status/42"
        );
    }

    #[test]
    fn test_syndication_url() {
        assert_eq!(
            syndication_url("https://cdn.syndication.twimg.com/", "42", "0"),
            SYN_URL
        );
    }

    #[test]
    fn test_source_serialization() {
        assert_eq!(serde_json::to_string(&Source::FxTwitter).unwrap(), "\"fxtwitter\"");
        assert_eq!(serde_json::to_string(&Source::Syndication).unwrap(), "\"syndication\"");
    }

    #[test]
    fn test_fx_accessor_defaults() {
        let tweet: FxTweet = serde_json::from_str(r#"{"views": null}"#).unwrap();
        assert_eq!(tweet.text(), "");
        assert_eq!(tweet.author_name(), "");
        assert_eq!(tweet.likes(), 0);
        assert_eq!(tweet.views(), 0);
        assert!(tweet.media_urls().is_empty());
        assert!(tweet.article.is_none());
    }

    #[test]
    fn test_fx_media_filtering() {
        let tweet: FxTweet = serde_json::from_str(
            r#"{"media": {"all": [{"url": "a"}, {}, {"url": "b"}]}}"#,
        )
        .unwrap();
        assert_eq!(tweet.media_urls(), vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_null_collections_read_as_empty() {
        let tweet: FxTweet = serde_json::from_str(
            r#"{"text": "hi", "media": {"all": null}, "article": {"content": {"blocks": null}}}"#,
        )
        .unwrap();
        assert!(tweet.media_urls().is_empty());
        assert!(tweet.article.as_ref().unwrap().blocks().is_empty());

        let tweet: FxTweet =
            serde_json::from_str(r#"{"media": {"all": [null, {"url": "a"}]}}"#).unwrap();
        assert_eq!(tweet.media_urls(), vec!["a".to_string()]);

        let tweet: SyndicationTweet =
            serde_json::from_str(r#"{"text": "hello", "mediaDetails": null}"#).unwrap();
        assert!(tweet.media_urls().is_empty());
    }

    #[test]
    fn test_syndication_id_fallback() {
        let tweet: SyndicationTweet = serde_json::from_str(r#"{"id": 99}"#).unwrap();
        assert_eq!(tweet.id(), "99");
        let tweet: SyndicationTweet = serde_json::from_str(r#"{"id_str": "100", "id": 99}"#).unwrap();
        assert_eq!(tweet.id(), "100");
    }

    #[tokio::test]
    async fn test_fetch_primary_success() {
        let client = MockHttpClient::new().with_ok(
            FX_URL,
            r#"{"code":200,"tweet":{"text":"hi","author":{"name":"Alice","screen_name":"alice"},"likes":3}}"#,
        );

        let raw = fetch_primary(&client, &AppConfig::default(), "https://x.com/alice/status/42")
            .await
            .unwrap();

        assert_eq!(raw.source(), Source::FxTwitter);
        match raw {
            RawProviderResponse::FxTwitter(resp) => {
                assert_eq!(resp.tweet.text(), "hi");
                assert_eq!(resp.tweet.likes(), 3);
            }
            other => panic!("想定外のレスポンス: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fetch_accepts_null_media() {
        let client = MockHttpClient::new()
            .with_ok(FX_URL, r#"{"tweet":{"text":"hi","media":{"all":null}}}"#)
            .with_ok(SYN_URL, r#"{"text":"hello","mediaDetails":null}"#);

        let raw = fetch_primary(&client, &AppConfig::default(), "https://x.com/alice/status/42")
            .await
            .unwrap();
        assert_eq!(raw.source(), Source::FxTwitter);

        let raw = fetch_syndication(&client, &AppConfig::default(), "42")
            .await
            .unwrap();
        assert_eq!(raw.source(), Source::Syndication);
    }

    #[tokio::test]
    async fn test_fetch_primary_empty_tweet() {
        let client = MockHttpClient::new().with_ok(FX_URL, r#"{"code":404,"tweet":{}}"#);
        let err = fetch_primary(&client, &AppConfig::default(), "https://x.com/alice/status/42")
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::EmptyPayload { .. }));
    }

    #[tokio::test]
    async fn test_fetch_primary_status_and_transport_errors() {
        let client = MockHttpClient::new().with_status(FX_URL, 500, "oops");
        let err = fetch_primary(&client, &AppConfig::default(), "https://x.com/alice/status/42")
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 500, .. }));

        let client = MockHttpClient::new().with_error(FX_URL, "timeout");
        let err = fetch_primary(&client, &AppConfig::default(), "https://x.com/alice/status/42")
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Transport { .. }));
    }

    #[tokio::test]
    async fn test_fetch_primary_invalid_json() {
        let client = MockHttpClient::new().with_ok(FX_URL, "<html>not json</html>");
        let err = fetch_primary(&client, &AppConfig::default(), "https://x.com/alice/status/42")
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Parse { .. }));
    }

    #[tokio::test]
    async fn test_fetch_syndication_requires_text() {
        let client = MockHttpClient::new().with_ok(SYN_URL, r#"{"text":"","favorite_count":1}"#);
        let err = fetch_syndication(&client, &AppConfig::default(), "42")
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::EmptyPayload { .. }));

        let client = MockHttpClient::new().with_ok(SYN_URL, r#"{"text":"hello","favorite_count":1}"#);
        let raw = fetch_syndication(&client, &AppConfig::default(), "42")
            .await
            .unwrap();
        assert_eq!(raw.source(), Source::Syndication);
    }
}
