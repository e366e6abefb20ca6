//! 返信の収集
//!
//! どの経路も失敗は0件として扱い、呼び出し側にエラーを返さない。
//! ミラーページのスクレイピングは構造変更で簡単に壊れるため、
//! 本文の取得処理とは独立させている。

use crate::domain::identifier::PostIdentifier;
use crate::domain::provider::{fetch_syndication_value, SyndicationTweet};
use crate::infra::api::http::HttpClient;
use crate::infra::config::AppConfig;
use crate::infra::parser::extract_reply_fragments;
use serde::Serialize;

/// スクレイピングした返信の著者名（ページから特定できない）
pub const UNKNOWN_AUTHOR: &str = "Unknown";
pub const UNKNOWN_USERNAME: &str = "unknown";

/// 元投稿への返信
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reply {
    pub id: String,
    pub text: String,
    pub author: String,
    pub username: String,
    pub created_at: String,
    pub likes: u64,
    pub retweets: u64,
}

impl Reply {
    fn from_syndication(tweet: &SyndicationTweet) -> Self {
        Self {
            id: tweet.id(),
            text: tweet.text().to_string(),
            author: tweet.user_name().to_string(),
            username: tweet.user_screen_name().to_string(),
            created_at: tweet.created_at().to_string(),
            likes: tweet.favorite_count(),
            retweets: tweet.retweet_count(),
        }
    }

    fn from_fragment(text: String) -> Self {
        Self {
            id: String::new(),
            text,
            author: UNKNOWN_AUTHOR.to_string(),
            username: UNKNOWN_USERNAME.to_string(),
            created_at: String::new(),
            likes: 0,
            retweets: 0,
        }
    }
}

/// 返信を収集する
///
/// 1. syndication APIの`conversation`から元投稿以外の項目を取り出す
/// 2. ハンドルが分かる場合はミラーページのスクレイピング結果を後ろに追加する
///    （最初に1件以上得られたホストで打ち切る）
///
/// 並びは取得順で、時系列とは限らない。
pub async fn harvest_replies<H: HttpClient>(
    client: &H,
    config: &AppConfig,
    identifier: &PostIdentifier,
) -> Vec<Reply> {
    let mut replies = harvest_from_syndication(client, config, &identifier.id).await;
    eprintln!("  syndication: {}件の返信", replies.len());

    match identifier.author_handle.as_deref() {
        Some(handle) => {
            let scraped = harvest_from_mirrors(client, config, handle, &identifier.id).await;
            replies.extend(scraped);
        }
        None => {
            tracing::debug!(id = %identifier.id, "ハンドル不明のためミラー取得をスキップ");
        }
    }

    replies
}

/// syndication APIの会話スレッドから返信を取り出す
pub async fn harvest_from_syndication<H: HttpClient>(
    client: &H,
    config: &AppConfig,
    root_id: &str,
) -> Vec<Reply> {
    match fetch_syndication_value(client, config, root_id).await {
        Ok(value) => replies_from_conversation(&value, root_id),
        Err(e) => {
            tracing::warn!(error = %e, "syndicationからの返信取得に失敗");
            Vec::new()
        }
    }
}

/// `conversation`配列のうち元投稿以外を返信に変換する
///
/// 解析できない項目は読み飛ばす。
pub fn replies_from_conversation(value: &serde_json::Value, root_id: &str) -> Vec<Reply> {
    let Some(items) = value.get("conversation").and_then(|c| c.as_array()) else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| serde_json::from_value::<SyndicationTweet>(item.clone()).ok())
        .filter(|tweet| tweet.id() != root_id)
        .map(|tweet| Reply::from_syndication(&tweet))
        .collect()
}

/// ミラーフロントエンドのページから返信本文をスクレイピングする
pub async fn harvest_from_mirrors<H: HttpClient>(
    client: &H,
    config: &AppConfig,
    handle: &str,
    post_id: &str,
) -> Vec<Reply> {
    for host in &config.mirror_hosts {
        let url = format!("{}/{}/status/{}", host.trim_end_matches('/'), handle, post_id);

        let response = match client.get(&url, config.mirror_timeout_secs).await {
            Ok(response) => response,
            Err(e) => {
                let error = format!("{:#}", e);
                tracing::warn!(host = %host, error = %error, "ミラー取得エラー");
                continue;
            }
        };
        if !response.is_ok() {
            tracing::warn!(host = %host, status = response.status, "ミラーのステータス異常");
            continue;
        }

        let fragments = extract_reply_fragments(
            &response.body,
            config.max_mirror_replies,
            config.min_reply_chars,
        );
        if !fragments.is_empty() {
            eprintln!("  {}: {}件の返信", host, fragments.len());
            return fragments.into_iter().map(Reply::from_fragment).collect();
        }
    }

    Vec::new()
}
