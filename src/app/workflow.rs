use crate::{
    domain::{
        identifier::PostIdentifier,
        post::{normalize, PostContent, PostKind, UnifiedPost},
        provider::{fetch_primary, fetch_syndication, Source},
        render::{render_post_markdown, render_replies_markdown},
        reply::{harvest_replies, Reply},
    },
    infra::{
        api::http::HttpClient,
        config::AppConfig,
        storage::file::{output_file_name, save_markdown, OutputKind},
    },
    types::{FetchError, FetchResult},
};
use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// ハンドルも投稿者名も分からない場合のファイル名用の代替値
const UNKNOWN_HANDLE: &str = "unknown";

/// 取得結果（標準出力に出すJSON）
///
/// 成功時: `{source, success: true, type, content[, replies]}`
/// 失敗時: `{success: false, error}`
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum FetchOutcome {
    Success(PostReport),
    Failure { success: bool, error: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct PostReport {
    pub source: Source,
    pub success: bool,
    #[serde(rename = "type")]
    pub kind: PostKind,
    pub content: PostContent,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replies: Option<Vec<Reply>>,
}

impl FetchOutcome {
    pub fn success(post: &UnifiedPost, replies: Option<&[Reply]>) -> Self {
        Self::Success(PostReport {
            source: post.source,
            success: true,
            kind: post.kind(),
            content: post.content.clone(),
            replies: replies.map(|r| r.to_vec()),
        })
    }

    pub fn failure(error: &FetchError) -> Self {
        Self::Failure {
            success: false,
            error: error.to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, FetchOutcome::Success(_))
    }

    /// 整形済みJSON文字列（非ASCII文字はエスケープしない）
    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("結果のJSON変換に失敗")
    }
}

/// 識別子に対応する投稿を取得する
///
/// ミラーAPI → syndication APIの順に一度ずつ試し、最初の成功を採用する。
/// 個々の失敗はログに出して次へ進み、両方失敗した場合のみエラーを返す。
pub async fn fetch_post<H: HttpClient>(
    client: &H,
    config: &AppConfig,
    identifier: &PostIdentifier,
    post_url: &str,
) -> FetchResult<UnifiedPost> {
    eprintln!("🔍 取得中...");

    eprintln!("  fxtwitter APIを試行...");
    match fetch_primary(client, config, post_url).await {
        Ok(raw) => {
            eprintln!("  ✅ fxtwitter 成功");
            return Ok(normalize(raw));
        }
        Err(e) => {
            eprintln!("  ⚠️ fxtwitter 失敗: {}", e);
            tracing::debug!(source = "fxtwitter", error = ?e, "一次取得に失敗");
        }
    }

    eprintln!("  syndication APIを試行...");
    match fetch_syndication(client, config, &identifier.id).await {
        Ok(raw) => {
            eprintln!("  ✅ syndication 成功");
            return Ok(normalize(raw));
        }
        Err(e) => {
            eprintln!("  ⚠️ syndication 失敗: {}", e);
            tracing::debug!(source = "syndication", error = ?e, "二次取得に失敗");
        }
    }

    eprintln!("❌ すべての取得方法が失敗しました");
    Err(FetchError::AllProvidersFailed)
}

/// URLを解析して投稿を取得する
pub async fn fetch_post_by_url<H: HttpClient>(
    client: &H,
    config: &AppConfig,
    post_url: &str,
) -> FetchResult<(PostIdentifier, UnifiedPost)> {
    let identifier = PostIdentifier::from_url(post_url)?;

    eprintln!("📍 Tweet ID: {}", identifier.id);
    eprintln!(
        "📍 Username: {}",
        identifier.author_handle.as_deref().unwrap_or("(不明)")
    );

    let post = fetch_post(client, config, &identifier, post_url).await?;
    Ok((identifier, post))
}

/// 返信を収集する（失敗しても空で返る）
pub async fn collect_replies<H: HttpClient>(
    client: &H,
    config: &AppConfig,
    identifier: &PostIdentifier,
) -> Vec<Reply> {
    eprintln!("💬 返信を取得中...");
    let replies = harvest_replies(client, config, identifier).await;
    if replies.is_empty() {
        eprintln!("  返信は見つかりませんでした");
    } else {
        eprintln!("  ✅ 合計{}件の返信を取得", replies.len());
    }
    replies
}

/// 出力の種類に応じたMarkdown文書を組み立てる
pub fn build_document(
    kind: OutputKind,
    post: &UnifiedPost,
    identifier: &PostIdentifier,
    post_url: &str,
    replies: &[Reply],
    now: NaiveDateTime,
) -> String {
    match kind {
        OutputKind::Post => render_post_markdown(post, identifier, post_url, &[], false),
        OutputKind::Replies => render_replies_markdown(identifier, post_url, replies, now),
        OutputKind::Full => render_post_markdown(post, identifier, post_url, replies, true),
    }
}

/// ファイル名に使うハンドル（URL → 取得結果のユーザー名 → "unknown" の順）
pub fn file_handle<'a>(identifier: &'a PostIdentifier, post: &'a UnifiedPost) -> &'a str {
    match identifier.author_handle.as_deref() {
        Some(handle) => handle,
        None if !post.username().is_empty() => post.username(),
        None => UNKNOWN_HANDLE,
    }
}

/// Markdown文書を組み立てて保存し、保存先のパスを返す
pub fn save_document(
    dir: &Path,
    kind: OutputKind,
    post: &UnifiedPost,
    identifier: &PostIdentifier,
    post_url: &str,
    replies: &[Reply],
    now: NaiveDateTime,
) -> Result<PathBuf> {
    let document = build_document(kind, post, identifier, post_url, replies, now);
    let file_name = output_file_name(
        file_handle(identifier, post),
        &identifier.id,
        Some(kind.suffix()),
        now,
    );

    let path = save_markdown(dir, &file_name, &document)
        .with_context(|| format!("Markdownの保存に失敗: {}", file_name))?;
    eprintln!("💾 保存しました: {}", path.display());
    Ok(path)
}
