use crate::domain::identifier::PostIdentifier;
use crate::domain::post::{ArticleContent, PostContent, TweetContent, UnifiedPost};
use crate::domain::reply::Reply;
use chrono::NaiveDateTime;

const SEPARATOR: &str = "---";

/// 件数を3桁区切りで表示する（例: 1234 → "1,234"）
pub fn format_count(count: u64) -> String {
    let digits = count.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// 統一形式の投稿をMarkdown文書にする
///
/// `include_replies`がfalseの場合、`replies`は無視される。
pub fn render_post_markdown(
    post: &UnifiedPost,
    identifier: &PostIdentifier,
    source_url: &str,
    replies: &[Reply],
    include_replies: bool,
) -> String {
    let mut sections: Vec<String> = Vec::new();

    sections.push(heading(post, identifier));
    sections.push(meta_block(post, source_url));
    sections.push(SEPARATOR.to_string());

    match &post.content {
        PostContent::Tweet(tweet) => sections.extend(tweet_body(tweet)),
        PostContent::Article(article) => sections.extend(article_body(article)),
    }

    sections.push(SEPARATOR.to_string());
    sections.push(stats_block(&post.content));

    if include_replies {
        sections.push(replies_section(replies));
    }

    let mut doc = sections.join("\n\n");
    doc.push('\n');
    doc
}

/// 返信のみのMarkdown文書にする
///
/// 生成日時の行を含むため、同じ入力でも`generated_at`が違えば結果は変わる。
pub fn render_replies_markdown(
    identifier: &PostIdentifier,
    source_url: &str,
    replies: &[Reply],
    generated_at: NaiveDateTime,
) -> String {
    let title = match identifier.author_handle.as_deref() {
        Some(handle) => format!("# Replies to @{} ({})", handle, identifier.id),
        None => format!("# Replies to post {}", identifier.id),
    };
    let meta = format!(
        "> **Link**: {}\n> **Generated**: {}",
        source_url,
        generated_at.format("%Y-%m-%d %H:%M:%S")
    );

    let mut doc = [title, meta, SEPARATOR.to_string(), replies_section(replies)].join("\n\n");
    doc.push('\n');
    doc
}

fn heading(post: &UnifiedPost, identifier: &PostIdentifier) -> String {
    match &post.content {
        PostContent::Article(article) if !article.title.is_empty() => {
            format!("# {}", article.title)
        }
        PostContent::Article(_) => format!("# Article {}", identifier.id),
        PostContent::Tweet(_) => {
            let username = if post.username().is_empty() {
                identifier.handle_or("")
            } else {
                post.username()
            };
            if username.is_empty() {
                format!("# Post {}", identifier.id)
            } else {
                format!("# Post by @{}", username)
            }
        }
    }
}

fn meta_block(post: &UnifiedPost, source_url: &str) -> String {
    let mut lines = vec![format!(
        "> **Author**: {} (@{})",
        post.author(),
        post.username()
    )];
    if !post.created_at().is_empty() {
        lines.push(format!("> **Date**: {}", post.created_at()));
    }
    if let PostContent::Article(article) = &post.content {
        if !article.modified_at.is_empty() {
            lines.push(format!("> **Updated**: {}", article.modified_at));
        }
    }
    lines.push(format!("> **Link**: {}", source_url));
    lines.join("\n")
}

fn tweet_body(tweet: &TweetContent) -> Vec<String> {
    let mut parts = Vec::new();
    if !tweet.text.is_empty() {
        parts.push(tweet.text.clone());
    }
    parts.extend(
        tweet
            .media
            .iter()
            .enumerate()
            .map(|(i, url)| format!("![media {}]({})", i + 1, url)),
    );
    parts
}

fn article_body(article: &ArticleContent) -> Vec<String> {
    let mut parts = Vec::new();
    if let Some(cover) = &article.cover_image {
        parts.push(format!("![cover]({})", cover));
    }
    if !article.full_text.is_empty() {
        parts.push(article.full_text.clone());
    } else if !article.preview.is_empty() {
        parts.push(article.preview.clone());
    }
    parts
}

fn stats_block(content: &PostContent) -> String {
    let lines = match content {
        PostContent::Tweet(t) => vec![
            format!("- ❤️ Likes: {}", format_count(t.likes)),
            format!("- 🔁 Retweets: {}", format_count(t.retweets)),
            format!("- 👁️ Views: {}", format_count(t.views)),
            format!("- 💬 Replies: {}", format_count(t.replies_count)),
        ],
        PostContent::Article(a) => vec![
            format!("- ❤️ Likes: {}", format_count(a.likes)),
            format!("- 🔁 Retweets: {}", format_count(a.retweets)),
            format!("- 👁️ Views: {}", format_count(a.views)),
            format!("- 🔖 Bookmarks: {}", format_count(a.bookmarks)),
        ],
    };
    format!("## Engagement\n\n{}", lines.join("\n"))
}

fn replies_section(replies: &[Reply]) -> String {
    if replies.is_empty() {
        return "## Replies (0)\n\n_No replies collected._".to_string();
    }

    let entries = replies
        .iter()
        .enumerate()
        .map(|(i, reply)| render_reply(i + 1, reply))
        .collect::<Vec<_>>()
        .join("\n\n");
    format!("## Replies ({})\n\n{}", replies.len(), entries)
}

fn render_reply(number: usize, reply: &Reply) -> String {
    let mut parts = vec![format!(
        "### {}. {} (@{})",
        number, reply.author, reply.username
    )];
    if !reply.created_at.is_empty() {
        parts.push(format!("*{}*", reply.created_at));
    }
    parts.push(reply.text.clone());
    if reply.likes > 0 || reply.retweets > 0 {
        parts.push(format!(
            "❤️ {} · 🔁 {}",
            format_count(reply.likes),
            format_count(reply.retweets)
        ));
    }
    parts.join("\n\n")
}
