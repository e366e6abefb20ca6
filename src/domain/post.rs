use crate::domain::provider::{
    ArticleBlock, FxArticle, FxTweet, RawProviderResponse, Source, SyndicationTweet,
};
use serde::Serialize;

/// 投稿の種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PostKind {
    Tweet,
    Article,
}

/// 通常の短文投稿
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TweetContent {
    pub text: String,
    pub author: String,
    pub username: String,
    pub created_at: String,
    pub likes: u64,
    pub retweets: u64,
    pub views: u64,
    pub replies_count: u64,
    pub media: Vec<String>,
}

/// 長文記事
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArticleContent {
    pub title: String,
    pub preview: String,
    /// ブロックをMarkdownに変換した本文
    pub full_text: String,
    pub cover_image: Option<String>,
    pub author: String,
    pub username: String,
    pub created_at: String,
    pub modified_at: String,
    pub likes: u64,
    pub retweets: u64,
    pub views: u64,
    pub bookmarks: u64,
}

// 種類ごとの本文（JSONでは`content`の中身としてそのまま出力する）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PostContent {
    Tweet(TweetContent),
    Article(ArticleContent),
}

/// プロバイダに依存しない統一形式の投稿
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnifiedPost {
    pub source: Source,
    pub content: PostContent,
}

impl UnifiedPost {
    /// 種類は`content`の形から決まる
    pub fn kind(&self) -> PostKind {
        match self.content {
            PostContent::Tweet(_) => PostKind::Tweet,
            PostContent::Article(_) => PostKind::Article,
        }
    }

    pub fn author(&self) -> &str {
        match &self.content {
            PostContent::Tweet(t) => &t.author,
            PostContent::Article(a) => &a.author,
        }
    }

    pub fn username(&self) -> &str {
        match &self.content {
            PostContent::Tweet(t) => &t.username,
            PostContent::Article(a) => &a.username,
        }
    }

    pub fn created_at(&self) -> &str {
        match &self.content {
            PostContent::Tweet(t) => &t.created_at,
            PostContent::Article(a) => &a.created_at,
        }
    }
}

/// 正規化前のレスポンスを統一形式に変換する
pub fn normalize(raw: RawProviderResponse) -> UnifiedPost {
    match raw {
        RawProviderResponse::FxTwitter(response) => {
            let tweet = response.tweet;
            let content = match &tweet.article {
                Some(article) => PostContent::Article(article_content(&tweet, article)),
                None => PostContent::Tweet(fx_tweet_content(&tweet)),
            };
            UnifiedPost {
                source: Source::FxTwitter,
                content,
            }
        }
        RawProviderResponse::Syndication(tweet) => UnifiedPost {
            source: Source::Syndication,
            content: PostContent::Tweet(syndication_tweet_content(&tweet)),
        },
    }
}

fn fx_tweet_content(tweet: &FxTweet) -> TweetContent {
    TweetContent {
        text: tweet.text().to_string(),
        author: tweet.author_name().to_string(),
        username: tweet.author_screen_name().to_string(),
        created_at: tweet.created_at().to_string(),
        likes: tweet.likes(),
        retweets: tweet.retweets(),
        views: tweet.views(),
        replies_count: tweet.replies(),
        media: tweet.media_urls(),
    }
}

// 記事の日時は記事側、エンゲージメントと著者は投稿側の値を使う
fn article_content(tweet: &FxTweet, article: &FxArticle) -> ArticleContent {
    ArticleContent {
        title: article.title().to_string(),
        preview: article.preview_text().to_string(),
        full_text: article_markdown(article.blocks()),
        cover_image: article.cover_image(),
        author: tweet.author_name().to_string(),
        username: tweet.author_screen_name().to_string(),
        created_at: article.created_at().to_string(),
        modified_at: article.modified_at().to_string(),
        likes: tweet.likes(),
        retweets: tweet.retweets(),
        views: tweet.views(),
        bookmarks: tweet.bookmarks(),
    }
}

// syndicationは返信数・閲覧数を返さないため0固定
fn syndication_tweet_content(tweet: &SyndicationTweet) -> TweetContent {
    TweetContent {
        text: tweet.text().to_string(),
        author: tweet.user_name().to_string(),
        username: tweet.user_screen_name().to_string(),
        created_at: tweet.created_at().to_string(),
        likes: tweet.favorite_count(),
        retweets: tweet.retweet_count(),
        views: 0,
        replies_count: 0,
        media: tweet.media_urls(),
    }
}

/// ブロック種別に対応するMarkdownの行頭記号
fn block_prefix(kind: &str) -> &'static str {
    match kind {
        "header-one" => "# ",
        "header-two" => "## ",
        "header-three" => "### ",
        "blockquote" => "> ",
        "unordered-list-item" => "- ",
        "ordered-list-item" => "1. ",
        _ => "",
    }
}

/// 記事のリッチテキストブロックをMarkdownに変換する
///
/// 空のブロックは捨て、残りを元の順序のまま空行区切りで連結する。
pub fn article_markdown(blocks: &[ArticleBlock]) -> String {
    blocks
        .iter()
        .filter_map(|block| {
            let text = block.text().trim();
            if text.is_empty() {
                None
            } else {
                Some(format!("{}{}", block_prefix(block.kind()), text))
            }
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}
