use crate::types::{FetchError, FetchResult};
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

lazy_static! {
    static ref STATUS_ID_RE: Regex =
        Regex::new(r"(?:x\.com|twitter\.com)/(?:i/web|\w+)/status(?:es)?/(\d+)").unwrap();
    static ref HANDLE_RE: Regex = Regex::new(r"(?:x\.com|twitter\.com)/(\w+)/status").unwrap();
}

/// 共有リンク（`x.com/i/status/...`）のパス要素。ハンドルではない。
const SHARE_PATH_SEGMENT: &str = "i";

/// 投稿URLから取り出した識別子
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostIdentifier {
    /// 数字のみの投稿ID
    pub id: String,
    /// 投稿者のハンドル（URLに含まれない場合はNone）
    pub author_handle: Option<String>,
}

impl PostIdentifier {
    /// URLから投稿IDとハンドルを抽出する
    ///
    /// IDが見つからない場合は`FetchError::InvalidUrl`。
    /// ハンドルの有無はIDの抽出に影響しない。
    pub fn from_url(url: &str) -> FetchResult<Self> {
        let id = STATUS_ID_RE
            .captures(url)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
            .ok_or_else(|| FetchError::invalid_url(url))?;

        Ok(Self {
            id,
            author_handle: extract_handle(url),
        })
    }

    /// ハンドル、無ければ指定の代替値
    pub fn handle_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.author_handle.as_deref().unwrap_or(fallback)
    }
}

fn extract_handle(url: &str) -> Option<String> {
    HANDLE_RE
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .filter(|handle| *handle != SHARE_PATH_SEGMENT)
        .map(str::to_string)
}
