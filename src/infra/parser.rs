use lazy_static::lazy_static;
use regex::Regex;
use scraper::Html;

lazy_static! {
    /// ミラーフロントエンドの投稿本文ブロック
    static ref TWEET_CONTENT_RE: Regex =
        Regex::new(r#"(?s)<div class="tweet-content[^"]*"[^>]*>(.*?)</div>"#).unwrap();
    /// 元投稿を囲むブロックの開始タグ
    static ref MAIN_TWEET_RE: Regex = Regex::new(r#"<div class="main-tweet[^"]*""#).unwrap();
    static ref BR_RE: Regex = Regex::new(r"(?i)<br\s*/?>").unwrap();
    static ref SPACE_RE: Regex = Regex::new(r"[ \t\u{a0}]+").unwrap();
}

/// ミラーページのHTMLから返信候補の本文を抽出する
///
/// 元投稿（`main-tweet`内の本文）とそれより前の会話は返信ではないため除き、
/// その後ろの本文ブロックを先頭から最大`limit`件候補とする。
/// テキスト化した結果が`min_chars`文字未満のものは捨てる。
/// ページ構造が変わった場合は空を返す。
///
/// # Arguments
/// * `html` - ミラーページのHTML
/// * `limit` - 候補の上限
/// * `min_chars` - 採用する最小文字数
pub fn extract_reply_fragments(html: &str, limit: usize, min_chars: usize) -> Vec<String> {
    let replies_html = &html[reply_section_start(html)..];

    TWEET_CONTENT_RE
        .captures_iter(replies_html)
        .take(limit)
        .filter_map(|caps| caps.get(1))
        .map(|m| html_to_text(m.as_str()))
        .filter(|text| text.chars().count() >= min_chars)
        .collect()
}

/// 返信部分の開始位置（元投稿の本文ブロックの直後）
///
/// `main-tweet`が無いページは先頭から全体を返信部分とみなす。
fn reply_section_start(html: &str) -> usize {
    match MAIN_TWEET_RE.find(html) {
        Some(main) => TWEET_CONTENT_RE
            .find_at(html, main.end())
            .map(|root| root.end())
            .unwrap_or(html.len()),
        None => 0,
    }
}

/// HTML断片をプレーンテキストに変換する
///
/// `<br>`は改行にし、それ以外はHTMLパーサでテキストノードだけを取り出す
/// （文字参照のデコードもパーサに任せる）。
pub fn html_to_text(fragment: &str) -> String {
    let with_breaks = BR_RE.replace_all(fragment, "\n");
    let document = Html::parse_fragment(&with_breaks);
    let text: String = document.root_element().text().collect();

    text.lines()
        .map(|line| SPACE_RE.replace_all(line.trim(), " ").into_owned())
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const MIRROR_PAGE: &str = r#"
        <div class="before-tweet thread-line">
          <div class="tweet-content media-body" dir="auto">Parent post in the thread</div>
        </div>
        <div class="main-tweet">
          <div class="timeline-item">
            <div class="tweet-content media-body" dir="auto">Root post text here</div>
          </div>
        </div>
        <div class="reply thread">
          <div class="tweet-content media-body" dir="auto">Great point, <a href="/bob">@bob</a> agrees</div>
        </div>
        <div class="reply thread">
          <div class="tweet-content media-body" dir="auto">ok</div>
        </div>
        <div class="reply thread">
          <div class="tweet-content media-body" dir="auto">Tom &amp; Jerry&#39;s<br>second line</div>
        </div>
    "#;

    #[test]
    fn test_extract_reply_fragments() {
        let fragments = extract_reply_fragments(MIRROR_PAGE, 20, 6);

        // 元投稿とそれより前の会話、短すぎる候補は除外される
        assert_eq!(
            fragments,
            vec![
                "Great point, @bob agrees".to_string(),
                "Tom & Jerry's\nsecond line".to_string(),
            ]
        );
    }

    #[test]
    fn test_root_post_is_not_a_reply() {
        let html = r#"<div class="main-tweet"><div class="tweet-content">The root post body</div></div>
            <div class="replies"><div class="tweet-content">An actual reply</div></div>"#;

        assert_eq!(
            extract_reply_fragments(html, 20, 6),
            vec!["An actual reply".to_string()]
        );
    }

    #[test]
    fn test_main_tweet_without_replies() {
        let html = r#"<div class="main-tweet"><div class="tweet-content">The root post body</div></div>"#;
        assert!(extract_reply_fragments(html, 20, 6).is_empty());
    }

    #[test]
    fn test_extract_respects_limit() {
        let html = (0..30)
            .map(|i| format!(r#"<div class="tweet-content">reply number {}</div>"#, i))
            .collect::<String>();

        let fragments = extract_reply_fragments(&html, 20, 6);
        assert_eq!(fragments.len(), 20);
        assert_eq!(fragments[19], "reply number 19");
    }

    #[test]
    fn test_min_chars_counts_characters_not_bytes() {
        // 日本語5文字は15バイトだが5文字扱い
        let html = r#"<div class="tweet-content">こんにちは</div><div class="tweet-content">ありがとう！</div>"#;
        let fragments = extract_reply_fragments(html, 20, 6);
        assert_eq!(fragments, vec!["ありがとう！".to_string()]);
    }

    #[test]
    fn test_no_matches() {
        assert!(extract_reply_fragments("<html><body>nothing</body></html>", 20, 6).is_empty());
    }

    #[test]
    fn test_html_to_text_entities() {
        assert_eq!(html_to_text("a &lt;b&gt; &amp;amp;"), "a <b> &amp;");
        assert_eq!(
            html_to_text("It&#8217;s &hellip; &#x1F600; &#64;bob"),
            "It\u{2019}s \u{2026} \u{1F600} @bob"
        );
    }

    #[test]
    fn test_html_to_text_breaks_and_spaces() {
        assert_eq!(
            html_to_text("<p>first&nbsp;&nbsp;line<BR/>  <b>second</b>   line</p>"),
            "first line\nsecond line"
        );
    }
}
