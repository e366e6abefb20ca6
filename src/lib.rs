//! X (Twitter) の投稿を取得し、統一形式のJSON / Markdownに変換するライブラリ
//!
//! - `domain`: URL解析、取得元クライアント、正規化、返信収集、Markdown生成
//! - `infra`: HTTP通信、設定、HTML解析、ファイル保存
//! - `app`: フォールバック付きの取得フローと出力の組み立て

pub mod app;
pub mod domain;
pub mod infra;
pub mod types;
