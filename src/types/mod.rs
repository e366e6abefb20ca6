//! 型定義モジュール
//!
//! アプリケーション全体で使用される共通的なエラー型を管理します。
//! - 取得エラー: URL解析とプロバイダ通信の失敗
//! - 設定エラー: 環境変数の検証失敗
//! - ストレージエラー: 出力ファイルの書き込み失敗

pub mod config;
pub mod error;
pub mod infra;

// 便利な再エクスポート
pub use config::{ConfigError, ConfigResult};
pub use error::{FetchError, FetchResult};
pub use infra::{StorageError, StorageResult};
