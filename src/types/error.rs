use thiserror::Error;

/// 取得処理のエラー型
/// URLの解析、プロバイダへのHTTP通信、レスポンスの検証に関するエラーを定義
#[derive(Error, Debug)]
pub enum FetchError {
    /// URLから投稿IDを抽出できない
    #[error("URLから投稿IDを抽出できません: {url}")]
    InvalidUrl { url: String },

    /// 通信エラー（接続失敗、タイムアウトなど）
    #[error("通信エラー: {url} - {message}")]
    Transport { url: String, message: String },

    /// 200以外のステータスコード
    #[error("HTTPステータス異常: {url} - {status}")]
    Status { url: String, status: u16 },

    /// レスポンスの解析エラー
    #[error("レスポンス解析エラー: {context} - {message}")]
    Parse { context: String, message: String },

    /// 必須フィールドが空または欠落
    #[error("{provider}のレスポンスに必要なデータがありません")]
    EmptyPayload { provider: String },

    /// すべての取得方法が失敗
    #[error("all fetch strategies failed")]
    AllProvidersFailed,
}

impl FetchError {
    /// URL不正エラーを作成
    pub fn invalid_url<U: Into<String>>(url: U) -> Self {
        Self::InvalidUrl { url: url.into() }
    }

    /// 通信エラーを作成
    pub fn transport<U: Into<String>, M: std::fmt::Display>(url: U, message: M) -> Self {
        Self::Transport {
            url: url.into(),
            message: message.to_string(),
        }
    }

    /// ステータス異常エラーを作成
    pub fn status<U: Into<String>>(url: U, status: u16) -> Self {
        Self::Status {
            url: url.into(),
            status,
        }
    }

    /// 解析エラーを作成
    pub fn parse<C: Into<String>, M: std::fmt::Display>(context: C, message: M) -> Self {
        Self::Parse {
            context: context.into(),
            message: message.to_string(),
        }
    }

    /// データ欠落エラーを作成
    pub fn empty_payload<P: Into<String>>(provider: P) -> Self {
        Self::EmptyPayload {
            provider: provider.into(),
        }
    }

    /// プロセスを終了させるべき致命的エラーかどうか
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::InvalidUrl { .. } | Self::AllProvidersFailed)
    }
}

/// 取得エラーのResult型エイリアス
pub type FetchResult<T> = std::result::Result<T, FetchError>;
