use thiserror::Error;

/// 設定関連のエラー型
/// 環境変数から読み込んだ設定値の検証に関するエラーを定義
#[derive(Error, Debug)]
pub enum ConfigError {
    /// 設定値が不正
    #[error("設定値が不正です: {name} - {reason}")]
    InvalidValue { name: String, reason: String },

    /// ミラーホストが1件も指定されていない
    #[error("ミラーホストが指定されていません: {name}")]
    EmptyHostList { name: String },
}

impl ConfigError {
    /// 不正な設定値エラーを作成
    pub fn invalid_value<N: Into<String>, R: Into<String>>(name: N, reason: R) -> Self {
        Self::InvalidValue {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// ホスト一覧が空のエラーを作成
    pub fn empty_host_list<N: Into<String>>(name: N) -> Self {
        Self::EmptyHostList { name: name.into() }
    }
}

/// 設定エラーのResult型エイリアス
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
