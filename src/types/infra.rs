use thiserror::Error;

/// インフラストラクチャ層のエラー型
/// 出力ファイルの書き込みに関するエラーを定義
#[derive(Error, Debug)]
pub enum StorageError {
    /// ディレクトリ作成エラー
    #[error("ディレクトリ作成エラー: {path} - {source}")]
    CreateDir {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// ファイル書き込みエラー
    #[error("ファイル書き込みエラー: {path} - {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl StorageError {
    /// ディレクトリ作成エラーを作成
    pub fn create_dir<P: Into<String>>(path: P, source: std::io::Error) -> Self {
        Self::CreateDir {
            path: path.into(),
            source,
        }
    }

    /// ファイル書き込みエラーを作成
    pub fn write<P: Into<String>>(path: P, source: std::io::Error) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }
}

/// ストレージエラーのResult型エイリアス
pub type StorageResult<T> = std::result::Result<T, StorageError>;
