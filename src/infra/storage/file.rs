use crate::types::{StorageError, StorageResult};
use chrono::NaiveDateTime;
use std::fs;
use std::path::{Path, PathBuf};

/// 保存するMarkdownの種類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputKind {
    /// 本文のみ
    Post,
    /// 返信のみ
    Replies,
    /// 本文と返信をまとめたアーカイブ
    Full,
}

impl OutputKind {
    /// ファイル名に付けるサフィックス
    pub fn suffix(&self) -> &'static str {
        match self {
            OutputKind::Post => "post",
            OutputKind::Replies => "replies",
            OutputKind::Full => "full",
        }
    }
}

/// 出力ファイル名を生成する
///
/// 形式: `<handle>_<postId>[_<suffix>]_<YYYYMMDD_HHMMSS>.md`
pub fn output_file_name(
    handle: &str,
    post_id: &str,
    suffix: Option<&str>,
    timestamp: NaiveDateTime,
) -> String {
    let stamp = timestamp.format("%Y%m%d_%H%M%S");
    match suffix {
        Some(suffix) => format!("{}_{}_{}_{}.md", handle, post_id, suffix, stamp),
        None => format!("{}_{}_{}.md", handle, post_id, stamp),
    }
}

/// Markdownをファイルに書き込み、書き込んだパスを返す
///
/// 既存ファイルは上書きする。ディレクトリが無ければ作成する。
pub fn save_markdown(dir: &Path, file_name: &str, content: &str) -> StorageResult<PathBuf> {
    if !dir.as_os_str().is_empty() && !dir.exists() {
        fs::create_dir_all(dir)
            .map_err(|e| StorageError::create_dir(dir.display().to_string(), e))?;
    }

    let path = dir.join(file_name);
    fs::write(&path, content).map_err(|e| StorageError::write(path.display().to_string(), e))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample_time() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 7)
            .unwrap()
            .and_hms_opt(9, 5, 1)
            .unwrap()
    }

    #[test]
    fn test_output_file_name_with_suffix() {
        let name = output_file_name("alice", "42", Some(OutputKind::Full.suffix()), sample_time());
        assert_eq!(name, "alice_42_full_20250307_090501.md");
    }

    #[test]
    fn test_output_file_name_without_suffix() {
        let name = output_file_name("alice", "42", None, sample_time());
        assert_eq!(name, "alice_42_20250307_090501.md");
    }

    #[test]
    fn test_suffixes() {
        assert_eq!(OutputKind::Post.suffix(), "post");
        assert_eq!(OutputKind::Replies.suffix(), "replies");
        assert_eq!(OutputKind::Full.suffix(), "full");
    }

    #[test]
    fn test_save_markdown_writes_utf8() {
        let dir = tempfile::tempdir().unwrap();
        let path = save_markdown(dir.path(), "a.md", "# 見出し\n\nこんにちは").unwrap();

        assert_eq!(path, dir.path().join("a.md"));
        let written = fs::read_to_string(&path).unwrap();
        assert_eq!(written, "# 見出し\n\nこんにちは");
    }

    #[test]
    fn test_save_markdown_creates_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("out").join("md");

        let path = save_markdown(&nested, "b.md", "body").unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_save_markdown_error() {
        let dir = tempfile::tempdir().unwrap();
        // ファイルをディレクトリとして扱おうとすると失敗する
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "x").unwrap();

        let result = save_markdown(&blocker, "c.md", "body");
        assert!(result.is_err(), "ファイル上への書き込みでエラーにならなかった");
    }
}
