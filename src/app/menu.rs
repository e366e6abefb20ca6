use crate::infra::storage::file::OutputKind;

/// 対話モードの選択肢
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    /// 本文のみ保存
    MainOnly,
    /// 返信のみ保存
    RepliesOnly,
    /// 本文 + 返信のアーカイブを保存
    FullArchive,
    /// JSON表示のみ（保存しない）
    JsonOnly,
    Quit,
}

pub const MENU_TEXT: &str = "\
どの形式で保存しますか？
  1. 本文のみ (Markdown)
  2. 返信のみ (Markdown)
  3. 本文 + 返信 (アーカイブ)
  4. JSONのみ（保存しない）
  5. 終了";

impl MenuChoice {
    /// 入力行を選択肢に変換する（前後の空白は無視）
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim() {
            "1" => Some(MenuChoice::MainOnly),
            "2" => Some(MenuChoice::RepliesOnly),
            "3" => Some(MenuChoice::FullArchive),
            "4" => Some(MenuChoice::JsonOnly),
            "5" | "q" | "Q" => Some(MenuChoice::Quit),
            _ => None,
        }
    }

    /// 保存するファイルの種類（保存しない選択肢はNone）
    pub fn output_kind(&self) -> Option<OutputKind> {
        match self {
            MenuChoice::MainOnly => Some(OutputKind::Post),
            MenuChoice::RepliesOnly => Some(OutputKind::Replies),
            MenuChoice::FullArchive => Some(OutputKind::Full),
            MenuChoice::JsonOnly | MenuChoice::Quit => None,
        }
    }

    /// 返信の収集が必要かどうか
    pub fn needs_replies(&self) -> bool {
        matches!(self, MenuChoice::RepliesOnly | MenuChoice::FullArchive)
    }
}
