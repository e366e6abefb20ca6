use crate::types::{ConfigError, ConfigResult};

pub const ENV_FXTWITTER_BASE: &str = "XFETCH_FXTWITTER_BASE";
pub const ENV_SYNDICATION_BASE: &str = "XFETCH_SYNDICATION_BASE";
pub const ENV_SYNDICATION_TOKEN: &str = "XFETCH_SYNDICATION_TOKEN";
pub const ENV_MIRROR_HOSTS: &str = "XFETCH_MIRROR_HOSTS";
pub const ENV_PRIMARY_TIMEOUT: &str = "XFETCH_PRIMARY_TIMEOUT";
pub const ENV_SYNDICATION_TIMEOUT: &str = "XFETCH_SYNDICATION_TIMEOUT";
pub const ENV_MIRROR_TIMEOUT: &str = "XFETCH_MIRROR_TIMEOUT";
pub const ENV_USER_AGENT: &str = "XFETCH_USER_AGENT";

const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36";

/// 実行時設定
///
/// 接続先とタイムアウトはデフォルト値を持ち、環境変数で上書きできる。
/// テストではモックサーバーのURLに差し替えて使用する。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// ミラーAPIのベースURL（投稿URLのドメイン部分をこれに置き換える）
    pub fxtwitter_base: String,
    /// syndicationエンドポイントのベースURL
    pub syndication_base: String,
    pub syndication_token: String,
    /// 返信スクレイピングに使うミラーフロントエンド（先頭から順に試す）
    pub mirror_hosts: Vec<String>,
    pub primary_timeout_secs: u64,
    pub syndication_timeout_secs: u64,
    pub mirror_timeout_secs: u64,
    pub user_agent: String,
    /// 1ホストから抽出する返信候補の上限
    pub max_mirror_replies: usize,
    /// これより短い返信候補は捨てる（文字数）
    pub min_reply_chars: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            fxtwitter_base: "https://api.fxtwitter.com".to_string(),
            syndication_base: "https://cdn.syndication.twimg.com".to_string(),
            syndication_token: "0".to_string(),
            mirror_hosts: vec![
                "https://nitter.net".to_string(),
                "https://nitter.privacydev.net".to_string(),
            ],
            primary_timeout_secs: 15,
            syndication_timeout_secs: 10,
            mirror_timeout_secs: 10,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            max_mirror_replies: 20,
            min_reply_chars: 6,
        }
    }
}

impl AppConfig {
    /// 環境変数からデフォルト値を上書きして設定を作成
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// 任意の取得関数から設定を作成する
    ///
    /// 空文字の値は未設定として扱う。
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let mut config = Self::default();

        if let Some(base) = get(ENV_FXTWITTER_BASE) {
            config.fxtwitter_base = parse_base_url(ENV_FXTWITTER_BASE, &base)?;
        }
        if let Some(base) = get(ENV_SYNDICATION_BASE) {
            config.syndication_base = parse_base_url(ENV_SYNDICATION_BASE, &base)?;
        }
        if let Some(token) = get(ENV_SYNDICATION_TOKEN) {
            config.syndication_token = token;
        }
        if let Some(hosts) = get(ENV_MIRROR_HOSTS) {
            config.mirror_hosts = parse_host_list(ENV_MIRROR_HOSTS, &hosts)?;
        }
        if let Some(secs) = get(ENV_PRIMARY_TIMEOUT) {
            config.primary_timeout_secs = parse_timeout(ENV_PRIMARY_TIMEOUT, &secs)?;
        }
        if let Some(secs) = get(ENV_SYNDICATION_TIMEOUT) {
            config.syndication_timeout_secs = parse_timeout(ENV_SYNDICATION_TIMEOUT, &secs)?;
        }
        if let Some(secs) = get(ENV_MIRROR_TIMEOUT) {
            config.mirror_timeout_secs = parse_timeout(ENV_MIRROR_TIMEOUT, &secs)?;
        }
        if let Some(agent) = get(ENV_USER_AGENT) {
            config.user_agent = agent;
        }

        Ok(config)
    }

    /// 全エンドポイントを同じベースURLに向けた設定（モックサーバー用）
    pub fn with_single_base(base: &str) -> Self {
        let base = base.trim_end_matches('/').to_string();
        Self {
            fxtwitter_base: base.clone(),
            syndication_base: base.clone(),
            mirror_hosts: vec![base],
            ..Self::default()
        }
    }
}

fn parse_base_url(name: &str, value: &str) -> ConfigResult<String> {
    if !(value.starts_with("http://") || value.starts_with("https://")) {
        return Err(ConfigError::invalid_value(
            name,
            format!("http(s)で始まるURLが必要です: {}", value),
        ));
    }
    Ok(value.trim_end_matches('/').to_string())
}

fn parse_host_list(name: &str, value: &str) -> ConfigResult<Vec<String>> {
    let hosts = value
        .split(',')
        .map(str::trim)
        .filter(|h| !h.is_empty())
        .map(|h| parse_base_url(name, h))
        .collect::<ConfigResult<Vec<_>>>()?;

    if hosts.is_empty() {
        return Err(ConfigError::empty_host_list(name));
    }
    Ok(hosts)
}

fn parse_timeout(name: &str, value: &str) -> ConfigResult<u64> {
    match value.parse::<u64>() {
        Ok(0) => Err(ConfigError::invalid_value(name, "0秒は指定できません")),
        Ok(secs) => Ok(secs),
        Err(_) => Err(ConfigError::invalid_value(
            name,
            format!("数値ではありません: {}", value),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn test_defaults_without_env() {
        let config = AppConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.primary_timeout_secs, 15);
        assert_eq!(config.syndication_timeout_secs, 10);
        assert_eq!(config.syndication_token, "0");
        assert_eq!(config.max_mirror_replies, 20);
        assert_eq!(config.min_reply_chars, 6);
    }

    #[test]
    fn test_env_overrides() {
        let config = AppConfig::from_lookup(lookup_from(&[
            (ENV_FXTWITTER_BASE, "http://127.0.0.1:9000/"),
            (ENV_MIRROR_HOSTS, "https://a.example, https://b.example ,"),
            (ENV_PRIMARY_TIMEOUT, "30"),
            (ENV_USER_AGENT, "test-agent"),
        ]))
        .unwrap();

        assert_eq!(config.fxtwitter_base, "http://127.0.0.1:9000");
        assert_eq!(
            config.mirror_hosts,
            vec!["https://a.example".to_string(), "https://b.example".to_string()]
        );
        assert_eq!(config.primary_timeout_secs, 30);
        assert_eq!(config.user_agent, "test-agent");
        // 上書きしていない値はデフォルトのまま
        assert_eq!(config.syndication_base, "https://cdn.syndication.twimg.com");
    }

    #[test]
    fn test_blank_value_is_ignored() {
        let config = AppConfig::from_lookup(lookup_from(&[(ENV_SYNDICATION_TOKEN, "  ")])).unwrap();
        assert_eq!(config.syndication_token, "0");
    }

    #[test]
    fn test_invalid_timeout() {
        let err = AppConfig::from_lookup(lookup_from(&[(ENV_MIRROR_TIMEOUT, "ten")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));

        let err = AppConfig::from_lookup(lookup_from(&[(ENV_MIRROR_TIMEOUT, "0")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn test_invalid_base_url() {
        let err =
            AppConfig::from_lookup(lookup_from(&[(ENV_SYNDICATION_BASE, "ftp://x")])).unwrap_err();
        assert!(err.to_string().contains(ENV_SYNDICATION_BASE));
    }

    #[test]
    fn test_empty_host_list() {
        let err = AppConfig::from_lookup(lookup_from(&[(ENV_MIRROR_HOSTS, ", ,")])).unwrap_err();
        assert!(matches!(err, ConfigError::EmptyHostList { .. }));
    }

    #[test]
    fn test_with_single_base() {
        let config = AppConfig::with_single_base("http://127.0.0.1:1234/");
        assert_eq!(config.fxtwitter_base, "http://127.0.0.1:1234");
        assert_eq!(config.syndication_base, "http://127.0.0.1:1234");
        assert_eq!(config.mirror_hosts, vec!["http://127.0.0.1:1234".to_string()]);
    }
}
