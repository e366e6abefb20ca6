use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::io::{AsyncBufReadExt, BufReader};
use xfetch::app::menu::{MenuChoice, MENU_TEXT};
use xfetch::app::workflow::{collect_replies, fetch_post_by_url, save_document, FetchOutcome};
use xfetch::domain::identifier::PostIdentifier;
use xfetch::domain::post::UnifiedPost;
use xfetch::infra::api::http::ReqwestHttpClient;
use xfetch::infra::config::AppConfig;
use xfetch::infra::storage::file::OutputKind;

#[derive(Parser, Debug)]
#[command(name = "xfetch")]
#[command(about = "X (Twitter) の投稿を取得してJSON / Markdownで出力する")]
struct Args {
    /// 投稿URL (例: https://x.com/alice/status/123456789)
    url: Option<String>,

    /// 本文をMarkdownで保存
    #[arg(long)]
    save_md: bool,

    /// 返信も取得し、返信のみのMarkdownを保存
    #[arg(long)]
    with_replies: bool,

    /// 本文と返信をまとめたアーカイブを保存
    #[arg(long)]
    full: bool,

    /// JSONのみ出力（ファイルは保存しない）
    #[arg(long)]
    json: bool,

    /// 保存先ディレクトリ
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,

    /// 詳細ログを表示
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn is_interactive(&self) -> bool {
        !(self.save_md || self.with_replies || self.full || self.json)
    }
}

/// 取得済みの投稿と、それを出力するための文脈
struct Session<'a> {
    client: &'a ReqwestHttpClient,
    config: &'a AppConfig,
    identifier: PostIdentifier,
    post: UnifiedPost,
    url: &'a str,
    output_dir: &'a PathBuf,
}

#[tokio::main]
async fn main() -> ExitCode {
    // 環境変数を読み込み（.envファイルがあれば使用）
    let _ = dotenvy::dotenv();

    let args = Args::parse();
    if let Err(e) = init_tracing(args.verbose) {
        eprintln!("⚠️ {}", e);
    }

    let Some(url) = args.url.clone() else {
        eprintln!("使い方: xfetch <x_url> [--save-md] [--with-replies] [--full] [--json]");
        eprintln!("例: xfetch https://x.com/elonmusk/status/123456789");
        return ExitCode::from(1);
    };

    match run(&args, &url).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("❌ {:#}", e);
            ExitCode::from(1)
        }
    }
}

fn init_tracing(verbose: bool) -> Result<()> {
    let level = if verbose { "debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_env("XFETCH_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("ログの初期化に失敗: {}", e))
}

async fn run(args: &Args, url: &str) -> Result<ExitCode> {
    let config = AppConfig::from_env().context("設定の読み込みに失敗")?;
    let client = ReqwestHttpClient::new(config.user_agent.clone());

    let (identifier, post) = match fetch_post_by_url(&client, &config, url).await {
        Ok(fetched) => fetched,
        Err(e) => {
            println!("{}", FetchOutcome::failure(&e).to_json_pretty()?);
            return Ok(ExitCode::from(1));
        }
    };

    let session = Session {
        client: &client,
        config: &config,
        identifier,
        post,
        url,
        output_dir: &args.output_dir,
    };

    if args.is_interactive() {
        run_interactive(&session).await?;
    } else {
        run_batch(&session, args).await?;
    }
    Ok(ExitCode::SUCCESS)
}

/// フラグ指定時の処理: JSONを出力し、指定された形式のファイルを保存する
async fn run_batch(session: &Session<'_>, args: &Args) -> Result<()> {
    let replies = if args.with_replies || args.full {
        Some(collect_replies(session.client, session.config, &session.identifier).await)
    } else {
        None
    };

    let outcome = FetchOutcome::success(&session.post, replies.as_deref());
    println!("{}", outcome.to_json_pretty()?);

    if args.json {
        return Ok(());
    }

    let replies = replies.unwrap_or_default();
    let mut kinds = Vec::new();
    if args.save_md {
        kinds.push(OutputKind::Post);
    }
    if args.with_replies {
        kinds.push(OutputKind::Replies);
    }
    if args.full {
        kinds.push(OutputKind::Full);
    }

    let now = Local::now().naive_local();
    for kind in kinds {
        save_document(
            session.output_dir,
            kind,
            &session.post,
            &session.identifier,
            session.url,
            &replies,
            now,
        )?;
    }
    Ok(())
}

/// フラグなしの処理: JSONを表示してから保存形式を尋ねる
async fn run_interactive(session: &Session<'_>) -> Result<()> {
    println!(
        "{}",
        FetchOutcome::success(&session.post, None).to_json_pretty()?
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let choice = loop {
        eprintln!("\n{}", MENU_TEXT);
        eprint!("選択 [1-5]: ");

        let Some(line) = lines.next_line().await.context("入力の読み込みに失敗")? else {
            // 入力終了は終了扱い
            break MenuChoice::Quit;
        };
        match MenuChoice::parse(&line) {
            Some(choice) => break choice,
            None => eprintln!("⚠️ 1〜5の数字を入力してください"),
        }
    };

    let Some(kind) = choice.output_kind() else {
        return Ok(());
    };

    let replies = if choice.needs_replies() {
        collect_replies(session.client, session.config, &session.identifier).await
    } else {
        Vec::new()
    };

    save_document(
        session.output_dir,
        kind,
        &session.post,
        &session.identifier,
        session.url,
        &replies,
        Local::now().naive_local(),
    )?;
    Ok(())
}
