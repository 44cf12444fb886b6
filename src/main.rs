//! 行単位のフロントエンド
//!
//! 標準入力の各行を解決し、`<found>\t<translated>` として標準出力に返す。
//! `:` で始まる行はデバッグコマンド（`:dump.nextPage`, `:engine.setLocale ja` など）。
//! ログは標準エラー出力に書き、レベルは `RUST_LOG` で選ぶ。

use std::path::PathBuf;
use std::process::ExitCode;

use text_localizer::{
    Engine,
    commands,
};
use tokio::io::{
    AsyncBufReadExt,
    AsyncWriteExt,
    BufReader,
};
use tracing_subscriber::EnvFilter;

/// エントリーポイント（第 1 引数はプロジェクトルート、省略時はカレントディレクトリ）
#[tokio::main]
async fn main() -> ExitCode {
    let (writer, _guard) = tracing_appender::non_blocking(std::io::stderr());
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(writer)
        .with_ansi(false)
        .init();

    let root =
        std::env::args_os().nth(1).map(PathBuf::from).or_else(|| std::env::current_dir().ok());
    let mut engine = match Engine::open(root) {
        Ok(engine) => engine,
        Err(error) => {
            tracing::error!(%error, "Failed to start");
            return ExitCode::FAILURE;
        }
    };

    let result = serve(&mut engine).await;
    engine.shutdown().await;

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::error!(%error, "I/O error");
            ExitCode::FAILURE
        }
    }
}

/// 標準入力が閉じるまで 1 行ずつ応答する
async fn serve(engine: &mut Engine) -> std::io::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    while let Some(line) = lines.next_line().await? {
        let response = if let Some(command) = line.strip_prefix(':') {
            commands::execute(engine, command).to_string()
        } else {
            let (found, translated) = engine.resolve_pair(&line);
            format!("{found}\t{translated}")
        };

        stdout.write_all(response.as_bytes()).await?;
        stdout.write_all(b"\n").await?;
        stdout.flush().await?;
    }
    Ok(())
}
