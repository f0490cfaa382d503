use anyhow::Context;
use chapter_reader_lib::{api, AppConfig, EpubParser, FilterPolicy, OutputMode, TextLayout};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// EPUB 章节提取服务
#[derive(Parser, Debug)]
#[command(name = "chapter-reader", version)]
#[command(about = "Extract metadata and reading-order chapters from EPUB files")]
struct Cli {
    /// 配置文件路径（默认读取 CHAPTER_READER_CONFIG 或 conf/config.toml）
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 启动 HTTP 服务（默认）
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// 解析本地 EPUB 文件，将 JSON 输出到 stdout
    Parse {
        file: PathBuf,
        #[arg(long, value_enum)]
        mode: Option<OutputMode>,
        #[arg(long, value_enum)]
        layout: Option<TextLayout>,
        /// 只输出被判定为正文的章节
        #[arg(long)]
        strict: bool,
        #[arg(long)]
        pretty: bool,
    },
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // 日志写到 stderr，stdout 留给 parse 的输出
    let stderr_layer = fmt::layer().with_writer(std::io::stderr).with_target(true);

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .try_init();
}

fn parse_file(
    mut config: AppConfig,
    file: &Path,
    mode: Option<OutputMode>,
    layout: Option<TextLayout>,
    strict: bool,
    pretty: bool,
) -> anyhow::Result<()> {
    if let Some(mode) = mode {
        config.extraction.output_mode = mode;
    }
    if let Some(layout) = layout {
        config.extraction.text_layout = layout;
    }
    if strict {
        config.extraction.filter = FilterPolicy::Strict;
    }

    let bytes = std::fs::read(file).with_context(|| format!("读取文件失败: {}", file.display()))?;
    let file_name = file
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default();

    let include_skipped = config.extraction.include_skipped;
    let parser = EpubParser::new(config.extraction)?;
    let result = parser.parse_bytes(&file_name, &bytes)?;
    let response = result.into_response(include_skipped);

    let json = if pretty {
        serde_json::to_string_pretty(&response)?
    } else {
        serde_json::to_string(&response)?
    };
    println!("{}", json);
    Ok(())
}

async fn run_server(mut config: AppConfig, host: Option<String>, port: Option<u16>) -> anyhow::Result<()> {
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    let listener = api::bind(&config)
        .await
        .with_context(|| format!("无法监听 {}:{}", config.server.host, config.server.port))?;
    api::serve(listener, config).await?;
    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match AppConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Error: {}", err);
            std::process::exit(1);
        }
    };
    init_tracing(&config.log_level);

    let outcome = match cli.command {
        Some(Command::Parse {
            file,
            mode,
            layout,
            strict,
            pretty,
        }) => parse_file(config, &file, mode, layout, strict, pretty),
        Some(Command::Serve { host, port }) => run_server(config, host, port).await,
        None => run_server(config, None, None).await,
    };

    if let Err(err) = outcome {
        eprintln!("Error: {:#}", err);
        std::process::exit(1);
    }
}
