use std::fs::File;
use std::io::{self, IsTerminal, Read, Write as _};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{DisableBracketedPaste, EnableBracketedPaste},
    execute, queue,
    terminal::{
        BeginSynchronizedUpdate, EndSynchronizedUpdate, EnterAlternateScreen, LeaveAlternateScreen,
        SetTitle, disable_raw_mode, enable_raw_mode,
    },
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing_subscriber::EnvFilter;

use hexlens::app::App;
use hexlens::config::{Config, DEFAULT_MAX_FILE_SIZE, DEFAULT_WINDOW_LENGTH, parse_encoding};
use hexlens::encoding::CharEncoding;

/// Terminal byte inspector with region classification
#[derive(Parser, Debug)]
#[command(name = "hexlens")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// File to open
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Name used to pick the file type for piped input (e.g. "dump.png")
    #[arg(short, long, default_value = "stdin.txt")]
    name: String,

    /// Reject inputs larger than this many bytes
    #[arg(long, default_value_t = DEFAULT_MAX_FILE_SIZE)]
    max_size: usize,

    /// Bytes shown per window
    #[arg(short, long, default_value_t = DEFAULT_WINDOW_LENGTH)]
    length: usize,

    /// Text column encoding (utf-8, utf-16le, utf-16be, sjis, euc-jp, windows-1252)
    #[arg(short, long, default_value = "utf-8", value_parser = parse_encoding)]
    encoding: CharEncoding,

    /// Write logs to this file (RUST_LOG controls the level)
    #[arg(long, value_name = "FILE")]
    log: Option<PathBuf>,
}

impl Args {
    fn config(&self) -> Config {
        Config {
            max_file_size: self.max_size,
            window_length: self.length,
            encoding: self.encoding,
            log_file: self.log.clone(),
        }
    }
}

/// ログをファイルに出す（端末には書かない）
fn init_logging(path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("cannot create log file {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = args.config();
    config.validate()?;

    if let Some(ref path) = config.log_file {
        init_logging(path)?;
    }

    // 標準入力からデータを読み込む（パイプされている場合）
    let stdin_data = if args.file.is_none() && !io::stdin().is_terminal() {
        let mut data = Vec::new();
        io::stdin()
            .take(config.max_file_size as u64 + 1)
            .read_to_end(&mut data)?;
        Some(data)
    } else {
        None
    };

    // ターミナルの初期化
    // Alternate Screenでトラックパッドスクロールによるバッファ移動を防止
    // Bracketed Pasteでペースト内容を一括取り込み
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &args, config, stdin_data);

    // ターミナルの後処理
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), DisableBracketedPaste, LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    Ok(())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    args: &Args,
    config: Config,
    stdin_data: Option<Vec<u8>>,
) -> Result<()> {
    let mut app = App::new(config);

    // データを読み込む（優先順位: ファイル > 標準入力）
    if let Some(ref path) = args.file {
        app.open(path)?;
    } else if let Some(data) = stdin_data {
        app.load_bytes(&args.name, data)?;
    }

    let mut title = String::new();
    loop {
        update_title(terminal.backend_mut(), &app, &mut title)?;

        // Synchronized Update: 描画のちらつきを防止
        queue!(terminal.backend_mut(), BeginSynchronizedUpdate)?;
        terminal.draw(|f| app.draw(f))?;
        queue!(terminal.backend_mut(), EndSynchronizedUpdate)?;
        terminal.backend_mut().flush()?;

        app.handle_event()?;

        if app.should_quit() {
            break;
        }
    }

    Ok(())
}

/// ウィンドウタイトルを更新（変わったときだけ）
fn update_title(backend: &mut CrosstermBackend<io::Stdout>, app: &App, last: &mut String) -> Result<()> {
    let title = format!(
        "hexlens - {}{}",
        app.filename().unwrap_or("[No file]"),
        if app.is_modified() { " [+]" } else { "" }
    );
    if *last != title {
        execute!(backend, SetTitle(&title))?;
        *last = title;
    }
    Ok(())
}
