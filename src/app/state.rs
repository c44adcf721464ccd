use std::path::{Path, PathBuf};

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};
use tracing::{info, warn};

use super::{Action, ClassifyWorker, InputState, KeyMod, PrefixKey, SidePanel};
use crate::buffer;
use crate::cipher::{CipherJob, CipherOutput, Direction as CipherDirection};
use crate::config::Config;
use crate::edit::parse_offset;
use crate::encoding::CharEncoding;
use crate::region;
use crate::render::ByteInfo;
use crate::session::Session;
use crate::ui::{BinaryView, Colors, HexView, RegionMap};
use crate::window::{HEX_ROW_WIDTH, Pane, ViewPosition, to_absolute_offset, to_view_position};

/// HEX欄の幅（アドレス + 16バイト + テキスト + 余白）
const HEX_PANE_WIDTH: u16 = 79;

/// プロンプト入力モード
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PromptMode {
    #[default]
    Off,
    /// オフセット入力中
    GotoAddress,
    /// ファイルパス入力中
    OpenFile,
    /// コマンド入力中 (M-x)
    Command,
}

/// アプリケーション状態
pub struct App {
    /// 閲覧中のセッション
    session: Session,
    /// 分類を実行するバックグラウンドワーカー
    worker: ClassifyWorker,
    /// 入力状態
    input_state: InputState,
    /// プレフィックスキー状態（C-x等）
    prefix_key: PrefixKey,
    /// 右側の欄
    side_panel: SidePanel,
    /// HEX欄の先頭行
    first_row: usize,
    /// 終了フラグ
    should_quit: bool,
    /// ステータスメッセージ
    status_message: Option<String>,
    /// プロンプト入力モード
    prompt_mode: PromptMode,
    /// プロンプト入力内容
    prompt_input: String,
    /// 直近の暗号変換の結果（見出し付き）
    cipher_output: Option<(String, CipherOutput)>,
}

impl App {
    /// 新しいアプリケーションを作成
    pub fn new(config: Config) -> Self {
        Self {
            session: Session::new(config),
            worker: ClassifyWorker::new(),
            input_state: InputState::Normal,
            prefix_key: PrefixKey::None,
            side_panel: SidePanel::Binary,
            first_row: 0,
            should_quit: false,
            status_message: None,
            prompt_mode: PromptMode::Off,
            prompt_input: String::new(),
            cipher_output: None,
        }
    }

    /// 全角英数記号（U+FF01〜U+FF5E）を半角（U+0021〜U+007E）に変換
    fn normalize_fullwidth(c: char) -> char {
        let cp = c as u32;
        if (0xFF01..=0xFF5E).contains(&cp) {
            char::from_u32(cp - 0xFF00 + 0x20).unwrap_or(c)
        } else if c == '　' {
            ' '
        } else {
            c
        }
    }

    /// HEX文字の正規化（全角→半角、小文字→大文字）
    fn normalize_hex_char(ch: char) -> Option<char> {
        let ch = Self::normalize_fullwidth(ch).to_ascii_uppercase();
        ch.is_ascii_hexdigit().then_some(ch)
    }

    /// ファイルを開く
    pub fn open(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let bytes = buffer::read_file(path, self.session.config().max_file_size)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        self.load_bytes(&name, bytes)
    }

    /// バイト列から読み込み（標準入力用）
    pub fn load_bytes(&mut self, name: &str, data: Vec<u8>) -> Result<()> {
        let request = self.session.load(name, data)?;
        self.worker.submit(request);
        self.input_state = InputState::Normal;
        self.first_row = 0;
        self.cipher_output = None;
        Ok(())
    }

    /// 終了すべきかどうか
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// ファイル名を取得
    pub fn filename(&self) -> Option<&str> {
        self.session.document().map(|d| d.name())
    }

    /// 変更されているかどうか
    pub fn is_modified(&self) -> bool {
        self.session.document().is_some_and(|d| d.is_modified())
    }

    fn buffer_len(&self) -> usize {
        self.session.document().map_or(0, |d| d.len())
    }

    /// 完了した分類を取り込む（古いバッファの結果は捨てられる）
    pub fn poll_classification(&mut self) {
        for result in self.worker.poll() {
            self.session.accept(result);
        }
    }

    /// ハイライトを移動する（未設定ならウィンドウ先頭から始める）
    fn move_highlight(&mut self, step: impl FnOnce(usize, usize) -> Option<usize>) {
        self.input_state = InputState::Normal;
        let len = self.buffer_len();
        if len == 0 {
            return;
        }
        let Some(current) = self.session.highlighted() else {
            self.session.highlight(self.session.window().offset);
            return;
        };
        if let Some(next) = step(current, len) {
            self.session.highlight(next);
        }
    }

    /// 絶対位置へハイライトを移す
    fn jump_to(&mut self, target: impl FnOnce(usize) -> usize) {
        self.input_state = InputState::Normal;
        let len = self.buffer_len();
        if len > 0 {
            self.session.highlight(target(len));
        }
    }

    /// ウィンドウ内での行頭
    fn row_start(&self, pos: usize) -> usize {
        let window = self.session.window();
        to_view_position(pos, &window, Pane::Hex)
            .ok()
            .and_then(|p| to_absolute_offset(ViewPosition { col: 0, ..p }, &window, Pane::Hex))
            .unwrap_or(pos)
    }

    /// HEX入力処理（2桁そろったら1バイト書き換える）
    fn input_hex(&mut self, ch: char) {
        let Some(digit) = Self::normalize_hex_char(ch) else {
            self.status_message = Some(format!("Not a hex digit: {}", ch));
            return;
        };
        let Some(pos) = self.session.highlighted() else {
            self.status_message = Some("No byte highlighted".to_string());
            return;
        };

        match self.input_state {
            InputState::Normal => {
                self.input_state = InputState::HexFirstDigit(digit);
            }
            InputState::HexFirstDigit(first) => {
                self.input_state = InputState::Normal;
                let hex = format!("{first}{digit}");
                match self.session.edit(pos, &hex) {
                    Ok(request) => {
                        self.worker.submit(request);
                        self.status_message = Some(format!("{:08X} = {}", pos, hex));
                        self.move_highlight(|h, len| (h + 1 < len).then_some(h + 1));
                    }
                    Err(e) => self.status_message = Some(e.to_string()),
                }
            }
        }
    }

    /// 暗号変換を実行する（結果は表示のみ）
    fn run_cipher(&mut self, algorithm: &str, key: Option<&str>, direction: CipherDirection) {
        let result = CipherJob::parse(algorithm, key, direction)
            .and_then(|job| self.session.cipher(&job).map(|out| (job, out)));
        match result {
            Ok((job, output)) => {
                let verb = match direction {
                    CipherDirection::Encrypt => "encrypt",
                    CipherDirection::Decrypt => "decrypt",
                };
                let title = format!("{} {}", job.algorithm.name(), verb);
                self.status_message = Some(format!("{}: {} bytes", title, output.bytes.len()));
                self.cipher_output = Some((title, output));
            }
            Err(e) => self.status_message = Some(e.to_string()),
        }
    }

    /// アクションを実行
    pub fn execute(&mut self, action: Action) {
        // ステータスメッセージをクリア（一部のアクションを除く）
        if !matches!(action, Action::EnterCtrlX) {
            self.status_message = None;
        }

        match action {
            Action::Quit => self.should_quit = true,
            Action::CursorUp => self.move_highlight(|h, _| h.checked_sub(HEX_ROW_WIDTH)),
            Action::CursorDown => {
                self.move_highlight(|h, len| (h + HEX_ROW_WIDTH < len).then_some(h + HEX_ROW_WIDTH))
            }
            Action::CursorLeft => self.move_highlight(|h, _| h.checked_sub(1)),
            Action::CursorRight => self.move_highlight(|h, len| (h + 1 < len).then_some(h + 1)),
            Action::CursorHome => {
                let start = self.session.highlighted().map(|h| self.row_start(h));
                self.move_highlight(|_, _| start);
            }
            Action::CursorEnd => {
                let end = self
                    .session
                    .highlighted()
                    .map(|h| self.row_start(h) + HEX_ROW_WIDTH - 1);
                self.move_highlight(|_, len| end.map(|e| e.min(len - 1)));
            }
            Action::PageUp => {
                self.session.page_up();
                self.first_row = 0;
            }
            Action::PageDown => {
                self.session.page_down();
                self.first_row = 0;
            }
            Action::GotoBeginning => self.jump_to(|_| 0),
            Action::GotoEnd => self.jump_to(|len| len - 1),
            Action::StartGoto => {
                self.prompt_mode = PromptMode::GotoAddress;
                self.prompt_input.clear();
            }
            Action::InputHex(ch) => self.input_hex(ch),
            Action::ToggleEncoding => {
                let encoding = self.session.window().encoding.next();
                self.session.set_encoding(encoding);
                self.status_message = Some(format!("Encoding: {}", encoding.name()));
            }
            Action::ToggleSidePanel => {
                self.side_panel = match self.side_panel {
                    SidePanel::Binary => SidePanel::Metadata,
                    SidePanel::Metadata => SidePanel::Binary,
                };
            }
            Action::OpenFile => {
                self.prompt_mode = PromptMode::OpenFile;
                self.prompt_input.clear();
            }
            Action::ExecuteCommand => {
                self.prompt_mode = PromptMode::Command;
                self.prompt_input.clear();
            }
            Action::EnterCtrlX => {
                self.prefix_key = PrefixKey::CtrlX;
                self.status_message = Some("C-x-".to_string());
            }
            Action::Cancel => {
                self.prefix_key = PrefixKey::None;
                self.input_state = InputState::Normal;
                self.cipher_output = None;
                self.status_message = Some("Quit".to_string());
            }
            Action::None => {}
        }
    }

    /// イベントを処理
    pub fn handle_event(&mut self) -> Result<()> {
        self.poll_classification();

        if event::poll(std::time::Duration::from_millis(100))? {
            match event::read()? {
                // ペーストイベント（Bracketed Paste Mode）
                Event::Paste(content) => {
                    if self.prompt_mode != PromptMode::Off {
                        self.prompt_input.push_str(content.trim_end_matches(['\r', '\n']));
                    }
                }
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        return Ok(());
                    }

                    // プロンプトモード中は特別な処理
                    if self.prompt_mode != PromptMode::Off {
                        self.handle_prompt_key(key);
                        return Ok(());
                    }

                    let mods = KeyMod {
                        ctrl: key.modifiers.contains(KeyModifiers::CONTROL),
                        shift: key.modifiers.contains(KeyModifiers::SHIFT),
                        alt: key.modifiers.contains(KeyModifiers::ALT),
                    };

                    // プレフィックスキー状態に応じて処理を分岐
                    let action = match self.prefix_key {
                        PrefixKey::None => Action::from_key(key.code, mods),
                        PrefixKey::CtrlX => {
                            self.prefix_key = PrefixKey::None;
                            Action::from_key_after_ctrl_x(key.code, mods)
                        }
                    };

                    if action != Action::None {
                        self.execute(action);
                    } else if let KeyCode::Char(ch) = key.code {
                        // 修飾キーがなければHEX入力
                        if !mods.ctrl && !mods.alt {
                            self.execute(Action::InputHex(ch));
                        }
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// プロンプトモード中のキー処理
    fn handle_prompt_key(&mut self, key: crossterm::event::KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match key.code {
            // Escape / C-g: キャンセル
            KeyCode::Esc => self.cancel_prompt(),
            KeyCode::Char('g') if ctrl => self.cancel_prompt(),
            // Enter: 確定
            KeyCode::Enter => self.execute_prompt(),
            KeyCode::Backspace => {
                self.prompt_input.pop();
            }
            KeyCode::Char(ch) if !ctrl => {
                self.prompt_input.push(ch);
            }
            _ => {}
        }
    }

    fn cancel_prompt(&mut self) {
        self.prompt_mode = PromptMode::Off;
        self.status_message = Some("Cancelled".to_string());
    }

    /// プロンプト入力を実行
    fn execute_prompt(&mut self) {
        let input = std::mem::take(&mut self.prompt_input);
        let mode = std::mem::take(&mut self.prompt_mode);

        match mode {
            PromptMode::GotoAddress => self.goto_address(&input),
            PromptMode::OpenFile => self.open_file(&input),
            PromptMode::Command => self.dispatch_command(&input),
            PromptMode::Off => {}
        }
    }

    /// コマンドをディスパッチ
    fn dispatch_command(&mut self, input: &str) {
        // 鍵には空白を含められるよう3つまでに分ける
        let mut parts = input.trim().splitn(3, char::is_whitespace);
        let cmd = parts.next().unwrap_or("").to_lowercase();
        let arg = parts.next().map(str::trim).filter(|s| !s.is_empty());
        let rest = parts.next().map(str::trim);

        match cmd.as_str() {
            "length" | "l" => match arg.and_then(parse_offset) {
                Some(length) => match self.session.set_length(length) {
                    Ok(()) => {
                        self.first_row = 0;
                        self.status_message = Some(format!("Window length: {}", length));
                    }
                    Err(e) => self.status_message = Some(e.to_string()),
                },
                None => self.status_message = Some("Usage: length <bytes>".to_string()),
            },
            "encoding" | "e" => match arg.and_then(CharEncoding::from_name) {
                Some(encoding) => {
                    self.session.set_encoding(encoding);
                    self.status_message = Some(format!("Encoding: {}", encoding.name()));
                }
                None => {
                    let names: Vec<_> = CharEncoding::ALL.iter().map(|e| e.name()).collect();
                    self.status_message = Some(format!("Usage: encoding <{}>", names.join("|")));
                }
            },
            "encrypt" | "decrypt" => {
                let direction = if cmd == "encrypt" {
                    CipherDirection::Encrypt
                } else {
                    CipherDirection::Decrypt
                };
                self.run_cipher(arg.unwrap_or(""), rest, direction);
            }
            "help" | "?" | "h" => {
                self.status_message = Some(
                    "Commands: length N, encoding NAME, encrypt ALG KEY, decrypt ALG KEY".to_string(),
                );
            }
            "" => {}
            _ => {
                self.status_message = Some(format!("Unknown command: {} (try 'help')", cmd));
            }
        }
    }

    /// オフセットにジャンプ
    fn goto_address(&mut self, input: &str) {
        let input = input.trim();
        if input.is_empty() {
            self.status_message = Some("No address".to_string());
            return;
        }
        let Some(addr) = parse_offset(input) else {
            self.status_message = Some("Invalid address".to_string());
            return;
        };
        self.input_state = InputState::Normal;
        if self.session.highlight(addr) {
            self.status_message = Some(format!("Jumped to {:08X}", addr));
        } else {
            self.status_message = Some(format!(
                "Address {:X} exceeds file size {:X}",
                addr,
                self.buffer_len()
            ));
        }
    }

    /// ファイルを開く
    fn open_file(&mut self, path: &str) {
        let path = path.trim();
        if path.is_empty() {
            self.status_message = Some("No file specified".to_string());
            return;
        }

        // チルダ展開
        let expanded = match (path.strip_prefix("~/"), std::env::var_os("HOME")) {
            (Some(rest), Some(home)) => PathBuf::from(home).join(rest),
            _ => PathBuf::from(path),
        };

        match self.open(&expanded) {
            Ok(()) => {
                info!(path = %expanded.display(), "opened from prompt");
                self.status_message = Some(format!("Opened: {}", expanded.display()));
            }
            Err(e) => {
                warn!(path = %expanded.display(), "open failed: {}", e);
                self.status_message = Some(format!("Failed to open: {}", e));
            }
        }
    }

    /// ハイライト行が見えるようにスクロール
    fn scroll_to_highlight(&mut self, visible_rows: usize, total_rows: usize) {
        let window = self.session.window();
        let position = self
            .session
            .highlighted()
            .and_then(|h| to_view_position(h, &window, Pane::Hex).ok());
        if let Some(ViewPosition { row, .. }) = position {
            if row < self.first_row {
                self.first_row = row;
            } else if visible_rows > 0 && row >= self.first_row + visible_rows {
                self.first_row = row + 1 - visible_rows;
            }
        }
        self.first_row = self.first_row.min(total_rows.saturating_sub(visible_rows));
    }

    fn format_byte_info(info: &ByteInfo) -> String {
        format!(
            "{:08X}: {} {} '{}' {}",
            info.offset,
            info.hex,
            info.binary,
            info.ascii,
            info.kind.name()
        )
    }

    /// メタデータと領域の一覧
    fn metadata_lines(&self) -> Vec<Line<'static>> {
        let mut lines = Vec::new();
        if let Some(summary) = self.session.summary() {
            for entry in summary.entries() {
                let color = if entry.sensitive {
                    Colors::region(region::RegionKind::Sensitive)
                } else {
                    Color::White
                };
                lines.push(Line::from(vec![
                    Span::styled(format!("{}: ", entry.label), Style::default().fg(Colors::LABEL)),
                    Span::styled(entry.value.clone(), Style::default().fg(color)),
                ]));
            }
        }
        if let Some(regions) = self.session.regions() {
            lines.push(Line::from(""));
            for summary in region::summarize(regions).into_iter().filter(|s| s.bytes > 0) {
                let first = summary
                    .first
                    .map(|r| format!(" first {:08X}-{:08X}", r.start, r.end))
                    .unwrap_or_default();
                lines.push(Line::from(Span::styled(
                    format!("{}: {} bytes{}", summary.kind.name(), summary.bytes, first),
                    Style::default().fg(Colors::region(summary.kind)),
                )));
            }
        }
        lines
    }

    /// ステータス行
    fn status_line(&self) -> String {
        let filename = self.filename().unwrap_or("[No file]");
        let modified = if self.is_modified() { "[+]" } else { "" };

        match self.prompt_mode {
            PromptMode::GotoAddress => return format!("Goto offset: {}_", self.prompt_input),
            PromptMode::OpenFile => return format!("Open file: {}_", self.prompt_input),
            PromptMode::Command => return format!("M-x {}_", self.prompt_input),
            PromptMode::Off => {}
        }
        if let InputState::HexFirstDigit(first) = self.input_state {
            if let Some(h) = self.session.highlighted() {
                return format!(" Edit {:08X}: {}_", h, first);
            }
        }
        if let Some(ref msg) = self.status_message {
            return format!(" {}{} | {}", filename, modified, msg);
        }

        let Some(document) = self.session.document() else {
            return " [No file] | C-x C-f open  C-x C-c quit".to_string();
        };
        let window = self.session.window();
        let position = match self.session.highlighted_info() {
            Some(info) => Self::format_byte_info(&info),
            None if self.session.is_pending() || self.worker.is_busy() => "classifying...".to_string(),
            None => format!("{:08X}+{:X}", window.offset, window.length),
        };
        format!(
            " {}{} [{}] | {} | {:08X} bytes | {}",
            filename,
            modified,
            document.descriptor().tag,
            position,
            document.len(),
            window.encoding.name(),
        )
    }

    /// UIを描画
    pub fn draw(&mut self, frame: &mut Frame) {
        let size = frame.area();
        let cipher_height = if self.cipher_output.is_some() { 4 } else { 0 };

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),             // 領域マップ
                Constraint::Min(1),                // メイン
                Constraint::Length(cipher_height), // 暗号結果
                Constraint::Length(1),             // ステータス
            ])
            .split(size);

        self.draw_region_map(frame, layout[0]);
        self.draw_main(frame, layout[1]);

        if let Some((title, output)) = &self.cipher_output {
            let body = output.text.clone().unwrap_or_else(|| output.hex());
            let widget = Paragraph::new(body)
                .wrap(Wrap { trim: false })
                .block(Block::default().borders(Borders::TOP).title(format!(" {} ", title)));
            frame.render_widget(widget, layout[2]);
        }

        let status_widget = Paragraph::new(self.status_line())
            .style(Style::default().bg(Colors::STATUS_BG).fg(Colors::STATUS));
        frame.render_widget(status_widget, layout[3]);
    }

    fn draw_region_map(&self, frame: &mut Frame, area: Rect) {
        let (Some(document), Some(regions)) = (self.session.document(), self.session.regions()) else {
            return;
        };
        let map = RegionMap::new(regions, document.len())
            .window(self.session.window())
            .highlight(self.session.highlighted());
        frame.render_widget(map, area);
    }

    fn draw_main(&mut self, frame: &mut Frame, area: Rect) {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(HEX_PANE_WIDTH), Constraint::Min(0)])
            .split(area);

        let Some(view) = self.session.render() else {
            let msg = if self.session.document().is_none() {
                "No file loaded. C-x C-f to open a file."
            } else {
                "Classifying..."
            };
            frame.render_widget(Paragraph::new(msg), columns[0]);
            return;
        };

        let visible_rows = (columns[0].height as usize).saturating_sub(1);
        self.scroll_to_highlight(visible_rows, self.session.window().rows(Pane::Hex));

        let encoding = self.session.window().encoding;
        let hex_view = HexView::new(&view)
            .first_row(self.first_row)
            .encoding_name(encoding.name());
        frame.render_widget(hex_view, columns[0]);

        match self.side_panel {
            SidePanel::Binary => {
                // バイナリ欄は1行8バイトなので HEX欄の2倍の行数になる
                let binary = BinaryView::new(&view).first_row(self.first_row * 2);
                frame.render_widget(binary, columns[1]);
            }
            SidePanel::Metadata => {
                let widget = Paragraph::new(self.metadata_lines())
                    .wrap(Wrap { trim: false })
                    .block(Block::default().borders(Borders::LEFT).title(" Metadata "));
                frame.render_widget(widget, columns[1]);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::*;

    fn app_with(name: &str, data: Vec<u8>) -> App {
        let mut app = App::new(Config::default());
        app.load_bytes(name, data).unwrap();
        wait_classified(&mut app);
        app
    }

    fn wait_classified(app: &mut App) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while app.session().is_pending() && Instant::now() < deadline {
            app.poll_classification();
            std::thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn test_normalize_hex_char() {
        assert_eq!(App::normalize_hex_char('a'), Some('A'));
        assert_eq!(App::normalize_hex_char('９'), Some('9'));
        assert_eq!(App::normalize_hex_char('ｆ'), Some('F'));
        assert_eq!(App::normalize_hex_char('g'), None);
    }

    #[test]
    fn test_hex_input_edits_highlighted_byte() {
        let mut app = app_with("zeros.txt", vec![0; 32]);
        app.execute(Action::CursorRight); // ハイライト開始（オフセット0）
        assert_eq!(app.session().highlighted(), Some(0));

        app.execute(Action::InputHex('4'));
        assert_eq!(app.input_state, InputState::HexFirstDigit('4'));
        app.execute(Action::InputHex('1'));
        assert_eq!(app.input_state, InputState::Normal);

        let buffer = app.session().document().unwrap().buffer();
        assert_eq!(buffer.get(0), Some(0x41));
        assert_eq!(app.session().highlighted(), Some(1));
        assert!(app.is_modified());

        wait_classified(&mut app);
        assert!(app.session().render().is_some());
    }

    #[test]
    fn test_movement_bounds() {
        let mut app = app_with("data.txt", vec![b'a'; 40]);
        app.execute(Action::CursorDown);
        app.execute(Action::CursorUp);
        assert_eq!(app.session().highlighted(), Some(0));
        app.execute(Action::CursorDown);
        app.execute(Action::CursorDown);
        app.execute(Action::CursorDown);
        assert_eq!(app.session().highlighted(), Some(32));
        app.execute(Action::CursorEnd);
        assert_eq!(app.session().highlighted(), Some(39));
        app.execute(Action::CursorHome);
        assert_eq!(app.session().highlighted(), Some(32));
        app.execute(Action::GotoBeginning);
        assert_eq!(app.session().highlighted(), Some(0));
        app.execute(Action::GotoEnd);
        assert_eq!(app.session().highlighted(), Some(39));
    }

    #[test]
    fn test_commands() {
        let mut app = app_with("notes.txt", b"Attack at dawn".to_vec());

        app.dispatch_command("encrypt caesar 13");
        let (title, output) = app.cipher_output.clone().unwrap();
        assert_eq!(title, "caesar encrypt");
        assert_eq!(output.text.as_deref(), Some("Nggnpx ng qnja"));
        assert_eq!(app.session().document().unwrap().buffer().data(), b"Attack at dawn");

        app.dispatch_command("encrypt xor");
        assert!(app.status_message.as_deref().unwrap().contains("Invalid cipher key"));

        app.dispatch_command("length 8");
        assert_eq!(app.session().window().length, 8);

        app.dispatch_command("encoding sjis");
        assert_eq!(app.session().window().encoding, CharEncoding::ShiftJis);

        app.dispatch_command("frobnicate");
        assert!(app.status_message.as_deref().unwrap().starts_with("Unknown command"));
    }

    #[test]
    fn test_goto_out_of_range() {
        let mut app = app_with("data.txt", vec![0; 16]);
        app.goto_address("0x20");
        assert!(app.status_message.as_deref().unwrap().contains("exceeds"));
        assert_eq!(app.session().highlighted(), None);
        app.goto_address("15");
        assert_eq!(app.session().highlighted(), Some(15));
    }

    #[test]
    fn test_rejected_load_keeps_previous_file() {
        let mut app = app_with("data.txt", vec![0; 16]);
        assert!(app.load_bytes("photo.png", b"not a png".to_vec()).is_err());
        assert_eq!(app.filename(), Some("data.txt"));
    }
}
