mod state;
mod worker;

pub use state::App;
pub use worker::ClassifyWorker;

use crossterm::event::KeyCode;

/// 入力状態（HEX入力は2桁で1バイト）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputState {
    #[default]
    Normal,
    /// HEX入力の1桁目を入力済み
    HexFirstDigit(char),
}

/// プレフィックスキー状態（Emacs 2ストローク用）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PrefixKey {
    #[default]
    None,
    /// C-x を押した状態
    CtrlX,
}

/// 右側の欄の表示内容
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SidePanel {
    #[default]
    Binary,
    Metadata,
}

/// アプリケーションアクション
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Quit,

    // ハイライト移動
    CursorUp,
    CursorDown,
    CursorLeft,
    CursorRight,
    CursorHome,
    CursorEnd,
    PageUp,
    PageDown,
    GotoBeginning, // M-< バッファ先頭
    GotoEnd,       // M-> バッファ末尾
    StartGoto,     // M-g オフセット入力

    // 編集
    InputHex(char),

    // 表示
    ToggleEncoding,
    ToggleSidePanel,

    // プロンプト
    OpenFile,       // C-x C-f
    ExecuteCommand, // M-x

    // プレフィックスキー
    EnterCtrlX, // C-x を押した
    Cancel,     // C-g でキャンセル

    None,
}

/// キー修飾子
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyMod {
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
}

impl Action {
    /// キーコードからアクションに変換（Emacsキーバインド）
    pub fn from_key(key: KeyCode, mods: KeyMod) -> Self {
        let KeyMod { ctrl, shift, alt } = mods;

        match (key, ctrl, alt, shift) {
            // === Emacsプレフィックスキー ===
            (KeyCode::Char('x'), true, false, false) => Action::EnterCtrlX,

            // C-g: キャンセル
            (KeyCode::Char('g'), true, false, false) => Action::Cancel,
            (KeyCode::Esc, _, _, _) => Action::Cancel,

            // === Emacsカーソル移動 ===
            (KeyCode::Char('f'), true, false, false) => Action::CursorRight,
            (KeyCode::Char('b'), true, false, false) => Action::CursorLeft,
            (KeyCode::Char('n'), true, false, false) => Action::CursorDown,
            (KeyCode::Char('p'), true, false, false) => Action::CursorUp,
            (KeyCode::Char('a'), true, false, false) => Action::CursorHome,
            (KeyCode::Char('e'), true, false, false) => Action::CursorEnd,
            // C-v / M-v: ウィンドウを1ページ送る
            (KeyCode::Char('v'), true, false, false) => Action::PageDown,
            (KeyCode::Char('v'), false, true, false) => Action::PageUp,
            (KeyCode::Char('<'), false, true, _) => Action::GotoBeginning,
            (KeyCode::Char('>'), false, true, _) => Action::GotoEnd,
            // M-g: オフセットへ移動
            (KeyCode::Char('g'), false, true, false) => Action::StartGoto,
            // M-x: コマンド
            (KeyCode::Char('x'), false, true, false) => Action::ExecuteCommand,

            // 矢印キー
            (KeyCode::Up, false, false, _) => Action::CursorUp,
            (KeyCode::Down, false, false, _) => Action::CursorDown,
            (KeyCode::Left, false, false, _) => Action::CursorLeft,
            (KeyCode::Right, false, false, _) => Action::CursorRight,
            (KeyCode::Home, _, _, _) => Action::CursorHome,
            (KeyCode::End, _, _, _) => Action::CursorEnd,
            (KeyCode::PageUp, _, _, _) => Action::PageUp,
            (KeyCode::PageDown, _, _, _) => Action::PageDown,

            (KeyCode::Tab, false, false, _) => Action::ToggleSidePanel,

            // エンコーディング切替: F2
            (KeyCode::F(2), false, false, _) => Action::ToggleEncoding,

            _ => Action::None,
        }
    }

    /// C-x の後のキーを処理
    pub fn from_key_after_ctrl_x(key: KeyCode, mods: KeyMod) -> Self {
        let KeyMod { ctrl, .. } = mods;

        match (key, ctrl) {
            // C-x C-c: 終了
            (KeyCode::Char('c'), true) => Action::Quit,
            // C-x C-f: ファイルを開く
            (KeyCode::Char('f'), true) => Action::OpenFile,

            // その他は無効
            _ => Action::Cancel,
        }
    }
}
