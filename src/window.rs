//! 表示ウィンドウとオフセット変換

use crate::encoding::CharEncoding;

/// HEX/テキスト欄の1行あたりのバイト数
pub const HEX_ROW_WIDTH: usize = 16;
/// バイナリ欄の1行あたりのバイト数
pub const BINARY_ROW_WIDTH: usize = 8;

/// 描画される欄
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Pane {
    #[default]
    Hex,
    Text,
    Binary,
}

impl Pane {
    pub fn row_width(&self) -> usize {
        match self {
            Pane::Hex | Pane::Text => HEX_ROW_WIDTH,
            Pane::Binary => BINARY_ROW_WIDTH,
        }
    }
}

/// 表示中のバッファ範囲とテキスト欄のエンコーディング
///
/// 値として丸ごと置き換える。変更系のメソッドはすべて新しい値を返す。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewWindow {
    pub offset: usize,
    pub length: usize,
    pub encoding: CharEncoding,
}

impl ViewWindow {
    pub fn new(offset: usize, length: usize, encoding: CharEncoding) -> Self {
        Self {
            offset,
            length,
            encoding,
        }
    }

    /// 終端（含まない）
    pub fn end(&self) -> usize {
        self.offset + self.length
    }

    pub fn contains(&self, pos: usize) -> bool {
        pos >= self.offset && pos < self.end()
    }

    /// `offset + length <= buffer_len` になるよう切り詰める
    pub fn clamped(self, buffer_len: usize) -> Self {
        let length = self.length.min(buffer_len);
        let offset = self.offset.min(buffer_len - length);
        Self {
            offset,
            length,
            ..self
        }
    }

    /// 指定オフセットから表示する
    pub fn scrubbed_to(self, offset: usize, buffer_len: usize) -> Self {
        Self { offset, ..self }.clamped(buffer_len)
    }

    pub fn with_length(self, length: usize, buffer_len: usize) -> Self {
        Self { length, ..self }.clamped(buffer_len)
    }

    pub fn with_encoding(self, encoding: CharEncoding) -> Self {
        Self { encoding, ..self }
    }

    /// ページダウン
    pub fn page_down(self, buffer_len: usize) -> Self {
        self.scrubbed_to(self.offset + self.length, buffer_len)
    }

    /// ページアップ
    pub fn page_up(self, buffer_len: usize) -> Self {
        self.scrubbed_to(self.offset.saturating_sub(self.length), buffer_len)
    }

    /// ハイライト位置を中央に置く
    pub fn recentered(self, highlight: usize, buffer_len: usize) -> Self {
        self.scrubbed_to(highlight.saturating_sub(self.length / 2), buffer_len)
    }

    /// ハイライト位置が範囲外のときだけ中央に置き直す
    pub fn revealing(self, highlight: usize, buffer_len: usize) -> Self {
        if self.contains(highlight) {
            self.clamped(buffer_len)
        } else {
            self.recentered(highlight, buffer_len)
        }
    }

    /// 欄の行数
    pub fn rows(&self, pane: Pane) -> usize {
        self.length.div_ceil(pane.row_width())
    }
}

/// 描画された欄の中の位置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewPosition {
    pub row: usize,
    pub col: usize,
}

/// ウィンドウ外のオフセット
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutOfWindow {
    pub offset: usize,
}

/// 絶対オフセットを欄内の位置に変換する
pub fn to_view_position(
    offset: usize,
    window: &ViewWindow,
    pane: Pane,
) -> Result<ViewPosition, OutOfWindow> {
    if !window.contains(offset) {
        return Err(OutOfWindow { offset });
    }
    let rel = offset - window.offset;
    let width = pane.row_width();
    Ok(ViewPosition {
        row: rel / width,
        col: rel % width,
    })
}

/// 欄内の位置を絶対オフセットに変換する（詰め物のセルなら None）
pub fn to_absolute_offset(position: ViewPosition, window: &ViewWindow, pane: Pane) -> Option<usize> {
    let width = pane.row_width();
    if position.col >= width {
        return None;
    }
    let offset = window.offset + position.row * width + position.col;
    window.contains(offset).then_some(offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window(offset: usize, length: usize) -> ViewWindow {
        ViewWindow::new(offset, length, CharEncoding::Utf8)
    }

    #[test]
    fn test_round_trip_every_offset() {
        let w = window(37, 100);
        for pane in [Pane::Hex, Pane::Text, Pane::Binary] {
            for offset in w.offset..w.end() {
                let pos = to_view_position(offset, &w, pane).unwrap();
                assert_eq!(to_absolute_offset(pos, &w, pane), Some(offset));
            }
        }
    }

    #[test]
    fn test_out_of_window() {
        let w = window(16, 32);
        assert_eq!(to_view_position(15, &w, Pane::Hex), Err(OutOfWindow { offset: 15 }));
        assert_eq!(to_view_position(48, &w, Pane::Hex), Err(OutOfWindow { offset: 48 }));
        assert_eq!(
            to_view_position(33, &w, Pane::Binary),
            Ok(ViewPosition { row: 2, col: 1 })
        );
    }

    #[test]
    fn test_absolute_offset_rejects_padding() {
        let w = window(0, 20);
        assert_eq!(to_absolute_offset(ViewPosition { row: 1, col: 3 }, &w, Pane::Hex), Some(19));
        assert_eq!(to_absolute_offset(ViewPosition { row: 1, col: 4 }, &w, Pane::Hex), None);
        assert_eq!(to_absolute_offset(ViewPosition { row: 0, col: 16 }, &w, Pane::Hex), None);
    }

    #[test]
    fn test_clamped() {
        assert_eq!(window(90, 32).clamped(100), window(68, 32));
        assert_eq!(window(5, 32).clamped(10), window(0, 10));
        assert_eq!(window(5, 32).clamped(0), window(0, 0));
    }

    #[test]
    fn test_recenter_outside_highlight() {
        let w = window(0, 64).revealing(500, 1000);
        assert_eq!(w.offset, 468);
        assert!(w.contains(500));

        // 末尾付近は [0, len - length] に収まる
        let w = window(0, 64).revealing(990, 1000);
        assert_eq!(w.offset, 936);
        assert!(w.contains(990));

        // 先頭付近は 0
        let w = window(500, 64).revealing(10, 1000);
        assert_eq!(w.offset, 0);
    }

    #[test]
    fn test_revealing_keeps_visible_window() {
        let w = window(100, 64);
        assert_eq!(w.revealing(120, 1000), w);
    }

    #[test]
    fn test_paging() {
        let w = window(0, 64);
        assert_eq!(w.page_down(100).offset, 36);
        assert_eq!(w.page_down(100).page_up(100).offset, 0);
    }

    #[test]
    fn test_rows() {
        assert_eq!(window(0, 33).rows(Pane::Hex), 3);
        assert_eq!(window(0, 33).rows(Pane::Binary), 5);
        assert_eq!(window(0, 0).rows(Pane::Hex), 0);
    }
}
