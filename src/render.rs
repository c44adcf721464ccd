//! ウィンドウの描画（HEX・テキスト・バイナリの3欄）
//!
//! 描画は純粋関数で、同じ入力からは常に同じ出力になる。
//! 表示層はここで付けた領域の種類をそのまま使い、自分で分類しない。

use crate::encoding::{DecodedChar, decode_for_display};
use crate::region::{Region, RegionKind, kind_at};
use crate::window::{BINARY_ROW_WIDTH, HEX_ROW_WIDTH, Pane, ViewWindow};

/// ウィンドウ末尾をまたぐ文字を読むための余分なバイト数（UTF-8/UTF-16の最大長）
const LOOKAHEAD: usize = 4;

/// 描画された1セル
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    /// 絶対オフセット（詰め物のセルは None）
    pub offset: Option<usize>,
    pub text: String,
    pub kind: RegionKind,
    pub highlighted: bool,
}

impl Cell {
    fn padding(text: &str) -> Self {
        Self {
            offset: None,
            text: text.to_string(),
            kind: RegionKind::Unknown,
            highlighted: false,
        }
    }
}

/// 描画された1行
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedLine {
    /// 行の先頭の絶対オフセット
    pub offset: usize,
    pub cells: Vec<Cell>,
}

impl RenderedLine {
    /// アドレス文字列
    pub fn address(&self) -> String {
        format!("{:08X}", self.offset)
    }

    /// セルを区切り文字でつないだ本文
    pub fn body(&self, separator: &str) -> String {
        self.cells
            .iter()
            .map(|c| c.text.as_str())
            .collect::<Vec<_>>()
            .join(separator)
    }
}

/// 3欄の描画結果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedView {
    pub hex_lines: Vec<RenderedLine>,
    pub text_lines: Vec<RenderedLine>,
    pub binary_lines: Vec<RenderedLine>,
}

impl RenderedView {
    pub fn lines(&self, pane: Pane) -> &[RenderedLine] {
        match pane {
            Pane::Hex => &self.hex_lines,
            Pane::Text => &self.text_lines,
            Pane::Binary => &self.binary_lines,
        }
    }

    /// HEX+テキストのダンプ
    pub fn hex_dump(&self) -> String {
        self.hex_lines
            .iter()
            .zip(&self.text_lines)
            .map(|(hex, text)| format!("{}  {}  |{}|", hex.address(), hex.body(" "), text.body("")))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// バイナリのダンプ
    pub fn binary_dump(&self) -> String {
        self.binary_lines
            .iter()
            .map(|line| format!("{}  {}", line.address(), line.body(" ")))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// ウィンドウを描画する
pub fn render(
    data: &[u8],
    regions: &[Region],
    window: &ViewWindow,
    highlight: Option<usize>,
) -> RenderedView {
    let window = window.clamped(data.len());
    let mut view = RenderedView::default();

    // テキスト欄はウィンドウ全体を1つのデコーダで読み、行に切り分ける
    let decode_end = (window.end() + LOOKAHEAD).min(data.len());
    let decoded = decode_for_display(
        &data[window.offset..decode_end.max(window.offset)],
        window.encoding,
    );

    for row_start in (window.offset..window.end()).step_by(HEX_ROW_WIDTH) {
        let row_end = (row_start + HEX_ROW_WIDTH).min(window.end());
        view.hex_lines.push(byte_line(data, regions, highlight, row_start, row_end, HEX_ROW_WIDTH, |b| {
            format!("{b:02X}")
        }));
        let row_decoded = &decoded[row_start - window.offset..row_end - window.offset];
        view.text_lines.push(text_line(row_decoded, regions, highlight, row_start));
    }

    for row_start in (window.offset..window.end()).step_by(BINARY_ROW_WIDTH) {
        let row_end = (row_start + BINARY_ROW_WIDTH).min(window.end());
        view.binary_lines.push(byte_line(
            data,
            regions,
            highlight,
            row_start,
            row_end,
            BINARY_ROW_WIDTH,
            |b| format!("{b:08b}"),
        ));
    }

    view
}

/// 1バイト1セルの行（HEX・バイナリ）
fn byte_line(
    data: &[u8],
    regions: &[Region],
    highlight: Option<usize>,
    row_start: usize,
    row_end: usize,
    row_width: usize,
    format_byte: impl Fn(u8) -> String,
) -> RenderedLine {
    let mut cells: Vec<Cell> = (row_start..row_end)
        .map(|i| Cell {
            offset: Some(i),
            text: format_byte(data[i]),
            kind: kind_at(regions, i),
            highlighted: highlight == Some(i),
        })
        .collect();

    // 短い最終行は詰め物で桁を揃える
    let blank = " ".repeat(format_byte(0).len());
    cells.resize_with(row_width, || Cell::padding(&blank));

    RenderedLine {
        offset: row_start,
        cells,
    }
}

/// テキスト欄の行
///
/// `decoded` はウィンドウ全体のデコード結果のうちこの行の分。文字の先頭バイトの
/// セルに文字を置き、継続バイトのセルは空にする。前の行の文字の続きで始まる
/// セルは空白になる。
fn text_line(
    decoded: &[Option<DecodedChar>],
    regions: &[Region],
    highlight: Option<usize>,
    row_start: usize,
) -> RenderedLine {
    let row_len = decoded.len();
    let mut cells = Vec::with_capacity(HEX_ROW_WIDTH);

    let mut idx = 0;
    while idx < row_len {
        let abs = row_start + idx;
        let Some(dc) = &decoded[idx] else {
            // 前の行からはみ出した文字の継続バイト
            cells.push(Cell {
                offset: Some(abs),
                text: " ".to_string(),
                kind: kind_at(regions, abs),
                highlighted: highlight == Some(abs),
            });
            idx += 1;
            continue;
        };

        let bytes_in_row = dc.byte_len.min(row_len - idx);
        // 行内に収まる文字は占有バイト数の桁まで空白で埋める
        let mut text = dc.display.clone();
        if bytes_in_row > dc.width {
            text.push_str(&" ".repeat(bytes_in_row - dc.width));
        }

        let char_end = abs + dc.byte_len;
        cells.push(Cell {
            offset: Some(abs),
            text,
            kind: kind_at(regions, abs),
            highlighted: highlight.is_some_and(|h| h >= abs && h < char_end),
        });
        for i in abs + 1..abs + bytes_in_row {
            cells.push(Cell {
                offset: Some(i),
                text: String::new(),
                kind: kind_at(regions, i),
                highlighted: highlight == Some(i),
            });
        }
        idx += bytes_in_row;
    }

    cells.resize_with(HEX_ROW_WIDTH, || Cell::padding(" "));

    RenderedLine {
        offset: row_start,
        cells,
    }
}

/// 1バイトの詳細（ツールチップ相当）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ByteInfo {
    pub offset: usize,
    pub value: u8,
    pub hex: String,
    pub binary: String,
    /// 表示可能なASCIIならその文字、それ以外は '.'
    pub ascii: char,
    pub kind: RegionKind,
}

pub fn byte_info(data: &[u8], regions: &[Region], offset: usize) -> Option<ByteInfo> {
    let value = *data.get(offset)?;
    Some(ByteInfo {
        offset,
        value,
        hex: format!("{value:02X}"),
        binary: format!("{value:08b}"),
        ascii: if (0x20..=0x7E).contains(&value) { value as char } else { '.' },
        kind: kind_at(regions, offset),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::CharEncoding;
    use crate::region::{ByteRange, RawRanges, resolve};

    fn utf8_window(offset: usize, length: usize) -> ViewWindow {
        ViewWindow::new(offset, length, CharEncoding::Utf8)
    }

    #[test]
    fn test_row_layout() {
        let data: Vec<u8> = (0..40).collect();
        let regions = resolve(data.len(), &RawRanges::default());
        let view = render(&data, &regions, &utf8_window(0, 40), None);

        assert_eq!(view.hex_lines.len(), 3);
        assert_eq!(view.text_lines.len(), 3);
        assert_eq!(view.binary_lines.len(), 5);
        assert_eq!(view.hex_lines[1].address(), "00000010");
        assert_eq!(view.hex_lines[0].cells[10].text, "0A");
        assert_eq!(view.binary_lines[0].cells[3].text, "00000011");

        // 短い最終行も16セル
        let last = &view.hex_lines[2];
        assert_eq!(last.cells.len(), HEX_ROW_WIDTH);
        assert_eq!(last.cells[8].offset, None);
        assert_eq!(last.cells[8].text, "  ");
        assert_eq!(view.text_lines[2].cells.len(), HEX_ROW_WIDTH);
    }

    #[test]
    fn test_region_and_highlight_metadata() {
        let data = vec![0u8; 32];
        let raw = RawRanges {
            header: vec![ByteRange::new(0, 3)],
            ..Default::default()
        };
        let regions = resolve(data.len(), &raw);
        let view = render(&data, &regions, &utf8_window(0, 32), Some(5));

        let cells = &view.hex_lines[0].cells;
        assert_eq!(cells[3].kind, RegionKind::Header);
        assert_eq!(cells[4].kind, RegionKind::Content);
        assert!(cells[5].highlighted);
        assert_eq!(cells.iter().filter(|c| c.highlighted).count(), 1);
        assert!(view.binary_lines[0].cells[5].highlighted);
        assert!(view.text_lines[0].cells[5].highlighted);
    }

    #[test]
    fn test_text_column_decodes_rows() {
        let data = b"Hello, world!\n\x00\x01ABC".to_vec();
        let regions = resolve(data.len(), &RawRanges::default());
        let view = render(&data, &regions, &utf8_window(0, data.len()), None);

        assert_eq!(view.text_lines[0].body(""), "Hello, world!...");
        assert_eq!(view.text_lines[1].body(""), "ABC             ");
    }

    #[test]
    fn test_multibyte_across_row_boundary() {
        // 15バイトのASCIIの後に「あ」(3バイト)が行をまたぐ
        let mut data = vec![b'a'; 15];
        data.extend_from_slice("あ".as_bytes());
        data.extend_from_slice(b"z");
        let regions = resolve(data.len(), &RawRanges::default());
        let view = render(&data, &regions, &utf8_window(0, data.len()), Some(16));

        let first = &view.text_lines[0];
        assert_eq!(first.cells[15].text, "あ");
        assert!(first.cells[15].highlighted);

        let second = &view.text_lines[1];
        assert_eq!(second.cells[0].text, " ");
        assert_eq!(second.cells[1].text, " ");
        assert_eq!(second.cells[2].text, "z");
        assert_eq!(second.cells[2].offset, Some(18));
    }

    #[test]
    fn test_shift_jis_text() {
        let data = vec![0x82, 0xA0, 0x41];
        let regions = resolve(data.len(), &RawRanges::default());
        let window = ViewWindow::new(0, 3, CharEncoding::ShiftJis);
        let view = render(&data, &regions, &window, None);

        let cells = &view.text_lines[0].cells;
        assert_eq!(cells[0].text, "あ");
        assert_eq!(cells[1].text, "");
        assert_eq!(cells[2].text, "A");
    }

    #[test]
    fn test_shift_jis_glyph_across_row_boundary() {
        // 82 82 | 82 82 | 82 A0: 最後の「あ」が15-16バイト目で行をまたぐ
        let mut data = vec![b'A'; 11];
        data.extend_from_slice(&[0x82, 0x82, 0x82, 0x82, 0x82, 0xA0]);
        data.push(b'Z');
        let regions = resolve(data.len(), &RawRanges::default());
        let window = ViewWindow::new(0, data.len(), CharEncoding::ShiftJis);
        let view = render(&data, &regions, &window, None);

        assert_eq!(view.text_lines[0].cells[15].text, "あ");
        let second = &view.text_lines[1].cells;
        assert_eq!(second[0].offset, Some(16));
        assert_eq!(second[0].text, " ");
        assert_eq!(second[1].offset, Some(17));
        assert_eq!(second[1].text, "Z");
    }

    #[test]
    fn test_glyph_across_window_end() {
        // ウィンドウ末尾の先頭バイトも後続バイトを読んで1文字になる
        let mut data = vec![b'a'; 3];
        data.extend_from_slice("あ".as_bytes());
        let regions = resolve(data.len(), &RawRanges::default());
        let view = render(&data, &regions, &utf8_window(0, 4), None);
        assert_eq!(view.text_lines[0].cells[3].text, "あ");
    }

    #[test]
    fn test_window_slice() {
        let data: Vec<u8> = (0..=255).collect();
        let regions = resolve(data.len(), &RawRanges::default());
        let view = render(&data, &regions, &utf8_window(100, 20), None);

        assert_eq!(view.hex_lines.len(), 2);
        assert_eq!(view.hex_lines[0].offset, 100);
        assert_eq!(view.hex_lines[0].cells[0].text, "64");
        assert_eq!(view.hex_lines[1].offset, 116);
        assert_eq!(view.hex_lines[1].cells[3].offset, Some(119));
        assert_eq!(view.hex_lines[1].cells[4].offset, None);
    }

    #[test]
    fn test_render_is_pure() {
        let data = "text with ü and 日本".as_bytes().to_vec();
        let regions = resolve(data.len(), &RawRanges::default());
        let w = utf8_window(0, data.len());
        assert_eq!(render(&data, &regions, &w, Some(3)), render(&data, &regions, &w, Some(3)));
    }

    #[test]
    fn test_empty_buffer_renders_nothing() {
        let view = render(&[], &[], &utf8_window(0, 256), None);
        assert!(view.hex_lines.is_empty());
        assert!(view.binary_lines.is_empty());
    }

    #[test]
    fn test_dump_format() {
        let data = b"AB".to_vec();
        let regions = resolve(data.len(), &RawRanges::default());
        let view = render(&data, &regions, &utf8_window(0, 2), None);
        let dump = view.hex_dump();
        assert!(dump.starts_with("00000000  41 42    "));
        assert!(dump.ends_with("|AB              |"));
        assert_eq!(view.binary_dump(), format!("00000000  01000001 01000010{}", " ".repeat(6 * 9)));
    }

    #[test]
    fn test_byte_info() {
        let data = vec![0x41, 0x0A];
        let regions = resolve(data.len(), &RawRanges::default());
        let info = byte_info(&data, &regions, 0).unwrap();
        assert_eq!(info.hex, "41");
        assert_eq!(info.binary, "01000001");
        assert_eq!(info.ascii, 'A');
        assert_eq!(byte_info(&data, &regions, 1).unwrap().ascii, '.');
        assert!(byte_info(&data, &regions, 2).is_none());
    }
}
