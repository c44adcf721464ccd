use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    widgets::Widget,
};
use unicode_width::UnicodeWidthStr;

use super::{Colors, cell_style};
use crate::render::{RenderedLine, RenderedView};
use crate::window::HEX_ROW_WIDTH;

/// HEX+テキスト表示ウィジェット
///
/// 描画済みの行をそのまま並べるだけで、領域の判定はしない。
pub struct HexView<'a> {
    view: &'a RenderedView,
    /// 先頭に表示する行
    first_row: usize,
    /// エンコーディング名（ヘッダーに表示）
    encoding_name: &'a str,
}

impl<'a> HexView<'a> {
    pub fn new(view: &'a RenderedView) -> Self {
        Self {
            view,
            first_row: 0,
            encoding_name: "",
        }
    }

    pub fn first_row(mut self, row: usize) -> Self {
        self.first_row = row;
        self
    }

    pub fn encoding_name(mut self, name: &'a str) -> Self {
        self.encoding_name = name;
        self
    }

    /// 1行分を描画
    fn render_row(&self, hex: &RenderedLine, text: &RenderedLine, area: Rect, buf: &mut Buffer) {
        let right = area.x + area.width;
        let mut x = area.x;
        let y = area.y;

        let addr = hex.address();
        buf.set_string(x, y, &addr, Style::default().fg(Colors::ADDR));
        x += addr.len() as u16 + 2;

        for cell in &hex.cells {
            if x >= right {
                return;
            }
            buf.set_string(x, y, &cell.text, cell_style(cell));
            x += 3; // "XX "
        }

        x += 1; // 区切りスペース

        // 継続バイトのセルは空文字列なので幅を持たない
        for cell in &text.cells {
            if x >= right {
                return;
            }
            if cell.text.is_empty() {
                continue;
            }
            buf.set_string(x, y, &cell.text, cell_style(cell));
            x += cell.text.width() as u16;
        }
    }
}

impl Widget for HexView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 {
            return;
        }

        let header = format!(
            "{:8}  {}  Text ({})",
            "Offset",
            (0..HEX_ROW_WIDTH)
                .map(|i| format!("{:02X}", i))
                .collect::<Vec<_>>()
                .join(" "),
            self.encoding_name
        );
        buf.set_string(
            area.x,
            area.y,
            &header,
            Style::default()
                .fg(Colors::HEADER)
                .add_modifier(Modifier::BOLD),
        );

        let visible_rows = (area.height as usize).saturating_sub(1); // ヘッダー分を引く
        let rows = self
            .view
            .hex_lines
            .iter()
            .zip(&self.view.text_lines)
            .skip(self.first_row)
            .take(visible_rows);
        for (row, (hex, text)) in rows.enumerate() {
            let row_area = Rect {
                x: area.x,
                y: area.y + 1 + row as u16,
                width: area.width,
                height: 1,
            };
            self.render_row(hex, text, row_area, buf);
        }
    }
}
