use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    widgets::Widget,
};

use super::{Colors, cell_style};
use crate::render::RenderedView;

/// バイナリ表示ウィジェット（1行8バイト）
pub struct BinaryView<'a> {
    view: &'a RenderedView,
    first_row: usize,
}

impl<'a> BinaryView<'a> {
    pub fn new(view: &'a RenderedView) -> Self {
        Self { view, first_row: 0 }
    }

    pub fn first_row(mut self, row: usize) -> Self {
        self.first_row = row;
        self
    }
}

impl Widget for BinaryView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 {
            return;
        }
        buf.set_string(
            area.x,
            area.y,
            "Binary",
            Style::default()
                .fg(Colors::HEADER)
                .add_modifier(Modifier::BOLD),
        );

        let right = area.x + area.width;
        let visible_rows = (area.height as usize).saturating_sub(1);
        for (row, line) in self
            .view
            .binary_lines
            .iter()
            .skip(self.first_row)
            .take(visible_rows)
            .enumerate()
        {
            let y = area.y + 1 + row as u16;
            let mut x = area.x;
            let addr = line.address();
            buf.set_string(x, y, &addr, Style::default().fg(Colors::ADDR));
            x += addr.len() as u16 + 2;

            for cell in &line.cells {
                if x >= right {
                    break;
                }
                buf.set_string(x, y, &cell.text, cell_style(cell));
                x += cell.text.len() as u16 + 1;
            }
        }
    }
}
