use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    widgets::Widget,
};

use super::Colors;
use crate::region::{Region, kind_at};
use crate::window::ViewWindow;

/// バッファ全体の領域を1行に縮めて表示するウィジェット
///
/// 表示中のウィンドウを下線、ハイライト位置を `|` で示す。
pub struct RegionMap<'a> {
    regions: &'a [Region],
    len: usize,
    window: Option<ViewWindow>,
    highlight: Option<usize>,
}

impl<'a> RegionMap<'a> {
    pub fn new(regions: &'a [Region], len: usize) -> Self {
        Self {
            regions,
            len,
            window: None,
            highlight: None,
        }
    }

    pub fn window(mut self, window: ViewWindow) -> Self {
        self.window = Some(window);
        self
    }

    pub fn highlight(mut self, highlight: Option<usize>) -> Self {
        self.highlight = highlight;
        self
    }

    /// 列が表すバイト範囲 [start, end)
    fn column_span(&self, col: usize, width: usize) -> (usize, usize) {
        let start = col * self.len / width;
        let end = ((col + 1) * self.len / width).max(start + 1);
        (start, end)
    }
}

impl Widget for RegionMap<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let width = area.width as usize;
        if width == 0 || area.height == 0 || self.len == 0 {
            return;
        }

        for col in 0..width {
            let (start, end) = self.column_span(col, width);
            if start >= self.len {
                break;
            }
            let kind = kind_at(self.regions, start);
            let mut style = Style::default().bg(Colors::region_bg(kind)).fg(Colors::HIGHLIGHT);
            let in_window = self
                .window
                .is_some_and(|w| w.length > 0 && start < w.end() && end > w.offset);
            if in_window {
                style = style.add_modifier(Modifier::UNDERLINED);
            }
            let symbol = match self.highlight {
                Some(h) if h >= start && h < end => "|",
                _ => " ",
            };
            buf.set_string(area.x + col as u16, area.y, symbol, style);
        }
    }
}
