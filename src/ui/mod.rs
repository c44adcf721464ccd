mod binary_view;
mod hex_view;
mod region_map;

pub use binary_view::BinaryView;
pub use hex_view::HexView;
pub use region_map::RegionMap;

use ratatui::style::{Color, Modifier, Style};

use crate::region::RegionKind;
use crate::render::Cell;

/// 配色
pub struct Colors;

impl Colors {
    pub const ADDR: Color = Color::DarkGray;
    pub const HEADER: Color = Color::Cyan;
    pub const HIGHLIGHT: Color = Color::Black;
    pub const HIGHLIGHT_BG: Color = Color::Yellow;
    pub const STATUS: Color = Color::White;
    pub const STATUS_BG: Color = Color::DarkGray;
    pub const LABEL: Color = Color::Gray;

    /// 領域の種類ごとの文字色
    pub fn region(kind: RegionKind) -> Color {
        match kind {
            RegionKind::FileName => Color::Magenta,
            RegionKind::Header => Color::Cyan,
            RegionKind::Sensitive => Color::LightRed,
            RegionKind::Content => Color::White,
            RegionKind::Unknown => Color::DarkGray,
        }
    }

    /// 領域マップの背景色
    pub fn region_bg(kind: RegionKind) -> Color {
        match kind {
            RegionKind::FileName => Color::Magenta,
            RegionKind::Header => Color::Blue,
            RegionKind::Sensitive => Color::Red,
            RegionKind::Content => Color::Gray,
            RegionKind::Unknown => Color::Black,
        }
    }
}

/// セルの表示スタイル（ハイライトは領域の色より優先）
pub fn cell_style(cell: &Cell) -> Style {
    if cell.highlighted {
        Style::default()
            .fg(Colors::HIGHLIGHT)
            .bg(Colors::HIGHLIGHT_BG)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Colors::region(cell.kind))
    }
}
