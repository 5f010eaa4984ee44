use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Layout utilities for TUI components
pub mod layout {
    use super::*;

    /// Create a centered rectangle with given width and height
    pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
        let width = width.min(area.width);
        let height = height.min(area.height);

        let popup_layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length((area.height.saturating_sub(height)) / 2),
                Constraint::Length(height),
                Constraint::Min(0),
            ])
            .split(area);

        Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Length((area.width.saturating_sub(width)) / 2),
                Constraint::Length(width),
                Constraint::Min(0),
            ])
            .split(popup_layout[1])[1]
    }

    /// Whether a terminal cell lies inside an area
    pub fn contains(area: Rect, column: u16, row: u16) -> bool {
        column >= area.x
            && column < area.x.saturating_add(area.width)
            && row >= area.y
            && row < area.y.saturating_add(area.height)
    }
}

/// Text utilities
pub mod text {
    use unicode_width::UnicodeWidthStr;

    /// Pad or truncate to an exact display width
    pub fn fit(text: &str, width: usize) -> String {
        if text.width() <= width {
            return format!("{:<width$}", text, width = width);
        }
        let mut out = String::new();
        for ch in text.chars() {
            if out.width() + 1 >= width {
                break;
            }
            out.push(ch);
        }
        out.push('…');
        out
    }
}
