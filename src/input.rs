//! Input plumbing: normalized events, click targets, and pixel → cell math.
//!
//! Nothing here knows about the quiz. Screens register targets while they
//! render; the mouse handler in main.rs hit-tests against them.

use ratzilla::ratatui::layout::Rect;

/// Keyboard and pointer input, normalized.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// A key press. Enter arrives as `'\n'`, Esc as `'q'`.
    Key(char),
    /// A click/tap on a registered target, identified by its action ID.
    Click(u16),
}

/// A clickable region in terminal cell coordinates.
#[derive(Debug, Clone)]
pub struct ClickTarget {
    pub rect: Rect,
    pub action_id: u16,
}

/// Targets registered during the last frame, plus the terminal size they
/// were laid out for.
pub struct ClickState {
    pub targets: Vec<ClickTarget>,
    pub terminal_cols: u16,
    pub terminal_rows: u16,
}

impl ClickState {
    pub fn new() -> Self {
        Self {
            targets: Vec::new(),
            terminal_cols: 0,
            terminal_rows: 0,
        }
    }

    /// Called at the start of every frame.
    pub fn clear_targets(&mut self) {
        self.targets.clear();
    }

    pub fn add_click_target(&mut self, rect: Rect, action_id: u16) {
        self.targets.push(ClickTarget { rect, action_id });
    }

    /// Register a full-width row inside `area`. Rows outside `area` are dropped.
    pub fn add_row_target(&mut self, area: Rect, row: u16, action_id: u16) {
        if row >= area.y && row < area.y + area.height {
            self.add_click_target(Rect::new(area.x, row, area.width, 1), action_id);
        }
    }

    /// Action ID under a cell. When targets overlap, the one registered
    /// last wins.
    pub fn hit_test(&self, col: u16, row: u16) -> Option<u16> {
        self.targets.iter().rev().find_map(|t| {
            let r = &t.rect;
            if col >= r.x && col < r.x + r.width && row >= r.y && row < r.y + r.height {
                Some(t.action_id)
            } else {
                None
            }
        })
    }
}

/// Phone-width screens drop side borders.
pub fn is_narrow_layout(width: u16) -> bool {
    width < 60
}

/// Pixel Y (relative to the grid's top edge) → terminal row.
///
/// `None` when the click is outside the grid or the grid has no size yet.
pub fn pixel_y_to_row(click_y: f64, grid_height: f64, terminal_rows: u16) -> Option<u16> {
    pixel_to_cell(click_y, grid_height, terminal_rows)
}

/// Pixel X (relative to the grid's left edge) → terminal column.
pub fn pixel_x_to_col(click_x: f64, grid_width: f64, terminal_cols: u16) -> Option<u16> {
    pixel_to_cell(click_x, grid_width, terminal_cols)
}

fn pixel_to_cell(offset: f64, extent: f64, cells: u16) -> Option<u16> {
    if extent <= 0.0 || cells == 0 || offset < 0.0 {
        return None;
    }
    let cell = (offset / (extent / cells as f64)) as u16;
    if cell >= cells {
        None
    } else {
        Some(cell)
    }
}
