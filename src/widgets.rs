//! Clickable line list shared by the home screen and every quiz screen.
//!
//! Rendering and click registration live together: a line added with
//! [`ClickableList::push_clickable`] carries its action ID, and
//! [`ClickableList::register_targets`] works out which screen rows it landed
//! on, wrap included.

use ratzilla::ratatui::layout::Rect;
use ratzilla::ratatui::text::Line;

use crate::input::ClickState;

/// Lines for a `Paragraph`, some of them bound to action IDs.
///
/// ```ignore
/// let mut cl = ClickableList::new();
/// cl.push(Line::from("問題"));
/// cl.push_clickable(Line::from(" [1] 外来生物"), OPTION_BASE);
/// cl.register_targets(area, &mut cs, 1, 1, 0, inner_width);
/// f.render_widget(Paragraph::new(cl.into_lines()).block(block), area);
/// ```
pub struct ClickableList<'a> {
    lines: Vec<Line<'a>>,
    /// `(line_index, action_id)`
    actions: Vec<(u16, u16)>,
}

impl<'a> ClickableList<'a> {
    pub fn new() -> Self {
        Self {
            lines: Vec::new(),
            actions: Vec::new(),
        }
    }

    pub fn push(&mut self, line: Line<'a>) {
        self.lines.push(line);
    }

    /// The target follows the line, so lines inserted above it shift it down.
    pub fn push_clickable(&mut self, line: Line<'a>, action_id: u16) {
        self.actions.push((self.lines.len() as u16, action_id));
        self.lines.push(line);
    }

    pub fn into_lines(self) -> Vec<Line<'a>> {
        self.lines
    }

    /// Register a row target for every visual row a clickable line occupies.
    ///
    /// * `top_offset` / `bottom_offset`: rows taken by borders above/below.
    /// * `scroll`: visual rows scrolled off the top.
    /// * `inner_width`: wrap width. `0` means no wrapping (one row per line).
    pub fn register_targets(
        &self,
        area: Rect,
        cs: &mut ClickState,
        top_offset: u16,
        bottom_offset: u16,
        scroll: u16,
        inner_width: u16,
    ) {
        let content_y = area.y + top_offset;
        let content_end = area.y + area.height.saturating_sub(bottom_offset);

        let mut starts: Vec<u16> = Vec::with_capacity(self.lines.len());
        let mut heights: Vec<u16> = Vec::with_capacity(self.lines.len());
        let mut cumulative: u16 = 0;
        for line in &self.lines {
            let h = if inner_width == 0 {
                1
            } else {
                let w = line.width();
                if w <= inner_width as usize {
                    1
                } else {
                    w.div_ceil(inner_width as usize) as u16
                }
            };
            starts.push(cumulative);
            heights.push(h);
            cumulative += h;
        }

        for &(line_idx, action_id) in &self.actions {
            let li = line_idx as usize;
            for r in 0..heights[li] {
                let visual = starts[li] + r;
                if visual < scroll {
                    continue;
                }
                let row = content_y + (visual - scroll);
                if row >= content_end {
                    break;
                }
                cs.add_row_target(area, row, action_id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn targets_skip_plain_lines() {
        let mut cl = ClickableList::new();
        cl.push(Line::from("問題文"));
        cl.push_clickable(Line::from(" [1] a"), 30);
        cl.push_clickable(Line::from(" [2] b"), 31);
        cl.push(Line::from("footer"));

        let area = Rect::new(0, 5, 80, 10);
        let mut cs = ClickState::new();
        cl.register_targets(area, &mut cs, 1, 1, 0, 0);

        assert_eq!(cs.targets.len(), 2);
        assert_eq!(cs.hit_test(10, 7), Some(30));
        assert_eq!(cs.hit_test(10, 8), Some(31));
        assert_eq!(cs.hit_test(10, 6), None);
        assert_eq!(cs.hit_test(10, 9), None);
    }

    #[test]
    fn scrolled_lines_not_registered() {
        let mut cl = ClickableList::new();
        for i in 0..4 {
            cl.push_clickable(Line::from(format!("item {}", i)), 100 + i);
        }
        let area = Rect::new(0, 10, 80, 5);
        let mut cs = ClickState::new();
        cl.register_targets(area, &mut cs, 0, 1, 2, 0);

        assert_eq!(cs.targets.len(), 2);
        assert_eq!(cs.hit_test(0, 10), Some(102));
        assert_eq!(cs.hit_test(0, 11), Some(103));
    }

    #[test]
    fn clipped_by_bottom_border() {
        let mut cl = ClickableList::new();
        for i in 0..20 {
            cl.push_clickable(Line::from(format!("item {}", i)), 50 + i as u16);
        }
        let area = Rect::new(0, 0, 80, 5);
        let mut cs = ClickState::new();
        cl.register_targets(area, &mut cs, 1, 1, 0, 0);

        assert_eq!(cs.targets.len(), 3);
        assert_eq!(cs.hit_test(0, 3), Some(52));
        assert_eq!(cs.hit_test(0, 4), None);
    }

    #[test]
    fn empty_list_registers_nothing() {
        let cl: ClickableList = ClickableList::new();
        let mut cs = ClickState::new();
        cl.register_targets(Rect::new(0, 0, 80, 10), &mut cs, 1, 1, 0, 0);
        assert!(cs.targets.is_empty());
        assert!(cl.into_lines().is_empty());
    }

    #[test]
    fn wrapped_question_pushes_options_down() {
        let mut cl = ClickableList::new();
        cl.push(Line::from("12345678901234567890"));
        cl.push_clickable(Line::from("opt"), 30);

        let area = Rect::new(0, 0, 12, 10);
        let mut cs = ClickState::new();
        cl.register_targets(area, &mut cs, 0, 0, 0, 10);

        assert_eq!(cs.hit_test(5, 0), None);
        assert_eq!(cs.hit_test(5, 1), None);
        assert_eq!(cs.hit_test(5, 2), Some(30));
    }

    #[test]
    fn wrapped_option_clickable_on_every_row() {
        let mut cl = ClickableList::new();
        cl.push_clickable(Line::from("123456789012345678901234567890"), 42);

        let area = Rect::new(0, 0, 12, 10);
        let mut cs = ClickState::new();
        cl.register_targets(area, &mut cs, 0, 0, 0, 10);

        for row in 0..3 {
            assert_eq!(cs.hit_test(5, row), Some(42));
        }
        assert_eq!(cs.hit_test(5, 3), None);
    }

    #[test]
    fn cjk_width_counts_double() {
        // 6 full-width chars = 12 columns → 2 rows at width 10.
        let mut cl = ClickableList::new();
        cl.push(Line::from("外来生物の森"));
        cl.push_clickable(Line::from("次へ"), 50);

        let area = Rect::new(0, 0, 10, 10);
        let mut cs = ClickState::new();
        cl.register_targets(area, &mut cs, 0, 0, 0, 10);
        assert_eq!(cs.hit_test(0, 2), Some(50));
    }
}
