//! Split-pane width controller for the three-column layout.
//!
//! Each divider owns the width of one side pane. A drag is anchored to the
//! position where the button went down, so the width always derives from
//! the drag start, never from intermediate frames.

/// One draggable vertical divider controlling a side pane's width.
#[derive(Debug, Clone)]
pub struct SplitPane {
    width: u16,
    min: u16,
    max: u16,
    /// Panes anchored to the right edge grow when the divider moves left.
    anchored_right: bool,
    drag: Option<DragState>,
}

#[derive(Debug, Clone, Copy)]
struct DragState {
    start_x: u16,
    start_width: u16,
}

impl SplitPane {
    pub fn new(width: u16, min: u16, max: u16, anchored_right: bool) -> Self {
        Self {
            width: width.clamp(min, max),
            min,
            max,
            anchored_right,
            drag: None,
        }
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Record the drag anchor. The current width is captured here; later
    /// motion is resolved against it.
    pub fn begin_drag(&mut self, x: u16) {
        self.drag = Some(DragState {
            start_x: x,
            start_width: self.width,
        });
    }

    /// Resolve pointer motion into a width. No-op unless a drag is active.
    pub fn drag_to(&mut self, x: u16) {
        let Some(drag) = self.drag else {
            return;
        };
        let mut delta = x as i32 - drag.start_x as i32;
        if self.anchored_right {
            delta = -delta;
        }
        let width = drag.start_width as i32 + delta;
        self.width = width.clamp(self.min as i32, self.max as i32) as u16;
    }

    pub fn end_drag(&mut self) {
        self.drag = None;
    }

    /// Keyboard resize; same clamping as a drag.
    pub fn nudge(&mut self, delta: i16) {
        let width = self.width as i32 + delta as i32;
        self.width = width.clamp(self.min as i32, self.max as i32) as u16;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drag_moves_width_relative_to_anchor() {
        let mut pane = SplitPane::new(40, 20, 80, false);
        pane.begin_drag(100);
        pane.drag_to(110);
        assert_eq!(pane.width(), 50);
        // Width resolves from the anchor, not the previous frame.
        pane.drag_to(105);
        assert_eq!(pane.width(), 45);
    }

    #[test]
    fn drag_clamps_at_both_bounds() {
        let mut pane = SplitPane::new(40, 20, 80, false);
        pane.begin_drag(100);
        pane.drag_to(0);
        assert_eq!(pane.width(), 20);
        pane.drag_to(400);
        assert_eq!(pane.width(), 80);
    }

    #[test]
    fn right_anchored_pane_grows_when_divider_moves_left() {
        let mut pane = SplitPane::new(40, 20, 80, true);
        pane.begin_drag(100);
        pane.drag_to(90);
        assert_eq!(pane.width(), 50);
    }

    #[test]
    fn motion_without_drag_is_ignored() {
        let mut pane = SplitPane::new(40, 20, 80, false);
        pane.drag_to(500);
        assert_eq!(pane.width(), 40);
    }

    #[test]
    fn end_drag_stops_tracking() {
        let mut pane = SplitPane::new(40, 20, 80, false);
        pane.begin_drag(100);
        pane.drag_to(110);
        pane.end_drag();
        assert!(!pane.is_dragging());
        pane.drag_to(200);
        assert_eq!(pane.width(), 50);
    }

    #[test]
    fn nudge_clamps_like_a_drag() {
        let mut pane = SplitPane::new(22, 20, 80, false);
        pane.nudge(-10);
        assert_eq!(pane.width(), 20);
        pane.nudge(100);
        assert_eq!(pane.width(), 80);
    }
}
