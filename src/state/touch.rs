// Axis lock for a single-finger drag on an unzoomed image: vertical drags feed
// swipe-to-close, horizontal ones are left to the pager.
use crate::model::Position;

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
enum DragAxis {
    #[default]
    Undecided,
    Vertical,
    Horizontal,
}

#[derive(Default, Debug, Clone)]
pub struct DragState {
    origin: Option<Position>,
    axis: DragAxis,
}

impl DragState {
    pub fn begin(&mut self, at: Position) {
        self.origin = Some(at);
        self.axis = DragAxis::Undecided;
    }

    /// Vertical offset from the drag origin once the drag locked vertically.
    pub fn update(&mut self, at: Position, slop: f64) -> Option<f64> {
        let delta = at - self.origin?;
        if self.axis == DragAxis::Undecided {
            if delta.x.abs().max(delta.y.abs()) <= slop {
                return None;
            }
            self.axis = if delta.y.abs() > delta.x.abs() {
                DragAxis::Vertical
            } else {
                DragAxis::Horizontal
            };
        }
        match self.axis {
            DragAxis::Vertical => Some(delta.y),
            _ => None,
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.origin.is_some() && self.axis == DragAxis::Vertical
    }

    /// Clears the drag; true if it was a vertical drag that needs a release.
    pub fn end(&mut self) -> bool {
        let was_dragging = self.is_dragging();
        *self = Self::default();
        was_dragging
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locks_vertical_after_slop() {
        let mut drag = DragState::default();
        drag.begin(Position::new(100.0, 100.0));
        assert_eq!(drag.update(Position::new(102.0, 105.0), 10.0), None);
        assert_eq!(drag.update(Position::new(104.0, 130.0), 10.0), Some(30.0));
        // stays vertical even if the finger drifts sideways
        assert_eq!(drag.update(Position::new(200.0, 140.0), 10.0), Some(40.0));
        assert!(drag.end());
        assert!(!drag.is_dragging());
    }

    #[test]
    fn horizontal_drag_is_left_alone() {
        let mut drag = DragState::default();
        drag.begin(Position::new(100.0, 100.0));
        assert_eq!(drag.update(Position::new(150.0, 110.0), 10.0), None);
        assert_eq!(drag.axis, DragAxis::Horizontal);
        assert_eq!(drag.update(Position::new(150.0, 300.0), 10.0), None);
        assert!(!drag.end());
    }

    #[test]
    fn update_without_begin_is_inert() {
        let mut drag = DragState::default();
        assert_eq!(drag.update(Position::new(0.0, 500.0), 10.0), None);
        assert!(!drag.end());
    }
}
