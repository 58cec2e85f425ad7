//! Drag session state: baseline size, reference point and per-move updates.

use crate::dom::DomEvent;
use crate::handles::MovementAxis;
use crate::options::Direction;
use kurbo::{Point, Size, Vec2};

/// Client position of the pointer carried by an event.
///
/// Touch events use the first touch still on the target and yield `None`
/// when there is none; mouse events use their own coordinates.
pub fn pointer_position(event: &DomEvent) -> Option<Point> {
    if event.kind.is_touch() {
        event.target_touches.first().map(|t| t.client)
    } else {
        Some(event.client)
    }
}

/// Dimensions applied by one move. `None` means that axis was left alone.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SizeUpdate {
    pub width: Option<f64>,
    pub height: Option<f64>,
}

impl SizeUpdate {
    /// Check if neither dimension changed.
    pub fn is_empty(&self) -> bool {
        self.width.is_none() && self.height.is_none()
    }
}

/// An open drag gesture on one handle.
#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    /// Handle that started the gesture.
    pub direction: Direction,
    /// Target size when the gesture started.
    pub baseline: Size,
    /// Pointer position when the gesture started.
    pub origin: Point,
    /// Last pointer position seen.
    pub current: Point,
}

impl DragSession {
    /// Start a session.
    pub fn new(direction: Direction, baseline: Size, origin: Point) -> Self {
        Self {
            direction,
            baseline,
            origin,
            current: origin,
        }
    }

    pub fn axis(&self) -> MovementAxis {
        self.direction.axis()
    }

    /// Pointer movement since the gesture started.
    pub fn delta(&self) -> Vec2 {
        self.current - self.origin
    }

    /// Size implied by a pointer position, before minimums or axis rules.
    pub fn candidate(&self, pointer: Point) -> Size {
        let delta = pointer - self.origin;
        Size::new(self.baseline.width + delta.x, self.baseline.height + delta.y)
    }

    /// Record a pointer move and compute which dimensions to apply.
    ///
    /// Each axis is applied only if the handle allows it and the candidate
    /// stays at or above its minimum; one axis failing never blocks the other.
    pub fn update(&mut self, pointer: Point, min: Size) -> SizeUpdate {
        self.current = pointer;
        let candidate = self.candidate(pointer);
        let axis = self.axis();
        let width_ok = axis.allows_horizontal() && candidate.width >= min.width;
        let height_ok = axis.allows_vertical() && candidate.height >= min.height;
        SizeUpdate {
            width: width_ok.then_some(candidate.width),
            height: height_ok.then_some(candidate.height),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{EventKind, Touch};

    const MIN: Size = Size::new(50.0, 50.0);

    fn start(direction: Direction, width: f64, height: f64, origin: Point) -> DragSession {
        DragSession::new(direction, Size::new(width, height), origin)
    }

    #[test]
    fn test_pointer_position_mouse() {
        let ev = DomEvent::mouse(EventKind::MouseMove, Point::new(3.0, 4.0));
        assert_eq!(pointer_position(&ev), Some(Point::new(3.0, 4.0)));
    }

    #[test]
    fn test_pointer_position_touch_uses_first_touch() {
        let ev = DomEvent::touch(
            EventKind::TouchMove,
            vec![Touch::new(7, Point::new(10.0, 20.0)), Touch::new(8, Point::new(0.0, 0.0))],
        );
        assert_eq!(pointer_position(&ev), Some(Point::new(10.0, 20.0)));

        let lifted = DomEvent::touch(EventKind::TouchEnd, Vec::new());
        assert_eq!(pointer_position(&lifted), None);
    }

    #[test]
    fn test_horizontal_handle_ignores_vertical_delta() {
        let mut session = start(Direction::East, 200.0, 200.0, Point::new(300.0, 150.0));
        let update = session.update(Point::new(350.0, 400.0), MIN);
        assert_eq!(update.width, Some(250.0));
        assert_eq!(update.height, None);
        assert_eq!(session.delta(), Vec2::new(50.0, 250.0));
    }

    #[test]
    fn test_vertical_handle_ignores_horizontal_delta() {
        let mut session = start(Direction::North, 200.0, 200.0, Point::ZERO);
        let update = session.update(Point::new(-500.0, 30.0), MIN);
        assert_eq!(
            update,
            SizeUpdate {
                width: None,
                height: Some(230.0)
            }
        );
    }

    #[test]
    fn test_both_axes_apply_independently() {
        let mut session = start(Direction::SouthEast, 100.0, 100.0, Point::ZERO);

        let update = session.update(Point::new(20.0, -10.0), MIN);
        assert_eq!(
            update,
            SizeUpdate {
                width: Some(120.0),
                height: Some(90.0)
            }
        );

        // Height would drop below the minimum; width still applies.
        let update = session.update(Point::new(-30.0, -60.0), MIN);
        assert_eq!(
            update,
            SizeUpdate {
                width: Some(70.0),
                height: None
            }
        );
    }

    #[test]
    fn test_exact_minimum_is_applied() {
        let mut session = start(Direction::East, 100.0, 100.0, Point::ZERO);
        assert_eq!(session.update(Point::new(-50.0, 0.0), MIN).width, Some(50.0));
        assert!(session.update(Point::new(-50.5, 0.0), MIN).is_empty());
    }
}
