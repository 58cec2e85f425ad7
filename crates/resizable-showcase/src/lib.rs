//! Showcase harness: mounts a resize controller on a demo box and replays
//! scripted drags so the widget can be inspected from the terminal.

use kurbo::{Point, Size};
use resizable_core::{
    ConfigError, Direction, Document, DomEvent, EventKind, NodeId, ResizeController, ResizeError,
    ResizeEvent, ResizeOptions, ResizeOptionsPatch,
};
use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;
use thiserror::Error;

/// Initial size of the demo box.
pub const BOX_SIZE: Size = Size::new(200.0, 200.0);

/// Showcase errors.
#[derive(Debug, Error)]
pub enum ShowcaseError {
    #[error("Failed to read options file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid options: {0}")]
    Config(#[from] ConfigError),
    #[error("Failed to mount controller: {0}")]
    Resize(#[from] ResizeError),
}

/// Load an options patch from a JSON file.
pub fn load_patch(path: &Path) -> Result<ResizeOptionsPatch, ShowcaseError> {
    let text = std::fs::read_to_string(path)?;
    let patch = serde_json::from_str(&text).map_err(ConfigError::from)?;
    Ok(patch)
}

/// One scripted gesture: press on a handle, move through points, release.
#[derive(Debug, Clone, PartialEq)]
pub struct Drag {
    pub direction: Direction,
    pub start: Point,
    pub moves: Vec<Point>,
}

impl Drag {
    pub fn new(direction: Direction, start: Point, moves: Vec<Point>) -> Self {
        Self {
            direction,
            start,
            moves,
        }
    }
}

/// The gestures replayed by the binary.
pub fn demo_script() -> Vec<Drag> {
    vec![
        Drag::new(
            Direction::SouthEast,
            Point::new(200.0, 200.0),
            vec![Point::new(230.0, 220.0), Point::new(260.0, 240.0)],
        ),
        Drag::new(Direction::East, Point::new(260.0, 120.0), vec![Point::new(40.0, 120.0)]),
        Drag::new(Direction::South, Point::new(130.0, 240.0), vec![Point::new(130.0, 180.0)]),
    ]
}

/// A document with one resizable box, as in the showcase page.
#[derive(Debug)]
pub struct Showcase {
    doc: Document,
    target: NodeId,
    controller: ResizeController,
    events: Rc<RefCell<Vec<ResizeEvent>>>,
}

impl Showcase {
    /// Build `<div><div id="box" class="resizable"></div></div>` and mount a
    /// controller on the box.
    pub fn mount(patch: &ResizeOptionsPatch) -> Result<Self, ShowcaseError> {
        let mut doc = Document::new();
        let container = doc.create_element("div");
        let target = doc.create_element("div");
        doc.append_child(doc.body(), container).map_err(ResizeError::from)?;
        doc.append_child(container, target).map_err(ResizeError::from)?;
        doc.set_id(target, "box");
        doc.add_class(target, "resizable");
        doc.set_size(target, BOX_SIZE);

        let patch = patch.clone().with_target(target);
        let options = ResizeOptions::merged(&ResizeOptions::default(), &patch);
        let controller = ResizeController::new(&mut doc, options)?;

        let events = Rc::new(RefCell::new(Vec::new()));
        {
            let events = Rc::clone(&events);
            controller.on_event(move |event| {
                log::info!("{}", event);
                events.borrow_mut().push(event);
            });
        }

        Ok(Self {
            doc,
            target,
            controller,
            events,
        })
    }

    pub fn controller(&self) -> &ResizeController {
        &self.controller
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    /// Current size of the box.
    pub fn size(&self) -> Size {
        self.doc.size(self.target)
    }

    /// Replay one gesture. Returns the resulting size, or `None` if the
    /// handle is not bound.
    pub fn replay(&mut self, drag: &Drag) -> Option<Size> {
        let handle = self.controller.handle(drag.direction)?.element;
        self.doc.dispatch(handle, DomEvent::mouse(EventKind::MouseDown, drag.start));
        for &point in &drag.moves {
            self.doc.dispatch_to_document(DomEvent::mouse(EventKind::MouseMove, point));
            log::debug!("pointer at {:?}, box now {:?}", point, self.size());
        }
        let end = drag.moves.last().copied().unwrap_or(drag.start);
        self.doc.dispatch_to_document(DomEvent::mouse(EventKind::MouseUp, end));
        Some(self.size())
    }

    /// Signals emitted since the last call.
    pub fn take_events(&self) -> Vec<ResizeEvent> {
        std::mem::take(&mut *self.events.borrow_mut())
    }

    /// Tear the controller down.
    pub fn unmount(&mut self) {
        self.controller.destroy(&mut self.doc);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_patch_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"min_width": 120, "handles": {{"west": true}}}}"#).unwrap();

        let patch = load_patch(file.path()).unwrap();
        assert_eq!(patch.min_width, Some(120.0));
        assert_eq!(patch.handles.len(), 1);
    }

    #[test]
    fn test_load_patch_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        assert!(matches!(load_patch(&missing), Err(ShowcaseError::Io(_))));

        let bad = dir.path().join("bad.json");
        std::fs::write(&bad, "{\"min_width\": \"wide\"}").unwrap();
        assert!(matches!(load_patch(&bad), Err(ShowcaseError::Config(ConfigError::Json(_)))));
    }

    #[test]
    fn test_demo_script_with_defaults() {
        let mut showcase = Showcase::mount(&ResizeOptionsPatch::default()).unwrap();
        let script = demo_script();

        assert_eq!(showcase.replay(&script[0]), Some(Size::new(260.0, 240.0)));
        assert_eq!(
            showcase.take_events(),
            vec![
                ResizeEvent::ResizeStart,
                ResizeEvent::Resize,
                ResizeEvent::Resize,
                ResizeEvent::ResizeEnd
            ]
        );

        // Dragging east past the minimum leaves the width alone.
        assert_eq!(showcase.replay(&script[1]), Some(Size::new(260.0, 240.0)));
        assert_eq!(showcase.replay(&script[2]), Some(Size::new(260.0, 180.0)));
    }

    #[test]
    fn test_unbound_handle_is_not_replayed() {
        let mut patch = ResizeOptionsPatch::default();
        patch.handles.insert(Direction::East, false.into());
        let mut showcase = Showcase::mount(&patch).unwrap();

        assert_eq!(showcase.replay(&demo_script()[1]), None);
        assert!(showcase.take_events().is_empty());
    }

    #[test]
    fn test_unmount_removes_handles() {
        let mut showcase = Showcase::mount(&ResizeOptionsPatch::default()).unwrap();
        showcase.unmount();
        assert!(showcase.controller().is_destroyed());
        assert_eq!(showcase.document().listener_count(), 0);
        assert_eq!(showcase.replay(&demo_script()[0]), None);
    }
}
