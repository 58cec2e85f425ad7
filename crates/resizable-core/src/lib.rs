//! Resizable Core Library
//!
//! Drag-handle resizing: handle configuration and resolution, the
//! pointer-driven drag state machine, and the host documents it runs on
//! (a headless tree everywhere, the page DOM on `wasm32`).

pub mod controller;
pub mod dom;
pub mod emitter;
pub mod handles;
pub mod host;
pub mod lifecycle;
pub mod options;
pub mod session;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use controller::{NO_USER_SELECT_CLASS, ResizeController, ResizeError};
pub use dom::{
    Document, DomError, DomEvent, EventKind, EventTarget, ListenerHandle, NodeId, Touch,
};
pub use emitter::{EventEmitter, ResizeEvent, SubscriptionId};
pub use handles::{HandleInfo, MovementAxis};
pub use host::ResizeHost;
pub use lifecycle::Lifecycle;
pub use options::{
    ConfigError, Direction, HandleSlots, HandleSpec, ResizeOptions, ResizeOptionsPatch,
};
pub use session::{DragSession, SizeUpdate, pointer_position};
#[cfg(target_arch = "wasm32")]
pub use web::WebHost;
