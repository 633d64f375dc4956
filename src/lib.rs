//! Block canvas engine.
//!
//! An in-memory document of positioned, multi-language code blocks, the
//! pointer-driven drag protocol that moves and spawns them, and the
//! coordinator that runs their content on an external execution service and
//! folds the results back into the document.
//!
//! [`session::CanvasSession`] ties the pieces together; each piece can also be
//! used on its own.

pub mod catalog;
pub mod config;
pub mod drag;
pub mod error;
pub mod execution;
pub mod logging;
pub mod model;
pub mod overlay;
pub mod session;
pub mod store;

pub use catalog::{BlockTemplate, PaletteItem, SearchResults, search, templates};
pub use config::CanvasConfig;
pub use drag::{DragEngine, DragOutcome, DragState};
pub use error::{DragError, TransportError};
pub use execution::{ExecutionCoordinator, ExecutionTransport, HttpTransport};
pub use model::{Block, BlockId, BlockKind, BlockOutput, BlockPatch, Language, Point};
pub use session::CanvasSession;
pub use store::BlockStore;
