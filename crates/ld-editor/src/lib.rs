//! LinkDraw editor: input normalization, keyboard shortcuts, the gesture
//! state machine, and the [`Session`] that ties them to a diagram.

pub mod config;
pub mod gesture;
pub mod input;
pub mod session;
pub mod shortcuts;

pub use config::{EditorConfig, ModifierKey};
pub use gesture::{EditorAction, GestureState, InteractionController};
pub use input::{InputEvent, Modifiers, PointerButton};
pub use session::{Response, Session};
