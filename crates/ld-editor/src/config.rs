//! Editor settings, loadable from JSON. Missing fields take defaults.

use ld_core::Direction;
use ld_render::Theme;
use serde::{Deserialize, Serialize};

use crate::input::Modifiers;

/// A modifier key a gesture binding can require.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModifierKey {
    Shift,
    Ctrl,
    Alt,
    Meta,
    /// Ctrl or ⌘.
    Command,
}

impl ModifierKey {
    pub fn held(self, m: Modifiers) -> bool {
        match self {
            Self::Shift => m.shift,
            Self::Ctrl => m.ctrl,
            Self::Alt => m.alt,
            Self::Meta => m.meta,
            Self::Command => m.command(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorConfig {
    /// Size, color and label of nodes created by double-click.
    pub node_width: f64,
    pub node_height: f64,
    pub node_color: String,
    pub node_label: String,

    /// Scale change per wheel unit.
    pub wheel_sensitivity: f64,
    /// Scale change per zoom key press.
    pub key_zoom_step: f64,
    pub grid_cell: f64,

    /// Held while dragging to move the selected node.
    pub move_modifier: ModifierKey,
    /// Held while dragging to draw a connection from the selected node.
    pub connect_modifier: ModifierKey,

    pub connection_direction: Direction,
    pub connection_dashed: bool,

    pub dark_mode: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            node_width: 50.0,
            node_height: 50.0,
            node_color: "green".into(),
            node_label: String::new(),
            wheel_sensitivity: 0.001,
            key_zoom_step: 0.1,
            grid_cell: ld_render::GRID_CELL,
            move_modifier: ModifierKey::Command,
            connect_modifier: ModifierKey::Shift,
            connection_direction: Direction::AtoB,
            connection_dashed: false,
            dark_mode: false,
        }
    }
}

impl EditorConfig {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        let config: Self = serde_json::from_str(text)?;
        log::debug!("editor config loaded: {config:?}");
        Ok(config)
    }

    pub fn theme(&self) -> Theme {
        if self.dark_mode {
            Theme::dark()
        } else {
            Theme::light()
        }
    }
}
