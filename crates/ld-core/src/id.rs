use serde::{Deserialize, Serialize};
use std::fmt;

/// Largest id representable by a 24-bit identity color.
pub const MAX_ENTITY_ID: u32 = 0x00FF_FFFF;

/// Identifier shared by nodes and connections.
///
/// Ids come from one counter per model, so a node and a connection never
/// share an id and therefore never share an identity color.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub u32);

impl EntityId {
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Whether this id fits the 24-bit identity color space.
    pub const fn is_encodable(self) -> bool {
        self.0 <= MAX_ENTITY_ID
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The solid color an entity is painted with in the pick buffer.
///
/// Bit-split encoding of the id: `r = id >> 16`, `g = id >> 8`, `b = id`
/// (each masked to a byte). Never shown on the visible surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IdentityColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl IdentityColor {
    /// Encode an id. Returns `None` for ids that would wrap the 24-bit space.
    pub fn from_id(id: EntityId) -> Option<Self> {
        if !id.is_encodable() {
            return None;
        }
        let n = id.get();
        Some(Self {
            r: ((n >> 16) & 0xFF) as u8,
            g: ((n >> 8) & 0xFF) as u8,
            b: (n & 0xFF) as u8,
        })
    }

    pub fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Decode back to the id this color was allocated for.
    pub fn to_id(self) -> EntityId {
        EntityId((self.r as u32) << 16 | (self.g as u32) << 8 | self.b as u32)
    }

    /// CSS form, e.g. `rgb(0,1,44)`.
    pub fn to_css(self) -> String {
        format!("rgb({},{},{})", self.r, self.g, self.b)
    }
}
