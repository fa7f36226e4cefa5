//! Drag operations and action masks
//!
//! `DragOperation` is the platform-level operation mask. Script sees the
//! same information through the `effectAllowed` and `dropEffect` strings;
//! the conversions here follow the lossy mapping browsers have always used.

use std::fmt;
use std::str::FromStr;

use bitflags::bitflags;

bitflags! {
    /// Operations a drag source allows or a drop target chooses
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct DragOperation: u32 {
        const COPY = 1;
        const LINK = 2;
        const GENERIC = 4;
        const PRIVATE = 8;
        const MOVE = 16;
        const DELETE = 32;
        const EVERY = u32::MAX;
    }
}

impl DragOperation {
    pub const NONE: Self = Self::empty();
}

impl Default for DragOperation {
    fn default() -> Self {
        Self::NONE
    }
}

bitflags! {
    /// Handling tiers a hovered document may use
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct DragDestinationAction: u32 {
        const DHTML = 1;
        const EDIT = 2;
        const LOAD = 4;
        const ANY = u32::MAX;
    }
}

bitflags! {
    /// Kinds of content a drag source may start
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct DragSourceAction: u32 {
        const DHTML = 1;
        const IMAGE = 2;
        const LINK = 4;
        const SELECTION = 8;
        const ANY = u32::MAX;
    }
}

/// `effectAllowed` values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EffectAllowed {
    None,
    Copy,
    CopyLink,
    CopyMove,
    Link,
    LinkMove,
    Move,
    All,
    #[default]
    Uninitialized,
}

impl EffectAllowed {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Copy => "copy",
            Self::CopyLink => "copyLink",
            Self::CopyMove => "copyMove",
            Self::Link => "link",
            Self::LinkMove => "linkMove",
            Self::Move => "move",
            Self::All => "all",
            Self::Uninitialized => "uninitialized",
        }
    }

    /// Operation mask script allowed
    pub fn to_drag_operation(self) -> DragOperation {
        match self {
            Self::Uninitialized | Self::All => DragOperation::EVERY,
            Self::None => DragOperation::NONE,
            Self::Copy => DragOperation::COPY,
            Self::Link => DragOperation::LINK,
            Self::Move => DragOperation::GENERIC | DragOperation::MOVE,
            Self::CopyLink => DragOperation::COPY | DragOperation::LINK,
            Self::CopyMove => DragOperation::COPY | DragOperation::GENERIC | DragOperation::MOVE,
            Self::LinkMove => DragOperation::LINK | DragOperation::GENERIC | DragOperation::MOVE,
        }
    }

    /// Closest script value for a platform mask
    pub fn from_drag_operation(op: DragOperation) -> Self {
        let generic_move = op.intersects(DragOperation::MOVE | DragOperation::GENERIC);
        let copy = op.contains(DragOperation::COPY);
        let link = op.contains(DragOperation::LINK);

        if op == DragOperation::EVERY || (generic_move && copy && link) {
            Self::All
        } else if generic_move && copy {
            Self::CopyMove
        } else if generic_move && link {
            Self::LinkMove
        } else if copy && link {
            Self::CopyLink
        } else if generic_move {
            Self::Move
        } else if copy {
            Self::Copy
        } else if link {
            Self::Link
        } else {
            Self::None
        }
    }
}

/// `dropEffect` values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DropEffect {
    #[default]
    Uninitialized,
    None,
    Copy,
    Link,
    Move,
}

impl DropEffect {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::None => "none",
            Self::Copy => "copy",
            Self::Link => "link",
            Self::Move => "move",
        }
    }

    pub fn to_drag_operation(self) -> DragOperation {
        match self {
            Self::Uninitialized => DragOperation::EVERY,
            Self::None => DragOperation::NONE,
            Self::Copy => DragOperation::COPY,
            Self::Link => DragOperation::LINK,
            Self::Move => DragOperation::GENERIC | DragOperation::MOVE,
        }
    }

    pub fn from_drag_operation(op: DragOperation) -> Self {
        match EffectAllowed::from_drag_operation(op) {
            EffectAllowed::Copy => Self::Copy,
            EffectAllowed::Link => Self::Link,
            EffectAllowed::Move => Self::Move,
            _ => Self::None,
        }
    }
}

/// Unknown `effectAllowed` / `dropEffect` keyword
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown drag effect: {0}")]
pub struct UnknownEffect(pub String);

impl FromStr for EffectAllowed {
    type Err = UnknownEffect;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "none" => Self::None,
            "copy" => Self::Copy,
            "copyLink" => Self::CopyLink,
            "copyMove" => Self::CopyMove,
            "link" => Self::Link,
            "linkMove" => Self::LinkMove,
            "move" => Self::Move,
            "all" => Self::All,
            "uninitialized" => Self::Uninitialized,
            other => return Err(UnknownEffect(other.to_string())),
        })
    }
}

impl FromStr for DropEffect {
    type Err = UnknownEffect;

    /// Script may only assign the four real effects
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "none" => Self::None,
            "copy" => Self::Copy,
            "link" => Self::Link,
            "move" => Self::Move,
            other => return Err(UnknownEffect(other.to_string())),
        })
    }
}

impl fmt::Display for EffectAllowed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for DropEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
