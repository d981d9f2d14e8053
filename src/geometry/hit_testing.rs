use egui::{Pos2, Rect, Vec2, pos2};

/// One of the eight grips around a crop selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResizeHandle {
    NorthWest,
    NorthEast,
    SouthWest,
    SouthEast,
    North,
    South,
    West,
    East,
}

impl ResizeHandle {
    /// All handles, in hit-test priority order
    pub const ALL: [ResizeHandle; 8] = [
        Self::NorthWest,
        Self::NorthEast,
        Self::SouthWest,
        Self::SouthEast,
        Self::North,
        Self::South,
        Self::West,
        Self::East,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NorthWest => "nw",
            Self::NorthEast => "ne",
            Self::SouthWest => "sw",
            Self::SouthEast => "se",
            Self::North => "n",
            Self::South => "s",
            Self::West => "w",
            Self::East => "e",
        }
    }

    /// Where the handle sits on the given rectangle
    pub fn anchor(&self, rect: Rect) -> Pos2 {
        let center = rect.center();
        match self {
            Self::NorthWest => rect.left_top(),
            Self::NorthEast => rect.right_top(),
            Self::SouthWest => rect.left_bottom(),
            Self::SouthEast => rect.right_bottom(),
            Self::North => pos2(center.x, rect.min.y),
            Self::South => pos2(center.x, rect.max.y),
            Self::West => pos2(rect.min.x, center.y),
            Self::East => pos2(rect.max.x, center.y),
        }
    }

    /// The square a pointer must land in to grab this handle
    pub fn hit_rect(&self, rect: Rect, handle_size: f32) -> Rect {
        Rect::from_center_size(self.anchor(rect), Vec2::splat(handle_size))
    }

    pub fn moves_left(&self) -> bool {
        matches!(self, Self::NorthWest | Self::SouthWest | Self::West)
    }

    pub fn moves_right(&self) -> bool {
        matches!(self, Self::NorthEast | Self::SouthEast | Self::East)
    }

    pub fn moves_top(&self) -> bool {
        matches!(self, Self::NorthWest | Self::NorthEast | Self::North)
    }

    pub fn moves_bottom(&self) -> bool {
        matches!(self, Self::SouthWest | Self::SouthEast | Self::South)
    }

    pub fn cursor(&self) -> CursorHint {
        match self {
            Self::NorthWest | Self::SouthEast => CursorHint::ResizeNwSe,
            Self::NorthEast | Self::SouthWest => CursorHint::ResizeNeSw,
            Self::North | Self::South => CursorHint::ResizeVertical,
            Self::West | Self::East => CursorHint::ResizeHorizontal,
        }
    }
}

/// Pointer cursor a tool would like shown at a given position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorHint {
    Default,
    Crosshair,
    Move,
    Grab,
    Grabbing,
    Text,
    ResizeNwSe,
    ResizeNeSw,
    ResizeVertical,
    ResizeHorizontal,
}

/// Find the first handle of `rect` under `pos`
pub fn handle_at(pos: Pos2, rect: Rect, handle_size: f32) -> Option<ResizeHandle> {
    ResizeHandle::ALL
        .into_iter()
        .find(|handle| handle.hit_rect(rect, handle_size).contains(pos))
}

/// Clamp a point into `[0, bounds]` on both axes
pub fn clamp_to_bounds(pos: Pos2, bounds: Vec2) -> Pos2 {
    pos2(pos.x.clamp(0.0, bounds.x.max(0.0)), pos.y.clamp(0.0, bounds.y.max(0.0)))
}

/// Clamp `value` into `[min, max]`, preferring `min` when the range is empty
pub fn clamp_prefer_min(value: f32, min: f32, max: f32) -> f32 {
    value.min(max).max(min)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect() -> Rect {
        Rect::from_min_size(pos2(100.0, 100.0), Vec2::new(200.0, 100.0))
    }

    #[test]
    fn test_corner_handles_take_priority_over_edges() {
        let r = rect();
        assert_eq!(handle_at(pos2(101.0, 101.0), r, 10.0), Some(ResizeHandle::NorthWest));
        assert_eq!(handle_at(pos2(300.0, 200.0), r, 10.0), Some(ResizeHandle::SouthEast));
    }

    #[test]
    fn test_edge_midpoints() {
        let r = rect();
        assert_eq!(handle_at(pos2(200.0, 100.0), r, 10.0), Some(ResizeHandle::North));
        assert_eq!(handle_at(pos2(200.0, 203.0), r, 10.0), Some(ResizeHandle::South));
        assert_eq!(handle_at(pos2(98.0, 150.0), r, 10.0), Some(ResizeHandle::West));
        assert_eq!(handle_at(pos2(300.0, 150.0), r, 10.0), Some(ResizeHandle::East));
    }

    #[test]
    fn test_interior_is_not_a_handle() {
        assert_eq!(handle_at(pos2(150.0, 150.0), rect(), 10.0), None);
        // Along an edge but away from its midpoint
        assert_eq!(handle_at(pos2(130.0, 100.0), rect(), 10.0), None);
    }

    #[test]
    fn test_clamp_prefer_min_with_empty_range() {
        assert_eq!(clamp_prefer_min(50.0, 5.0, 2.0), 5.0);
        assert_eq!(clamp_prefer_min(1.0, 5.0, 20.0), 5.0);
        assert_eq!(clamp_prefer_min(30.0, 5.0, 20.0), 20.0);
    }
}
