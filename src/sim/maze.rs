//! Maze model: wall segments, holes and goal on a square grid
//!
//! Grid cell `(column, row)` has its top-left corner at `(column * w, row * w)` where
//! `w` is the path width. Walls run along grid lines and are centred on them; each
//! unit-length piece of a wall is a rectangle `wall_width` thick terminated by two
//! round caps of radius `wall_width / 2`.

use std::collections::{HashSet, VecDeque};

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::tuning::{ConfigError, Tuning};

/// A square cell of the maze grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridCell {
    pub column: u32,
    pub row: u32,
}

impl GridCell {
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }
}

/// A straight wall run along a grid line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WallSegment {
    pub column: u32,
    pub row: u32,
    pub horizontal: bool,
    /// Number of unit pieces
    pub length: u32,
}

impl WallSegment {
    /// Horizontal wall starting at the top-left corner of `(column, row)`
    pub const fn horizontal(column: u32, row: u32, length: u32) -> Self {
        Self {
            column,
            row,
            horizontal: true,
            length,
        }
    }

    /// Vertical wall starting at the top-left corner of `(column, row)`
    pub const fn vertical(column: u32, row: u32, length: u32) -> Self {
        Self {
            column,
            row,
            horizontal: false,
            length,
        }
    }

    /// Grid corners where each unit piece starts, in increasing offset
    ///
    /// Stops early rather than wrapping if the run leaves the `u32` grid.
    pub fn unit_origins(&self) -> impl Iterator<Item = GridCell> + '_ {
        (0..self.length).map_while(move |i| {
            if self.horizontal {
                Some(GridCell::new(self.column.checked_add(i)?, self.row))
            } else {
                Some(GridCell::new(self.column, self.row.checked_add(i)?))
            }
        })
    }
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    pub fn from_center_half(center: Vec2, half: Vec2) -> Self {
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Point strictly inside (boundary excluded)
    pub fn contains(&self, point: Vec2) -> bool {
        point.x > self.min.x && point.x < self.max.x && point.y > self.min.y && point.y < self.max.y
    }

    /// Interiors intersect (touching edges do not count)
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
    }
}

/// One unit-length collidable piece of a wall
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WallUnit {
    /// Grid corner the piece starts at
    pub origin: GridCell,
    pub horizontal: bool,
    /// Centre of the leading end-cap
    pub start: Vec2,
    /// Centre of the trailing end-cap
    pub end: Vec2,
}

impl WallUnit {
    pub fn caps(&self) -> [Vec2; 2] {
        [self.start, self.end]
    }

    /// Point of the spine (cap to cap) closest to `point`
    pub fn nearest_spine_point(&self, point: Vec2) -> Vec2 {
        let spine = self.end - self.start;
        let len_sq = spine.length_squared();
        if len_sq <= f32::EPSILON {
            return self.start;
        }
        let t = ((point - self.start).dot(spine) / len_sq).clamp(0.0, 1.0);
        self.start + spine * t
    }

    /// Rectangle occupied by the piece, caps included
    pub fn bounds(&self, cap_radius: f32) -> Aabb {
        Aabb::new(
            self.start.min(self.end) - Vec2::splat(cap_radius),
            self.start.max(self.end) + Vec2::splat(cap_radius),
        )
    }
}

/// A wall end-cap and the orientation of the wall it terminates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WallCap {
    pub center: Vec2,
    pub horizontal: bool,
}

/// Static description of a level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MazeLayout {
    pub columns: u32,
    pub rows: u32,
    pub start: GridCell,
    pub goal: GridCell,
    pub walls: Vec<WallSegment>,
    pub holes: Vec<GridCell>,
}

const CLASSIC_WALLS: [WallSegment; 52] = [
    // Border
    WallSegment::horizontal(0, 0, 10),
    WallSegment::vertical(0, 0, 9),
    WallSegment::horizontal(0, 9, 10),
    WallSegment::vertical(10, 0, 9),
    // Horizontal, by starting column
    WallSegment::horizontal(0, 6, 1),
    WallSegment::horizontal(0, 8, 1),
    WallSegment::horizontal(1, 1, 2),
    WallSegment::horizontal(1, 7, 1),
    WallSegment::horizontal(2, 2, 2),
    WallSegment::horizontal(2, 4, 1),
    WallSegment::horizontal(2, 5, 1),
    WallSegment::horizontal(2, 6, 1),
    WallSegment::horizontal(3, 3, 1),
    WallSegment::horizontal(3, 8, 3),
    WallSegment::horizontal(4, 6, 1),
    WallSegment::horizontal(5, 2, 2),
    WallSegment::horizontal(5, 7, 1),
    WallSegment::horizontal(6, 1, 1),
    WallSegment::horizontal(6, 6, 2),
    WallSegment::horizontal(7, 3, 2),
    WallSegment::horizontal(7, 7, 2),
    WallSegment::horizontal(8, 1, 1),
    WallSegment::horizontal(8, 2, 1),
    WallSegment::horizontal(8, 3, 1),
    WallSegment::horizontal(8, 4, 2),
    WallSegment::horizontal(8, 8, 2),
    // Vertical, by column line
    WallSegment::vertical(1, 1, 2),
    WallSegment::vertical(1, 4, 2),
    WallSegment::vertical(2, 2, 2),
    WallSegment::vertical(2, 5, 1),
    WallSegment::vertical(2, 7, 2),
    WallSegment::vertical(3, 0, 1),
    WallSegment::vertical(3, 4, 1),
    WallSegment::vertical(3, 6, 2),
    WallSegment::vertical(4, 1, 2),
    WallSegment::vertical(4, 6, 1),
    WallSegment::vertical(5, 0, 2),
    WallSegment::vertical(5, 6, 1),
    WallSegment::vertical(5, 8, 1),
    WallSegment::vertical(6, 2, 2),
    WallSegment::vertical(6, 5, 1),
    WallSegment::vertical(7, 1, 1),
    WallSegment::vertical(7, 3, 2),
    WallSegment::vertical(7, 8, 1),
    WallSegment::vertical(8, 0, 1),
    WallSegment::vertical(8, 2, 1),
    WallSegment::vertical(8, 5, 1),
    WallSegment::vertical(8, 7, 1),
    WallSegment::vertical(8, 8, 1),
    WallSegment::vertical(9, 1, 1),
    WallSegment::vertical(9, 5, 2),
    WallSegment::vertical(9, 8, 1),
];

const CLASSIC_HOLES: [(u32, u32); 34] = [
    (0, 3), (0, 5),
    (1, 0), (1, 2), (1, 3), (1, 5), (1, 6), (1, 8),
    (2, 0), (2, 1), (2, 3), (2, 8),
    (3, 1), (3, 2), (3, 5),
    (4, 0), (4, 4),
    (5, 1), (5, 3), (5, 4), (5, 5), (5, 6),
    (6, 0), (6, 4), (6, 7),
    (7, 0), (7, 2), (7, 4), (7, 5), (7, 6),
    (8, 6), (8, 7),
    (9, 3), (9, 6),
];

impl MazeLayout {
    /// The built-in 10x9 level
    pub fn classic() -> Self {
        Self {
            columns: 10,
            rows: 9,
            start: GridCell::new(1, 7),
            goal: GridCell::new(9, 0),
            walls: CLASSIC_WALLS.to_vec(),
            holes: CLASSIC_HOLES
                .iter()
                .map(|&(column, row)| GridCell::new(column, row))
                .collect(),
        }
    }

    /// Parse a layout from JSON and check it fits its grid
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let layout: MazeLayout = serde_json::from_str(json)?;
        layout.validate()?;
        Ok(layout)
    }

    pub fn contains_cell(&self, cell: GridCell) -> bool {
        cell.column < self.columns && cell.row < self.rows
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.columns == 0 || self.rows == 0 {
            return Err(ConfigError::Invalid("maze grid is empty".into()));
        }
        if !self.contains_cell(self.start) {
            return Err(ConfigError::Invalid(format!("start {:?} is off the grid", self.start)));
        }
        if !self.contains_cell(self.goal) {
            return Err(ConfigError::Invalid(format!("goal {:?} is off the grid", self.goal)));
        }
        for wall in &self.walls {
            let fits = if wall.horizontal {
                wall.column.saturating_add(wall.length) <= self.columns && wall.row <= self.rows
            } else {
                wall.row.saturating_add(wall.length) <= self.rows && wall.column <= self.columns
            };
            if wall.length == 0 || !fits {
                return Err(ConfigError::Invalid(format!("wall {:?} leaves the grid", wall)));
            }
        }
        if let Some(hole) = self.holes.iter().find(|h| !self.contains_cell(**h)) {
            return Err(ConfigError::Invalid(format!("hole {:?} is off the grid", hole)));
        }
        Ok(())
    }
}

/// A layout bound to its tuning, with wall units expanded once
#[derive(Debug, Clone)]
pub struct Maze {
    layout: MazeLayout,
    tuning: Tuning,
    units: Vec<WallUnit>,
}

impl Maze {
    pub fn new(layout: MazeLayout, tuning: Tuning) -> Self {
        let w = tuning.path_width;
        let units = layout
            .walls
            .iter()
            .flat_map(|wall| {
                let horizontal = wall.horizontal;
                wall.unit_origins()
                    .map(move |origin| {
                        let start = Vec2::new(origin.column as f32, origin.row as f32) * w;
                        let step = if horizontal { Vec2::new(w, 0.0) } else { Vec2::new(0.0, w) };
                        WallUnit {
                            origin,
                            horizontal,
                            start,
                            end: start + step,
                        }
                    })
                    .collect::<Vec<_>>()
            })
            .collect();

        Self {
            layout,
            tuning,
            units,
        }
    }

    /// Classic level with default tuning
    pub fn classic() -> Self {
        Self::new(MazeLayout::classic(), Tuning::default())
    }

    pub fn layout(&self) -> &MazeLayout {
        &self.layout
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    /// Collidable wall pieces in layout order
    pub fn wall_units(&self) -> &[WallUnit] {
        &self.units
    }

    /// Both end-caps of every wall piece, in layout order
    pub fn wall_caps(&self) -> impl Iterator<Item = WallCap> + '_ {
        self.units.iter().flat_map(|unit| {
            unit.caps().map(|center| WallCap {
                center,
                horizontal: unit.horizontal,
            })
        })
    }

    pub fn goal(&self) -> GridCell {
        self.layout.goal
    }

    pub fn holes(&self) -> &[GridCell] {
        &self.layout.holes
    }

    /// Top-left corner of a cell
    pub fn cell_origin(&self, cell: GridCell) -> Vec2 {
        Vec2::new(cell.column as f32, cell.row as f32) * self.tuning.path_width
    }

    pub fn cell_center(&self, cell: GridCell) -> Vec2 {
        self.cell_origin(cell) + Vec2::splat(self.tuning.path_width / 2.0)
    }

    /// Where a fresh ball is placed
    pub fn start_position(&self) -> Vec2 {
        self.cell_center(self.layout.start)
    }

    pub fn goal_bounds(&self) -> Aabb {
        let origin = self.cell_origin(self.layout.goal);
        Aabb::new(origin, origin + Vec2::splat(self.tuning.path_width))
    }

    /// Square hole region centred in its cell
    pub fn hole_bounds(&self, cell: GridCell) -> Aabb {
        Aabb::from_center_half(self.cell_center(cell), Vec2::splat(self.tuning.hole_size / 2.0))
    }

    pub fn in_goal(&self, point: Vec2) -> bool {
        self.goal_bounds().contains(point)
    }

    /// The hole whose region contains `point`, if any
    pub fn hole_at(&self, point: Vec2) -> Option<GridCell> {
        self.layout
            .holes
            .iter()
            .copied()
            .find(|&cell| self.hole_bounds(cell).contains(point))
    }

    /// Whether the goal can be reached from the start without crossing a wall
    ///
    /// Holes are hazards rather than walls and do not block the search.
    pub fn is_solvable(&self) -> bool {
        self.reachable_cells().contains(&self.layout.goal)
    }

    /// Cells connected to the start cell by wall-free edges
    pub fn reachable_cells(&self) -> HashSet<GridCell> {
        let mut horizontal_edges = HashSet::new();
        let mut vertical_edges = HashSet::new();
        for unit in &self.units {
            if unit.horizontal {
                horizontal_edges.insert(unit.origin);
            } else {
                vertical_edges.insert(unit.origin);
            }
        }

        let mut seen = HashSet::from([self.layout.start]);
        let mut queue = VecDeque::from([self.layout.start]);
        while let Some(cell) = queue.pop_front() {
            let GridCell { column, row } = cell;
            // (neighbour, edge between them, edge set)
            let mut moves = Vec::with_capacity(4);
            if column + 1 < self.layout.columns {
                moves.push((GridCell::new(column + 1, row), GridCell::new(column + 1, row), &vertical_edges));
            }
            if column > 0 {
                moves.push((GridCell::new(column - 1, row), cell, &vertical_edges));
            }
            if row + 1 < self.layout.rows {
                moves.push((GridCell::new(column, row + 1), GridCell::new(column, row + 1), &horizontal_edges));
            }
            if row > 0 {
                moves.push((GridCell::new(column, row - 1), cell, &horizontal_edges));
            }
            for (next, edge, walls) in moves {
                if !walls.contains(&edge) && seen.insert(next) {
                    queue.push_back(next);
                }
            }
        }
        seen
    }
}
