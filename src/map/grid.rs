//! Tile grid storage and the read-only level map handed to gameplay
//!
//! Cells are indexed `[column, row]` with row 0 at the bottom of the screen.
//! Each tile spans `2 * units_per_tile` world units; the cell at
//! `(col, row)` is centered at
//! `origin + (col * units_per_tile * 2 + units_per_tile, row * units_per_tile * 2 + units_per_tile)`.

use std::fmt;

use glam::Vec2;
use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};

use super::generator::{LevelType, Segment, WallReport};
use crate::consts::{WALL_INTRO_LEVEL, WALL_INTRO_SPAWN_ROW};
use crate::scaling::ScaleProfile;
use crate::sim::{Shape, overlaps, point_in};

/// One cell of the level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Tile {
    /// Walkable
    #[default]
    Floor,
    /// Blocks players and bullets
    Wall,
    /// Level exit
    Door,
}

impl Tile {
    pub fn as_char(&self) -> char {
        match self {
            Tile::Floor => '.',
            Tile::Wall => '#',
            Tile::Door => 'D',
        }
    }
}

/// Dense column/row storage
///
/// Serialize-only: `cells` always holds `width * height` entries because
/// the only constructor is [`TileGrid::new`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TileGrid<T> {
    width: usize,
    height: usize,
    cells: Vec<T>,
}

impl<T: Clone + Default> TileGrid<T> {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![T::default(); width * height],
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn get(&self, col: usize, row: usize) -> Option<&T> {
        if col < self.width && row < self.height {
            Some(&self.cells[row * self.width + col])
        } else {
            None
        }
    }

    #[inline]
    pub fn set(&mut self, col: usize, row: usize, value: T) {
        if col < self.width && row < self.height {
            self.cells[row * self.width + col] = value;
        }
    }

    /// Neighbor of a cell by a signed offset, if it is on the grid
    #[inline]
    pub fn offset(&self, (col, row): (usize, usize), dx: isize, dy: isize) -> Option<(usize, usize)> {
        let col = col.checked_add_signed(dx)?;
        let row = row.checked_add_signed(dy)?;
        (col < self.width && row < self.height).then_some((col, row))
    }

    /// True for cells that are not on the outer border
    #[inline]
    pub fn is_interior(&self, (col, row): (usize, usize)) -> bool {
        col > 0 && row > 0 && col + 1 < self.width && row + 1 < self.height
    }
}

/// A cell ready to be instantiated by the renderer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TilePlacement {
    pub col: usize,
    pub row: usize,
    pub tile: Tile,
    /// World-space center of the cell
    pub center: Vec2,
}

/// Door appearance and collision footprint
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum DoorState {
    /// Box covering the whole tile
    Closed,
    /// Small circle the player has to step onto
    Open { radius: f32 },
}

/// A generated level map
///
/// Read-only to gameplay apart from opening the door; the next level
/// replaces the whole value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Grid {
    tiles: TileGrid<Tile>,
    units_per_tile: f32,
    origin: Vec2,
    door: (usize, usize),
    door_state: DoorState,
    level: u32,
    level_type: LevelType,
    segments: Vec<Segment>,
    report: WallReport,
}

impl Grid {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        tiles: TileGrid<Tile>,
        units_per_tile: f32,
        origin: Vec2,
        door: (usize, usize),
        level: u32,
        level_type: LevelType,
        segments: Vec<Segment>,
        report: WallReport,
    ) -> Self {
        Self {
            tiles,
            units_per_tile,
            origin,
            door,
            door_state: DoorState::Closed,
            level,
            level_type,
            segments,
            report,
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.tiles.width()
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.tiles.height()
    }

    /// Half the world-space side length of a tile
    #[inline]
    pub fn units_per_tile(&self) -> f32 {
        self.units_per_tile
    }

    /// World-space side length of a tile
    #[inline]
    pub fn tile_size(&self) -> f32 {
        self.units_per_tile * 2.0
    }

    /// World position of the grid's bottom-left corner
    #[inline]
    pub fn origin(&self) -> Vec2 {
        self.origin
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn level_type(&self) -> LevelType {
        self.level_type
    }

    pub fn get(&self, col: usize, row: usize) -> Option<Tile> {
        self.tiles.get(col, row).copied()
    }

    /// Tile at a cell; anything off the grid reads as floor
    pub fn tile_at(&self, col: usize, row: usize) -> Tile {
        self.get(col, row).unwrap_or_default()
    }

    pub fn cell_center(&self, col: usize, row: usize) -> Vec2 {
        let u = self.units_per_tile;
        self.origin + Vec2::new(col as f32 * u * 2.0 + u, row as f32 * u * 2.0 + u)
    }

    /// Cell containing a world position
    pub fn cell_at(&self, position: Vec2) -> Option<(usize, usize)> {
        let local = (position - self.origin) / self.tile_size();
        if !local.is_finite() || local.x < 0.0 || local.y < 0.0 {
            return None;
        }
        let (col, row) = (local.x as usize, local.y as usize);
        (col < self.width() && row < self.height()).then_some((col, row))
    }

    /// Every cell with its tile and world center, column-major
    pub fn placements(&self) -> impl Iterator<Item = TilePlacement> + '_ {
        (0..self.width()).flat_map(move |col| {
            (0..self.height()).map(move |row| TilePlacement {
                col,
                row,
                tile: self.tile_at(col, row),
                center: self.cell_center(col, row),
            })
        })
    }

    pub fn door_cell(&self) -> (usize, usize) {
        self.door
    }

    pub fn door_position(&self) -> Vec2 {
        self.cell_center(self.door.0, self.door.1)
    }

    pub fn door_state(&self) -> DoorState {
        self.door_state
    }

    pub fn is_door_open(&self) -> bool {
        matches!(self.door_state, DoorState::Open { .. })
    }

    /// Switch the door to its open look; `ratio` scales `units_per_tile`
    pub fn open_door(&mut self, ratio: f32) {
        let ratio = crate::positive_or(ratio, ScaleProfile::default().open_door);
        let radius = self.units_per_tile * ratio;
        self.door_state = DoorState::Open { radius };
        log::debug!("Door at {:?} opened (radius {})", self.door, radius);
    }

    pub fn door_shape(&self) -> Shape {
        let center = self.door_position();
        match self.door_state {
            DoorState::Closed => Shape::rect(center, Vec2::splat(self.units_per_tile)),
            DoorState::Open { radius } => Shape::circle(center, radius),
        }
    }

    pub fn wall_count(&self) -> usize {
        self.wall_cells().count()
    }

    pub fn wall_cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.placements()
            .filter(|p| p.tile == Tile::Wall)
            .map(|p| (p.col, p.row))
    }

    /// Collision footprints of all wall tiles
    pub fn wall_shapes(&self) -> Vec<Shape> {
        self.wall_cells()
            .map(|(col, row)| self.wall_shape(col, row))
            .collect()
    }

    fn wall_shape(&self, col: usize, row: usize) -> Shape {
        Shape::rect(self.cell_center(col, row), Vec2::splat(self.units_per_tile))
    }

    /// Wall segments laid during generation, in placement order
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn report(&self) -> &WallReport {
        &self.report
    }

    /// Check if a shape overlaps any wall tile
    pub fn blocks(&self, shape: &Shape) -> bool {
        self.walls_near(shape.min(), shape.max())
            .any(|wall| overlaps(shape, &wall))
    }

    /// Check if a point lies inside any wall tile
    pub fn point_blocked(&self, point: Vec2) -> bool {
        self.walls_near(point, point).any(|wall| point_in(point, &wall))
    }

    /// Wall shapes whose cells touch the box `[min, max]`, padded by one cell
    fn walls_near(&self, min: Vec2, max: Vec2) -> impl Iterator<Item = Shape> + '_ {
        let size = self.tile_size();
        let last_col = self.width() as f32 - 1.0;
        let last_row = self.height() as f32 - 1.0;
        let lo = ((min - self.origin) / size).floor() - Vec2::ONE;
        let hi = ((max - self.origin) / size).floor() + Vec2::ONE;

        // Boxes entirely off the grid produce an empty range
        let (c0, c1) = (lo.x.max(0.0), hi.x.min(last_col));
        let (r0, r1) = (lo.y.max(0.0), hi.y.min(last_row));
        let empty = !(c0 <= c1 && r0 <= r1);
        let (c0, c1, r0, r1) = if empty {
            (1, 0, 1, 0)
        } else {
            (c0 as usize, c1 as usize, r0 as usize, r1 as usize)
        };

        (c0..=c1).flat_map(move |col| {
            (r0..=r1)
                .filter(move |&row| self.tile_at(col, row) == Tile::Wall)
                .map(move |row| self.wall_shape(col, row))
        })
    }

    /// Center of a random interior floor cell for the player to start on
    ///
    /// On the wall introduction level the player starts above the wall row,
    /// away from the door, when the map is tall enough to have a free row
    /// there. Returns `None` if no floor cell qualifies.
    pub fn random_spawn_location<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Vec2> {
        // Needs at least one interior row at or above the spawn row
        let min_row = if self.level == WALL_INTRO_LEVEL && self.height() > WALL_INTRO_SPAWN_ROW + 1 {
            WALL_INTRO_SPAWN_ROW
        } else {
            1
        };

        let candidates: Vec<(usize, usize)> = (1..self.width().saturating_sub(1))
            .flat_map(|col| (min_row..self.height().saturating_sub(1)).map(move |row| (col, row)))
            .filter(|&(col, row)| self.tile_at(col, row) == Tile::Floor)
            .collect();

        candidates
            .choose(rng)
            .map(|&(col, row)| self.cell_center(col, row))
    }
}

impl fmt::Display for Grid {
    /// ASCII map, top row first
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in (0..self.height()).rev() {
            let line: String = (0..self.width())
                .map(|col| self.tile_at(col, row).as_char())
                .collect();
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}
