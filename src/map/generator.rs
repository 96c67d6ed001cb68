//! Procedural level maps
//!
//! A map is a grid of floor tiles with straight wall segments and exactly
//! one door. Wall segments are laid one at a time; every wall cell reserves
//! its eight neighbors in a transient buffer grid so later segments keep at
//! least one floor tile between them and never merge.

use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};

use super::difficulty::WallBudget;
use super::grid::{Grid, Tile, TileGrid};
use crate::consts::*;
use crate::sim::Viewport;

/// Special level categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LevelType {
    #[default]
    Normal,
    /// Same layout rules as `Normal`; never picked by level progression
    Night,
    /// No walls at all
    Tutorial,
}

/// Compass direction a wall segment grows in (row 0 is the bottom)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Right,
    Down,
    Left,
}

impl Direction {
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        match rng.random_range(0..4) {
            0 => Direction::Down,
            1 => Direction::Left,
            2 => Direction::Up,
            _ => Direction::Right,
        }
    }

    /// Column/row offset of one step
    #[inline]
    pub fn step(&self) -> (isize, isize) {
        match self {
            Direction::Up => (0, 1),
            Direction::Right => (1, 0),
            Direction::Down => (0, -1),
            Direction::Left => (-1, 0),
        }
    }

    #[inline]
    pub fn is_horizontal(&self) -> bool {
        matches!(self, Direction::Left | Direction::Right)
    }
}

/// One straight run of wall tiles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Segment {
    pub start: (usize, usize),
    pub direction: Direction,
    /// Number of wall tiles actually laid (at least 1)
    pub length: usize,
}

impl Segment {
    /// Cells covered by the segment, from the start outward
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let (dx, dy) = self.direction.step();
        let (col, row) = self.start;
        (0..self.length as isize).map(move |i| {
            (
                col.wrapping_add_signed(dx * i),
                row.wrapping_add_signed(dy * i),
            )
        })
    }
}

/// Outcome of the wall placement phase
///
/// `exhausted` is set when no free start cell turned up within the
/// placement budget and the remaining segments were skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WallReport {
    pub requested: u32,
    pub placed: u32,
    pub exhausted: bool,
}

/// Builds a fresh [`Grid`] for each level
#[derive(Debug, Clone)]
pub struct MapGenerator {
    viewport: Viewport,
    placement_attempts: u32,
}

impl Default for MapGenerator {
    fn default() -> Self {
        Self::new(Viewport::default())
    }
}

impl MapGenerator {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport: viewport.sanitized(),
            placement_attempts: WALL_PLACEMENT_ATTEMPTS,
        }
    }

    /// Override the start-cell search budget (minimum 1)
    pub fn with_placement_attempts(mut self, attempts: u32) -> Self {
        self.placement_attempts = attempts.max(1);
        self
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport.sanitized();
    }

    /// Grid dimensions and `units_per_tile` for a requested height
    ///
    /// Heights below the minimum fall back to the default.
    pub fn map_size(&self, height: i32) -> (usize, usize, f32) {
        let height = if height < MIN_MAP_HEIGHT {
            DEFAULT_MAP_HEIGHT
        } else {
            height.min(MAX_MAP_HEIGHT)
        };
        let units_per_tile = self.viewport.half_height / height as f32;
        let width = (self.viewport.half_width / units_per_tile).ceil() as usize;

        (
            width.clamp(MIN_MAP_WIDTH, MAX_MAP_WIDTH),
            height as usize,
            units_per_tile,
        )
    }

    /// Generate the map for a level
    pub fn generate<R: Rng + ?Sized>(
        &self,
        level: u32,
        level_type: LevelType,
        height: i32,
        rng: &mut R,
    ) -> Grid {
        let (width, height, units_per_tile) = self.map_size(height);
        let mut tiles = TileGrid::new(width, height);
        let mut segments = Vec::new();

        let report = match level_type {
            LevelType::Tutorial => WallReport::default(),
            LevelType::Normal | LevelType::Night if level == WALL_INTRO_LEVEL => {
                lay_intro_wall(&mut tiles, &mut segments)
            }
            LevelType::Normal | LevelType::Night => lay_segments(
                &mut tiles,
                &mut segments,
                level,
                self.placement_attempts,
                rng,
            ),
        };

        let door = place_door(&mut tiles, level, rng);

        log::info!(
            "Level {} ({:?}): {}x{} tiles, {} of {} wall segments, door at {:?}",
            level,
            level_type,
            width,
            height,
            report.placed,
            report.requested,
            door
        );

        Grid::new(
            tiles,
            units_per_tile,
            self.viewport.origin(),
            door,
            level,
            level_type,
            segments,
            report,
        )
    }
}

/// Full-width wall row that introduces walls on level 2
fn lay_intro_wall(tiles: &mut TileGrid<Tile>, segments: &mut Vec<Segment>) -> WallReport {
    if WALL_INTRO_ROW >= tiles.height() {
        return WallReport::default();
    }
    for col in 0..tiles.width() {
        tiles.set(col, WALL_INTRO_ROW, Tile::Wall);
    }
    segments.push(Segment {
        start: (0, WALL_INTRO_ROW),
        direction: Direction::Right,
        length: tiles.width(),
    });
    WallReport {
        requested: 1,
        placed: 1,
        exhausted: false,
    }
}

/// Random wall segments scaled by level
fn lay_segments<R: Rng + ?Sized>(
    tiles: &mut TileGrid<Tile>,
    segments: &mut Vec<Segment>,
    level: u32,
    attempts: u32,
    rng: &mut R,
) -> WallReport {
    let mut report = WallReport::default();

    if tiles.width() < MIN_WALL_MAP_WIDTH {
        return report;
    }
    let Some(budget) = WallBudget::for_level(level) else {
        return report;
    };

    let mut buffer: TileGrid<bool> = TileGrid::new(tiles.width(), tiles.height());
    report.requested = rng.random_range(budget.min_walls..budget.max_walls);

    for _ in 0..report.requested {
        let direction = Direction::random(rng);
        let length = rng.random_range(budget.min_length..=budget.max_length);

        let Some(start) = find_free_cell(&buffer, attempts, rng) else {
            report.exhausted = true;
            log::debug!(
                "No free wall start after {} attempts, stopping at {} of {} segments",
                attempts,
                report.placed,
                report.requested
            );
            break;
        };

        segments.push(lay_segment(tiles, &mut buffer, start, direction, length));
        report.placed += 1;
    }

    report
}

/// Rejection-sample an interior cell that is not reserved
fn find_free_cell<R: Rng + ?Sized>(
    buffer: &TileGrid<bool>,
    attempts: u32,
    rng: &mut R,
) -> Option<(usize, usize)> {
    (0..attempts).find_map(|_| {
        let cell = (
            rng.random_range(1..buffer.width() - 1),
            rng.random_range(1..buffer.height() - 1),
        );
        (!reserved(buffer, cell)).then_some(cell)
    })
}

#[inline]
fn reserved(buffer: &TileGrid<bool>, (col, row): (usize, usize)) -> bool {
    buffer.get(col, row).copied().unwrap_or(true)
}

#[inline]
fn reserve(buffer: &mut TileGrid<bool>, cell: (usize, usize), dx: isize, dy: isize) {
    if let Some((col, row)) = buffer.offset(cell, dx, dy) {
        buffer.set(col, row, true);
    }
}

/// Lay one segment starting at a free cell
///
/// Growth stops early at a reserved cell or the border. Afterwards every
/// cell in the 8-neighborhood of the segment is reserved.
fn lay_segment(
    tiles: &mut TileGrid<Tile>,
    buffer: &mut TileGrid<bool>,
    start: (usize, usize),
    direction: Direction,
    length: usize,
) -> Segment {
    let (sx, sy) = direction.step();
    // Unit vector across the segment
    let (px, py) = if direction.is_horizontal() { (0, 1) } else { (1, 0) };

    tiles.set(start.0, start.1, Tile::Wall);
    reserve(buffer, start, 0, 0);
    reserve(buffer, start, -sx, -sy);
    for along in -1..=1 {
        reserve(buffer, start, along * sx + px, along * sy + py);
        reserve(buffer, start, along * sx - px, along * sy - py);
    }

    let mut end = start;
    let mut laid = 1;
    while laid < length {
        let Some(next) = tiles.offset(end, sx, sy) else {
            break;
        };
        if !tiles.is_interior(next) || reserved(buffer, next) {
            break;
        }

        tiles.set(next.0, next.1, Tile::Wall);
        reserve(buffer, next, 0, 0);
        reserve(buffer, next, sx + px, sy + py);
        reserve(buffer, next, sx - px, sy - py);

        end = next;
        laid += 1;
    }

    // Keep the next segment from touching this one end-to-end
    reserve(buffer, end, sx, sy);

    Segment {
        start,
        direction,
        length: laid,
    }
}

/// Mark exactly one interior cell as the door
///
/// Prefers floor cells so the door never eats a wall tile; the wall
/// introduction level pins the door row below the wall.
fn place_door<R: Rng + ?Sized>(tiles: &mut TileGrid<Tile>, level: u32, rng: &mut R) -> (usize, usize) {
    let (width, height) = (tiles.width(), tiles.height());
    let rows = if level == WALL_INTRO_LEVEL {
        let row = WALL_INTRO_DOOR_ROW.min(height - 2);
        row..row + 1
    } else {
        1..height - 1
    };

    let floor_cells: Vec<(usize, usize)> = (1..width - 1)
        .flat_map(|col| rows.clone().map(move |row| (col, row)))
        .filter(|&(col, row)| tiles.get(col, row) == Some(&Tile::Floor))
        .collect();

    let door = match floor_cells.choose(rng) {
        Some(&cell) => cell,
        None => (
            rng.random_range(1..width - 1),
            rng.random_range(rows.start..rows.end),
        ),
    };

    tiles.set(door.0, door.1, Tile::Door);
    door
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;
    use std::collections::HashMap;

    fn generator() -> MapGenerator {
        MapGenerator::new(Viewport::default())
    }

    fn door_count(grid: &Grid) -> usize {
        grid.placements().filter(|p| p.tile == Tile::Door).count()
    }

    fn assert_door_valid(grid: &Grid) {
        assert_eq!(door_count(grid), 1);
        let (col, row) = grid.door_cell();
        assert_eq!(grid.tile_at(col, row), Tile::Door);
        assert!(col >= 1 && col + 1 < grid.width(), "door column {col} on border");
        assert!(row >= 1 && row + 1 < grid.height(), "door row {row} on border");
    }

    /// Every wall neighbor (8-neighborhood) of a wall tile belongs to the same segment
    fn assert_segments_spaced(grid: &Grid) {
        let mut owner = HashMap::new();
        for (id, segment) in grid.segments().iter().enumerate() {
            for cell in segment.cells() {
                assert!(owner.insert(cell, id).is_none(), "segments overlap at {cell:?}");
            }
        }

        for (col, row) in grid.wall_cells() {
            let id = owner.get(&(col, row)).expect("wall tile outside any segment");
            for dx in -1..=1isize {
                for dy in -1..=1isize {
                    let Some(n) = col
                        .checked_add_signed(dx)
                        .zip(row.checked_add_signed(dy))
                    else {
                        continue;
                    };
                    if grid.get(n.0, n.1) == Some(Tile::Wall) {
                        assert_eq!(owner.get(&n), Some(id), "segments touch at {n:?}");
                    }
                }
            }
        }
    }

    #[test]
    fn test_map_size() {
        let mut generator = generator();
        generator.set_viewport(Viewport::new(glam::Vec2::ZERO, 8.0, 4.0));

        let (w, h, u) = generator.map_size(16);
        assert_eq!((w, h), (32, 16));
        assert_eq!(u, 0.25);

        // Invalid heights fall back to the default
        assert_eq!(generator.map_size(2).1, DEFAULT_MAP_HEIGHT as usize);
        assert_eq!(generator.map_size(-5).1, DEFAULT_MAP_HEIGHT as usize);
        assert_eq!(generator.map_size(3).1, 3);
    }

    #[test]
    fn test_width_rounds_up() {
        let generator = MapGenerator::new(Viewport::new(glam::Vec2::ZERO, 5.1, 5.0));
        let (w, h, _) = generator.map_size(10);
        assert_eq!(h, 10);
        assert_eq!(w, 11);
    }

    #[test]
    fn test_tutorial_has_no_walls() {
        let mut rng = Pcg32::seed_from_u64(1);
        for level in [1, 2, 5, 25, 60] {
            let grid = generator().generate(level, LevelType::Tutorial, 16, &mut rng);
            assert_eq!(grid.wall_count(), 0, "level {level}");
            assert_eq!(grid.report().requested, 0);
            assert_door_valid(&grid);
        }
    }

    #[test]
    fn test_low_levels_have_no_walls() {
        let mut rng = Pcg32::seed_from_u64(2);
        for level in [0, 1] {
            let grid = generator().generate(level, LevelType::Normal, 16, &mut rng);
            assert_eq!(grid.wall_count(), 0);
            assert_door_valid(&grid);
        }
    }

    #[test]
    fn test_intro_level_layout() {
        let mut rng = Pcg32::seed_from_u64(3);
        let grid = generator().generate(WALL_INTRO_LEVEL, LevelType::Normal, 16, &mut rng);

        for col in 0..grid.width() {
            assert_eq!(grid.tile_at(col, WALL_INTRO_ROW), Tile::Wall);
        }
        assert_eq!(grid.wall_count(), grid.width());
        assert_eq!(grid.door_cell().1, WALL_INTRO_DOOR_ROW);
        assert_eq!(grid.segments().len(), 1);
        assert_door_valid(&grid);
    }

    #[test]
    fn test_intro_level_on_smallest_map() {
        let mut rng = Pcg32::seed_from_u64(4);
        let grid = generator().generate(WALL_INTRO_LEVEL, LevelType::Normal, 3, &mut rng);
        assert_eq!(grid.height(), 3);
        // Row 3 does not exist, so no wall; the door moves to the only interior row
        assert_eq!(grid.wall_count(), 0);
        assert_eq!(grid.door_cell().1, 1);
        assert_door_valid(&grid);
    }

    #[test]
    fn test_same_seed_same_map() {
        let a = generator().generate(12, LevelType::Normal, 16, &mut Pcg32::seed_from_u64(42));
        let b = generator().generate(12, LevelType::Normal, 16, &mut Pcg32::seed_from_u64(42));
        assert_eq!(a, b);

        let c = generator().generate(12, LevelType::Normal, 16, &mut Pcg32::seed_from_u64(43));
        assert_ne!(a.to_string(), c.to_string());
    }

    #[test]
    fn test_max_tier_respects_budget() {
        for seed in 0..40 {
            let mut rng = Pcg32::seed_from_u64(seed);
            let grid = generator().generate(25, LevelType::Normal, 16, &mut rng);
            let report = grid.report();

            assert!(report.requested >= 15 && report.requested < 35);
            assert!(report.placed <= report.requested);
            assert_eq!(grid.segments().len(), report.placed as usize);
            assert!(grid.segments().iter().all(|s| s.length >= 1 && s.length <= 20));
            assert_segments_spaced(&grid);
            assert_door_valid(&grid);
        }
    }

    #[test]
    fn test_walls_stay_off_the_border() {
        for seed in 0..20 {
            let mut rng = Pcg32::seed_from_u64(seed);
            let grid = generator().generate(30, LevelType::Normal, 12, &mut rng);
            for (col, row) in grid.wall_cells() {
                assert!(col >= 1 && col + 1 < grid.width());
                assert!(row >= 1 && row + 1 < grid.height());
            }
        }
    }

    #[test]
    fn test_night_uses_normal_rules() {
        let normal = generator().generate(8, LevelType::Normal, 16, &mut Pcg32::seed_from_u64(9));
        let night = generator().generate(8, LevelType::Night, 16, &mut Pcg32::seed_from_u64(9));
        assert_eq!(normal.to_string(), night.to_string());
    }

    #[test]
    fn test_exhausted_budget_is_reported() {
        // A tiny map fills up fast; with a single attempt per start the
        // placement phase gives up early but the door is still placed.
        let generator = MapGenerator::new(Viewport::new(glam::Vec2::ZERO, 5.0, 5.0))
            .with_placement_attempts(1);
        let mut exhausted = false;
        for seed in 0..50 {
            let grid = generator.generate(25, LevelType::Normal, 5, &mut Pcg32::seed_from_u64(seed));
            let report = grid.report();
            if report.exhausted {
                exhausted = true;
                assert!(report.placed < report.requested);
            }
            assert_segments_spaced(&grid);
            assert_door_valid(&grid);
        }
        assert!(exhausted);
    }

    #[test]
    fn test_narrow_map_skips_walls() {
        // half_width 1 over half_height 4 at 16 rows: ceil(1 / 0.25) = 4 columns
        let generator = MapGenerator::new(Viewport::new(glam::Vec2::ZERO, 1.0, 4.0));
        let grid = generator.generate(25, LevelType::Normal, 16, &mut Pcg32::seed_from_u64(5));
        assert_eq!(grid.width(), 4);
        assert_eq!(grid.wall_count(), 0);
        assert_door_valid(&grid);
    }

    #[test]
    fn test_lay_segment_stops_at_reserved_cell() {
        let mut tiles: TileGrid<Tile> = TileGrid::new(10, 5);
        let mut buffer: TileGrid<bool> = TileGrid::new(10, 5);
        buffer.set(5, 2, true);

        let seg = lay_segment(&mut tiles, &mut buffer, (2, 2), Direction::Right, 8);
        assert_eq!(seg.length, 3);
        assert_eq!(seg.cells().collect::<Vec<_>>(), vec![(2, 2), (3, 2), (4, 2)]);
        assert_eq!(tiles.get(5, 2), Some(&Tile::Floor));

        // Whole 8-neighborhood is reserved
        for col in 1..=5 {
            for row in 1..=3 {
                assert_eq!(buffer.get(col, row), Some(&true), "({col}, {row})");
            }
        }
        assert_eq!(buffer.get(6, 2), Some(&false));
    }

    #[test]
    fn test_lay_segment_stops_at_border() {
        let mut tiles: TileGrid<Tile> = TileGrid::new(6, 6);
        let mut buffer: TileGrid<bool> = TileGrid::new(6, 6);

        let seg = lay_segment(&mut tiles, &mut buffer, (2, 3), Direction::Down, 10);
        assert_eq!(seg.length, 3);
        assert_eq!(seg.cells().last(), Some((2, 1)));
        assert_eq!(tiles.get(2, 0), Some(&Tile::Floor));

        // Vertical segments reserve the columns on either side
        for col in 1..=3 {
            for row in 0..=4 {
                assert_eq!(buffer.get(col, row), Some(&true), "({col}, {row})");
            }
        }
        assert_eq!(buffer.get(4, 2), Some(&false));
        assert_eq!(buffer.get(2, 5), Some(&false));
    }

    #[test]
    fn test_direction_steps() {
        assert_eq!(Direction::Up.step(), (0, 1));
        assert_eq!(Direction::Left.step(), (-1, 0));
        assert!(Direction::Right.is_horizontal());
        assert!(!Direction::Down.is_horizontal());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn generated_maps_hold_invariants(
            seed in any::<u64>(),
            level in 0u32..60,
            height in -2i32..30,
            tutorial in any::<bool>(),
        ) {
            let level_type = if tutorial { LevelType::Tutorial } else { LevelType::Normal };
            let grid = generator().generate(level, level_type, height, &mut Pcg32::seed_from_u64(seed));

            prop_assert_eq!(door_count(&grid), 1);
            let (col, row) = grid.door_cell();
            prop_assert!(col >= 1 && col + 1 < grid.width());
            prop_assert!(row >= 1 && row + 1 < grid.height());

            if tutorial {
                prop_assert_eq!(grid.wall_count(), 0);
            }
            if level != WALL_INTRO_LEVEL {
                assert_segments_spaced(&grid);
            }
        }
    }
}
