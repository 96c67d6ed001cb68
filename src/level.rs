//! Level transitions
//!
//! `LevelManager` owns everything that changes between levels: the current
//! map, the play field bounds, the prefab scales and the seeded RNG. Moving
//! to the next level swaps in a freshly generated grid in one step.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::consts::{PROGRESSION_MAX_HEIGHT, PROGRESSION_MIN_HEIGHT};
use crate::map::{Grid, LevelType, MapGenerator};
use crate::scaling::{PrefabCatalog, PrefabScales};
use crate::settings::Settings;
use crate::sim::{BoundedPlane, Shape, Viewport, overlaps, point_in};

#[derive(Debug)]
pub struct LevelManager {
    settings: Settings,
    generator: MapGenerator,
    plane: BoundedPlane,
    seed: u64,
    rng: Pcg32,
    catalog: PrefabCatalog,
    scales: PrefabScales,
    grid: Option<Grid>,
    level: u32,
}

impl LevelManager {
    /// Create a manager before the first level
    ///
    /// Without a configured seed a random one is drawn; [`Self::seed`]
    /// reports it so a run can be replayed.
    pub fn new(settings: Settings) -> Self {
        let settings = settings.sanitized();
        let seed = settings.seed.unwrap_or_else(|| rand::rng().random());
        let generator = MapGenerator::new(settings.viewport)
            .with_placement_attempts(settings.placement_attempts);
        let (_, _, units_per_tile) = generator.map_size(settings.map_height);
        let catalog = PrefabCatalog::default();

        log::info!("Level manager ready (seed {})", seed);

        Self {
            plane: BoundedPlane::from_viewport(&settings.viewport),
            scales: PrefabScales::for_tile(units_per_tile, &catalog, &settings.scale),
            rng: Pcg32::seed_from_u64(seed),
            seed,
            generator,
            catalog,
            settings,
            grid: None,
            level: 0,
        }
    }

    /// Use a different set of prefab sprites
    pub fn with_catalog(mut self, catalog: PrefabCatalog) -> Self {
        self.catalog = catalog;
        self.rescale(self.scales.units_per_tile);
        self
    }

    /// Current level, 0 before the first `advance_level`
    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn grid(&self) -> Option<&Grid> {
        self.grid.as_ref()
    }

    pub fn plane(&self) -> &BoundedPlane {
        &self.plane
    }

    pub fn scales(&self) -> &PrefabScales {
        &self.scales
    }

    /// Level type progression: the first level is the tutorial
    pub fn next_level_type(&self) -> LevelType {
        if self.level == 0 {
            LevelType::Tutorial
        } else {
            LevelType::Normal
        }
    }

    /// Map height of the level after `level`
    pub fn map_height_after(level: u32) -> i32 {
        let grown = (level.saturating_add(1) / 3).min(PROGRESSION_MAX_HEIGHT as u32) as i32;
        (grown + PROGRESSION_MIN_HEIGHT).clamp(PROGRESSION_MIN_HEIGHT, PROGRESSION_MAX_HEIGHT)
    }

    /// Move to the next level using the normal progression
    pub fn advance_level(&mut self) -> &Grid {
        let level_type = self.next_level_type();
        let height = Self::map_height_after(self.level);
        self.advance_level_with(level_type, height)
    }

    /// Move to the next level with a forced type and map height
    pub fn advance_level_with(&mut self, level_type: LevelType, height: i32) -> &Grid {
        self.level = self.level.saturating_add(1);
        let grid = self
            .generator
            .generate(self.level, level_type, height, &mut self.rng);
        self.rescale(grid.units_per_tile());
        self.grid.insert(grid)
    }

    fn rescale(&mut self, units_per_tile: f32) {
        self.scales = PrefabScales::for_tile(units_per_tile, &self.catalog, &self.settings.scale);
    }

    /// Track a camera change; maps generated from now on use the new size
    pub fn set_viewport(&mut self, viewport: Viewport) {
        let viewport = viewport.sanitized();
        log::debug!(
            "Viewport changed to {}x{} at {:?}",
            viewport.half_width * 2.0,
            viewport.half_height * 2.0,
            viewport.center
        );
        self.settings.viewport = viewport;
        self.generator.set_viewport(viewport);
        self.plane.recompute_bounds(&viewport);
    }

    /// Random player start on the current map
    pub fn spawn_location(&mut self) -> Option<Vec2> {
        self.grid
            .as_ref()
            .and_then(|grid| grid.random_spawn_location(&mut self.rng))
    }

    pub fn open_door(&mut self) {
        let ratio = self.settings.scale.open_door;
        if let Some(grid) = self.grid.as_mut() {
            grid.open_door(ratio);
        }
    }

    pub fn is_door_open(&self) -> bool {
        self.grid.as_ref().is_some_and(Grid::is_door_open)
    }

    /// Check if the player touches the key while the door is still closed
    pub fn picks_up_key(&self, player: &Shape, key: &Shape) -> bool {
        self.grid.is_some() && !self.is_door_open() && overlaps(player, key)
    }

    /// Where a dropped key ends up: pulled back inside the screen if needed
    pub fn key_drop_position(&self, key: &Shape) -> Vec2 {
        self.plane.clamp_inside(key)
    }

    /// Check if the player stands on the open door (door center inside the player)
    pub fn door_reached(&self, player: &Shape) -> bool {
        self.grid
            .as_ref()
            .is_some_and(|grid| grid.is_door_open() && point_in(grid.door_position(), player))
    }

    /// Player or asteroid against the walls
    pub fn hits_wall(&self, shape: &Shape) -> bool {
        self.grid.as_ref().is_some_and(|grid| grid.blocks(shape))
    }

    /// Bullets are tested by their center point only
    pub fn bullet_hits_wall(&self, position: Vec2) -> bool {
        self.grid
            .as_ref()
            .is_some_and(|grid| grid.point_blocked(position))
    }

    pub fn wrap(&self, position: Vec2) -> Vec2 {
        self.plane.wrap(position)
    }

    pub fn out_of_bounds(&self, shape: &Shape) -> bool {
        self.plane.is_out_of_bounds(shape)
    }
}
