//! Wall count and length ranges by level

use serde::{Deserialize, Serialize};

/// Difficulty bracket a level falls into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tier {
    /// Levels 0-2: no random walls
    Intro,
    /// Levels 3-20: ranges grow with the level
    Scaling,
    /// Levels past 20: fixed maximum ranges
    Max,
}

impl Tier {
    pub fn for_level(level: u32) -> Self {
        match level {
            0..=2 => Tier::Intro,
            3..=20 => Tier::Scaling,
            _ => Tier::Max,
        }
    }
}

/// How many wall segments to lay and how long they may be
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WallBudget {
    /// Inclusive lower bound on the segment count
    pub min_walls: u32,
    /// Exclusive upper bound on the segment count
    pub max_walls: u32,
    /// Inclusive segment length range
    pub min_length: usize,
    pub max_length: usize,
}

impl WallBudget {
    /// Ranges for a level, `None` for intro-tier levels
    pub fn for_level(level: u32) -> Option<Self> {
        match Tier::for_level(level) {
            Tier::Intro => None,
            Tier::Scaling => {
                let l = level as f32;
                Some(Self {
                    min_walls: (l * 0.2) as u32,
                    max_walls: 10 + level,
                    min_length: 1 + (l * 0.15) as usize,
                    max_length: 5 + (l * 0.75) as usize,
                })
            }
            Tier::Max => Some(Self {
                min_walls: 15,
                max_walls: 35,
                min_length: 4,
                max_length: 20,
            }),
        }
    }
}
