//! Request and resolved parameter types for running animations.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::color::{ColorSequence, PreparedColors};

/// Travel direction for animations that sweep along the strip.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    #[default]
    Forward,
    Backward,
}

/// How many full iterations an animation performs before finishing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunCount {
    /// Loop until cancelled.
    Infinite,
    /// Run exactly this many iterations, then finish.
    Count(u32),
}

impl RunCount {
    pub fn is_infinite(self) -> bool {
        matches!(self, RunCount::Infinite)
    }
}

impl Default for RunCount {
    fn default() -> RunCount {
        RunCount::Count(1)
    }
}

/// Round-robin bookkeeping for animation groups.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GroupState {
    /// Not a group, or a group that draws members at random.
    NotGrouped,
    Randomized,
    /// Ordered group; `next` indexes the member to schedule next.
    Ordered { next: usize },
}

/// A client request to start an animation.
///
/// Every field except the animation name is optional; resolution fills the
/// gaps from the animation's definition and the target section. The struct
/// deserializes from partial JSON, so a request can be as small as
/// `{"animation": "sparkle"}`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AnimationToRunParams {
    pub animation: String,
    #[serde(default)]
    pub colors: Vec<ColorSequence>,
    #[serde(default)]
    pub center: Option<usize>,
    #[serde(default)]
    pub delay_ms: Option<u64>,
    #[serde(default)]
    pub delay_mod: Option<f64>,
    #[serde(default)]
    pub direction: Option<Direction>,
    #[serde(default)]
    pub distance: Option<usize>,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub run_count: Option<RunCount>,
    #[serde(default)]
    pub section: Option<String>,
    #[serde(default)]
    pub spacing: Option<usize>,
}

impl AnimationToRunParams {
    pub fn new(animation: &str) -> AnimationToRunParams {
        AnimationToRunParams {
            animation: animation.to_string(),
            ..AnimationToRunParams::default()
        }
    }

    pub fn with_color(mut self, colors: ColorSequence) -> AnimationToRunParams {
        self.colors.push(colors);
        self
    }

    pub fn with_center(mut self, center: usize) -> AnimationToRunParams {
        self.center = Some(center);
        self
    }

    pub fn with_delay(mut self, delay_ms: u64) -> AnimationToRunParams {
        self.delay_ms = Some(delay_ms);
        self
    }

    pub fn with_delay_mod(mut self, delay_mod: f64) -> AnimationToRunParams {
        self.delay_mod = Some(delay_mod);
        self
    }

    pub fn with_direction(mut self, direction: Direction) -> AnimationToRunParams {
        self.direction = Some(direction);
        self
    }

    pub fn with_distance(mut self, distance: usize) -> AnimationToRunParams {
        self.distance = Some(distance);
        self
    }

    pub fn with_id(mut self, id: &str) -> AnimationToRunParams {
        self.id = Some(id.to_string());
        self
    }

    pub fn with_run_count(mut self, run_count: RunCount) -> AnimationToRunParams {
        self.run_count = Some(run_count);
        self
    }

    pub fn with_section(mut self, section: &str) -> AnimationToRunParams {
        self.section = Some(section.to_string());
        self
    }

    pub fn with_spacing(mut self, spacing: usize) -> AnimationToRunParams {
        self.spacing = Some(spacing);
        self
    }
}

/// Fully resolved parameters, immutable for the lifetime of one run.
///
/// Animation bodies read these; changing a running animation means ending
/// it and starting a new one. `colors` always holds at least one prepared
/// entry. `source_colors` keeps the sequences exactly as the caller supplied
/// them, so a group can hand them down and members with no group colors
/// still fall back to their own defaults.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RunningAnimationParams {
    pub animation: String,
    pub colors: Vec<PreparedColors>,
    pub source_colors: Vec<ColorSequence>,
    pub center: usize,
    pub delay_ms: u64,
    pub direction: Direction,
    pub distance: usize,
    pub id: String,
    pub run_count: RunCount,
    pub section: String,
    pub spacing: usize,
    pub group_state: GroupState,
}

impl RunningAnimationParams {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    /// Prepared colors by slot, wrapping past the end.
    pub fn color_at(&self, index: usize) -> &PreparedColors {
        &self.colors[index % self.colors.len()]
    }
}
