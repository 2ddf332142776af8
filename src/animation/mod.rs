//! Animation definitions, parameter resolution, and the running-animation
//! manager.

pub mod library;
pub mod manager;
pub mod params;

use std::fmt;

use crate::color::{Color, ColorSequence};
use crate::error::{Error, Result};
use crate::section::Section;
use crate::sync::CancelToken;

use params::{AnimationToRunParams, GroupState, RunCount, RunningAnimationParams};

/// One iteration of an animation.
///
/// The body runs on its own thread, writes through the section it was given
/// and sleeps through the token so cancellation interrupts delays. Returning
/// an error ends the run; other animations are unaffected.
pub type AnimationBody = fn(&Section, &RunningAnimationParams, &CancelToken) -> Result<()>;

/// What a registered animation actually is.
#[derive(Clone)]
pub enum AnimationKind {
    /// A body invoked once per iteration.
    Leaf(AnimationBody),
    /// A scheduler that runs other registered animations.
    Group(GroupSpec),
}

/// Scheduling rules for an animation group.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GroupSpec {
    pub members: Vec<String>,
    pub order: GroupOrder,
    /// Hard bound on each member's runtime. `None` waits for the member to
    /// finish on its own.
    pub member_timeout_ms: Option<u64>,
    /// Pause after each member before the next is scheduled.
    pub post_delay_ms: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GroupOrder {
    Ordered,
    Randomized,
}

/// A registered animation: its name, its parameter defaults, and either a
/// body or a group schedule.
///
/// Defaults fill whatever a request leaves out. `default_colors` covers
/// missing color slots one by one; an animation whose required slots exceed
/// its defaults makes those colors mandatory in the request.
#[derive(Clone)]
pub struct AnimationDefinition {
    name: String,
    required_colors: usize,
    default_colors: Vec<Color>,
    default_delay_ms: u64,
    default_spacing: usize,
    default_run_count: RunCount,
    /// `None` resolves to the target section's full length.
    default_distance: Option<usize>,
    kind: AnimationKind,
}

impl AnimationDefinition {
    pub fn leaf(name: &str, body: AnimationBody) -> AnimationDefinition {
        AnimationDefinition {
            name: name.to_string(),
            required_colors: 1,
            default_colors: Vec::new(),
            default_delay_ms: 50,
            default_spacing: 3,
            default_run_count: RunCount::Count(1),
            default_distance: None,
            kind: AnimationKind::Leaf(body),
        }
    }

    pub fn ordered_group(name: &str, members: Vec<String>) -> AnimationDefinition {
        AnimationDefinition::group(name, members, GroupOrder::Ordered)
    }

    pub fn randomized_group(name: &str, members: Vec<String>) -> AnimationDefinition {
        AnimationDefinition::group(name, members, GroupOrder::Randomized)
    }

    fn group(name: &str, members: Vec<String>, order: GroupOrder) -> AnimationDefinition {
        AnimationDefinition {
            name: name.to_string(),
            required_colors: 0,
            default_colors: Vec::new(),
            default_delay_ms: 50,
            default_spacing: 3,
            default_run_count: RunCount::Infinite,
            default_distance: None,
            kind: AnimationKind::Group(GroupSpec {
                members,
                order,
                member_timeout_ms: None,
                post_delay_ms: 0,
            }),
        }
    }

    pub fn with_required_colors(mut self, count: usize) -> AnimationDefinition {
        self.required_colors = count;
        self
    }

    pub fn with_default_colors(mut self, colors: Vec<Color>) -> AnimationDefinition {
        self.default_colors = colors;
        self
    }

    pub fn with_default_delay(mut self, delay_ms: u64) -> AnimationDefinition {
        self.default_delay_ms = delay_ms;
        self
    }

    pub fn with_default_spacing(mut self, spacing: usize) -> AnimationDefinition {
        self.default_spacing = spacing;
        self
    }

    pub fn with_default_run_count(mut self, run_count: RunCount) -> AnimationDefinition {
        self.default_run_count = run_count;
        self
    }

    pub fn with_default_distance(mut self, distance: usize) -> AnimationDefinition {
        self.default_distance = Some(distance);
        self
    }

    /// Bounds each group member's runtime. No effect on leaf animations.
    pub fn with_member_timeout(mut self, timeout_ms: u64) -> AnimationDefinition {
        if let AnimationKind::Group(ref mut spec) = self.kind {
            spec.member_timeout_ms = Some(timeout_ms);
        }
        self
    }

    /// Pause between group members. No effect on leaf animations.
    pub fn with_post_delay(mut self, delay_ms: u64) -> AnimationDefinition {
        if let AnimationKind::Group(ref mut spec) = self.kind {
            spec.post_delay_ms = delay_ms;
        }
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_group(&self) -> bool {
        matches!(self.kind, AnimationKind::Group(_))
    }

    pub(crate) fn kind(&self) -> &AnimationKind {
        &self.kind
    }

    /// Fills a request's gaps against this definition and a target section.
    ///
    /// Pure except for the errors it raises: an explicit or defaulted center
    /// outside the section, or too few colors once defaults are exhausted.
    /// The id is passed through as-is; the manager assigns one later if the
    /// request left it empty.
    pub(crate) fn resolve(
        &self,
        request: &AnimationToRunParams,
        section: &Section,
    ) -> Result<RunningAnimationParams> {
        let num_leds = section.num_leds();

        let center = request.center.unwrap_or(num_leds / 2);
        if center >= num_leds {
            return Err(Error::CenterOutOfSection {
                center,
                section_len: num_leds,
            });
        }

        let mut sequences = request.colors.clone();
        while sequences.len() < self.required_colors {
            match self.default_colors.get(sequences.len()) {
                Some(&color) => sequences.push(ColorSequence::solid(color)),
                None => {
                    return Err(Error::MissingColors {
                        animation: self.name.clone(),
                        required: self.required_colors,
                        provided: request.colors.len(),
                    })
                }
            }
        }
        if sequences.is_empty() {
            // Keeps color_at total for bodies that take no required colors.
            sequences.push(ColorSequence::solid(Color::BLACK));
        }
        let colors = sequences.iter().map(|s| s.prepare(num_leds)).collect();

        let base_delay = request.delay_ms.unwrap_or(self.default_delay_ms);
        let delay_mod = request.delay_mod.unwrap_or(1.0);
        let delay_ms = ((base_delay as f64 * delay_mod).round() as u64).max(1);

        let group_state = match &self.kind {
            AnimationKind::Leaf(_) => GroupState::NotGrouped,
            AnimationKind::Group(spec) => match spec.order {
                GroupOrder::Ordered => GroupState::Ordered { next: 0 },
                GroupOrder::Randomized => GroupState::Randomized,
            },
        };

        Ok(RunningAnimationParams {
            animation: self.name.clone(),
            colors,
            source_colors: request.colors.clone(),
            center,
            delay_ms,
            direction: request.direction.unwrap_or_default(),
            distance: request
                .distance
                .unwrap_or_else(|| self.default_distance.unwrap_or(num_leds)),
            id: request.id.clone().unwrap_or_default(),
            run_count: request.run_count.unwrap_or(self.default_run_count),
            section: section.name().to_string(),
            spacing: request.spacing.unwrap_or(self.default_spacing).max(1),
            group_state,
        })
    }
}

impl fmt::Debug for AnimationDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match &self.kind {
            AnimationKind::Leaf(_) => "leaf",
            AnimationKind::Group(_) => "group",
        };
        f.debug_struct("AnimationDefinition")
            .field("name", &self.name)
            .field("kind", &kind)
            .field("required_colors", &self.required_colors)
            .finish()
    }
}
