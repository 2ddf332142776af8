//! The built-in animation catalog.
//!
//! Each body implements one iteration; the manager loops it according to the
//! resolved run count. Bodies write through the section they are handed and
//! sleep through the cancel token, so they stay oblivious to threads,
//! registries, and the render loop.

mod fills;
mod flashes;
mod runners;

use std::time::Duration;

use once_cell::sync::Lazy;

use crate::animation::params::{Direction, RunCount};
use crate::animation::AnimationDefinition;
use crate::color::{Color, PreparedColors};
use crate::error::Result;
use crate::section::Section;
use crate::sync::CancelToken;

/// Definitions every strip starts with.
pub(crate) static BUILTIN_ANIMATIONS: Lazy<Vec<AnimationDefinition>> = Lazy::new(|| {
    vec![
        AnimationDefinition::leaf("solid", fills::solid).with_default_delay(50),
        AnimationDefinition::leaf("alternate", fills::alternate)
            .with_required_colors(2)
            .with_default_colors(vec![Color::WHITE, Color::BLACK])
            .with_default_delay(1000)
            .with_default_run_count(RunCount::Infinite),
        AnimationDefinition::leaf("wipe", fills::wipe).with_default_delay(10),
        AnimationDefinition::leaf("smooth_chase", fills::smooth_chase)
            .with_default_delay(50)
            .with_default_run_count(RunCount::Infinite),
        AnimationDefinition::leaf("stack", fills::stack).with_default_delay(10),
        AnimationDefinition::leaf("pixel_run", runners::pixel_run)
            .with_default_delay(10)
            .with_default_run_count(RunCount::Infinite),
        AnimationDefinition::leaf("bounce", runners::bounce)
            .with_default_delay(10)
            .with_default_run_count(RunCount::Infinite),
        AnimationDefinition::leaf("meteor", runners::meteor)
            .with_default_delay(10)
            .with_default_spacing(8)
            .with_default_run_count(RunCount::Infinite),
        AnimationDefinition::leaf("ripple", runners::ripple).with_default_delay(30),
        AnimationDefinition::leaf("sparkle", flashes::sparkle)
            .with_default_colors(vec![Color::WHITE])
            .with_default_delay(50)
            .with_default_spacing(10)
            .with_default_run_count(RunCount::Infinite),
        AnimationDefinition::leaf("twinkle", flashes::twinkle)
            .with_default_colors(vec![Color::WHITE])
            .with_default_delay(100)
            .with_default_run_count(RunCount::Infinite),
        AnimationDefinition::leaf("strobe", flashes::strobe)
            .with_default_colors(vec![Color::WHITE])
            .with_default_delay(200)
            .with_default_run_count(RunCount::Infinite),
    ]
});

/// Pixel visit order for sweeping animations.
fn scan(num_leds: usize, direction: Direction) -> Box<dyn Iterator<Item = usize>> {
    match direction {
        Direction::Forward => Box::new(0..num_leds),
        Direction::Backward => Box::new((0..num_leds).rev()),
    }
}

/// Walks `path`, lighting each pixel temporarily for `delay` before moving
/// on. The override carries a deadline a few delays out, so a killed thread
/// cannot strand a lit pixel. Returns `false` if cancelled mid-walk.
fn run_pixel_along(
    section: &Section,
    colors: &PreparedColors,
    path: impl Iterator<Item = usize>,
    delay: Duration,
    token: &CancelToken,
) -> Result<bool> {
    for i in path {
        section.set_temporary(i, colors.get(i), delay.saturating_mul(4))?;
        let finished = token.sleep(delay);
        section.revert(i)?;
        if !finished {
            return Ok(false);
        }
    }
    Ok(true)
}
