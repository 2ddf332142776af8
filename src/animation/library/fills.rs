//! Animations that paint the prolonged layer.

use crate::animation::params::{Direction, RunningAnimationParams};
use crate::error::Result;
use crate::section::Section;
use crate::sync::CancelToken;

use super::{run_pixel_along, scan};

/// Paints the whole section with the first color sequence.
pub(super) fn solid(
    section: &Section,
    params: &RunningAnimationParams,
    token: &CancelToken,
) -> Result<()> {
    let colors = params.color_at(0);
    for i in 0..section.num_leds() {
        section.set_prolonged(i, colors.get(i))?;
    }
    let _ = token.sleep(params.delay());
    Ok(())
}

/// Swaps the section between the first two color sequences, holding each for
/// one delay.
pub(super) fn alternate(
    section: &Section,
    params: &RunningAnimationParams,
    token: &CancelToken,
) -> Result<()> {
    for slot in 0..2 {
        let colors = params.color_at(slot);
        for i in 0..section.num_leds() {
            section.set_prolonged(i, colors.get(i))?;
        }
        if !token.sleep(params.delay()) {
            return Ok(());
        }
    }
    Ok(())
}

/// Paints pixel by pixel from one end to the other.
pub(super) fn wipe(
    section: &Section,
    params: &RunningAnimationParams,
    token: &CancelToken,
) -> Result<()> {
    let colors = params.color_at(0);
    for i in scan(section.num_leds(), params.direction) {
        section.set_prolonged(i, colors.get(i))?;
        if !token.sleep(params.delay()) {
            return Ok(());
        }
    }
    Ok(())
}

/// Rotates the prepared gradient one pixel per delay. Prepared lookups wrap,
/// so offsetting the index is all the rotation takes.
pub(super) fn smooth_chase(
    section: &Section,
    params: &RunningAnimationParams,
    token: &CancelToken,
) -> Result<()> {
    let colors = params.color_at(0);
    let num_leds = section.num_leds();
    for offset in scan(num_leds, params.direction) {
        for i in 0..num_leds {
            section.set_prolonged(i, colors.get(i + offset))?;
        }
        if !token.sleep(params.delay()) {
            return Ok(());
        }
    }
    Ok(())
}

/// Runs a pixel to the far end, parks it there, and repeats with a shorter
/// track until the section is full.
pub(super) fn stack(
    section: &Section,
    params: &RunningAnimationParams,
    token: &CancelToken,
) -> Result<()> {
    let num_leds = section.num_leds();
    let colors = params.color_at(0);
    let delay = params.delay();

    match params.direction {
        Direction::Forward => {
            for target in (0..num_leds).rev() {
                if !run_pixel_along(section, colors, 0..target, delay, token)? {
                    return Ok(());
                }
                section.set_prolonged(target, colors.get(target))?;
            }
        }
        Direction::Backward => {
            for target in 0..num_leds {
                if !run_pixel_along(section, colors, (target + 1..num_leds).rev(), delay, token)? {
                    return Ok(());
                }
                section.set_prolonged(target, colors.get(target))?;
            }
        }
    }
    Ok(())
}
