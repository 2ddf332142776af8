//! Animations that move temporary light along the strip.

use crate::animation::params::{Direction, RunningAnimationParams};
use crate::error::Result;
use crate::section::Section;
use crate::sync::CancelToken;

use super::{run_pixel_along, scan};

/// A single pixel of light travelling end to end over the prolonged colors.
pub(super) fn pixel_run(
    section: &Section,
    params: &RunningAnimationParams,
    token: &CancelToken,
) -> Result<()> {
    let colors = params.color_at(0);
    run_pixel_along(
        section,
        colors,
        scan(section.num_leds(), params.direction),
        params.delay(),
        token,
    )?;
    Ok(())
}

/// A pixel of light making one round trip, skipping the endpoints on the way
/// back so they do not flash twice.
pub(super) fn bounce(
    section: &Section,
    params: &RunningAnimationParams,
    token: &CancelToken,
) -> Result<()> {
    let num_leds = section.num_leds();
    let colors = params.color_at(0);
    let delay = params.delay();
    let interior = 1..num_leds.saturating_sub(1);

    match params.direction {
        Direction::Forward => {
            if run_pixel_along(section, colors, 0..num_leds, delay, token)? {
                run_pixel_along(section, colors, interior.rev(), delay, token)?;
            }
        }
        Direction::Backward => {
            if run_pixel_along(section, colors, (0..num_leds).rev(), delay, token)? {
                run_pixel_along(section, colors, interior, delay, token)?;
            }
        }
    }
    Ok(())
}

/// A travelling head whose wake stays lit for `spacing` steps before the
/// overrides expire on their own, leaving a fading tail with no cleanup
/// pass.
pub(super) fn meteor(
    section: &Section,
    params: &RunningAnimationParams,
    token: &CancelToken,
) -> Result<()> {
    let colors = params.color_at(0);
    let steps = u32::try_from(params.spacing).unwrap_or(u32::MAX);
    let tail = params.delay().saturating_mul(steps);
    for i in scan(section.num_leds(), params.direction) {
        section.set_temporary(i, colors.get(i), tail)?;
        if !token.sleep(params.delay()) {
            return Ok(());
        }
    }
    Ok(())
}

/// A ring of light expanding from `center` out to `distance` pixels.
pub(super) fn ripple(
    section: &Section,
    params: &RunningAnimationParams,
    token: &CancelToken,
) -> Result<()> {
    let num_leds = section.num_leds();
    let colors = params.color_at(0);
    let hold = params.delay().saturating_mul(6);

    for radius in 0..=params.distance {
        let outer = params.center + radius;
        let inner = params.center.checked_sub(radius);
        if outer >= num_leds && inner.is_none() {
            break;
        }
        if outer < num_leds {
            section.set_temporary(outer, colors.get(outer), hold)?;
        }
        if let Some(inner) = inner {
            section.set_temporary(inner, colors.get(inner), hold)?;
        }
        if !token.sleep(params.delay()) {
            return Ok(());
        }
    }
    Ok(())
}
