//! Stochastic and whole-section flash animations.

use rand::Rng;

use crate::animation::params::RunningAnimationParams;
use crate::error::Result;
use crate::section::Section;
use crate::sync::CancelToken;

/// Lights a random scattering of pixels each iteration, roughly one per
/// `spacing` pixels. Each spark expires on its own a few delays later.
pub(super) fn sparkle(
    section: &Section,
    params: &RunningAnimationParams,
    token: &CancelToken,
) -> Result<()> {
    let num_leds = section.num_leds();
    if num_leds == 0 {
        return Ok(());
    }
    let colors = params.color_at(0);
    let sparks = (num_leds / params.spacing).max(1);
    let life = params.delay().saturating_mul(3);

    let mut rng = rand::thread_rng();
    for _ in 0..sparks {
        let i = rng.gen_range(0..num_leds);
        section.set_temporary(i, colors.get(i), life)?;
    }
    let _ = token.sleep(params.delay());
    Ok(())
}

/// One random pixel breathing up to full brightness and back down.
pub(super) fn twinkle(
    section: &Section,
    params: &RunningAnimationParams,
    token: &CancelToken,
) -> Result<()> {
    let num_leds = section.num_leds();
    if num_leds == 0 {
        return Ok(());
    }
    let colors = params.color_at(0);
    let i = rand::thread_rng().gen_range(0..num_leds);
    let target = colors.get(i);
    let hold = params.delay().saturating_mul(3);

    for intensity in [0.25, 0.5, 0.75, 1.0, 0.75, 0.5, 0.25] {
        section.set_temporary(i, target.scale(intensity), hold)?;
        if !token.sleep(params.delay()) {
            section.revert(i)?;
            return Ok(());
        }
    }
    section.revert(i)?;
    Ok(())
}

/// Flashes the whole section on for one delay, then dark for one delay. The
/// on-phase is a temporary override sized to expire exactly when the dark
/// phase begins.
pub(super) fn strobe(
    section: &Section,
    params: &RunningAnimationParams,
    token: &CancelToken,
) -> Result<()> {
    let colors = params.color_at(0);
    let phase = params.delay();
    for i in 0..section.num_leds() {
        section.set_temporary(i, colors.get(i), phase)?;
    }
    if token.sleep(phase) {
        let _ = token.sleep(phase);
    }
    Ok(())
}
