//! Layered per-pixel color state.
//!
//! Every pixel carries two values: a prolonged color that persists until
//! rewritten, and an optional temporary color that expires after a duration
//! and reveals the prolonged color again. Both layers are single atomics so
//! animation threads and the render loop never lock and never see torn
//! colors.

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::time::{Duration, Instant};

use crate::color::Color;
use crate::error::{Error, Result};

/// Temporary slot layout: `(deadline_ms << 24) | rgb`.
///
/// The low 24 bits hold the packed color, the upper 40 hold the expiry
/// deadline in milliseconds since the buffer was created. A packed value of
/// zero means the slot is vacant, so real deadlines are clamped to at
/// least 1.
const COLOR_BITS: u32 = 24;
const DEADLINE_MAX: u64 = (1 << 40) - 1;
const VACANT: u64 = 0;

struct PixelSlot {
    prolonged: AtomicU32,
    temporary: AtomicU64,
}

impl PixelSlot {
    fn new() -> PixelSlot {
        PixelSlot {
            prolonged: AtomicU32::new(Color::BLACK.value()),
            temporary: AtomicU64::new(VACANT),
        }
    }
}

fn pack_temporary(color: Color, deadline_ms: u64) -> u64 {
    (deadline_ms.clamp(1, DEADLINE_MAX) << COLOR_BITS) | color.value() as u64
}

fn unpack_temporary(packed: u64) -> (Color, u64) {
    let color = Color::from_value(packed as u32);
    (color, packed >> COLOR_BITS)
}

/// The strip-wide color state, indexed by physical pixel.
///
/// Writers replace whole slots; readers resolve expiry on the fly against a
/// monotonic clock anchored at construction. There is no timer thread, so a
/// temporary color that is overwritten before its deadline simply never
/// reverts.
pub struct PixelBuffer {
    slots: Vec<PixelSlot>,
    epoch: Instant,
}

impl PixelBuffer {
    pub fn new(num_leds: usize) -> PixelBuffer {
        PixelBuffer {
            slots: (0..num_leds).map(|_| PixelSlot::new()).collect(),
            epoch: Instant::now(),
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    fn now_ms(&self) -> u64 {
        self.epoch.elapsed().as_millis() as u64
    }

    fn slot(&self, index: usize) -> Result<&PixelSlot> {
        self.slots.get(index).ok_or(Error::PixelOutOfBounds {
            index,
            len: self.slots.len(),
        })
    }

    /// `slice::get` turns inverted ranges into `None` along with overlong
    /// ones, so both come back as the same error instead of a panic.
    fn slot_range(&self, range: std::ops::Range<usize>) -> Result<&[PixelSlot]> {
        let index = range.start.max(range.end.saturating_sub(1));
        self.slots.get(range).ok_or(Error::PixelOutOfBounds {
            index,
            len: self.slots.len(),
        })
    }

    /// Sets the persistent color. Any active temporary color keeps masking
    /// it until that expires or is reverted.
    pub fn set_prolonged(&self, index: usize, color: Color) -> Result<()> {
        self.slot(index)?
            .prolonged
            .store(color.value(), Ordering::Relaxed);
        Ok(())
    }

    /// Sets the persistent color on every pixel in `range`.
    pub fn fill_prolonged(&self, range: std::ops::Range<usize>, color: Color) -> Result<()> {
        for slot in self.slot_range(range)? {
            slot.prolonged.store(color.value(), Ordering::Relaxed);
        }
        Ok(())
    }

    /// Overrides the pixel with `color` for `duration`.
    ///
    /// A later temporary write replaces the deadline wholesale, so only the
    /// most recent override ever reverts. Zero durations still occupy the
    /// slot for at least a millisecond.
    pub fn set_temporary(&self, index: usize, color: Color, duration: Duration) -> Result<()> {
        let packed = pack_temporary(color, self.deadline_for(duration));
        self.slot(index)?.temporary.store(packed, Ordering::Relaxed);
        Ok(())
    }

    /// Overrides every pixel in `range` with `color` for `duration`. The
    /// deadline is computed once, so the whole range expires together.
    pub fn fill_temporary(
        &self,
        range: std::ops::Range<usize>,
        color: Color,
        duration: Duration,
    ) -> Result<()> {
        let slots = self.slot_range(range)?;
        let packed = pack_temporary(color, self.deadline_for(duration));
        for slot in slots {
            slot.temporary.store(packed, Ordering::Relaxed);
        }
        Ok(())
    }

    fn deadline_for(&self, duration: Duration) -> u64 {
        self.now_ms()
            .saturating_add(duration.as_millis().min(u64::MAX as u128) as u64)
    }

    /// Drops any temporary color immediately, exposing the prolonged color.
    pub fn revert(&self, index: usize) -> Result<()> {
        self.slot(index)?.temporary.store(VACANT, Ordering::Relaxed);
        Ok(())
    }

    /// The persistent color, ignoring any temporary override.
    pub fn prolonged_color(&self, index: usize) -> Result<Color> {
        let slot = self.slot(index)?;
        Ok(Color::from_value(slot.prolonged.load(Ordering::Relaxed)))
    }

    /// The color the pixel should display right now: the temporary color if
    /// one is active and unexpired, otherwise the prolonged color.
    pub fn effective_color(&self, index: usize) -> Result<Color> {
        self.slot(index).map(|slot| self.resolve(slot))
    }

    /// Bounds-unchecked variant for the render loop, which iterates
    /// `0..len()` by construction.
    pub(crate) fn effective_at(&self, index: usize) -> Color {
        self.resolve(&self.slots[index])
    }

    fn resolve(&self, slot: &PixelSlot) -> Color {
        let packed = slot.temporary.load(Ordering::Relaxed);
        if packed != VACANT {
            let (color, deadline) = unpack_temporary(packed);
            if deadline > self.now_ms() {
                return color;
            }
            // Expired. Clear it so the slot does not linger, but only if no
            // newer write raced us in.
            let _ = slot.temporary.compare_exchange(
                packed,
                VACANT,
                Ordering::Relaxed,
                Ordering::Relaxed,
            );
        }
        Color::from_value(slot.prolonged.load(Ordering::Relaxed))
    }
}
