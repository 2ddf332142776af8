//! Named sections and nested subsections of a strip.
//!
//! A section addresses a contiguous pixel range in local coordinates
//! starting at zero. Subsections nest to any depth; every level stores the
//! physical offset computed at creation, so pixel writes translate with one
//! addition no matter how deep the tree goes.

use std::collections::HashMap;
use std::fmt;
use std::ops::Range;
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

use log::{debug, info, warn};

use crate::color::Color;
use crate::error::{Error, Result};
use crate::state::PixelBuffer;
use crate::strip::ObserverSlot;

/// Strip-wide map of registered section names.
///
/// Creating a section under an existing name replaces the mapping; the old
/// section object stays valid for anyone still holding it.
pub(crate) struct SectionRegistry {
    named: Mutex<HashMap<String, Arc<Section>>>,
}

impl SectionRegistry {
    pub(crate) fn new() -> Arc<SectionRegistry> {
        Arc::new(SectionRegistry {
            named: Mutex::new(HashMap::new()),
        })
    }

    /// Maps `name` to `section`, returning the previous holder of the name.
    pub(crate) fn register(&self, name: &str, section: Arc<Section>) -> Option<Arc<Section>> {
        self.named.lock().unwrap().insert(name.to_string(), section)
    }

    pub(crate) fn lookup(&self, name: &str) -> Option<Arc<Section>> {
        self.named.lock().unwrap().get(name).cloned()
    }

    pub(crate) fn names(&self) -> Vec<String> {
        self.named.lock().unwrap().keys().cloned().collect()
    }
}

/// A contiguous, addressable slice of the strip.
///
/// All pixel operations take local indices; `physical_start` anchors the
/// section on the real strip. Sections never own pixels, they delegate every
/// read and write to the shared [`PixelBuffer`].
pub struct Section {
    name: String,
    start_pixel: usize,
    num_leds: usize,
    physical_start: usize,
    buffer: Arc<PixelBuffer>,
    registry: Weak<SectionRegistry>,
    observers: Arc<ObserverSlot>,
    subsections: Mutex<HashMap<(usize, usize), Arc<Section>>>,
}

impl Section {
    pub(crate) fn root(
        name: &str,
        buffer: Arc<PixelBuffer>,
        registry: &Arc<SectionRegistry>,
        observers: Arc<ObserverSlot>,
    ) -> Arc<Section> {
        let num_leds = buffer.len();
        Arc::new(Section {
            name: name.to_string(),
            start_pixel: 0,
            num_leds,
            physical_start: 0,
            buffer,
            registry: Arc::downgrade(registry),
            observers,
            subsections: Mutex::new(HashMap::new()),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// First covered pixel, in the parent's coordinates.
    pub fn start_pixel(&self) -> usize {
        self.start_pixel
    }

    /// Last covered pixel, in the parent's coordinates.
    pub fn end_pixel(&self) -> usize {
        self.start_pixel + self.num_leds.saturating_sub(1)
    }

    /// Offset of this section's pixel 0 on the physical strip.
    pub fn physical_start(&self) -> usize {
        self.physical_start
    }

    pub fn num_leds(&self) -> usize {
        self.num_leds
    }

    /// Translates a local index to the physical strip index.
    pub fn physical_index(&self, local: usize) -> Result<usize> {
        if local >= self.num_leds {
            return Err(Error::PixelOutOfBounds {
                index: local,
                len: self.num_leds,
            });
        }
        Ok(self.physical_start + local)
    }

    /// Inverted ranges are as out of bounds as overlong ones; reporting them
    /// here keeps the error in local coordinates.
    fn check_range(&self, range: &Range<usize>) -> Result<()> {
        if range.start > range.end || range.end > self.num_leds {
            return Err(Error::PixelOutOfBounds {
                index: range.start.max(range.end.saturating_sub(1)),
                len: self.num_leds,
            });
        }
        Ok(())
    }

    /// Returns the subsection covering `start..=end` of this section.
    ///
    /// Requests with identical bounds return the same object, so callers can
    /// treat subsections as stable identities.
    pub fn subsection(&self, start: usize, end: usize) -> Result<Arc<Section>> {
        self.subsection_inner(start, end, None)
    }

    /// Creates (or re-points) a named section covering `start..=end`.
    ///
    /// The name is registered strip-wide. If the bounds were already cached
    /// the existing object is aliased under `name` and keeps its original
    /// name; if `name` was taken its mapping moves to this section.
    pub fn create_named(&self, name: &str, start: usize, end: usize) -> Result<Arc<Section>> {
        let section = self.subsection_inner(start, end, Some(name))?;
        if let Some(registry) = self.registry.upgrade() {
            match registry.register(name, Arc::clone(&section)) {
                Some(old) => info!(
                    "[SECTION] Re-registered '{}': {}..={} replaces {}..={}",
                    name,
                    section.start_pixel,
                    section.end_pixel(),
                    old.start_pixel,
                    old.end_pixel()
                ),
                None => info!(
                    "[SECTION] Registered '{}' covering {}..={} of '{}'",
                    name, start, end, self.name
                ),
            }
        } else {
            warn!("[SECTION] Strip gone, '{}' created but not registered", name);
        }
        Ok(section)
    }

    fn subsection_inner(
        &self,
        start: usize,
        end: usize,
        name: Option<&str>,
    ) -> Result<Arc<Section>> {
        if start > end || end >= self.num_leds {
            return Err(Error::SectionOutOfBounds {
                name: name
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("{}:{}-{}", self.name, start, end)),
                start,
                end,
                parent_len: self.num_leds,
            });
        }

        let mut cache = self.subsections.lock().unwrap();
        if let Some(existing) = cache.get(&(start, end)) {
            return Ok(Arc::clone(existing));
        }

        let child = Arc::new(Section {
            name: name
                .map(str::to_string)
                .unwrap_or_else(|| format!("{}:{}-{}", self.name, start, end)),
            start_pixel: start,
            num_leds: end - start + 1,
            physical_start: self.physical_start + start,
            buffer: Arc::clone(&self.buffer),
            registry: Weak::clone(&self.registry),
            observers: Arc::clone(&self.observers),
            subsections: Mutex::new(HashMap::new()),
        });
        cache.insert((start, end), Arc::clone(&child));
        drop(cache);

        debug!(
            "[SECTION] '{}' now covers physical {}..={}",
            child.name,
            child.physical_start,
            child.physical_start + child.num_leds - 1
        );
        self.observers.notify_section_created(&child);
        Ok(child)
    }

    /// Sets the persistent color of one local pixel.
    pub fn set_prolonged(&self, local: usize, color: Color) -> Result<()> {
        self.buffer.set_prolonged(self.physical_index(local)?, color)
    }

    /// Sets the persistent color of every pixel in a local range.
    pub fn set_prolonged_range(&self, range: Range<usize>, color: Color) -> Result<()> {
        self.check_range(&range)?;
        self.buffer.fill_prolonged(
            self.physical_start + range.start..self.physical_start + range.end,
            color,
        )
    }

    /// Sets the persistent color of the whole section.
    pub fn fill_prolonged(&self, color: Color) -> Result<()> {
        self.set_prolonged_range(0..self.num_leds, color)
    }

    /// Overrides one local pixel with `color` for `duration`, after which it
    /// falls back to its prolonged color.
    pub fn set_temporary(&self, local: usize, color: Color, duration: Duration) -> Result<()> {
        self.buffer
            .set_temporary(self.physical_index(local)?, color, duration)
    }

    /// Overrides every pixel in a local range with `color` for `duration`.
    pub fn set_temporary_range(
        &self,
        range: Range<usize>,
        color: Color,
        duration: Duration,
    ) -> Result<()> {
        self.check_range(&range)?;
        self.buffer.fill_temporary(
            self.physical_start + range.start..self.physical_start + range.end,
            color,
            duration,
        )
    }

    /// Overrides the whole section with `color` for `duration`.
    pub fn fill_temporary(&self, color: Color, duration: Duration) -> Result<()> {
        self.set_temporary_range(0..self.num_leds, color, duration)
    }

    /// Cancels any temporary override on one local pixel.
    pub fn revert(&self, local: usize) -> Result<()> {
        self.buffer.revert(self.physical_index(local)?)
    }

    /// The currently displayed color of one local pixel.
    pub fn effective_color(&self, local: usize) -> Result<Color> {
        self.buffer.effective_color(self.physical_index(local)?)
    }

    /// The persistent color of one local pixel, ignoring overrides.
    pub fn prolonged_color(&self, local: usize) -> Result<Color> {
        self.buffer.prolonged_color(self.physical_index(local)?)
    }
}

impl fmt::Debug for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Section")
            .field("name", &self.name)
            .field("start_pixel", &self.start_pixel)
            .field("num_leds", &self.num_leds)
            .field("physical_start", &self.physical_start)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_root(num_leds: usize) -> (Arc<Section>, Arc<SectionRegistry>) {
        let registry = SectionRegistry::new();
        let root = Section::root(
            "strip",
            Arc::new(PixelBuffer::new(num_leds)),
            &registry,
            Arc::new(ObserverSlot::new()),
        );
        (root, registry)
    }

    #[test]
    fn nested_sections_accumulate_physical_offsets() {
        let (root, _registry) = test_root(10);

        let a = root.create_named("A", 2, 7).unwrap();
        assert_eq!(a.physical_start(), 2);
        assert_eq!(a.num_leds(), 6);

        let b = a.subsection(1, 3).unwrap();
        assert_eq!(b.physical_start(), 3);
        assert_eq!(b.num_leds(), 3);
        assert_eq!(b.physical_index(0).unwrap(), 3);
        assert_eq!(b.physical_index(2).unwrap(), 5);
    }

    #[test]
    fn writes_through_a_subsection_land_on_physical_pixels() {
        let (root, _registry) = test_root(10);
        let a = root.create_named("A", 2, 7).unwrap();
        let b = a.subsection(1, 3).unwrap();

        b.set_prolonged(0, Color::RED).unwrap();
        b.set_prolonged(2, Color::GREEN).unwrap();

        assert_eq!(root.effective_color(3).unwrap(), Color::RED);
        assert_eq!(root.effective_color(5).unwrap(), Color::GREEN);
        assert_eq!(root.effective_color(4).unwrap(), Color::BLACK);
    }

    #[test]
    fn identical_bounds_return_the_same_object() {
        let (root, _registry) = test_root(10);
        let first = root.subsection(2, 7).unwrap();
        let second = root.subsection(2, 7).unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        let named = root.create_named("left", 2, 7).unwrap();
        assert!(Arc::ptr_eq(&first, &named));
    }

    #[test]
    fn different_bounds_are_distinct_objects() {
        let (root, _registry) = test_root(10);
        let a = root.subsection(0, 4).unwrap();
        let b = root.subsection(0, 5).unwrap();
        assert!(!Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn invalid_bounds_leave_the_registry_unchanged() {
        let (root, registry) = test_root(10);

        let reversed = root.create_named("bad", 5, 2);
        assert!(matches!(reversed, Err(Error::SectionOutOfBounds { .. })));

        let overflowing = root.create_named("bad", 0, 10);
        assert!(matches!(overflowing, Err(Error::SectionOutOfBounds { .. })));

        assert!(registry.lookup("bad").is_none());
        assert!(registry.names().is_empty());
    }

    #[test]
    fn renaming_points_the_registry_at_the_new_section() {
        let (root, registry) = test_root(10);
        let first = root.create_named("zone", 0, 3).unwrap();
        let second = root.create_named("zone", 4, 9).unwrap();

        let current = registry.lookup("zone").unwrap();
        assert!(Arc::ptr_eq(&current, &second));
        // The displaced section still works for existing holders.
        assert_eq!(first.num_leds(), 4);
        first.set_prolonged(0, Color::BLUE).unwrap();
    }

    #[test]
    fn local_bounds_are_enforced() {
        let (root, _registry) = test_root(10);
        let a = root.create_named("A", 2, 7).unwrap();

        assert_eq!(
            a.set_prolonged(6, Color::RED),
            Err(Error::PixelOutOfBounds { index: 6, len: 6 })
        );
        assert!(a.effective_color(6).is_err());
        assert!(a.set_prolonged_range(0..7, Color::RED).is_err());
        assert!(a.set_prolonged_range(0..6, Color::RED).is_ok());
    }

    #[test]
    fn fill_covers_only_the_section() {
        let (root, _registry) = test_root(10);
        let a = root.create_named("A", 2, 7).unwrap();
        a.fill_prolonged(Color::MAGENTA).unwrap();

        assert_eq!(root.effective_color(1).unwrap(), Color::BLACK);
        assert_eq!(root.effective_color(2).unwrap(), Color::MAGENTA);
        assert_eq!(root.effective_color(7).unwrap(), Color::MAGENTA);
        assert_eq!(root.effective_color(8).unwrap(), Color::BLACK);
    }

    #[test]
    fn temporary_writes_translate_too() {
        let (root, _registry) = test_root(10);
        let a = root.create_named("A", 2, 7).unwrap();

        a.set_temporary(1, Color::WHITE, Duration::from_secs(60))
            .unwrap();
        assert_eq!(root.effective_color(3).unwrap(), Color::WHITE);
        assert_eq!(root.prolonged_color(3).unwrap(), Color::BLACK);

        a.revert(1).unwrap();
        assert_eq!(root.effective_color(3).unwrap(), Color::BLACK);

        a.fill_temporary(Color::ORANGE, Duration::from_secs(60)).unwrap();
        assert_eq!(root.effective_color(1).unwrap(), Color::BLACK);
        assert_eq!(root.effective_color(2).unwrap(), Color::ORANGE);
        assert_eq!(root.effective_color(7).unwrap(), Color::ORANGE);
        assert_eq!(root.effective_color(8).unwrap(), Color::BLACK);
    }

    #[test]
    fn inverted_ranges_are_rejected_like_inverted_bounds() {
        let (root, _registry) = test_root(10);
        assert!(root.create_named("bad", 5, 2).is_err());

        assert!(matches!(
            root.set_prolonged_range(5..2, Color::RED),
            Err(Error::PixelOutOfBounds { .. })
        ));
        assert!(matches!(
            root.set_temporary_range(5..2, Color::RED, Duration::from_secs(1)),
            Err(Error::PixelOutOfBounds { .. })
        ));
        for index in 0..10 {
            assert_eq!(root.effective_color(index).unwrap(), Color::BLACK);
        }
    }
}
