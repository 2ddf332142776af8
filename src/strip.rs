//! The strip facade: driver interface, configuration, observers, and the
//! top-level [`LedStrip`] that ties pixel state, sections, animations, and
//! rendering together.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use glam::Vec3;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::animation::manager::AnimationManager;
use crate::animation::params::{AnimationToRunParams, RunningAnimationParams};
use crate::animation::AnimationDefinition;
use crate::color::Color;
use crate::error::{Error, Result};
use crate::renderer::{self, Frame, RendererControl};
use crate::section::{Section, SectionRegistry};
use crate::state::PixelBuffer;

/// Hardware-facing driver interface.
///
/// `set_pixel_color` stages a value; `render` pushes everything staged to
/// the device. The render thread owns the driver, drives it on a fixed
/// cadence, and calls `close` exactly once on shutdown.
pub trait NativeStrip: Send {
    fn num_leds(&self) -> usize;
    fn set_pixel_color(&mut self, index: usize, color: Color);
    fn render(&mut self) -> Result<()>;
    fn close(&mut self);
}

/// Physical position of one pixel, in whatever unit the installation uses.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PixelLocation {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl PixelLocation {
    pub fn new(x: f32, y: f32, z: f32) -> PixelLocation {
        PixelLocation { x, y, z }
    }

    pub fn position(self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }

    pub fn distance_to(self, other: PixelLocation) -> f32 {
        self.position().distance(other.position())
    }
}

fn default_render_delay_ms() -> u64 {
    5
}

fn default_frame_history_size() -> usize {
    500
}

/// Static configuration for one strip.
///
/// Deserializes from partial JSON; only `num_leds` is required.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StripInfo {
    pub num_leds: usize,
    /// Render loop tick, in milliseconds.
    #[serde(default = "default_render_delay_ms")]
    pub render_delay_ms: u64,
    /// Where each pixel physically sits. `None` means a straight line along
    /// the X axis, one unit apart.
    #[serde(default)]
    pub pixel_locations: Option<Vec<PixelLocation>>,
    /// Record every pushed frame in the bounded history.
    #[serde(default)]
    pub log_renders: bool,
    #[serde(default = "default_frame_history_size")]
    pub frame_history_size: usize,
}

impl StripInfo {
    pub fn new(num_leds: usize) -> StripInfo {
        StripInfo {
            num_leds,
            render_delay_ms: default_render_delay_ms(),
            pixel_locations: None,
            log_renders: false,
            frame_history_size: default_frame_history_size(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(locations) = &self.pixel_locations {
            if locations.len() != self.num_leds {
                return Err(Error::MismatchedLocations {
                    expected: self.num_leds,
                    provided: locations.len(),
                });
            }
        }
        Ok(())
    }

    /// The configured locations, or the default straight line.
    pub fn resolved_locations(&self) -> Vec<PixelLocation> {
        match &self.pixel_locations {
            Some(locations) => locations.clone(),
            None => (0..self.num_leds)
                .map(|i| PixelLocation::new(i as f32, 0.0, 0.0))
                .collect(),
        }
    }
}

/// Callbacks fired at strip lifecycle milestones.
///
/// All methods default to no-ops, so an observer implements only what it
/// cares about. Hooks run on the thread that triggered them and must not
/// block for long.
pub trait StripObserver: Send + Sync {
    fn animation_started(&self, _params: &RunningAnimationParams) {}
    fn animation_ended(&self, _params: &RunningAnimationParams) {}
    fn section_created(&self, _section: &Section) {}
}

/// Holds the strip's zero-or-one observer.
pub(crate) struct ObserverSlot {
    observer: Mutex<Option<Arc<dyn StripObserver>>>,
}

impl ObserverSlot {
    pub(crate) fn new() -> ObserverSlot {
        ObserverSlot {
            observer: Mutex::new(None),
        }
    }

    /// Installs `observer`, displacing any previous one.
    pub(crate) fn set(&self, observer: Arc<dyn StripObserver>) {
        let mut slot = self.observer.lock().unwrap();
        if slot.is_some() {
            info!("[STRIP] Replacing the installed observer");
        }
        *slot = Some(observer);
    }

    fn current(&self) -> Option<Arc<dyn StripObserver>> {
        self.observer.lock().unwrap().clone()
    }

    // Hooks are invoked on a clone taken out of the lock, so a slow observer
    // never holds up an observer swap.

    pub(crate) fn notify_animation_started(&self, params: &RunningAnimationParams) {
        if let Some(observer) = self.current() {
            observer.animation_started(params);
        }
    }

    pub(crate) fn notify_animation_ended(&self, params: &RunningAnimationParams) {
        if let Some(observer) = self.current() {
            observer.animation_ended(params);
        }
    }

    pub(crate) fn notify_section_created(&self, section: &Section) {
        if let Some(observer) = self.current() {
            observer.section_created(section);
        }
    }
}

struct EmulatedState {
    displayed: Mutex<Vec<Color>>,
    render_count: AtomicU64,
    fail_renders: AtomicBool,
    closed: AtomicBool,
}

/// In-memory driver for tests, demos, and development away from hardware.
///
/// Grab a [`EmulatedStripHandle`] before handing the strip over; the handle
/// stays usable after the driver moves into the render thread.
pub struct EmulatedStrip {
    staged: Vec<Color>,
    shared: Arc<EmulatedState>,
}

impl EmulatedStrip {
    pub fn new(num_leds: usize) -> EmulatedStrip {
        EmulatedStrip {
            staged: vec![Color::BLACK; num_leds],
            shared: Arc::new(EmulatedState {
                displayed: Mutex::new(vec![Color::BLACK; num_leds]),
                render_count: AtomicU64::new(0),
                fail_renders: AtomicBool::new(false),
                closed: AtomicBool::new(false),
            }),
        }
    }

    pub fn handle(&self) -> EmulatedStripHandle {
        EmulatedStripHandle {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl NativeStrip for EmulatedStrip {
    fn num_leds(&self) -> usize {
        self.staged.len()
    }

    fn set_pixel_color(&mut self, index: usize, color: Color) {
        if let Some(pixel) = self.staged.get_mut(index) {
            *pixel = color;
        }
    }

    fn render(&mut self) -> Result<()> {
        if self.shared.fail_renders.load(Ordering::Relaxed) {
            return Err(Error::StripIo("emulated render failure".to_string()));
        }
        self.shared
            .displayed
            .lock()
            .unwrap()
            .copy_from_slice(&self.staged);
        self.shared.render_count.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn close(&mut self) {
        self.shared.closed.store(true, Ordering::Relaxed);
        debug!("[STRIP] Emulated strip closed");
    }
}

/// Shared view of an [`EmulatedStrip`].
#[derive(Clone)]
pub struct EmulatedStripHandle {
    shared: Arc<EmulatedState>,
}

impl EmulatedStripHandle {
    /// Snapshot of what the strip currently shows.
    pub fn displayed(&self) -> Vec<Color> {
        self.shared.displayed.lock().unwrap().clone()
    }

    pub fn pixel(&self, index: usize) -> Option<Color> {
        self.shared.displayed.lock().unwrap().get(index).copied()
    }

    pub fn render_count(&self) -> u64 {
        self.shared.render_count.load(Ordering::Relaxed)
    }

    /// Makes subsequent renders fail until turned off again.
    pub fn set_failing(&self, fail: bool) {
        self.shared.fail_renders.store(fail, Ordering::Relaxed);
    }

    pub fn is_closed(&self) -> bool {
        self.shared.closed.load(Ordering::Relaxed)
    }
}

/// An addressable LED strip with sections, animations, and rendering.
///
/// Construction spawns the render thread and starts pushing immediately.
/// Dropping the strip ends all animations, stops the render thread, and
/// closes the driver.
pub struct LedStrip {
    info: Arc<StripInfo>,
    buffer: Arc<PixelBuffer>,
    registry: Arc<SectionRegistry>,
    root: Arc<Section>,
    animations: Arc<AnimationManager>,
    observers: Arc<ObserverSlot>,
    renderer: Arc<RendererControl>,
    render_thread: Option<JoinHandle<()>>,
}

impl LedStrip {
    pub fn new(driver: Box<dyn NativeStrip>, info: StripInfo) -> Result<LedStrip> {
        info.validate()?;
        if driver.num_leds() != info.num_leds {
            return Err(Error::StripLengthMismatch {
                driver: driver.num_leds(),
                info: info.num_leds,
            });
        }

        let info = Arc::new(info);
        let buffer = Arc::new(PixelBuffer::new(info.num_leds));
        let registry = SectionRegistry::new();
        let observers = Arc::new(ObserverSlot::new());
        let root = Section::root(
            "strip",
            Arc::clone(&buffer),
            &registry,
            Arc::clone(&observers),
        );
        let animations = AnimationManager::new(Arc::clone(&observers));
        let renderer = RendererControl::new(true);
        let render_thread = renderer::spawn(
            driver,
            Arc::clone(&buffer),
            Arc::clone(&info),
            Arc::clone(&renderer),
        );

        info!("[STRIP] Strip up: {} pixels", info.num_leds);
        Ok(LedStrip {
            info,
            buffer,
            registry,
            root,
            animations,
            observers,
            renderer,
            render_thread: Some(render_thread),
        })
    }

    pub fn info(&self) -> &StripInfo {
        &self.info
    }

    pub fn num_leds(&self) -> usize {
        self.info.num_leds
    }

    /// The whole-strip section.
    pub fn root_section(&self) -> &Arc<Section> {
        &self.root
    }

    /// The animation manager, for starting animations on section objects
    /// directly (anonymous subsections have no name to route by).
    pub fn animations(&self) -> &Arc<AnimationManager> {
        &self.animations
    }

    /// Creates a named section of the whole strip. Nested sections are made
    /// through [`Section::create_named`] on a parent.
    pub fn create_section(&self, name: &str, start: usize, end: usize) -> Result<Arc<Section>> {
        self.root.create_named(name, start, end)
    }

    /// The section registered under `name`, or the whole strip when the name
    /// is unknown.
    pub fn section(&self, name: &str) -> Arc<Section> {
        match self.registry.lookup(name) {
            Some(section) => section,
            None => {
                warn!("[STRIP] No section named '{}', using the whole strip", name);
                Arc::clone(&self.root)
            }
        }
    }

    /// An anonymous window onto the whole strip, cached by bounds.
    pub fn subsection(&self, start: usize, end: usize) -> Result<Arc<Section>> {
        self.root.subsection(start, end)
    }

    pub fn section_names(&self) -> Vec<String> {
        self.registry.names()
    }

    /// Starts an animation. The target section comes from the request and
    /// falls back to the whole strip.
    pub fn start_animation(&self, request: AnimationToRunParams) -> Result<String> {
        let section = match request.section.as_deref() {
            Some(name) => self.section(name),
            None => Arc::clone(&self.root),
        };
        self.animations.start_animation(request, &section)
    }

    pub fn end_animation(&self, id: &str) {
        self.animations.end_animation(id);
    }

    pub fn end_all_animations(&self) {
        self.animations.end_all();
    }

    /// Blocks until the animation finishes or `timeout` passes. Unknown ids
    /// count as already finished.
    pub fn wait_for_animation(&self, id: &str, timeout: Duration) -> bool {
        self.animations.wait_for(id, timeout)
    }

    pub fn running_animation_ids(&self) -> Vec<String> {
        self.animations.running_ids()
    }

    pub fn running_animation(&self, id: &str) -> Option<Arc<RunningAnimationParams>> {
        self.animations.running_params(id)
    }

    pub fn register_animation(&self, definition: AnimationDefinition) {
        self.animations.register(definition);
    }

    pub fn animation_names(&self) -> Vec<String> {
        self.animations.animation_names()
    }

    /// Sweeps finished entries out of the running registry if it is idle.
    pub fn prune_finished_animations(&self) {
        self.animations.prune_finished();
    }

    /// Installs the observer, displacing any previous one.
    pub fn set_observer(&self, observer: Arc<dyn StripObserver>) {
        self.observers.set(observer);
    }

    pub fn start_rendering(&self) {
        self.renderer.set_rendering(true);
    }

    /// Stops pushing frames. Pixel state keeps evolving and the render
    /// thread keeps ticking; the driver stays open for a later restart.
    pub fn stop_rendering(&self) {
        self.renderer.set_rendering(false);
    }

    pub fn is_rendering(&self) -> bool {
        self.renderer.is_rendering()
    }

    /// Recorded frames, oldest first. Empty unless `log_renders` is set.
    pub fn frame_history(&self) -> Vec<Frame> {
        self.renderer.frames()
    }

    /// Direct read of the effective color by physical index.
    pub fn effective_color(&self, index: usize) -> Result<Color> {
        self.buffer.effective_color(index)
    }
}

impl fmt::Debug for LedStrip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LedStrip")
            .field("info", &self.info)
            .finish_non_exhaustive()
    }
}

impl Drop for LedStrip {
    fn drop(&mut self) {
        self.animations.end_all();
        self.renderer.shutdown();
        if let Some(thread) = self.render_thread.take() {
            if thread.join().is_err() {
                warn!("[STRIP] Render thread panicked during shutdown");
            }
        }
        debug!("[STRIP] Strip shut down");
    }
}
