//! Animation engine for addressable LED strips.
//!
//! Pixel state is layered: a prolonged color persists until rewritten, a
//! temporary color masks it for a bounded duration and then reveals it
//! again. Strips subdivide into named, nestable sections, and animations
//! address whichever section they were started on in local coordinates.
//!
//! Every started animation runs on its own thread under cooperative
//! cancellation, while a dedicated render thread pushes the effective state
//! to a [`strip::NativeStrip`] driver on a fixed cadence. The
//! [`strip::EmulatedStrip`] driver runs the whole engine without hardware.

pub mod animation;
pub mod color;
pub mod error;
pub mod renderer;
pub mod section;
pub mod state;
pub mod strip;
pub mod sync;

pub use animation::manager::AnimationManager;
pub use animation::params::{
    AnimationToRunParams, Direction, GroupState, RunCount, RunningAnimationParams,
};
pub use animation::{AnimationBody, AnimationDefinition, AnimationKind, GroupOrder, GroupSpec};
pub use color::{Color, ColorSequence, PreparedColors};
pub use error::{Error, Result};
pub use renderer::Frame;
pub use section::Section;
pub use state::PixelBuffer;
pub use strip::{
    EmulatedStrip, EmulatedStripHandle, LedStrip, NativeStrip, PixelLocation, StripInfo,
    StripObserver,
};
pub use sync::CancelToken;
