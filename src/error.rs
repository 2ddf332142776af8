use std::fmt;

/// Specialized result type for strip and animation operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the engine.
///
/// Configuration problems (bad bounds, unknown names, unresolvable
/// parameters) are returned synchronously from the call that caused them.
/// Driver failures are wrapped in [`Error::StripIo`] and retried inside the
/// render loop, so they only reach callers driving a native strip directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Requested section bounds fall outside the parent section.
    SectionOutOfBounds {
        name: String,
        start: usize,
        end: usize,
        parent_len: usize,
    },
    /// A local pixel index is outside the section it addresses.
    PixelOutOfBounds { index: usize, len: usize },
    /// No animation with this name is registered.
    UnknownAnimation(String),
    /// Resolved center pixel lies outside the target section.
    CenterOutOfSection { center: usize, section_len: usize },
    /// Too few colors supplied and the animation has no defaults to fill the gap.
    MissingColors {
        animation: String,
        required: usize,
        provided: usize,
    },
    /// An animation with this id is already running.
    DuplicateAnimationId(String),
    /// Strip info pixel count does not match the driver.
    StripLengthMismatch { driver: usize, info: usize },
    /// Pixel location list does not cover every pixel exactly once.
    MismatchedLocations { expected: usize, provided: usize },
    /// The native strip driver reported a failure.
    StripIo(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::SectionOutOfBounds {
                name,
                start,
                end,
                parent_len,
            } => write!(
                f,
                "section '{name}' bounds {start}..={end} do not fit a parent with {parent_len} pixels"
            ),
            Error::PixelOutOfBounds { index, len } => {
                write!(f, "pixel {index} is outside a section with {len} pixels")
            }
            Error::UnknownAnimation(name) => write!(f, "no animation named '{name}' is registered"),
            Error::CenterOutOfSection {
                center,
                section_len,
            } => write!(
                f,
                "center pixel {center} is outside a section with {section_len} pixels"
            ),
            Error::MissingColors {
                animation,
                required,
                provided,
            } => write!(
                f,
                "animation '{animation}' needs {required} colors but only {provided} were supplied"
            ),
            Error::DuplicateAnimationId(id) => {
                write!(f, "an animation with id '{id}' is already running")
            }
            Error::StripLengthMismatch { driver, info } => write!(
                f,
                "strip info declares {info} pixels but the driver has {driver}"
            ),
            Error::MismatchedLocations { expected, provided } => write!(
                f,
                "expected {expected} pixel locations but {provided} were supplied"
            ),
            Error::StripIo(msg) => write!(f, "strip driver error: {msg}"),
        }
    }
}

impl std::error::Error for Error {}
