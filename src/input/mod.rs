//! Virtual button input.
//!
//! The harness has exactly one digital input. Sources produce the raw
//! "is active" level once per tick; the sampler turns level changes into
//! discrete press events.

pub mod sampler;
pub mod sources;

pub use sampler::{InputSampler, PressEvent};
pub use sources::{ButtonSource, IntervalButton, NullButton, ScriptedButton};
