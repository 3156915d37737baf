//! The log sink: an append-only, thread-safe event channel.
//!
//! The module is organised around an unbounded channel ([`EventBus`]) feeding
//! pluggable [`EventSink`]s from a background listener task. Producers hold a
//! [`LogEmitter`] and never block; consumers drain at their own pace.

pub mod bus;
pub mod emitter;
pub mod event;
pub mod sink;

pub use bus::EventBus;
pub use emitter::{EmitterError, LogEmitter};
pub use event::{DiagnosticEvent, LogEvent, OutputEvent};
pub use sink::{ChannelSink, EventSink, MemorySink, StdOutSink};
