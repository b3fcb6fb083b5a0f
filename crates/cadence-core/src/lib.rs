//! Real-time RSVP playback core: pacing, chunk planning, the frame-driven
//! scheduler, narration chaining, and reading telemetry.

#![no_std]

extern crate alloc;

pub mod app;
pub mod chunk;
pub mod document;
pub mod narration;
pub mod pacing;
pub mod progress;
pub mod render;
pub mod scheduler;
pub mod speech;
pub mod telemetry;
pub mod text_policy;
