//! Core functionality for the storybook
//!
//! This crate provides the book state machine, the fireworks particle
//! engine, the timer scheduler that drives both, and the configuration
//! they are built from. Nothing in here touches a window; the UI crate
//! projects this state onto the screen.

pub mod book;
pub mod config;
pub mod error;
pub mod fireworks;
pub mod render_loop;
pub mod schedule;
pub mod stars;

// Re-export commonly used types
pub use book::{
    BookController, BookEvent, BookObserver, BookTask, CoverState, Curl, CurlDirection,
    PageRole, PageView, Sequence,
};
pub use config::{BookConfig, FireworksConfig, MusicConfig, PageContent, StarLayerConfig, TimingConfig, WindowConfig};
pub use error::{BookError, Result};
pub use fireworks::{FireworkTrigger, ParticleEngine, Spark, Surface};
pub use render_loop::RenderLoop;
pub use schedule::{Scheduler, TimerId};
pub use stars::{Star, StarField, StarLayer};
