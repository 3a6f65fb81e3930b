//! a smooth cpu usage and temperature monitor.
//!
//! `calor` samples per-core cpu utilization and the package temperature at a
//! coarse cadence, keeps a multi-scale rolling history of the pair, and draws
//! an animated terminal dashboard at a fine cadence. the two cadences are
//! independent: sampling happens every half second while frames are drawn
//! sixty times a second, with per-core values eased toward their sampled
//! targets so the display moves continuously between polls.

pub use self::app::{App, Config};

/// the driver: event loop, key bindings, and all mutable monitor state.
pub mod app;

/// the multi-scale usage/temperature timeline behind the scrolling graph.
pub mod history;

/// fail-soft observation of the kernel's cpu accounting.
pub mod sampler;

/// rolling sample windows and frame-by-frame animation.
pub mod smooth;

/// seams abstracting over providers of kernel statistics.
pub mod source;

/// kernel cpu accounting: counters, snapshots, and utilization math.
pub mod stat;

/// lifecycle of the optional external load generator.
pub mod stress;

/// package temperature acquisition and running extrema.
pub mod thermal;

/// terminal ownership and frame drawing.
pub mod ui;

/// errors that abort the monitor.
///
/// per-tick sampling failures never surface here; they are recovered in
/// place by substituting the last known value. only losing the terminal or
/// the event channel stops the dashboard.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// the terminal could not be prepared, drawn to, or restored.
    #[error("terminal failure")]
    Terminal(#[source] std::io::Error),

    /// every event producer hung up while the monitor was running.
    #[error("event channel disconnected")]
    Disconnected,
}
