//! Client-side domain core of the budget tracker.
//!
//! Nothing in here performs I/O: the crate holds the canonical money and
//! permission types, the keyed reconciler that keeps rendered views in sync
//! with polled collections, the memoization slot used by the entity model and
//! the timeline alignment fed to the dashboard charts.

pub use cache::CacheSlot;
pub use error::EngineError;
pub use money::MoneyCents;
pub use permission::PermissionLevel;
pub use reconcile::{
    Binder, Key, Keyed, ReconcileReport, ReconcilerState, Scoped, ScopedState, UpdatePolicy,
};
pub use timeline::{Series, Timeline, TimelineColumn};

mod cache;
mod error;
mod money;
mod permission;
pub mod reconcile;
mod timeline;
pub mod util;

pub type ResultEngine<T> = Result<T, EngineError>;
