//! Probspace core: sample space model and probability summary engine.
//!
//! Collaborators build a [`SampleSpace`] out of [`Sample`]s (attribute
//! maps) and [`Event`]s (named conjunctions of [`Filter`] predicates),
//! then call [`summarize`] to derive the full empirical
//! [`ProbabilitySummary`]: per-event marginals, pairwise
//! intersection/union/conditional probabilities, the Euler-diagram
//! partition table, and sanity invariants.
//!
//! The engine is a pure, synchronous function of the space it borrows;
//! recompute after any mutation.

pub mod config;
pub mod event;
pub mod filter;
pub mod logging;
pub mod sample;
pub mod space;
pub mod summary;

pub use config::{EngineConfig, ValidationError, CONFIG_SCHEMA_VERSION};
pub use event::Event;
pub use filter::{Comparator, Filter, Operand};
pub use logging::{init_logging, LogConfig, LogFormat};
pub use ps_common::{AttrValue, Error, Result};
pub use sample::Sample;
pub use space::{SampleGroup, SampleSpace, OUTSIDE_GROUP, UNIVERSE_GROUP};
pub use summary::{
    summarize, EventStat, PairwiseStat, PartitionCell, ProbabilitySummary, SanityChecks,
    SummaryOptions,
};
