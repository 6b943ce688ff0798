//! The sample space: events, samples, grouping, and the mutation contract.

use ps_common::error::{Error, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::event::Event;
use crate::filter::Filter;
use crate::sample::Sample;

/// Group label for the whole sample collection.
pub const UNIVERSE_GROUP: &str = "universe";

/// Group label for samples matching no event.
pub const OUTSIDE_GROUP: &str = "not_in_any_event";

/// A labeled group of samples produced by [`SampleSpace::groups`].
#[derive(Debug, Clone, PartialEq)]
pub struct SampleGroup<'a> {
    pub label: String,
    pub members: Vec<&'a Sample>,
}

/// A finite collection of samples and the events defined over them.
///
/// Event names are unique; registering a duplicate is rejected so that
/// name lookups stay unambiguous. Mutations take `&mut self`; the summary
/// engine borrows the space immutably, so the borrow checker rules out a
/// space mutated mid-computation. Callers that want snapshot-and-replace
/// semantics can `clone()` the value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SampleSpace {
    events: Vec<Event>,
    samples: Vec<Sample>,
}

impl SampleSpace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// Look up an event by name.
    pub fn event(&self, name: &str) -> Option<&Event> {
        self.events.iter().find(|e| e.name() == name)
    }

    /// Add an observation to the space.
    pub fn add_sample(&mut self, sample: Sample) {
        self.samples.push(sample);
    }

    /// Register a new event.
    ///
    /// Rejects a name already in use: duplicate names would make every
    /// downstream lookup ambiguous.
    pub fn add_event(&mut self, event: Event) -> Result<()> {
        if self.event(event.name()).is_some() {
            return Err(Error::DuplicateEvent {
                name: event.name().to_string(),
            });
        }
        debug!(event = event.name(), "event registered");
        self.events.push(event);
        Ok(())
    }

    /// Append a filter to the named event.
    ///
    /// An unknown name is a typed error rather than a silent no-op: a
    /// misspelled event name must not quietly drop the filter.
    pub fn add_filter(&mut self, event_name: &str, filter: Filter) -> Result<()> {
        let event = self
            .events
            .iter_mut()
            .find(|e| e.name() == event_name)
            .ok_or_else(|| Error::UnknownEvent {
                name: event_name.to_string(),
            })?;
        event.push_filter(filter);
        Ok(())
    }

    /// Drop all events and samples.
    pub fn clear(&mut self) {
        debug!(
            events = self.events.len(),
            samples = self.samples.len(),
            "clearing sample space"
        );
        self.events.clear();
        self.samples.clear();
    }

    /// Group samples by event membership.
    ///
    /// With no events defined, the single `"universe"` group holds all
    /// samples. Otherwise the groups are, in order: one per event (in
    /// definition order, sample order preserved), `"universe"` with all
    /// samples, and `"not_in_any_event"` with samples matching no event.
    pub fn groups(&self) -> Result<Vec<SampleGroup<'_>>> {
        let mut groups = Vec::with_capacity(self.events.len() + 2);
        if self.events.is_empty() {
            groups.push(SampleGroup {
                label: UNIVERSE_GROUP.to_string(),
                members: self.samples.iter().collect(),
            });
            return Ok(groups);
        }

        let mut in_any = vec![false; self.samples.len()];
        for event in &self.events {
            let mut members = Vec::new();
            for (idx, sample) in self.samples.iter().enumerate() {
                if event.matches(sample)? {
                    in_any[idx] = true;
                    members.push(sample);
                }
            }
            groups.push(SampleGroup {
                label: event.name().to_string(),
                members,
            });
        }

        groups.push(SampleGroup {
            label: UNIVERSE_GROUP.to_string(),
            members: self.samples.iter().collect(),
        });
        groups.push(SampleGroup {
            label: OUTSIDE_GROUP.to_string(),
            members: self
                .samples
                .iter()
                .zip(&in_any)
                .filter(|(_, hit)| !**hit)
                .map(|(sample, _)| sample)
                .collect(),
        });
        Ok(groups)
    }

    /// SHA-256 over the canonical JSON encoding of the space.
    ///
    /// Stable across identical contents; usable as a cache key for
    /// derived summaries.
    pub fn content_hash(&self) -> Result<String> {
        let bytes = serde_json::to_vec(self)?;
        let digest = Sha256::digest(&bytes);
        Ok(hex::encode(digest))
    }
}
