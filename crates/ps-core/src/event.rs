//! Events: named conjunctions of filters.

use ps_common::error::Result;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::filter::Filter;
use crate::sample::Sample;

/// A named boolean predicate over samples.
///
/// A sample belongs to the event iff it satisfies every filter (logical
/// AND); an event with no filters matches everything. The name is the
/// identity key for all downstream lookups — uniqueness within a space is
/// enforced by [`crate::space::SampleSpace::add_event`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Event {
    name: String,
    #[serde(default)]
    filters: Vec<Filter>,
}

impl Event {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            filters: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    /// Append a filter to the conjunction.
    pub fn push_filter(&mut self, filter: Filter) {
        self.filters.push(filter);
    }

    /// Builder-style variant of [`Event::push_filter`].
    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    /// True iff the sample satisfies every filter of this event.
    pub fn matches(&self, sample: &Sample) -> Result<bool> {
        for filter in &self.filters {
            if !filter.evaluate(sample.get(&filter.key))? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}
