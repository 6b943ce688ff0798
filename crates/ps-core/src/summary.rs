//! The probability summary engine.
//!
//! Partitions the sample space into Euler-diagram cells (one per
//! event-membership bitmask) and derives per-event marginals, pairwise
//! intersection/union/conditional probabilities, a numeric independence
//! test, and global sanity invariants. The computation is a pure function
//! of the space: same inputs, same summary.

use std::collections::BTreeMap;

use ps_common::error::{Error, Result};
use ps_math::{ratio, round_to, within};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::space::SampleSpace;

/// Event membership masks are u64 bit sets, so at most 63 events fit.
pub const MAX_EVENTS: usize = 63;

/// Cells are enumerated densely (zero counts included) while `2^k` stays
/// at or below this; beyond it only observed cells are emitted.
pub const DENSE_CELL_LIMIT: u32 = 20;

/// Separator used to build partition keys like `A&!B&C`.
const KEY_SEPARATOR: &str = "&";

/// Prefix marking a negated event name inside a partition key.
const NEGATION_PREFIX: &str = "!";

/// Options for [`summarize`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct SummaryOptions {
    /// Emit the full partition table (one entry per membership cell).
    pub include_partitions: bool,
    /// Numeric tolerance for the independence test and sanity checks.
    pub tolerance: f64,
    /// Decimal digits to round emitted probabilities to. Counts are
    /// never rounded, and the independence test runs on unrounded
    /// values.
    pub precision: Option<u32>,
}

impl Default for SummaryOptions {
    fn default() -> Self {
        Self {
            include_partitions: true,
            tolerance: 1e-9,
            precision: None,
        }
    }
}

/// Marginal statistics for one event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EventStat {
    pub name: String,
    pub count: u64,
    pub probability: f64,
    pub complement_count: u64,
    pub complement_probability: f64,
}

/// Pairwise statistics for one unordered event pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PairwiseStat {
    pub a: String,
    pub b: String,
    pub intersection_count: u64,
    pub intersection_probability: f64,
    pub union_count: u64,
    pub union_probability: f64,
    /// P(A|B); absent when B has no members.
    pub cond_a_given_b: Option<f64>,
    /// P(B|A); absent when A has no members.
    pub cond_b_given_a: Option<f64>,
    /// Whether `|P(A∩B) - P(A)P(B)| <= tolerance`; absent when either
    /// conditional is absent.
    pub independence: Option<bool>,
}

/// One Euler-diagram cell: the samples sharing an exact combination of
/// event memberships.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PartitionCell {
    /// Membership bitmask; bit i is set iff the cell lies inside event i
    /// (in definition order). Positional, so reordering events renumbers
    /// masks — compare cells by `key` or `member_names`.
    pub mask: u64,
    /// Human-readable cell label, e.g. `A&!B&C`.
    pub key: String,
    /// Names of the events containing this cell, in event order.
    pub member_names: Vec<String>,
    pub count: u64,
    pub probability: f64,
}

/// Global invariants checked over the computed summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SanityChecks {
    /// Emitted partition probabilities sum to 1 within tolerance
    /// (vacuously true when partitions are not emitted).
    pub partitions_sum_one: bool,
    /// Partition counts sum to the sample total.
    pub counts_sum_equal_total: bool,
}

/// The full statistical summary of a sample space.
///
/// Derived, never mutated; recompute after any change to the space.
/// Every numeric field is finite or absent — NaN never leaks to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ProbabilitySummary {
    pub total: u64,
    pub events: Vec<EventStat>,
    pub pairwise: Vec<PairwiseStat>,
    /// All membership cells in ascending mask order; empty when
    /// partitions are excluded or no events are defined.
    pub partitions: Vec<PartitionCell>,
    pub sanity: SanityChecks,
}

/// Compute the probability summary for a sample space.
///
/// A filter failure (kind mismatch, malformed operand) aborts the whole
/// summary: silently treating it as non-membership would corrupt every
/// downstream probability.
#[instrument(skip_all, fields(samples = space.samples().len(), events = space.events().len()))]
pub fn summarize(space: &SampleSpace, options: &SummaryOptions) -> Result<ProbabilitySummary> {
    let events = space.events();
    let k = events.len();
    if k > MAX_EVENTS {
        return Err(Error::TooManyEvents {
            count: k,
            max: MAX_EVENTS,
        });
    }

    let n = space.samples().len() as u64;
    let names: Vec<&str> = events.iter().map(|e| e.name()).collect();
    let round = |x: f64| match options.precision {
        Some(digits) => round_to(x, digits),
        None => x,
    };

    // No samples: zero-valued marginals, vacuously true sanity.
    if n == 0 {
        return Ok(ProbabilitySummary {
            total: 0,
            events: names
                .iter()
                .map(|&name| EventStat {
                    name: name.to_string(),
                    count: 0,
                    probability: 0.0,
                    complement_count: 0,
                    complement_probability: 0.0,
                })
                .collect(),
            pairwise: Vec::new(),
            partitions: Vec::new(),
            sanity: SanityChecks {
                partitions_sum_one: true,
                counts_sum_equal_total: true,
            },
        });
    }

    // Membership mask per sample, accumulated sparsely: most of the 2^k
    // cells are unobserved once k grows.
    let mut cell_counts: BTreeMap<u64, u64> = BTreeMap::new();
    for sample in space.samples() {
        let mut mask = 0u64;
        for (i, event) in events.iter().enumerate() {
            if event.matches(sample)? {
                mask |= 1 << i;
            }
        }
        *cell_counts.entry(mask).or_insert(0) += 1;
    }
    debug!(cells = cell_counts.len(), "membership cells accumulated");

    // Marginal counts: every cell with bit i set lies inside event i.
    let mut event_counts = vec![0u64; k];
    for (&mask, &count) in &cell_counts {
        for (i, slot) in event_counts.iter_mut().enumerate() {
            if mask & (1 << i) != 0 {
                *slot += count;
            }
        }
    }

    let n_f = n as f64;
    let event_stats: Vec<EventStat> = event_counts
        .iter()
        .zip(&names)
        .map(|(&count, &name)| {
            let p = count as f64 / n_f;
            EventStat {
                name: name.to_string(),
                count,
                probability: round(p),
                complement_count: n - count,
                complement_probability: round(1.0 - p),
            }
        })
        .collect();

    // Pairwise stats over unordered pairs in definition order.
    let mut pairwise = Vec::with_capacity(k.saturating_sub(1) * k / 2);
    for i in 0..k {
        for j in (i + 1)..k {
            let pair_bits = (1u64 << i) | (1 << j);
            let intersection: u64 = cell_counts
                .iter()
                .filter(|(&mask, _)| mask & pair_bits == pair_bits)
                .map(|(_, &count)| count)
                .sum();
            let count_a = event_counts[i];
            let count_b = event_counts[j];
            let union = count_a + count_b - intersection;

            let p_a = count_a as f64 / n_f;
            let p_b = count_b as f64 / n_f;
            let p_intersection = intersection as f64 / n_f;

            let cond_a_given_b = ratio(intersection, count_b);
            let cond_b_given_a = ratio(intersection, count_a);
            let independence = match (cond_a_given_b, cond_b_given_a) {
                (Some(_), Some(_)) => {
                    Some(within(p_intersection, p_a * p_b, options.tolerance))
                }
                _ => None,
            };

            pairwise.push(PairwiseStat {
                a: names[i].to_string(),
                b: names[j].to_string(),
                intersection_count: intersection,
                intersection_probability: round(p_intersection),
                union_count: union,
                union_probability: round(union as f64 / n_f),
                cond_a_given_b: cond_a_given_b.map(&round),
                cond_b_given_a: cond_b_given_a.map(&round),
                independence,
            });
        }
    }

    // Partition table. Dense enumeration emits every cell, observed or
    // not; past the dense limit only observed cells are emitted (the
    // BTreeMap already yields ascending mask order).
    let mut partitions = Vec::new();
    if options.include_partitions && k > 0 {
        if (k as u32) <= DENSE_CELL_LIMIT {
            for mask in 0..(1u64 << k) {
                let count = cell_counts.get(&mask).copied().unwrap_or(0);
                partitions.push(build_cell(mask, count, &names, n_f, &round));
            }
        } else {
            for (&mask, &count) in &cell_counts {
                partitions.push(build_cell(mask, count, &names, n_f, &round));
            }
        }
    }

    let sum_counts: u64 = cell_counts.values().sum();
    let partitions_sum_one = if options.include_partitions && k > 0 {
        let sum_prob: f64 = partitions.iter().map(|cell| cell.probability).sum();
        within(sum_prob, 1.0, options.tolerance)
    } else {
        true
    };

    Ok(ProbabilitySummary {
        total: n,
        events: event_stats,
        pairwise,
        partitions,
        sanity: SanityChecks {
            partitions_sum_one,
            counts_sum_equal_total: sum_counts == n,
        },
    })
}

fn build_cell(
    mask: u64,
    count: u64,
    names: &[&str],
    n_f: f64,
    round: &impl Fn(f64) -> f64,
) -> PartitionCell {
    let mut member_names = Vec::new();
    let mut parts = Vec::with_capacity(names.len());
    for (i, &name) in names.iter().enumerate() {
        if mask & (1 << i) != 0 {
            member_names.push(name.to_string());
            parts.push(name.to_string());
        } else {
            parts.push(format!("{NEGATION_PREFIX}{name}"));
        }
    }
    PartitionCell {
        mask,
        key: parts.join(KEY_SEPARATOR),
        member_names,
        count,
        probability: round(count as f64 / n_f),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Event;
    use crate::filter::{Comparator, Filter};
    use crate::sample::Sample;
    use ps_common::value::AttrValue;

    fn sample(entries: &[(&str, AttrValue)]) -> Sample {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn threshold_space() -> SampleSpace {
        let mut space = SampleSpace::new();
        for x in [1.0, 2.0, 3.0] {
            space.add_sample(sample(&[("x", AttrValue::Number(x))]));
        }
        space
            .add_event(Event::new("A").with_filter(Filter::new("x", Comparator::Le, "2")))
            .unwrap();
        space
    }

    #[test]
    fn empty_space_is_all_zeroes() {
        let mut space = SampleSpace::new();
        space.add_event(Event::new("A")).unwrap();

        let summary = summarize(&space, &SummaryOptions::default()).unwrap();
        assert_eq!(summary.total, 0);
        assert_eq!(summary.events.len(), 1);
        assert_eq!(summary.events[0].count, 0);
        assert_eq!(summary.events[0].probability, 0.0);
        assert_eq!(summary.events[0].complement_count, 0);
        assert_eq!(summary.events[0].complement_probability, 0.0);
        assert!(summary.pairwise.is_empty());
        assert!(summary.partitions.is_empty());
        assert!(summary.sanity.partitions_sum_one);
        assert!(summary.sanity.counts_sum_equal_total);
    }

    #[test]
    fn threshold_marginals_and_partitions() {
        let space = threshold_space();
        let options = SummaryOptions {
            precision: Some(4),
            ..SummaryOptions::default()
        };
        let summary = summarize(&space, &options).unwrap();

        assert_eq!(summary.total, 3);
        let a = &summary.events[0];
        assert_eq!(a.name, "A");
        assert_eq!(a.count, 2);
        assert_eq!(a.probability, 0.6667);
        assert_eq!(a.complement_count, 1);
        assert_eq!(a.complement_probability, 0.3333);

        assert_eq!(summary.partitions.len(), 2);
        let outside = &summary.partitions[0];
        assert_eq!(outside.mask, 0);
        assert_eq!(outside.key, "!A");
        assert!(outside.member_names.is_empty());
        assert_eq!(outside.count, 1);

        let inside = &summary.partitions[1];
        assert_eq!(inside.mask, 1);
        assert_eq!(inside.key, "A");
        assert_eq!(inside.member_names, vec!["A"]);
        assert_eq!(inside.count, 2);

        assert!(summary.sanity.counts_sum_equal_total);
    }

    #[test]
    fn pairwise_intersection_union_and_dependence() {
        // 4 samples; A = red (2 of them), B = size > 10 (2 of them),
        // exactly 1 sample in both.
        let mut space = SampleSpace::new();
        space.add_sample(sample(&[
            ("color", AttrValue::from("red")),
            ("size", AttrValue::Number(12.0)),
        ]));
        space.add_sample(sample(&[
            ("color", AttrValue::from("red")),
            ("size", AttrValue::Number(8.0)),
        ]));
        space.add_sample(sample(&[
            ("color", AttrValue::from("blue")),
            ("size", AttrValue::Number(15.0)),
        ]));
        space.add_sample(sample(&[
            ("color", AttrValue::from("blue")),
            ("size", AttrValue::Number(5.0)),
        ]));
        space
            .add_event(Event::new("A").with_filter(Filter::new("color", Comparator::Eq, "red")))
            .unwrap();
        space
            .add_event(Event::new("B").with_filter(Filter::new("size", Comparator::Gt, "10")))
            .unwrap();

        let summary = summarize(&space, &SummaryOptions::default()).unwrap();
        assert_eq!(summary.pairwise.len(), 1);
        let pair = &summary.pairwise[0];
        assert_eq!((pair.a.as_str(), pair.b.as_str()), ("A", "B"));
        assert_eq!(pair.intersection_count, 1);
        assert_eq!(pair.union_count, 3);
        assert_eq!(pair.cond_a_given_b, Some(0.5));
        assert_eq!(pair.cond_b_given_a, Some(0.5));
        // P(A∩B) = 0.25 = P(A)P(B): independent here.
        assert_eq!(pair.independence, Some(true));

        assert_eq!(summary.partitions.len(), 4);
        let both = summary.partitions.iter().find(|c| c.key == "A&B").unwrap();
        assert_eq!(both.count, 1);
    }

    #[test]
    fn dependence_detected_beyond_tolerance() {
        // 4 samples, A and B both match the same 2: P(A∩B)=0.5 ≠ 0.25.
        let mut space = SampleSpace::new();
        for x in [1.0, 2.0, 11.0, 12.0] {
            space.add_sample(sample(&[("x", AttrValue::Number(x))]));
        }
        space
            .add_event(Event::new("A").with_filter(Filter::new("x", Comparator::Gt, "10")))
            .unwrap();
        space
            .add_event(Event::new("B").with_filter(Filter::new("x", Comparator::Ge, "11")))
            .unwrap();

        let summary = summarize(&space, &SummaryOptions::default()).unwrap();
        assert_eq!(summary.pairwise[0].independence, Some(false));
    }

    #[test]
    fn conditional_absent_when_conditioning_event_empty() {
        let mut space = SampleSpace::new();
        space.add_sample(sample(&[("x", AttrValue::Number(1.0))]));
        space
            .add_event(Event::new("A").with_filter(Filter::new("x", Comparator::Le, "2")))
            .unwrap();
        space
            .add_event(Event::new("B").with_filter(Filter::new("x", Comparator::Gt, "100")))
            .unwrap();

        let summary = summarize(&space, &SummaryOptions::default()).unwrap();
        let pair = &summary.pairwise[0];
        // B is empty: P(A|B) undefined, so independence is undecided.
        assert_eq!(pair.cond_a_given_b, None);
        assert_eq!(pair.cond_b_given_a, Some(0.0));
        assert_eq!(pair.independence, None);
    }

    #[test]
    fn no_events_means_no_partitions() {
        let mut space = SampleSpace::new();
        space.add_sample(sample(&[("x", AttrValue::Number(1.0))]));

        let summary = summarize(&space, &SummaryOptions::default()).unwrap();
        assert_eq!(summary.total, 1);
        assert!(summary.events.is_empty());
        assert!(summary.partitions.is_empty());
        assert!(summary.sanity.partitions_sum_one);
        assert!(summary.sanity.counts_sum_equal_total);
    }

    #[test]
    fn partitions_excluded_on_request() {
        let space = threshold_space();
        let options = SummaryOptions {
            include_partitions: false,
            ..SummaryOptions::default()
        };
        let summary = summarize(&space, &options).unwrap();
        assert!(summary.partitions.is_empty());
        // Vacuously true when nothing is emitted.
        assert!(summary.sanity.partitions_sum_one);
    }

    #[test]
    fn filter_failure_aborts_summary() {
        let mut space = SampleSpace::new();
        space.add_sample(sample(&[("age", AttrValue::Number(35.0))]));
        space
            .add_event(Event::new("A").with_filter(Filter::new("age", Comparator::Ge, "30, 40")))
            .unwrap();

        let err = summarize(&space, &SummaryOptions::default()).unwrap_err();
        assert!(matches!(err, Error::InvalidFilterOperand { .. }));
    }

    #[test]
    fn summary_is_idempotent() {
        let space = threshold_space();
        let options = SummaryOptions::default();
        let first = summarize(&space, &options).unwrap();
        let second = summarize(&space, &options).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn summary_serializes_with_snake_case_fields() {
        let space = threshold_space();
        let summary = summarize(&space, &SummaryOptions::default()).unwrap();
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["total"], 3);
        assert!(json["events"][0]["complement_count"].is_u64());
        assert!(json["sanity"]["counts_sum_equal_total"].as_bool().unwrap());
    }
}
