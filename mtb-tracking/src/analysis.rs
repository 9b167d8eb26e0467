//! Trial-level metrics derived on demand from the accumulated badge state.
//!
//! Everything here is a pure read of [`TrialState`]; the only input that
//! moves between calls is the `now_ms` the caller passes in.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use mtb_core::Atom;
use serde::Serialize;

use crate::entry::BadgeInteractionEntry;
use crate::trial::TrialState;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrialEngagement {
    pub time_on_stimulus_ms: u64,
    pub time_to_first_badge_hover_ms: Option<u64>,
    pub time_to_first_badge_click_ms: Option<u64>,
    pub total_badge_interactions: usize,
    pub unique_badges_interacted: usize,
    pub proportion_time_on_badges: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BadgeAggregate {
    pub badge_id: Atom,
    pub badge_label: String,
    pub badge_type: Option<String>,
    pub badge_category: Option<Atom>,
    pub badge_topics: Vec<Atom>,
    pub click_count: u64,
    pub total_hover_count: u64,
    pub total_hover_time_ms: u64,
    pub average_hover_time_ms: f64,
    pub max_hover_time_ms: u64,
    pub drawer_open_count: u64,
    pub total_drawer_open_time_ms: u64,
    pub average_drawer_open_time_ms: f64,
    pub first_click_latency_ms: Option<u64>,
    pub last_interaction_ts: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FirstBadge {
    pub id: Atom,
    pub category: Option<Atom>,
    pub latency_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BadgeCoverage {
    pub badges_seen_count: usize,
    pub badges_clicked_count: usize,
    pub badges_with_details_viewed_count: usize,
    pub categories_seen_counts: BTreeMap<String, usize>,
    pub topics_seen_counts: BTreeMap<String, usize>,
    pub first_badge: Option<FirstBadge>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrialAnalysis {
    pub trial_engagement: TrialEngagement,
    pub badge_aggregates: IndexMap<Atom, BadgeAggregate>,
    pub badge_coverage: BadgeCoverage,
}

fn ratio(total: u64, count: u64) -> f64 {
    if count > 0 {
        total as f64 / count as f64
    } else {
        0.0
    }
}

impl TrialState {
    pub fn analyze(&self, now_ms: i64) -> TrialAnalysis {
        TrialAnalysis {
            trial_engagement: self.engagement(now_ms),
            badge_aggregates: self
                .entries()
                .iter()
                .map(|(id, entry)| (id.clone(), self.aggregate(entry)))
                .collect(),
            badge_coverage: self.coverage(),
        }
    }

    pub fn engagement(&self, now_ms: i64) -> TrialEngagement {
        let time_on_stimulus_ms = self.latency_ms(now_ms);
        let totals = self.entries().values().map(BadgeInteractionEntry::totals);

        let mut first_hover: Option<i64> = None;
        let mut first_click: Option<i64> = None;
        let mut time_on_badges = 0u64;
        for t in totals {
            first_hover = min_opt(first_hover, t.first_hover_start_time);
            first_click = min_opt(first_click, t.first_click_time);
            time_on_badges += t.time_on_badge();
        }

        let proportion_time_on_badges = if time_on_stimulus_ms > 0 {
            time_on_badges as f64 / time_on_stimulus_ms as f64
        } else {
            0.0
        };

        TrialEngagement {
            time_on_stimulus_ms,
            time_to_first_badge_hover_ms: first_hover.map(|ts| self.latency_ms(ts)),
            time_to_first_badge_click_ms: first_click.map(|ts| self.latency_ms(ts)),
            total_badge_interactions: self.interaction_count(),
            unique_badges_interacted: self.entries().len(),
            proportion_time_on_badges,
        }
    }

    pub fn aggregate(&self, entry: &BadgeInteractionEntry) -> BadgeAggregate {
        let t = entry.totals();
        BadgeAggregate {
            badge_id: entry.badge_id.clone(),
            badge_label: entry.badge_label.clone(),
            badge_type: entry.badge_type.clone(),
            badge_category: entry.badge_category.clone(),
            badge_topics: entry.badge_topics.clone(),
            click_count: t.total_clicks,
            total_hover_count: t.total_hover_ends,
            total_hover_time_ms: t.total_hover_time,
            average_hover_time_ms: ratio(t.total_hover_time, t.total_hover_ends),
            max_hover_time_ms: t.max_hover_time,
            drawer_open_count: t.total_drawer_opens,
            total_drawer_open_time_ms: t.total_drawer_time,
            average_drawer_open_time_ms: ratio(t.total_drawer_time, t.total_drawer_closes),
            first_click_latency_ms: t.first_click_time.map(|ts| self.latency_ms(ts)),
            last_interaction_ts: t.last_interaction_time,
        }
    }

    /// Coverage over badges, categories and topics.
    ///
    /// Category and topic tallies count each badge once. The first badge is
    /// the entry with the strictly earliest first interaction; equal
    /// timestamps keep the earlier-inserted entry, which makes same-millisecond
    /// ties from unrelated callbacks order-dependent.
    pub fn coverage(&self) -> BadgeCoverage {
        let mut coverage = BadgeCoverage {
            badges_seen_count: self.entries().len(),
            badges_clicked_count: 0,
            badges_with_details_viewed_count: 0,
            categories_seen_counts: BTreeMap::new(),
            topics_seen_counts: BTreeMap::new(),
            first_badge: None,
        };
        let mut first_ts: Option<i64> = None;

        for entry in self.entries().values() {
            let t = entry.totals();
            if t.total_clicks > 0 {
                coverage.badges_clicked_count += 1;
            }
            if t.total_drawer_opens > 0 || t.total_drawer_time > 0 {
                coverage.badges_with_details_viewed_count += 1;
            }
            if let Some(category) = entry.badge_category.as_deref().filter(|c| !c.is_empty()) {
                *coverage
                    .categories_seen_counts
                    .entry(category.to_string())
                    .or_default() += 1;
            }
            for topic in &entry.badge_topics {
                *coverage.topics_seen_counts.entry(topic.to_string()).or_default() += 1;
            }

            if let Some(ts) = t.first_interaction_time {
                if first_ts.is_none_or(|best| ts < best) {
                    first_ts = Some(ts);
                    coverage.first_badge = Some(FirstBadge {
                        id: entry.badge_id.clone(),
                        category: entry.badge_category.clone(),
                        latency_ms: self.latency_ms(ts),
                    });
                }
            }
        }
        coverage
    }
}

fn min_opt(a: Option<i64>, b: Option<i64>) -> Option<i64> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, None) => a,
        (None, b) => b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mtb_core::{BadgeMetadata, InteractionType};

    fn meta(category: &str, topics: &[&str]) -> BadgeMetadata {
        BadgeMetadata {
            label: category.to_uppercase(),
            badge_type: None,
            category: Some(Atom::from(category)),
            topics: topics.iter().map(|t| Atom::from(*t)).collect(),
        }
    }

    #[test]
    fn empty_trial_has_zero_metrics() {
        let trial = TrialState::new(100);
        let analysis = trial.analyze(100);
        assert_eq!(analysis.trial_engagement.time_on_stimulus_ms, 0);
        assert_eq!(analysis.trial_engagement.time_to_first_badge_hover_ms, None);
        assert_eq!(analysis.trial_engagement.proportion_time_on_badges, 0.0);
        assert!(analysis.badge_aggregates.is_empty());
        assert_eq!(analysis.badge_coverage.first_badge, None);
    }

    #[test]
    fn topics_count_once_per_badge() {
        let mut trial = TrialState::new(0);
        let m = meta("info", &["source", "trust"]);
        for ts in [1, 2, 3] {
            trial.record_at(Atom::from("a"), InteractionType::Click, &m, ts, None);
        }
        let b = meta("info", &["source"]);
        trial.record_at(Atom::from("b"), InteractionType::HoverStart, &b, 4, None);
        let coverage = trial.coverage();
        assert_eq!(coverage.categories_seen_counts.get("info"), Some(&2));
        assert_eq!(coverage.topics_seen_counts.get("source"), Some(&2));
        assert_eq!(coverage.topics_seen_counts.get("trust"), Some(&1));
    }

    #[test]
    fn first_badge_tie_keeps_insertion_order() {
        let mut trial = TrialState::new(0);
        let (w, x) = (meta("w", &[]), meta("x", &[]));
        trial.record_at(Atom::from("late"), InteractionType::HoverStart, &w, 50, None);
        trial.record_at(Atom::from("tie"), InteractionType::HoverStart, &x, 50, None);
        let first = trial.coverage().first_badge.unwrap();
        assert_eq!(&*first.id, "late");
        assert_eq!(first.latency_ms, 50);
    }

    #[test]
    fn drawer_averages_divide_by_closes() {
        let mut trial = TrialState::new(0);
        let m = meta("info", &[]);
        let id = Atom::from("a");
        trial.record_at(id.clone(), InteractionType::DrawerOpen, &m, 0, None);
        trial.record_at(id.clone(), InteractionType::DrawerClose, &m, 400, None);
        trial.record_at(id.clone(), InteractionType::DrawerOpen, &m, 500, None);
        let aggregate = trial.aggregate(trial.entry("a").unwrap());
        assert_eq!(aggregate.drawer_open_count, 2);
        assert_eq!(aggregate.total_drawer_open_time_ms, 400);
        assert_eq!(aggregate.average_drawer_open_time_ms, 400.0);
        assert_eq!(trial.coverage().badges_with_details_viewed_count, 1);
    }
}
