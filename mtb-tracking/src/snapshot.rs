//! The answer payload handed to the study's answer store.
//!
//! A payload is always a complete snapshot: the full badge catalog plus every
//! aggregate, never a delta against an earlier save.

use indexmap::IndexMap;
use mtb_core::{Atom, Badge};
use serde::Serialize;
use serde_json::Value;

use crate::analysis::{BadgeAggregate, BadgeCoverage, TrialEngagement};
use crate::entry::BadgeInteractionEntry;
use crate::trial::TrialState;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerPayload {
    pub status: bool,
    pub provenance_graph: Value,
    pub answers: StimulusAnswers,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BadgeStat {
    pub badge_id: Atom,
    pub badge_label: String,
    pub clicks: u64,
    pub hover_count: u64,
    pub time_spent_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingSummary {
    pub total_interactions: usize,
    pub total_clicks: u64,
    pub total_hovers: u64,
    pub total_drawer_opens: u64,
    pub total_time_on_badges: u64,
    pub unique_badges_interacted: usize,
    pub most_clicked_badge: Option<Atom>,
    pub session_start_time: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComprehensiveTracking {
    pub badge_interactions: IndexMap<Atom, BadgeInteractionEntry>,
    pub click_counts: IndexMap<Atom, u64>,
    pub summary: TrackingSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BadgePosition {
    pub row: &'static str,
    pub order: usize,
}

/// Catalog badge enriched with the fields analysis scripts filter on.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailableBadge {
    #[serde(flatten)]
    pub badge: Badge,
    pub has_tooltip: bool,
    pub has_drawer: bool,
    pub tooltip_content: Option<String>,
    pub drawer_content: Option<String>,
    pub category: Option<Atom>,
    pub subcategory: Option<String>,
    pub tags: Vec<Atom>,
    pub is_interactive: bool,
    pub can_be_clicked: bool,
    pub can_be_hovered: bool,
    pub has_detailed_info: bool,
    pub has_external_link: bool,
    pub position: BadgePosition,
}

impl AvailableBadge {
    pub fn new(badge: &Badge, order: usize) -> Self {
        let non_empty = |s: &Option<String>| s.as_deref().is_some_and(|s| !s.is_empty());
        Self {
            has_tooltip: true,
            has_drawer: true,
            tooltip_content: badge.description.clone(),
            drawer_content: badge
                .detailed_description
                .clone()
                .filter(|d| !d.is_empty())
                .or_else(|| badge.description.clone()),
            category: badge.kind.clone(),
            subcategory: badge.badge_type.clone(),
            tags: badge.topics.clone(),
            is_interactive: true,
            can_be_clicked: true,
            can_be_hovered: true,
            has_detailed_info: non_empty(&badge.detailed_description),
            has_external_link: non_empty(&badge.link),
            position: BadgePosition {
                row: "bottom",
                order,
            },
            badge: badge.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StimulusAnswers {
    pub badge_stats: Vec<BadgeStat>,
    pub total_badge_clicks: u64,
    pub total_badge_time_spent: u64,
    pub badge_tracking_data: ComprehensiveTracking,
    pub badge_interactions: IndexMap<Atom, BadgeInteractionEntry>,
    pub badge_click_counts: IndexMap<Atom, u64>,
    pub total_time_on_badges: u64,
    pub badge_tracking_summary: TrackingSummary,
    pub trial_engagement: TrialEngagement,
    pub badge_aggregates: IndexMap<Atom, BadgeAggregate>,
    pub badge_coverage: BadgeCoverage,
    pub available_badges: Vec<AvailableBadge>,
}

impl AnswerPayload {
    pub fn build(
        trial: &TrialState,
        catalog: &[Badge],
        provenance_graph: Value,
        now_ms: i64,
    ) -> Self {
        let analysis = trial.analyze(now_ms);
        let comprehensive = comprehensive(trial);
        let badge_stats: Vec<BadgeStat> = trial
            .entries()
            .values()
            .map(|entry| {
                let t = entry.totals();
                BadgeStat {
                    badge_id: entry.badge_id.clone(),
                    badge_label: entry.badge_label.clone(),
                    clicks: t.total_clicks,
                    hover_count: t.total_hover_ends,
                    time_spent_ms: t.time_on_badge(),
                }
            })
            .collect();

        Self {
            status: true,
            provenance_graph,
            answers: StimulusAnswers {
                total_badge_clicks: comprehensive.summary.total_clicks,
                total_badge_time_spent: comprehensive.summary.total_time_on_badges,
                badge_stats,
                badge_interactions: comprehensive.badge_interactions.clone(),
                badge_click_counts: comprehensive.click_counts.clone(),
                total_time_on_badges: comprehensive.summary.total_time_on_badges,
                badge_tracking_summary: comprehensive.summary.clone(),
                badge_tracking_data: comprehensive,
                trial_engagement: analysis.trial_engagement,
                badge_aggregates: analysis.badge_aggregates,
                badge_coverage: analysis.badge_coverage,
                available_badges: catalog
                    .iter()
                    .enumerate()
                    .map(|(order, badge)| AvailableBadge::new(badge, order))
                    .collect(),
            },
        }
    }
}

fn comprehensive(trial: &TrialState) -> ComprehensiveTracking {
    let mut summary = TrackingSummary {
        total_interactions: trial.interaction_count(),
        total_clicks: 0,
        total_hovers: 0,
        total_drawer_opens: 0,
        total_time_on_badges: 0,
        unique_badges_interacted: trial.entries().len(),
        most_clicked_badge: None,
        session_start_time: trial.stimulus_start_time(),
    };
    let mut click_counts = IndexMap::with_capacity(trial.entries().len());
    let mut best_clicks = 0;

    for (id, entry) in trial.entries() {
        let t = entry.totals();
        summary.total_clicks += t.total_clicks;
        summary.total_hovers += t.total_hover_ends;
        summary.total_drawer_opens += t.total_drawer_opens;
        summary.total_time_on_badges += t.time_on_badge();
        if t.total_clicks > best_clicks {
            best_clicks = t.total_clicks;
            summary.most_clicked_badge = Some(id.clone());
        }
        click_counts.insert(id.clone(), t.total_clicks);
    }

    ComprehensiveTracking {
        badge_interactions: trial.entries().clone(),
        click_counts,
        summary,
    }
}
