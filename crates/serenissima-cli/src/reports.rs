//! Read-only analysis reports.
//!
//! Each report is a pure aggregation over a fetched snapshot, separated
//! from fetching and printing so the numbers are testable without a live
//! API. `--mock` swaps the fetch for a generated snapshot with the same
//! shape.

use std::collections::BTreeMap;

use rand::Rng;
use rust_decimal::Decimal;

use serenissima_types::{
    Citizen, Problem, ProblemSeverity, ResourceStack, ResourceType, SocialClass, Username,
};

/// Aggregate view of the citizen population.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CitizenSummary {
    /// Total citizens in the snapshot.
    pub total: usize,
    /// Citizens controlled by AI agents.
    pub ai_count: usize,
    /// Citizens currently hungry.
    pub hungry_count: usize,
    /// Head count per social class, in class order.
    pub by_class: BTreeMap<String, usize>,
    /// Sum of all purses.
    pub total_ducats: Decimal,
    /// Mean purse, zero for an empty snapshot.
    pub mean_ducats: Decimal,
    /// The largest single purse, with its holder.
    pub richest: Option<(Username, Decimal)>,
}

/// Sum citizens into a [`CitizenSummary`].
pub fn summarize_citizens(citizens: &[Citizen]) -> CitizenSummary {
    let mut by_class: BTreeMap<String, usize> = BTreeMap::new();
    let mut ai_count = 0_usize;
    let mut hungry_count = 0_usize;
    let mut total_ducats = Decimal::ZERO;
    let mut richest: Option<(Username, Decimal)> = None;

    for citizen in citizens {
        let slot = by_class
            .entry(format!("{:?}", citizen.social_class))
            .or_insert(0);
        *slot = slot.saturating_add(1);
        if citizen.is_ai {
            ai_count = ai_count.saturating_add(1);
        }
        if citizen.hungry {
            hungry_count = hungry_count.saturating_add(1);
        }
        total_ducats = total_ducats.saturating_add(citizen.ducats);
        let is_richer = richest
            .as_ref()
            .is_none_or(|(_, best)| citizen.ducats > *best);
        if is_richer {
            richest = Some((citizen.username.clone(), citizen.ducats));
        }
    }

    let mean_ducats = total_ducats
        .checked_div(Decimal::from(citizens.len().max(1)))
        .unwrap_or(Decimal::ZERO);
    CitizenSummary {
        total: citizens.len(),
        ai_count,
        hungry_count,
        by_class,
        total_ducats,
        mean_ducats,
        richest,
    }
}

/// Count problems per severity band, in severity order.
pub fn summarize_problems(problems: &[Problem]) -> BTreeMap<String, usize> {
    let mut by_severity: BTreeMap<String, usize> = BTreeMap::new();
    for problem in problems {
        let slot = by_severity
            .entry(format!("{:?}", problem.severity))
            .or_insert(0);
        *slot = slot.saturating_add(1);
    }
    by_severity
}

/// Total units per resource type across all stacks.
pub fn summarize_resources(stacks: &[ResourceStack]) -> BTreeMap<&'static str, u64> {
    let mut by_resource: BTreeMap<&'static str, u64> = BTreeMap::new();
    for stack in stacks {
        let slot = by_resource.entry(stack.resource.as_str()).or_insert(0);
        *slot = slot.saturating_add(u64::from(stack.count));
    }
    by_resource
}

/// Render the citizen report for the console.
pub fn render_citizens(summary: &CitizenSummary) -> String {
    let mut out = String::new();
    out.push_str(&format!("Citizens: {}\n", summary.total));
    out.push_str(&format!(
        "  AI-controlled: {}   hungry: {}\n",
        summary.ai_count, summary.hungry_count
    ));
    for (class, count) in &summary.by_class {
        out.push_str(&format!("  {class:<12} {count}\n"));
    }
    out.push_str(&format!(
        "Wealth: {} ducats total, {:.2} mean\n",
        summary.total_ducats, summary.mean_ducats
    ));
    if let Some((username, ducats)) = &summary.richest {
        out.push_str(&format!("  richest: {username} ({ducats} ducats)\n"));
    }
    out
}

/// Render the problem report for the console.
pub fn render_problems(by_severity: &BTreeMap<String, usize>) -> String {
    let total: usize = by_severity.values().fold(0, |acc, n| acc.saturating_add(*n));
    let mut out = format!("Problems: {total}\n");
    for (severity, count) in by_severity {
        out.push_str(&format!("  {severity:<10} {count}\n"));
    }
    out
}

/// Render the resource report for the console.
pub fn render_resources(by_resource: &BTreeMap<&'static str, u64>) -> String {
    let mut out = String::from("Resources:\n");
    for (resource, units) in by_resource {
        out.push_str(&format!("  {resource:<8} {units}\n"));
    }
    out
}

// ---------------------------------------------------------------------------
// Mock snapshots
// ---------------------------------------------------------------------------

const MOCK_CITIZEN_COUNT: usize = 120;
const MOCK_PROBLEM_COUNT: usize = 24;
const MOCK_STACK_COUNT: usize = 60;

const CLASSES: [SocialClass; 6] = [
    SocialClass::Nobili,
    SocialClass::Cittadini,
    SocialClass::Popolani,
    SocialClass::Facchini,
    SocialClass::Forestieri,
    SocialClass::Artisti,
];

const RESOURCES: [ResourceType; 6] = [
    ResourceType::Paper,
    ResourceType::Fish,
    ResourceType::Timber,
    ResourceType::Grain,
    ResourceType::Wine,
    ResourceType::Salt,
];

const SEVERITIES: [ProblemSeverity; 4] = [
    ProblemSeverity::Low,
    ProblemSeverity::Medium,
    ProblemSeverity::High,
    ProblemSeverity::Critical,
];

fn pick<T: Copy>(rng: &mut impl Rng, options: &[T]) -> Option<T> {
    options.get(rng.random_range(0..options.len())).copied()
}

/// Generate a plausible citizen snapshot for offline report runs.
pub fn mock_citizens(rng: &mut impl Rng) -> Vec<Citizen> {
    (0..MOCK_CITIZEN_COUNT)
        .map(|i| Citizen {
            username: Username::from(format!("Citizen{i}").as_str()),
            first_name: "Marco".to_owned(),
            last_name: "Contarini".to_owned(),
            ducats: Decimal::from(rng.random_range(5..20_000_i64)),
            social_class: pick(rng, &CLASSES).unwrap_or(SocialClass::Popolani),
            position: None,
            hungry: rng.random_bool(0.15),
            is_ai: rng.random_bool(0.9),
        })
        .collect()
}

/// Generate a plausible problem snapshot for offline report runs.
pub fn mock_problems(rng: &mut impl Rng) -> Vec<Problem> {
    (0..MOCK_PROBLEM_COUNT)
        .map(|i| Problem {
            problem_id: format!("problem-{i}"),
            severity: pick(rng, &SEVERITIES).unwrap_or(ProblemSeverity::Low),
            citizen: None,
            title: "Hungry citizen".to_owned(),
        })
        .collect()
}

/// Generate a plausible resource snapshot for offline report runs.
pub fn mock_resources(rng: &mut impl Rng) -> Vec<ResourceStack> {
    (0..MOCK_STACK_COUNT)
        .map(|_| {
            let resource = pick(rng, &RESOURCES).unwrap_or(ResourceType::Fish);
            ResourceStack {
                resource_stack_id: ResourceStack::mint_id(resource),
                resource,
                owner: Username::from("Citizen0"),
                holder_building: serenissima_types::BuildingId::from("bld_mock"),
                count: rng.random_range(1..200),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    fn citizen(username: &str, class: SocialClass, ducats: i64, is_ai: bool) -> Citizen {
        Citizen {
            username: Username::from(username),
            first_name: "Marco".to_owned(),
            last_name: "Contarini".to_owned(),
            ducats: Decimal::from(ducats),
            social_class: class,
            position: None,
            hungry: false,
            is_ai,
        }
    }

    #[test]
    fn citizen_summary_counts_classes_and_wealth() {
        let citizens = vec![
            citizen("a", SocialClass::Nobili, 1_000, false),
            citizen("b", SocialClass::Popolani, 200, true),
            citizen("c", SocialClass::Popolani, 300, true),
        ];
        let summary = summarize_citizens(&citizens);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.ai_count, 2);
        assert_eq!(summary.by_class.get("Popolani"), Some(&2));
        assert_eq!(summary.total_ducats, Decimal::from(1_500));
        assert_eq!(summary.mean_ducats, Decimal::from(500));
        assert_eq!(
            summary.richest,
            Some((Username::from("a"), Decimal::from(1_000)))
        );
    }

    #[test]
    fn empty_snapshot_summarizes_to_zeroes() {
        let summary = summarize_citizens(&[]);
        assert_eq!(summary.total, 0);
        assert_eq!(summary.mean_ducats, Decimal::ZERO);
        assert!(summary.richest.is_none());
    }

    #[test]
    fn resource_totals_merge_stacks_of_one_type() {
        let stacks = vec![
            ResourceStack {
                resource_stack_id: ResourceStack::mint_id(ResourceType::Fish),
                resource: ResourceType::Fish,
                owner: Username::from("a"),
                holder_building: serenissima_types::BuildingId::from("bld_1"),
                count: 10,
            },
            ResourceStack {
                resource_stack_id: ResourceStack::mint_id(ResourceType::Fish),
                resource: ResourceType::Fish,
                owner: Username::from("b"),
                holder_building: serenissima_types::BuildingId::from("bld_2"),
                count: 5,
            },
        ];
        let totals = summarize_resources(&stacks);
        assert_eq!(totals.get("fish"), Some(&15));
    }

    #[test]
    fn mock_snapshots_have_the_documented_sizes() {
        let mut rng = rand::rng();
        assert_eq!(mock_citizens(&mut rng).len(), MOCK_CITIZEN_COUNT);
        assert_eq!(mock_problems(&mut rng).len(), MOCK_PROBLEM_COUNT);
        assert_eq!(mock_resources(&mut rng).len(), MOCK_STACK_COUNT);
    }
}
