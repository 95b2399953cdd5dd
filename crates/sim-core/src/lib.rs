#![deny(warnings)]

//! Core domain models and invariants for the sanctions simulation.
//!
//! This crate defines the serializable types shared across the engine with
//! validation helpers to guarantee basic invariants: nations with output
//! levels and pairwise affinities, sanction categories, the derived trade
//! network, and the simulation record produced by one engine run.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;
use thiserror::Error;

/// Lower bound of the diplomatic affinity scale.
pub const AFFINITY_MIN: i32 = -100;
/// Upper bound of the diplomatic affinity scale.
pub const AFFINITY_MAX: i32 = 100;

/// Unique identifier for a nation, e.g. "USA", "PRC", "DEU".
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NationId(pub String);

/// An economic actor participating in the simulation.
///
/// Nations are supplied per simulation call and treated as frozen for the
/// duration of that call; the engine never retains a reference past return.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Nation {
    /// Nation identifier.
    pub id: NationId,
    /// Annual output in USD (GDP-equivalent, >= 0).
    pub gdp_usd: Decimal,
    /// Affinity held toward other nations on the [-100, 100] scale.
    pub affinities: BTreeMap<NationId, i32>,
}

impl Nation {
    /// Affinity this nation holds toward `other`. Nations without a recorded
    /// relationship read as neutral (0).
    pub fn affinity_toward(&self, other: &NationId) -> i32 {
        self.affinities.get(other).copied().unwrap_or(0)
    }
}

/// Kinds of sanctions a nation can impose.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SanctionCategory {
    /// Blanket ban on bilateral trade.
    TradeBan,
    /// Export controls on technology goods.
    TechnologyBan,
    /// Ban on weapons sales.
    ArmsEmbargo,
    /// Freeze of financial assets and payment channels.
    FinancialFreeze,
    /// Trade ban plus financial freeze.
    FullEmbargo,
}

impl SanctionCategory {
    /// Fixed severity multiplier applied to the target-side loss.
    ///
    /// A design constant, not derived: trade-ban 1.0, technology-ban 0.6,
    /// arms-embargo 0.3, financial-freeze 0.8, full-embargo 1.5.
    pub fn severity(self) -> Decimal {
        match self {
            SanctionCategory::TradeBan => Decimal::new(10, 1),
            SanctionCategory::TechnologyBan => Decimal::new(6, 1),
            SanctionCategory::ArmsEmbargo => Decimal::new(3, 1),
            SanctionCategory::FinancialFreeze => Decimal::new(8, 1),
            SanctionCategory::FullEmbargo => Decimal::new(15, 1),
        }
    }

    /// All recognized categories, in severity-table order.
    pub fn all() -> [SanctionCategory; 5] {
        [
            SanctionCategory::TradeBan,
            SanctionCategory::TechnologyBan,
            SanctionCategory::ArmsEmbargo,
            SanctionCategory::FinancialFreeze,
            SanctionCategory::FullEmbargo,
        ]
    }
}

impl FromStr for SanctionCategory {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "trade-ban" => Ok(SanctionCategory::TradeBan),
            "technology-ban" => Ok(SanctionCategory::TechnologyBan),
            "arms-embargo" => Ok(SanctionCategory::ArmsEmbargo),
            "financial-freeze" => Ok(SanctionCategory::FinancialFreeze),
            "full-embargo" => Ok(SanctionCategory::FullEmbargo),
            other => Err(ValidationError::UnknownCategory(other.to_string())),
        }
    }
}

/// One directed trade relationship derived from a nation snapshot.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TradeEdge {
    /// Exporting nation.
    pub source: NationId,
    /// Importing nation.
    pub dest: NationId,
    /// Estimated annual trade volume in USD (>= 0).
    pub volume_usd: Decimal,
    /// Fraction of the source's output carried by this edge.
    ///
    /// Usually in [0, 1], but not clamped: a near-zero source output reads
    /// as fully dependent (1) rather than failing the build.
    pub dependency: Decimal,
}

/// Snapshot of all bilateral trade relationships for one simulation call.
///
/// Built fresh per call; never updated in place. Callers that need current
/// figures after a nation changes must rebuild.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TradeNetwork {
    /// Edges in deterministic build order, at most one per ordered pair.
    pub edges: Vec<TradeEdge>,
}

impl TradeNetwork {
    /// Edges with `id` at either endpoint, in network order.
    pub fn edges_touching<'a>(
        &'a self,
        id: &'a NationId,
    ) -> impl Iterator<Item = &'a TradeEdge> {
        self.edges
            .iter()
            .filter(move |e| e.source == *id || e.dest == *id)
    }
}

/// Bilateral damage from a single sanction, as percentage GDP losses.
///
/// Both sides are non-negative and unbounded above; extreme dependency and
/// severity combinations can exceed 100 and are reported as computed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DirectImpact {
    /// Percentage GDP loss on the sanctioned side.
    pub target_loss_pct: Decimal,
    /// Percentage GDP cost borne by the sanctioning side.
    pub sanctioner_cost_pct: Decimal,
}

/// Secondary damage to a third party trading with the sanctioned nation.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CascadeEffect {
    /// The indirectly affected nation.
    pub nation: NationId,
    /// Positive percentage GDP impact.
    pub gdp_impact_pct: Decimal,
    /// Short label for the transmission channel.
    pub cause: String,
}

/// An alternative trading partner able to absorb displaced volume.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SubstitutionOption {
    /// Candidate partner.
    pub nation: NationId,
    /// Fraction of lost capacity this partner can replace, in [0, 0.7].
    pub replacement_capacity: Decimal,
    /// Turns of diplomatic/logistic setup before trade resumes.
    pub lead_time_turns: u32,
}

/// Immutable result of one sanction simulation run.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SimulationRecord {
    /// Sanctioning nation.
    pub sanctioner: NationId,
    /// Sanctioned nation.
    pub target: NationId,
    /// Category of the sanction evaluated.
    pub category: SanctionCategory,
    /// Bilateral direct damage.
    pub direct: DirectImpact,
    /// Third-party effects, sorted descending by impact.
    pub cascade: Vec<CascadeEffect>,
    /// Up to five substitute partners in network discovery order.
    pub substitutions: Vec<SubstitutionOption>,
    /// Estimated years until the loss is offset (>= 1).
    pub recovery_years: u32,
    /// Self-declared model confidence in (0, 1].
    pub confidence: Decimal,
    /// Caller-supplied timestamp of the run.
    pub issued_at: DateTime<Utc>,
}

impl SimulationRecord {
    /// Deterministic top-`n` prefix of the cascade sequence, for callers
    /// that render only the largest effects.
    pub fn top_cascades(&self, n: usize) -> &[CascadeEffect] {
        &self.cascade[..n.min(self.cascade.len())]
    }
}

/// Per-run configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SimConfig {
    /// Seed for the deterministic RNG used for lead-time sampling.
    pub rng_seed: u64,
}

/// Validation errors for domain invariants.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// Nation id must contain non-whitespace characters.
    #[error("nation id must not be empty")]
    EmptyId,
    /// GDP must be non-negative.
    #[error("nation {0} has negative gdp")]
    NegativeGdp(String),
    /// Affinity scores live on the [-100, 100] scale.
    #[error("affinity {1} held by {0} is outside [-100, 100]")]
    AffinityOutOfRange(String, i32),
    /// A nation must not record an affinity toward itself.
    #[error("nation {0} holds an affinity toward itself")]
    SelfAffinity(String),
    /// Ids must be unique within one snapshot.
    #[error("duplicate nation id: {0}")]
    DuplicateId(String),
    /// Unrecognized sanction category name.
    #[error("unknown sanction category: {0}")]
    UnknownCategory(String),
}

/// Validate a single nation.
pub fn validate_nation(nation: &Nation) -> Result<(), ValidationError> {
    if nation.id.0.trim().is_empty() {
        return Err(ValidationError::EmptyId);
    }
    if nation.gdp_usd < Decimal::ZERO {
        return Err(ValidationError::NegativeGdp(nation.id.0.clone()));
    }
    for (other, &score) in &nation.affinities {
        if *other == nation.id {
            return Err(ValidationError::SelfAffinity(nation.id.0.clone()));
        }
        if !(AFFINITY_MIN..=AFFINITY_MAX).contains(&score) {
            return Err(ValidationError::AffinityOutOfRange(
                nation.id.0.clone(),
                score,
            ));
        }
    }
    Ok(())
}

/// Validate a full snapshot, including id uniqueness.
pub fn validate_snapshot(nations: &[Nation]) -> Result<(), ValidationError> {
    let mut ids: BTreeSet<&NationId> = BTreeSet::new();
    for nation in nations {
        validate_nation(nation)?;
        if !ids.insert(&nation.id) {
            return Err(ValidationError::DuplicateId(nation.id.0.clone()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn nation(id: &str, gdp: i64, affinities: &[(&str, i32)]) -> Nation {
        Nation {
            id: NationId(id.to_string()),
            gdp_usd: Decimal::new(gdp, 0),
            affinities: affinities
                .iter()
                .map(|(other, score)| (NationId(other.to_string()), *score))
                .collect(),
        }
    }

    #[test]
    fn serde_roundtrip_nation() {
        let n = nation("USA", 25_000, &[("PRC", -40), ("DEU", 75)]);
        let s = serde_json::to_string(&n).unwrap();
        let back: Nation = serde_json::from_str(&s).unwrap();
        assert_eq!(back.id.0, "USA");
        assert_eq!(back.affinity_toward(&NationId("DEU".into())), 75);
        assert_eq!(back.affinity_toward(&NationId("FRA".into())), 0);
    }

    #[test]
    fn serde_roundtrip_record() {
        let record = SimulationRecord {
            sanctioner: NationId("A".into()),
            target: NationId("B".into()),
            category: SanctionCategory::TradeBan,
            direct: DirectImpact {
                target_loss_pct: Decimal::new(45, 1),
                sanctioner_cost_pct: Decimal::new(1125, 3),
            },
            cascade: vec![CascadeEffect {
                nation: NationId("C".into()),
                gdp_impact_pct: Decimal::new(30, 0),
                cause: "trade exposure to B".into(),
            }],
            substitutions: vec![SubstitutionOption {
                nation: NationId("D".into()),
                replacement_capacity: Decimal::new(56, 2),
                lead_time_turns: 4,
            }],
            recovery_years: 3,
            confidence: Decimal::new(75, 2),
            issued_at: DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
        };
        let s = serde_json::to_string_pretty(&record).unwrap();
        let back: SimulationRecord = serde_json::from_str(&s).unwrap();
        assert_eq!(back.target, record.target);
        assert_eq!(back.recovery_years, 3);
        assert_eq!(back.issued_at, record.issued_at);
        assert_eq!(back.top_cascades(5).len(), 1);
    }

    #[test]
    fn category_serializes_kebab_case() {
        let s = serde_json::to_string(&SanctionCategory::FinancialFreeze).unwrap();
        assert_eq!(s, "\"financial-freeze\"");
        let back: SanctionCategory = serde_json::from_str("\"full-embargo\"").unwrap();
        assert_eq!(back, SanctionCategory::FullEmbargo);
    }

    #[test]
    fn category_from_str_matches_serde_names() {
        for cat in SanctionCategory::all() {
            let name = serde_json::to_string(&cat).unwrap();
            let parsed: SanctionCategory = name.trim_matches('"').parse().unwrap();
            assert_eq!(parsed, cat);
        }
        assert_eq!(
            "oil-embargo".parse::<SanctionCategory>(),
            Err(ValidationError::UnknownCategory("oil-embargo".into()))
        );
    }

    #[test]
    fn severity_table_is_fixed() {
        assert_eq!(SanctionCategory::TradeBan.severity(), Decimal::new(10, 1));
        assert_eq!(SanctionCategory::ArmsEmbargo.severity(), Decimal::new(3, 1));
        assert_eq!(SanctionCategory::FullEmbargo.severity(), Decimal::new(15, 1));
    }

    #[test]
    fn edges_touching_matches_either_endpoint() {
        let network = TradeNetwork {
            edges: vec![
                TradeEdge {
                    source: NationId("A".into()),
                    dest: NationId("B".into()),
                    volume_usd: Decimal::ONE,
                    dependency: Decimal::new(1, 2),
                },
                TradeEdge {
                    source: NationId("C".into()),
                    dest: NationId("A".into()),
                    volume_usd: Decimal::ONE,
                    dependency: Decimal::new(2, 2),
                },
                TradeEdge {
                    source: NationId("B".into()),
                    dest: NationId("C".into()),
                    volume_usd: Decimal::ONE,
                    dependency: Decimal::new(3, 2),
                },
            ],
        };
        let a = NationId("A".into());
        assert_eq!(network.edges_touching(&a).count(), 2);
        let b = NationId("B".into());
        assert_eq!(network.edges_touching(&b).count(), 2);
    }

    #[test]
    fn validate_rejects_out_of_range_affinity() {
        let n = nation("USA", 100, &[("PRC", 120)]);
        assert_eq!(
            validate_nation(&n),
            Err(ValidationError::AffinityOutOfRange("USA".into(), 120))
        );
    }

    #[test]
    fn validate_rejects_self_affinity_and_duplicates() {
        let n = nation("USA", 100, &[("USA", 10)]);
        assert_eq!(
            validate_nation(&n),
            Err(ValidationError::SelfAffinity("USA".into()))
        );
        let snapshot = vec![nation("USA", 100, &[]), nation("USA", 200, &[])];
        assert_eq!(
            validate_snapshot(&snapshot),
            Err(ValidationError::DuplicateId("USA".into()))
        );
    }

    #[test]
    fn zero_gdp_is_valid_input() {
        let n = nation("RUIN", 0, &[]);
        assert!(validate_nation(&n).is_ok());
    }

    proptest! {
        #[test]
        fn in_range_affinities_validate(score in AFFINITY_MIN..=AFFINITY_MAX, gdp in 0i64..1_000_000) {
            let n = nation("USA", gdp, &[("PRC", score)]);
            prop_assert!(validate_nation(&n).is_ok());
        }

        #[test]
        fn out_of_range_affinities_reject(score in prop_oneof![-10_000i32..AFFINITY_MIN, (AFFINITY_MAX + 1)..10_000]) {
            let n = nation("USA", 100, &[("PRC", score)]);
            prop_assert!(validate_nation(&n).is_err());
        }
    }
}
