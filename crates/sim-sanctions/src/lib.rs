#![deny(warnings)]

//! Economic-impact propagation engine for sanction events.
//!
//! Given a sanctioning nation, a target, and a sanction category, this crate:
//! - derives a trade network from the nation snapshot (gravity-style estimate)
//! - computes the bilateral direct damage
//! - propagates one-hop cascade effects to trading partners
//! - searches for substitute partners able to absorb displaced volume
//! - estimates a recovery horizon
//!
//! Every stage is a pure function of its inputs; the only randomness is the
//! substitute lead-time draw, taken from an injected RNG so runs are
//! reproducible under a fixed seed.

use chrono::{DateTime, Utc};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use sim_core::{
    CascadeEffect, DirectImpact, Nation, NationId, SanctionCategory, SimulationRecord,
    SubstitutionOption, TradeEdge, TradeNetwork,
};
use std::collections::BTreeSet;
use std::ops::RangeInclusive;
use thiserror::Error;
use tracing::{debug, info};

/// Affinity score a nation must exceed toward a partner before trade flows.
pub const AFFINITY_TRADE_THRESHOLD: i32 = 20;

/// Base trade rate applied to the smaller economy of a pair (0.05).
pub const TRADE_BASE_RATE: Decimal = Decimal::from_parts(5, 0, 0, false, 2);

/// Share of the dependency-weighted volume the sanctioner loses itself (0.5).
/// Category severity never applies to the sanctioner side.
pub const SANCTIONER_COST_FACTOR: Decimal = Decimal::from_parts(5, 0, 0, false, 1);

/// One hop of separation reduces the transmitted shock to 30%.
pub const CASCADE_ATTENUATION: Decimal = Decimal::from_parts(3, 0, 0, false, 1);

/// Cascade effects below this many percentage points are dropped.
pub const MATERIALITY_FLOOR_PCT: Decimal = Decimal::ONE;

/// No single substitute replaces more than 70% of lost capacity.
pub const SUBSTITUTION_CEILING: Decimal = Decimal::from_parts(7, 0, 0, false, 1);

/// Maximum number of substitution options returned.
pub const MAX_SUBSTITUTES: usize = 5;

/// Inclusive range of diplomatic/logistic setup turns for a substitute.
pub const LEAD_TIME_TURNS: RangeInclusive<u32> = 2..=8;

/// Percentage points of target loss absorbed per year of recovery (10).
pub const RECOVERY_LOSS_PER_YEAR_PCT: Decimal = Decimal::from_parts(10, 0, 0, false, 0);

/// Self-declared model confidence attached to every record (0.75).
pub const MODEL_CONFIDENCE: Decimal = Decimal::from_parts(75, 0, 0, false, 2);

/// Outputs at or below this level are degenerate; ratios against them use
/// the sentinel dependency of 1 instead of dividing.
const GDP_FLOOR_USD: Decimal = Decimal::from_parts(1, 0, 0, false, 6);

/// Errors produced by the engine. Any error aborts the call before stage
/// work begins; there is no partial record.
#[derive(Debug, Error, PartialEq)]
pub enum SimError {
    /// A nation cannot sanction itself.
    #[error("sanctioner and target must be distinct nations")]
    SelfSanction,
    /// Both parties must be present in the supplied snapshot.
    #[error("nation not present in snapshot: {0}")]
    UnknownNation(String),
}

/// Normalized affinity factor in [0, 1] for scores on the [-100, 100] scale.
fn affinity_factor(score: i32) -> Decimal {
    Decimal::from(score + 100) / Decimal::from(200)
}

/// Fraction of `output` carried by `volume`, with the degenerate-output
/// sentinel: a near-zero output reads as fully dependent (1) rather than
/// raising a division fault.
pub fn dependency_ratio(volume: Decimal, output: Decimal) -> Decimal {
    if output <= GDP_FLOOR_USD {
        Decimal::ONE
    } else {
        volume / output
    }
}

/// Gravity-style estimate of the annual trade volume `a` sends to `b`.
///
/// `min(a.gdp, b.gdp) * 0.05 * ((affinity + 100) / 200)`: a base rate
/// proportional to the smaller economy, scaled by a's affinity toward b.
/// Not gated by the affinity threshold; the network builder applies the
/// gate, this estimate needs only the two nations.
///
/// Example:
/// a.gdp = 100, b.gdp = 50, affinity a->b = 80
/// volume = 50 * 0.05 * 0.9 = 2.25
pub fn estimated_volume(a: &Nation, b: &Nation) -> Decimal {
    let base = a.gdp_usd.min(b.gdp_usd) * TRADE_BASE_RATE;
    base * affinity_factor(a.affinity_toward(&b.id))
}

/// Derive the trade network for one snapshot.
///
/// For every ordered pair (A, B), A != B, in input order, an edge exists iff
/// A's affinity toward B exceeds [`AFFINITY_TRADE_THRESHOLD`]: trade only
/// flows between states with non-hostile relations. O(n²) pair scan;
/// identical snapshots always yield identical networks. Empty and singleton
/// inputs yield an empty network.
pub fn build_trade_network(nations: &[Nation]) -> TradeNetwork {
    let mut edges = Vec::new();
    for a in nations {
        for b in nations {
            if a.id == b.id {
                continue;
            }
            if a.affinity_toward(&b.id) <= AFFINITY_TRADE_THRESHOLD {
                continue;
            }
            let volume = estimated_volume(a, b);
            edges.push(TradeEdge {
                source: a.id.clone(),
                dest: b.id.clone(),
                volume_usd: volume,
                dependency: dependency_ratio(volume, a.gdp_usd),
            });
        }
    }
    TradeNetwork { edges }
}

/// Bilateral percentage GDP damage of one sanction.
///
/// Target side: dependency on the sanctioner times the category severity.
/// Sanctioner side: dependency on the target times the flat
/// [`SANCTIONER_COST_FACTOR`]. Neither side is clamped; degenerate outputs
/// fall back to the sentinel dependency.
pub fn direct_impact(
    sanctioner: &Nation,
    target: &Nation,
    category: SanctionCategory,
) -> DirectImpact {
    let hundred = Decimal::ONE_HUNDRED;
    let target_dep = dependency_ratio(estimated_volume(target, sanctioner), target.gdp_usd);
    let sanctioner_dep =
        dependency_ratio(estimated_volume(sanctioner, target), sanctioner.gdp_usd);
    DirectImpact {
        target_loss_pct: target_dep * category.severity() * hundred,
        sanctioner_cost_pct: sanctioner_dep * SANCTIONER_COST_FACTOR * hundred,
    }
}

/// One-hop cascade: third parties hit through their trade edge with the
/// target.
///
/// Each edge incident to the target transmits
/// `dependency * target_loss * 0.3` to the counterpart. Effects below
/// [`MATERIALITY_FLOOR_PCT`] are dropped; survivors are stable-sorted
/// descending by impact so a top-N prefix is deterministic across runs.
/// Propagation stops at one trading relationship of separation — this is an
/// illustrative shock model, not an input-output fixed point.
pub fn propagate_cascade(
    target: &NationId,
    network: &TradeNetwork,
    direct: &DirectImpact,
) -> Vec<CascadeEffect> {
    let mut effects: Vec<CascadeEffect> = Vec::new();
    for edge in network.edges_touching(target) {
        let neighbour = if edge.source == *target {
            &edge.dest
        } else {
            &edge.source
        };
        let impact = edge.dependency * direct.target_loss_pct * CASCADE_ATTENUATION;
        if impact < MATERIALITY_FLOOR_PCT {
            continue;
        }
        effects.push(CascadeEffect {
            nation: neighbour.clone(),
            gdp_impact_pct: impact,
            cause: format!("trade exposure to {}", target.0),
        });
    }
    // sort_by is stable: ties keep network order
    effects.sort_by(|a, b| b.gdp_impact_pct.cmp(&a.gdp_impact_pct));
    effects
}

/// Substitute partners for the target's displaced trade volume.
///
/// Candidates are destinations of edges that touch the sanctioner at
/// neither endpoint (a substitute must sit outside the sanctioning
/// relationship), excluding the target itself, deduplicated, and taken in
/// network iteration order up to [`MAX_SUBSTITUTES`]. The first-N-found
/// selection is kept as-is rather than upgraded to a top-N-by-capacity
/// ranking. Lead times are drawn from the injected RNG, the pipeline's one
/// stochastic element.
pub fn find_substitutions<R: Rng + ?Sized>(
    target: &Nation,
    sanctioner: &NationId,
    network: &TradeNetwork,
    nations: &[Nation],
    rng: &mut R,
) -> Vec<SubstitutionOption> {
    let mut seen: BTreeSet<NationId> = BTreeSet::new();
    let mut options = Vec::new();
    for edge in &network.edges {
        if options.len() == MAX_SUBSTITUTES {
            break;
        }
        if edge.source == *sanctioner || edge.dest == *sanctioner {
            continue;
        }
        let candidate = &edge.dest;
        if *candidate == target.id || !seen.insert(candidate.clone()) {
            continue;
        }
        let Some(nation) = nations.iter().find(|n| n.id == *candidate) else {
            continue;
        };
        let size_ratio =
            dependency_ratio(nation.gdp_usd, target.gdp_usd).min(Decimal::ONE);
        options.push(SubstitutionOption {
            nation: candidate.clone(),
            replacement_capacity: size_ratio * SUBSTITUTION_CEILING,
            lead_time_turns: rng.gen_range(LEAD_TIME_TURNS),
        });
    }
    options
}

/// Integer recovery horizon in years, never below 1.
///
/// `max(floor(floor(loss / 10) * (1 - avg_capacity)), 1)`; an empty
/// substitution list counts as zero average capacity.
pub fn estimate_recovery(
    direct: &DirectImpact,
    substitutions: &[SubstitutionOption],
) -> u32 {
    let base = (direct.target_loss_pct / RECOVERY_LOSS_PER_YEAR_PCT).floor();
    let avg_capacity = if substitutions.is_empty() {
        Decimal::ZERO
    } else {
        substitutions
            .iter()
            .map(|s| s.replacement_capacity)
            .sum::<Decimal>()
            / Decimal::from(substitutions.len() as u64)
    };
    let years = (base * (Decimal::ONE - avg_capacity)).floor();
    years.to_u32().unwrap_or(u32::MAX).max(1)
}

/// Run one full sanction simulation over a frozen nation snapshot.
///
/// The snapshot is borrowed only for the duration of the call; the returned
/// record is self-contained. `issued_at` is caller-supplied so that a fixed
/// (snapshot, category, seed, timestamp) tuple reproduces the record
/// bit-for-bit.
///
/// Errors: [`SimError::SelfSanction`] when sanctioner and target coincide,
/// [`SimError::UnknownNation`] when either is absent from the snapshot.
pub fn simulate<R: Rng + ?Sized>(
    sanctioner: &NationId,
    target: &NationId,
    category: SanctionCategory,
    nations: &[Nation],
    issued_at: DateTime<Utc>,
    rng: &mut R,
) -> Result<SimulationRecord, SimError> {
    if sanctioner == target {
        return Err(SimError::SelfSanction);
    }
    let sanctioner_nation = nations
        .iter()
        .find(|n| n.id == *sanctioner)
        .ok_or_else(|| SimError::UnknownNation(sanctioner.0.clone()))?;
    let target_nation = nations
        .iter()
        .find(|n| n.id == *target)
        .ok_or_else(|| SimError::UnknownNation(target.0.clone()))?;

    let network = build_trade_network(nations);
    debug!(edges = network.edges.len(), "trade network derived");

    let direct = direct_impact(sanctioner_nation, target_nation, category);
    let cascade = propagate_cascade(target, &network, &direct);
    let substitutions = find_substitutions(target_nation, sanctioner, &network, nations, rng);
    debug!(
        cascade_effects = cascade.len(),
        substitutes = substitutions.len(),
        "propagation complete"
    );
    let recovery_years = estimate_recovery(&direct, &substitutions);

    info!(
        sanctioner = %sanctioner.0,
        target = %target.0,
        ?category,
        target_loss_pct = %direct.target_loss_pct,
        recovery_years,
        "sanction simulated"
    );

    Ok(SimulationRecord {
        sanctioner: sanctioner.clone(),
        target: target.clone(),
        category,
        direct,
        cascade,
        substitutions,
        recovery_years,
        confidence: MODEL_CONFIDENCE,
        issued_at,
    })
}

/// [`simulate`] with a ChaCha8 RNG seeded from `seed`, for reproducible runs.
pub fn simulate_seeded(
    sanctioner: &NationId,
    target: &NationId,
    category: SanctionCategory,
    nations: &[Nation],
    issued_at: DateTime<Utc>,
    seed: u64,
) -> Result<SimulationRecord, SimError> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    simulate(sanctioner, target, category, nations, issued_at, &mut rng)
}
