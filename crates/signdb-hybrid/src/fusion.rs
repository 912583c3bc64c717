//! Reciprocal-rank fusion with per-unit de-duplication.
//!
//! Each channel's 0-based rank becomes `weight / (rank + 1)`. Variant hits are
//! collapsed onto their owning unit: the unit keeps its best semantic and best
//! lexical score, and remembers one representative variant.

use std::collections::HashMap;

use signdb_core::types::{SearchWeights, UnitId};

/// One ranked hit from a channel, already resolved to its owning unit.
#[derive(Debug, Clone, Copy)]
pub struct RankedVariant<'a> {
    pub unit_id: UnitId,
    pub variant_id: &'a str,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FusedUnit {
    pub unit_id: UnitId,
    pub semantic: f32,
    pub lexical: f32,
    pub score: f32,
    /// Variant id that best explains the unit's score.
    pub representative: String,
}

pub fn reciprocal_rank(weight: f32, rank: usize) -> f32 {
    weight / (rank as f32 + 1.0)
}

struct Tally<'a> {
    semantic: f32,
    lexical: f32,
    representative: &'a str,
}

/// Fuse both channels and return every unit, best first.
///
/// Ordering is by fused score descending, then unit id ascending.
/// The representative variant starts as the unit's best semantic variant; a
/// lexical hit that raises the unit's lexical score takes over only when its
/// own semantic + lexical score beats the current representative's.
pub fn fuse<'a>(semantic: &[RankedVariant<'a>], lexical: &[RankedVariant<'a>], weights: SearchWeights) -> Vec<FusedUnit> {
    let mut tallies: HashMap<UnitId, Tally<'a>> = HashMap::new();
    let mut variant_semantic: HashMap<&'a str, f32> = HashMap::new();
    let mut variant_lexical: HashMap<&'a str, f32> = HashMap::new();

    for (rank, hit) in semantic.iter().enumerate() {
        let score = reciprocal_rank(weights.semantic, rank);
        variant_semantic.entry(hit.variant_id).or_insert(score);
        match tallies.get_mut(&hit.unit_id) {
            None => {
                tallies.insert(hit.unit_id, Tally { semantic: score, lexical: 0.0, representative: hit.variant_id });
            }
            Some(t) if score > t.semantic => {
                t.semantic = score;
                t.representative = hit.variant_id;
            }
            Some(_) => {}
        }
    }

    for (rank, hit) in lexical.iter().enumerate() {
        let score = reciprocal_rank(weights.lexical, rank);
        variant_lexical.entry(hit.variant_id).or_insert(score);
        match tallies.get_mut(&hit.unit_id) {
            None => {
                tallies.insert(hit.unit_id, Tally { semantic: 0.0, lexical: score, representative: hit.variant_id });
            }
            Some(t) if score > t.lexical => {
                t.lexical = score;
                let own = |id: &str| {
                    variant_semantic.get(id).copied().unwrap_or(0.0) + variant_lexical.get(id).copied().unwrap_or(0.0)
                };
                if own(hit.variant_id) > own(t.representative) {
                    t.representative = hit.variant_id;
                }
            }
            Some(_) => {}
        }
    }

    let mut fused: Vec<FusedUnit> = tallies
        .into_iter()
        .map(|(unit_id, t)| FusedUnit {
            unit_id,
            semantic: t.semantic,
            lexical: t.lexical,
            score: t.semantic + t.lexical,
            representative: t.representative.to_string(),
        })
        .collect();
    fused.sort_by(|a, b| b.score.total_cmp(&a.score).then(a.unit_id.cmp(&b.unit_id)));
    fused
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(unit_id: UnitId, variant_id: &str) -> RankedVariant<'_> {
        RankedVariant { unit_id, variant_id }
    }

    #[test]
    fn reciprocal_rank_decays() {
        assert!((reciprocal_rank(0.7, 0) - 0.7).abs() < 1e-6);
        assert!((reciprocal_rank(0.7, 1) - 0.35).abs() < 1e-6);
        assert!((reciprocal_rank(0.3, 2) - 0.1).abs() < 1e-6);
    }

    #[test]
    fn collapses_variants_to_best_per_channel() {
        let semantic = [hit(1, "1:0"), hit(1, "1:1"), hit(2, "2:0")];
        let lexical = [hit(2, "2:0"), hit(1, "1:1")];
        let fused = fuse(&semantic, &lexical, SearchWeights::default());

        assert_eq!(fused.len(), 2);
        // unit 1: semantic 0.3/1, lexical 0.7/2
        // unit 2: semantic 0.3/3, lexical 0.7/1
        assert_eq!(fused[0].unit_id, 2);
        assert!((fused[0].score - (0.1 + 0.7)).abs() < 1e-6);
        assert_eq!(fused[1].unit_id, 1);
        assert!((fused[1].semantic - 0.3).abs() < 1e-6);
        assert!((fused[1].lexical - 0.35).abs() < 1e-6);
        assert!((fused[1].score - 0.65).abs() < 1e-6);
    }

    #[test]
    fn representative_switches_only_when_variant_scores_higher() {
        // 1:0 is the best semantic variant (0.3), 1:1 semantic 0.15 + lexical 0.7 = 0.85.
        let semantic = [hit(1, "1:0"), hit(1, "1:1")];
        let lexical = [hit(1, "1:1")];
        let fused = fuse(&semantic, &lexical, SearchWeights::default());
        assert_eq!(fused[0].representative, "1:1");

        // With a tiny lexical weight, 1:1 (0.15 + 0.01) does not beat 1:0 (0.3).
        let fused = fuse(&semantic, &lexical, SearchWeights::new(0.3, 0.01));
        assert_eq!(fused[0].representative, "1:0");
        assert!((fused[0].score - 0.31).abs() < 1e-6);
    }

    #[test]
    fn lexical_only_unit_uses_its_lexical_variant() {
        let fused = fuse(&[], &[hit(4, "4:2")], SearchWeights::default());
        assert_eq!(fused.len(), 1);
        assert_eq!(fused[0].representative, "4:2");
        assert!((fused[0].semantic).abs() < 1e-6);
    }

    #[test]
    fn equal_scores_order_by_unit_id() {
        let semantic = [hit(9, "9:0"), hit(3, "3:0")];
        let lexical = [hit(3, "3:0"), hit(9, "9:0")];
        let fused = fuse(&semantic, &lexical, SearchWeights::new(1.0, 1.0));
        assert!((fused[0].score - fused[1].score).abs() < 1e-6);
        assert_eq!(fused[0].unit_id, 3);
        assert_eq!(fused[1].unit_id, 9);
    }

    #[test]
    fn zero_weights_still_list_units() {
        let fused = fuse(&[hit(1, "1:0")], &[hit(2, "2:0")], SearchWeights::new(0.0, 0.0));
        assert_eq!(fused.len(), 2);
        assert!(fused.iter().all(|f| f.score == 0.0));
        assert_eq!(fused[0].unit_id, 1);
    }
}
