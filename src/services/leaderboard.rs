//! Point totals and ranking for a pool's players.

use std::collections::HashMap;

use crate::models::bets::{Bet, Prediction};
use crate::models::fixture::{Fixture, Outcome};
use crate::models::leaderboard::{LeadData, RankedLead};
use crate::models::pool::Membership;

/// Scores a single bet against a finished fixture. Implementations must
/// return a value for every input.
pub trait ScoringRule {
    fn points(&self, bet: &Bet, outcome: &Outcome) -> u32;
}

/// Fixed-tier scoring: an exact score beats a correct result, which beats a
/// miss.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoringTable {
    pub exact_score: u32,
    pub correct_result: u32,
    pub miss: u32,
}

impl Default for ScoringTable {
    fn default() -> Self {
        ScoringTable {
            exact_score: 10,
            correct_result: 5,
            miss: 0,
        }
    }
}

impl ScoringRule for ScoringTable {
    fn points(&self, bet: &Bet, outcome: &Outcome) -> u32 {
        match bet.prediction() {
            Some(Prediction::Score { home, away }) if home == outcome.home && away == outcome.away => {
                self.exact_score
            }
            Some(prediction) if prediction.side() == outcome.side() => self.correct_result,
            _ => self.miss,
        }
    }
}

/// Sums each player's points over `bets`.
///
/// Returns one entry per player in input order. Bets on fixtures that are
/// missing from `fixtures` or not finished yet add nothing.
pub fn calc_lead<R>(players: &[Membership], fixtures: &[Fixture], bets: &[Bet], rule: &R) -> Vec<LeadData>
where
    R: ScoringRule + ?Sized,
{
    let outcomes: HashMap<i64, Outcome> = fixtures
        .iter()
        .filter_map(|f| f.outcome().map(|o| (f.id, o)))
        .collect();

    let mut bets_by_player: HashMap<&str, Vec<&Bet>> = HashMap::new();
    for bet in bets {
        bets_by_player.entry(bet.user_bolao_id.as_str()).or_default().push(bet);
    }

    players
        .iter()
        .map(|player| {
            let id = player.id_hex();
            let total = bets_by_player
                .get(id.as_str())
                .into_iter()
                .flatten()
                .filter_map(|bet| outcomes.get(&bet.fixture_id).map(|o| rule.points(bet, o)))
                .fold(0u32, u32::saturating_add);

            LeadData {
                id,
                name: player.name.clone(),
                total,
            }
        })
        .collect()
}

/// Orders entries by total, highest first, keeping input order between
/// equal totals. Equal totals share a position ("1, 2, 2, 4").
pub fn rank(lead: &[LeadData]) -> Vec<RankedLead> {
    let mut ordered: Vec<&LeadData> = lead.iter().collect();
    ordered.sort_by(|a, b| b.total.cmp(&a.total));

    let mut ranked: Vec<RankedLead> = Vec::with_capacity(ordered.len());
    for (i, entry) in ordered.into_iter().enumerate() {
        let position = match ranked.last() {
            Some(prev) if prev.lead.total == entry.total => prev.position,
            _ => i + 1,
        };
        ranked.push(RankedLead {
            position,
            lead: entry.clone(),
        });
    }
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::bets::bet;
    use crate::models::fixture::fixtures::{finished, fixture};
    use mongodb::bson::oid::ObjectId;

    fn player(name: &str) -> Membership {
        Membership::new("pool-1".into(), format!("user-{}", name), name.to_string())
    }

    fn lead(id: &str, total: u32) -> LeadData {
        LeadData { id: id.into(), name: id.into(), total }
    }

    #[test]
    fn scoring_tiers() {
        let table = ScoringTable::default();
        let outcome = Outcome { home: 2, away: 1 };

        assert_eq!(table.points(&bet("p", 1, "score", "2-1"), &outcome), 10);
        assert_eq!(table.points(&bet("p", 1, "score", "1-0"), &outcome), 5);
        assert_eq!(table.points(&bet("p", 1, "score", "1-1"), &outcome), 0);
        assert_eq!(table.points(&bet("p", 1, "result", "home"), &outcome), 5);
        assert_eq!(table.points(&bet("p", 1, "result", "draw"), &outcome), 0);
        assert_eq!(table.points(&bet("p", 1, "score", "garbage"), &outcome), 0);
        assert_eq!(table.points(&bet("p", 1, "corners", "9"), &outcome), 0);
    }

    #[test]
    fn totals_per_player_in_input_order() {
        let p1 = player("ana");
        let p2 = player("bruno");
        let fixtures = vec![finished(1, 2, 1), finished(2, 0, 0)];
        let bets = vec![
            bet(&p1.id_hex(), 1, "score", "2-1"),
            bet(&p2.id_hex(), 1, "score", "2-1"),
            bet(&p2.id_hex(), 2, "score", "0-0"),
        ];

        let lead = calc_lead(&[p1.clone(), p2.clone()], &fixtures, &bets, &ScoringTable::default());

        assert_eq!(lead.len(), 2);
        assert_eq!(lead[0], LeadData { id: p1.id_hex(), name: "ana".into(), total: 10 });
        assert_eq!(lead[1], LeadData { id: p2.id_hex(), name: "bruno".into(), total: 20 });

        let ranked = rank(&lead);
        assert_eq!(ranked[0].lead.name, "bruno");
        assert_eq!(ranked[1].lead.name, "ana");
        // ranking must not reorder its input
        assert_eq!(lead[0].name, "ana");
    }

    #[test]
    fn orphaned_and_unfinished_bets_add_nothing() {
        let p = player("carla");
        let fixtures = vec![finished(1, 1, 0), fixture(2, "1H", (Some(1), Some(0)))];
        let bets = vec![
            bet(&p.id_hex(), 1, "result", "home"),
            bet(&p.id_hex(), 2, "score", "1-0"),
            bet(&p.id_hex(), 999, "score", "1-0"),
        ];

        let lead = calc_lead(&[p], &fixtures, &bets, &ScoringTable::default());
        assert_eq!(lead[0].total, 5);
    }

    #[test]
    fn player_without_bets_scores_zero() {
        let p = player("davi");
        let other = ObjectId::new().to_hex();
        let bets = vec![bet(&other, 1, "score", "1-0")];

        let lead = calc_lead(&[p], &[finished(1, 1, 0)], &bets, &ScoringTable::default());
        assert_eq!(lead[0].total, 0);
    }

    #[test]
    fn repeated_calls_are_identical() {
        let players = vec![player("a"), player("b"), player("c")];
        let fixtures = vec![finished(1, 3, 1), finished(2, 0, 2)];
        let bets = vec![
            bet(&players[0].id_hex(), 1, "score", "3-1"),
            bet(&players[1].id_hex(), 2, "result", "away"),
            bet(&players[2].id_hex(), 2, "result", "away"),
        ];
        let rule = ScoringTable::default();

        let first = calc_lead(&players, &fixtures, &bets, &rule);
        let second = calc_lead(&players, &fixtures, &bets, &rule);
        assert_eq!(first, second);
        assert_eq!(rank(&first), rank(&second));
    }

    #[test]
    fn custom_rule_is_used() {
        struct Flat;
        impl ScoringRule for Flat {
            fn points(&self, _bet: &Bet, _outcome: &Outcome) -> u32 {
                1
            }
        }

        let p = player("eva");
        let bets = vec![bet(&p.id_hex(), 1, "score", "9-9"), bet(&p.id_hex(), 2, "x", "y")];
        let lead = calc_lead(&[p], &[finished(1, 0, 0), finished(2, 0, 0)], &bets, &Flat);
        assert_eq!(lead[0].total, 2);
    }

    #[test]
    fn totals_saturate() {
        let huge = ScoringTable { exact_score: u32::MAX, correct_result: 0, miss: 0 };
        let p = player("fabio");
        let bets = vec![bet(&p.id_hex(), 1, "score", "1-0"), bet(&p.id_hex(), 2, "score", "1-0")];
        let lead = calc_lead(&[p], &[finished(1, 1, 0), finished(2, 1, 0)], &bets, &huge);
        assert_eq!(lead[0].total, u32::MAX);
    }

    #[test]
    fn ties_keep_input_order_and_share_position() {
        let ranked = rank(&[lead("a", 5), lead("b", 20), lead("c", 5), lead("d", 1)]);
        let order: Vec<(&str, usize)> = ranked.iter().map(|r| (r.lead.id.as_str(), r.position)).collect();
        assert_eq!(order, vec![("b", 1), ("a", 2), ("c", 2), ("d", 4)]);
    }
}
