//! Round pagination over a competition's ordered round list.

use std::collections::HashSet;

use crate::models::fixture::Fixture;
use crate::models::lookup::Lookup;
use crate::models::round::{RoundList, RoundSelection};

/// Trims labels, drops empty ones and removes case-insensitive duplicates,
/// keeping the first occurrence and the source order.
pub fn clean_rounds<I, S>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    raw.into_iter()
        .filter_map(|label| {
            let label = label.as_ref().trim();
            if label.is_empty() || !seen.insert(label.to_lowercase()) {
                None
            } else {
                Some(label.to_string())
            }
        })
        .collect()
}

fn same_round(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

/// 0-based position of `label`, matched case-insensitively.
pub fn round_index(all_rounds: &[String], label: &str) -> Option<usize> {
    all_rounds.iter().position(|r| same_round(r, label))
}

/// 1-based page of `label`, or 0 when it is not in the list.
pub fn round_page(all_rounds: &[String], label: &str) -> usize {
    round_index(all_rounds, label).map_or(0, |i| i + 1)
}

/// Picks the round to display.
///
/// Without a `round_param` the current round is used. With one, it is read
/// as a 1-based page into `all_rounds`; anything that doesn't land on a
/// round (empty list, non-numeric, zero, past the end) is `NotFound`.
pub fn resolve(all_rounds: &[String], current_round: &str, round_param: Option<&str>) -> Lookup<RoundSelection> {
    if all_rounds.is_empty() {
        return Lookup::NotFound;
    }
    let total_pages = all_rounds.len();

    match round_param.map(str::trim).filter(|p| !p.is_empty()) {
        None => Lookup::Found(RoundSelection {
            round: current_round.to_string(),
            page: round_page(all_rounds, current_round),
            total_pages,
            is_first_round: same_round(current_round, &all_rounds[0]),
            is_last_round: same_round(current_round, &all_rounds[total_pages - 1]),
        }),
        Some(param) => {
            let Ok(page) = param.parse::<usize>() else {
                return Lookup::NotFound;
            };
            match page.checked_sub(1).and_then(|i| all_rounds.get(i)) {
                Some(round) => Lookup::Found(RoundSelection {
                    round: round.clone(),
                    page,
                    total_pages,
                    is_first_round: page == 1,
                    is_last_round: page == total_pages,
                }),
                None => Lookup::NotFound,
            }
        }
    }
}

/// `resolve` against a fetched round list. After the season ends the source
/// reports no current round, so the last round stands in for it.
pub fn pick_round(list: &RoundList, round_param: Option<&str>) -> Lookup<RoundSelection> {
    let current_round = list
        .current_round
        .as_deref()
        .or_else(|| list.rounds.last().map(String::as_str))
        .unwrap_or_default();
    resolve(&list.rounds, current_round, round_param)
}

/// Returns the fixtures ordered by kick-off, earliest first. Fixtures
/// kicking off together are ordered by id.
pub fn sort_fixtures(fixtures: &[Fixture]) -> Vec<Fixture> {
    let mut sorted = fixtures.to_vec();
    sorted.sort_by(|a, b| a.date.cmp(&b.date).then(a.id.cmp(&b.id)));
    sorted
}
