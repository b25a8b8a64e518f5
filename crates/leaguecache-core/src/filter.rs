//! League filtering.
//!
//! All functions are pure and keep the input order. They take any iterator
//! of borrowed leagues, so filters compose without cloning:
//! `filter_by_sport(filter_by_search(&leagues, term), sport)`.

use std::collections::BTreeSet;

use crate::models::League;

/// Leagues whose name, alternate name or sport contains `term`,
/// ignoring case. A blank term keeps everything.
pub fn filter_by_search<'a, I>(leagues: I, term: &str) -> Vec<&'a League>
where
    I: IntoIterator<Item = &'a League>,
{
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return leagues.into_iter().collect();
    }

    leagues
        .into_iter()
        .filter(|league| {
            [&league.name, &league.alternate_name, &league.sport]
                .iter()
                .any(|field| !field.is_empty() && field.to_lowercase().contains(&term))
        })
        .collect()
}

/// Leagues whose sport is exactly `sport`. An empty sport keeps everything.
pub fn filter_by_sport<'a, I>(leagues: I, sport: &str) -> Vec<&'a League>
where
    I: IntoIterator<Item = &'a League>,
{
    if sport.is_empty() {
        return leagues.into_iter().collect();
    }

    leagues
        .into_iter()
        .filter(|league| league.sport == sport)
        .collect()
}

/// Distinct non-empty sports, sorted by code point.
pub fn unique_sports<'a, I>(leagues: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a League>,
{
    leagues
        .into_iter()
        .map(|league| league.sport.as_str())
        .filter(|sport| !sport.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Search first, then narrow by sport.
pub fn apply_filters<'a, I>(leagues: I, term: &str, sport: &str) -> Vec<&'a League>
where
    I: IntoIterator<Item = &'a League>,
{
    filter_by_sport(filter_by_search(leagues, term), sport)
}
