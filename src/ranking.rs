//! Lateness rankings of airlines and flights.

use serde::Serialize;
use tracing::{debug, info};

use crate::airline::AirlineBook;
use crate::rating::Rating;

/// One ranked airline or flight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankingEntry {
    /// Airline name or flight code.
    pub subject_id: String,
    pub percent_late: i64,
    pub average_delay_minutes: i64,
}

impl RankingEntry {
    pub fn new(subject_id: impl Into<String>, rating: Rating) -> Self {
        RankingEntry {
            subject_id: subject_id.into(),
            percent_late: rating.percent_late,
            average_delay_minutes: rating.average_delay_minutes,
        }
    }

    /// Composite lateness, lower is better.
    pub fn score(&self) -> i64 {
        self.percent_late * 1000 + self.average_delay_minutes
    }
}

/// Airlines and flights, each ordered from most to least punctual.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Rankings {
    pub airlines: Vec<RankingEntry>,
    pub flights: Vec<RankingEntry>,
}

/// Head and reversed tail of a ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Extremes<T> {
    pub best: Vec<T>,
    /// Worst entry first.
    pub worst: Vec<T>,
}

impl Rankings {
    /// Best and worst `n` airlines.
    pub fn airline_extremes(&self, n: usize) -> Extremes<RankingEntry> {
        let (best, worst) = take_extremes(&self.airlines, n);
        Extremes { best, worst }
    }

    /// Best and worst `n` flights.
    pub fn flight_extremes(&self, n: usize) -> Extremes<RankingEntry> {
        let (best, worst) = take_extremes(&self.flights, n);
        Extremes { best, worst }
    }
}

/// Rates every airline and every flight of `book` and sorts both lists by
/// ascending score.
///
/// Airlines are visited in the order they were first seen and flights in
/// the order their codes were first seen within their airline, so entries
/// with equal scores keep that order.
#[tracing::instrument(skip_all, fields(airlines = book.len()))]
pub fn build_rankings(book: &AirlineBook) -> Rankings {
    let mut rankings = Rankings::default();

    for airline in book {
        match airline.rate_airline() {
            Some(rating) => rankings
                .airlines
                .push(RankingEntry::new(airline.name(), rating)),
            None => debug!(airline = airline.name(), "Airline has no records, not ranked"),
        }

        for code in airline.flight_codes() {
            if let Some(rating) = airline.rate_flight(code) {
                rankings.flights.push(RankingEntry::new(code, rating));
            }
        }
    }

    sort_by_score(&mut rankings.airlines);
    sort_by_score(&mut rankings.flights);

    info!(
        airlines = rankings.airlines.len(),
        flights = rankings.flights.len(),
        "Rankings built"
    );
    rankings
}

/// Stable ascending sort on [`RankingEntry::score`].
pub fn sort_by_score(entries: &mut [RankingEntry]) {
    entries.sort_by_key(RankingEntry::score);
}

/// Splits off the first `n` elements and the last `n` elements, the latter
/// reversed so the final element comes first.
///
/// Both slices saturate at the length of `sorted`; `n == 0` yields two
/// empty lists.
pub fn take_extremes<T: Clone>(sorted: &[T], n: usize) -> (Vec<T>, Vec<T>) {
    if n < 1 {
        return (Vec::new(), Vec::new());
    }

    let n = n.min(sorted.len());
    let first = sorted[..n].to_vec();
    let last = sorted[sorted.len() - n..].iter().rev().cloned().collect();
    (first, last)
}
