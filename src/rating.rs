//! Punctuality rating over a pool of delays.

use serde::Serialize;

/// A take-off is late when it leaves strictly more than this many minutes
/// after schedule.
pub const LATE_THRESHOLD_MINUTES: i32 = 30;

/// Share of late take-offs and mean delay, both truncated toward zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rating {
    pub percent_late: i64,
    pub average_delay_minutes: i64,
}

/// Rates every delay yielded by `delays` as one flat pool.
///
/// Returns `None` for an empty pool.
pub fn rate<I>(delays: I) -> Option<Rating>
where
    I: IntoIterator<Item = i32>,
{
    let mut count = 0i64;
    let mut nb_late = 0i64;
    let mut total_delay = 0i64;

    for delay in delays {
        count += 1;
        total_delay += i64::from(delay);
        if delay > LATE_THRESHOLD_MINUTES {
            nb_late += 1;
        }
    }

    if count == 0 {
        return None;
    }

    Some(Rating {
        percent_late: nb_late * 100 / count,
        average_delay_minutes: total_delay / count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_pool_is_absent() {
        assert_eq!(rate(Vec::<i32>::new()), None);
    }

    #[test]
    fn test_threshold_is_strict() {
        let rating = rate([30, 30, 31, 0]).unwrap();
        assert_eq!(rating.percent_late, 25);
    }

    #[test]
    fn test_on_time_pool_has_no_late() {
        let rating = rate([-10, 0, 5, 30]).unwrap();
        assert_eq!(rating.percent_late, 0);
        assert_eq!(rating.average_delay_minutes, 6);
    }

    #[test]
    fn test_truncates_toward_zero() {
        assert_eq!(rate([63, 30]).unwrap(), Rating {
            percent_late: 50,
            average_delay_minutes: 46,
        });
        // one in three late is 33%, not 34%
        assert_eq!(rate([40, 0, 0]).unwrap().percent_late, 33);
        // mean of -25 and 0 is -12, not -13
        assert_eq!(rate([-25, 0]).unwrap().average_delay_minutes, -12);
    }

    #[test]
    fn test_percent_is_exact() {
        let delays = (0..100).map(|i| if i < 29 { 45 } else { 0 });
        assert_eq!(rate(delays).unwrap().percent_late, 29);
    }
}
