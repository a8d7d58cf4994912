//! Aggregate rating recomputation.
//!
//! The recipe's displayed rating is the mean over its full review set,
//! re-read after every review mutation. The recompute intentionally does not
//! maintain an incremental running sum; see DESIGN.md for the rationale.

use super::review::Rating;

/// Snapshot of a recipe's aggregate rating state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatingSummary {
    /// Mean of all review ratings, `0.0` when the recipe has no reviews.
    pub rating: f64,
    /// Number of reviews contributing to the mean.
    pub review_count: u64,
}

impl RatingSummary {
    /// Compute the mean rating and count over a review set.
    ///
    /// # Examples
    /// ```
    /// use tastebook::domain::{Rating, RatingSummary};
    ///
    /// let ratings = [Rating::new(4).unwrap(), Rating::new(2).unwrap()];
    /// let summary = RatingSummary::from_ratings(ratings);
    /// assert_eq!(summary.rating, 3.0);
    /// assert_eq!(summary.review_count, 2);
    /// ```
    pub fn from_ratings<I>(ratings: I) -> Self
    where
        I: IntoIterator<Item = Rating>,
    {
        let mut sum: u64 = 0;
        let mut count: u64 = 0;
        for rating in ratings {
            sum += u64::from(rating.value());
            count += 1;
        }
        if count == 0 {
            return Self {
                rating: 0.0,
                review_count: 0,
            };
        }
        Self {
            rating: sum as f64 / count as f64,
            review_count: count,
        }
    }

    /// Summary for a recipe with no reviews.
    pub fn empty() -> Self {
        Self {
            rating: 0.0,
            review_count: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn ratings(values: &[u8]) -> Vec<Rating> {
        values
            .iter()
            .map(|value| Rating::new(*value).expect("test ratings are in range"))
            .collect()
    }

    #[rstest]
    #[case(&[], 0.0, 0)]
    #[case(&[4], 4.0, 1)]
    #[case(&[4, 2], 3.0, 2)]
    #[case(&[5, 5, 5], 5.0, 3)]
    #[case(&[1, 2, 3, 4], 2.5, 4)]
    fn computes_mean_and_count(#[case] values: &[u8], #[case] mean: f64, #[case] count: u64) {
        let summary = RatingSummary::from_ratings(ratings(values));
        assert_eq!(summary.rating, mean);
        assert_eq!(summary.review_count, count);
    }

    #[test]
    fn empty_matches_from_no_ratings() {
        assert_eq!(RatingSummary::empty(), RatingSummary::from_ratings([]));
    }
}
