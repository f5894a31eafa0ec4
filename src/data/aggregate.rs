use std::cmp::Ordering;
use std::collections::BTreeMap;

use super::model::Listing;

// ---------------------------------------------------------------------------
// Mean accumulator
// ---------------------------------------------------------------------------

/// Running sum and count for an exact arithmetic mean.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Mean {
    sum: f64,
    count: usize,
}

impl Mean {
    pub fn push(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// `None` for an empty accumulator.
    pub fn value(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}

// ---------------------------------------------------------------------------
// Two-level grouping
// ---------------------------------------------------------------------------

/// Group `records` by two nested keys and accumulate the mean of `value`.
///
/// Only keys observed in the input appear in the result, so every group has
/// at least one member. Records for which `value` is `None` do not
/// contribute and do not create a group.
pub fn group_mean<'a, T: 'a>(
    records: impl IntoIterator<Item = &'a T>,
    outer: impl Fn(&T) -> &str,
    inner: impl Fn(&T) -> &str,
    value: impl Fn(&T) -> Option<f64>,
) -> BTreeMap<(String, String), Mean> {
    let mut groups: BTreeMap<(String, String), Mean> = BTreeMap::new();
    for record in records {
        let Some(v) = value(record) else {
            continue;
        };
        groups
            .entry((outer(record).to_string(), inner(record).to_string()))
            .or_default()
            .push(v);
    }
    groups
}

// ---------------------------------------------------------------------------
// Review aggregate for the bar chart
// ---------------------------------------------------------------------------

/// Mean review score of one (borough, neighbourhood) group.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateBucket {
    pub borough: String,
    pub neighborhood: String,
    pub mean: f64,
    pub count: usize,
}

/// Presentation order: borough ascending, then mean descending. Equal means
/// fall back to the neighbourhood name so the order is total.
pub fn presentation_order(a: &AggregateBucket, b: &AggregateBucket) -> Ordering {
    a.borough
        .cmp(&b.borough)
        .then_with(|| b.mean.total_cmp(&a.mean))
        .then_with(|| a.neighborhood.cmp(&b.neighborhood))
}

/// Mean review score per (borough, neighbourhood), in presentation order.
pub fn review_buckets<'a>(listings: impl IntoIterator<Item = &'a Listing>) -> Vec<AggregateBucket> {
    let groups = group_mean(
        listings,
        |l: &Listing| l.borough.as_str(),
        |l: &Listing| l.neighborhood.as_str(),
        |l: &Listing| l.review_score,
    );

    let mut buckets: Vec<AggregateBucket> = groups
        .into_iter()
        .filter_map(|((borough, neighborhood), mean)| {
            Some(AggregateBucket {
                borough,
                neighborhood,
                mean: mean.value()?,
                count: mean.count(),
            })
        })
        .collect();
    buckets.sort_by(presentation_order);
    buckets
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rated(borough: &str, neighborhood: &str, score: f64) -> Listing {
        Listing {
            id: String::new(),
            name: String::new(),
            borough: borough.to_string(),
            neighborhood: neighborhood.to_string(),
            room_type: "Private room".to_string(),
            price: None,
            review_score: Some(score),
            construction_year: None,
            location: None,
        }
    }

    #[test]
    fn mean_of_two_scores() {
        let listings = vec![
            rated("Brooklyn", "Williamsburg", 2.0),
            rated("Brooklyn", "Williamsburg", 4.0),
        ];
        let buckets = review_buckets(&listings);
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].borough, "Brooklyn");
        assert_eq!(buckets[0].neighborhood, "Williamsburg");
        assert_eq!(buckets[0].mean, 3.0);
        assert_eq!(buckets[0].count, 2);
    }

    #[test]
    fn ordered_by_borough_then_descending_mean() {
        let listings = vec![
            rated("Queens", "Astoria", 3.0),
            rated("Brooklyn", "Bushwick", 2.0),
            rated("Brooklyn", "Williamsburg", 5.0),
            rated("Brooklyn", "Red Hook", 4.0),
            rated("Bronx", "Fordham", 1.0),
        ];
        let buckets = review_buckets(&listings);
        let order: Vec<(&str, &str)> = buckets
            .iter()
            .map(|b| (b.borough.as_str(), b.neighborhood.as_str()))
            .collect();
        assert_eq!(
            order,
            vec![
                ("Bronx", "Fordham"),
                ("Brooklyn", "Williamsburg"),
                ("Brooklyn", "Red Hook"),
                ("Brooklyn", "Bushwick"),
                ("Queens", "Astoria"),
            ]
        );
    }

    #[test]
    fn aggregation_ignores_input_order() {
        let mut listings = vec![
            rated("Brooklyn", "Williamsburg", 1.0),
            rated("Manhattan", "SoHo", 5.0),
            rated("Brooklyn", "Williamsburg", 4.0),
            rated("Manhattan", "SoHo", 2.0),
            rated("Brooklyn", "Bushwick", 3.0),
            rated("Manhattan", "Harlem", 4.0),
        ];
        let forward = review_buckets(&listings);
        listings.reverse();
        let backward = review_buckets(&listings);
        listings.rotate_left(2);
        let rotated = review_buckets(&listings);

        for other in [&backward, &rotated] {
            assert_eq!(forward.len(), other.len());
            for (a, b) in forward.iter().zip(other.iter()) {
                assert_eq!(a.borough, b.borough);
                assert_eq!(a.neighborhood, b.neighborhood);
                assert!((a.mean - b.mean).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn missing_values_create_no_group() {
        let mut unrated = rated("Bronx", "Fordham", 1.0);
        unrated.review_score = None;
        let listings = vec![unrated, rated("Bronx", "Mott Haven", 3.0)];
        let buckets = review_buckets(&listings);
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].neighborhood, "Mott Haven");
        assert!(review_buckets(&Vec::<Listing>::new()).is_empty());
    }

    #[test]
    fn empty_mean_has_no_value() {
        assert_eq!(Mean::default().value(), None);
    }
}
