use std::collections::BTreeSet;
use std::ops::RangeInclusive;

use chrono::NaiveDate;

use super::model::{Dataset, SaleRecord};

// ---------------------------------------------------------------------------
// Selection – a multi-choice set-membership predicate
// ---------------------------------------------------------------------------

/// Which values of a text column are selected.
///
/// `Any` is the untouched control (no constraint). `Only` with an empty set
/// means the user deselected everything, which matches no row.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    Any,
    Only(BTreeSet<String>),
}

impl Selection {
    /// Nothing selected.
    pub fn none() -> Self {
        Selection::Only(BTreeSet::new())
    }

    pub fn only<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Selection::Only(values.into_iter().map(Into::into).collect())
    }

    pub fn matches(&self, value: &str) -> bool {
        match self {
            Selection::Any => true,
            Selection::Only(set) => set.contains(value),
        }
    }

    /// Flip one value. Toggling out of `Any` selects every other option.
    pub fn toggle(&mut self, value: &str, options: &[String]) {
        match self {
            Selection::Any => {
                *self = Selection::Only(
                    options
                        .iter()
                        .filter(|o| o.as_str() != value)
                        .cloned()
                        .collect(),
                );
            }
            Selection::Only(set) => {
                if !set.remove(value) {
                    set.insert(value.to_string());
                }
            }
        }
    }

    /// `(selected, total)` for headers such as "Seller (3/8)".
    pub fn count(&self, options: &[String]) -> (usize, usize) {
        let selected = options.iter().filter(|o| self.matches(o)).count();
        (selected, options.len())
    }
}

// ---------------------------------------------------------------------------
// FilterCriteria – all predicates, AND-ed together
// ---------------------------------------------------------------------------

/// Active predicates. The default value restricts nothing.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FilterCriteria {
    pub products: Selection,
    pub categories: Selection,
    pub sellers: Selection,
    pub locations: Selection,
    /// Inclusive on both bounds.
    pub price: Option<RangeInclusive<f64>>,
    /// Inclusive on both bounds.
    pub freight: Option<RangeInclusive<f64>>,
    /// Inclusive on both bounds.
    pub purchase_date: Option<RangeInclusive<NaiveDate>>,
}

impl FilterCriteria {
    /// Whether a single record passes every active predicate.
    pub fn matches(&self, record: &SaleRecord) -> bool {
        self.products.matches(&record.product)
            && self.categories.matches(&record.category)
            && self.sellers.matches(&record.seller)
            && self.locations.matches(&record.location)
            && self.price.as_ref().map_or(true, |r| r.contains(&record.price))
            && self.freight.as_ref().map_or(true, |r| r.contains(&record.freight))
            && self
                .purchase_date
                .as_ref()
                .map_or(true, |r| r.contains(&record.purchase_date))
    }
}

/// Return indices of sales that pass all active filters, in dataset order.
pub fn filtered_indices(dataset: &Dataset, criteria: &FilterCriteria) -> Vec<usize> {
    dataset
        .records()
        .iter()
        .enumerate()
        .filter(|(_, r)| criteria.matches(r))
        .map(|(i, _)| i)
        .collect()
}

/// Apply `criteria` and return the surviving rows as a new dataset.
pub fn apply(dataset: &Dataset, criteria: &FilterCriteria) -> Dataset {
    dataset.subset(&filtered_indices(dataset, criteria))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::fixtures::sample_dataset;

    #[test]
    fn no_criteria_is_identity() {
        let ds = sample_dataset();
        let out = apply(&ds, &FilterCriteria::default());
        assert_eq!(out.records(), ds.records());
    }

    #[test]
    fn result_is_a_subset_in_original_order() {
        let ds = sample_dataset();
        let criteria = FilterCriteria {
            sellers: Selection::only(["Ana", "Bruno"]),
            price: Some(100.0..=1500.0),
            ..Default::default()
        };
        let idx = filtered_indices(&ds, &criteria);
        assert_eq!(idx, vec![0, 1, 4]);
        assert!(idx.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn empty_selection_matches_nothing() {
        let ds = sample_dataset();
        let criteria = FilterCriteria {
            categories: Selection::none(),
            ..Default::default()
        };
        assert!(apply(&ds, &criteria).is_empty());
    }

    #[test]
    fn ranges_are_inclusive() {
        let ds = sample_dataset();
        let criteria = FilterCriteria {
            price: Some(500.0..=520.0),
            purchase_date: Some(
                NaiveDate::from_ymd_opt(2021, 1, 10).unwrap()..=NaiveDate::from_ymd_opt(2022, 1, 5).unwrap(),
            ),
            ..Default::default()
        };
        let out = apply(&ds, &criteria);
        let prices: Vec<f64> = out.records().iter().map(|r| r.price).collect();
        assert_eq!(prices, vec![500.0, 520.0]);
    }

    #[test]
    fn freight_range_applies() {
        let ds = sample_dataset();
        let criteria = FilterCriteria {
            freight: Some(0.0..=10.0),
            ..Default::default()
        };
        // freight is price / 20 in the fixture
        assert_eq!(filtered_indices(&ds, &criteria), vec![3, 5]);
    }

    #[test]
    fn toggle_out_of_any_keeps_the_others() {
        let options = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let mut sel = Selection::Any;
        sel.toggle("b", &options);
        assert_eq!(sel, Selection::only(["a", "c"]));
        assert_eq!(sel.count(&options), (2, 3));
        sel.toggle("b", &options);
        assert_eq!(sel.count(&options), (3, 3));
    }
}
