use std::fmt;

use super::model::Listing;

// ---------------------------------------------------------------------------
// Choice – a selector value or "All"
// ---------------------------------------------------------------------------

/// Sentinel label that clears a selector.
pub const ALL: &str = "All";

/// A value picked for one selector. `All` clears the selector.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Choice {
    All,
    Only(String),
}

impl Choice {
    fn into_option(self) -> Option<String> {
        match self {
            Choice::All => None,
            Choice::Only(v) => Some(v),
        }
    }
}

impl From<&str> for Choice {
    fn from(value: &str) -> Self {
        if value == ALL {
            Choice::All
        } else {
            Choice::Only(value.to_string())
        }
    }
}

impl From<Option<&str>> for Choice {
    fn from(value: Option<&str>) -> Self {
        value.map_or(Choice::All, Choice::from)
    }
}

impl fmt::Display for Choice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Choice::All => write!(f, "{ALL}"),
            Choice::Only(v) => write!(f, "{v}"),
        }
    }
}

// ---------------------------------------------------------------------------
// FilterState – the three selectors
// ---------------------------------------------------------------------------

/// The cross-filter selectors. An unset selector places no constraint.
///
/// This is a plain value: the `with_*` methods return a new state and leave
/// `self` untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FilterState {
    pub borough: Option<String>,
    pub neighborhood: Option<String>,
    pub room_type: Option<String>,
}

impl FilterState {
    /// Select or clear the borough. A neighbourhood belongs to exactly one
    /// borough, so any borough choice also clears the neighbourhood.
    pub fn with_borough(&self, choice: Choice) -> Self {
        FilterState {
            borough: choice.into_option(),
            neighborhood: None,
            room_type: self.room_type.clone(),
        }
    }

    pub fn with_neighborhood(&self, choice: Choice) -> Self {
        FilterState {
            neighborhood: choice.into_option(),
            ..self.clone()
        }
    }

    pub fn with_room_type(&self, choice: Choice) -> Self {
        FilterState {
            room_type: choice.into_option(),
            ..self.clone()
        }
    }

    /// The same state with the neighbourhood selector removed.
    pub fn without_neighborhood(&self) -> Self {
        self.with_neighborhood(Choice::All)
    }

    /// Whether no selector is set.
    pub fn is_empty(&self) -> bool {
        self.borough.is_none() && self.neighborhood.is_none() && self.room_type.is_none()
    }

    /// Conjunction of every set selector, by exact string equality.
    pub fn matches(&self, listing: &Listing) -> bool {
        fn accepts(selector: &Option<String>, value: &str) -> bool {
            selector.as_deref().map_or(true, |s| s == value)
        }
        accepts(&self.borough, &listing.borough)
            && accepts(&self.neighborhood, &listing.neighborhood)
            && accepts(&self.room_type, &listing.room_type)
    }
}

impl fmt::Display for FilterState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let show = |v: &Option<String>| v.as_deref().unwrap_or(ALL).to_string();
        write!(
            f,
            "borough={} neighbourhood={} room type={}",
            show(&self.borough),
            show(&self.neighborhood),
            show(&self.room_type)
        )
    }
}

/// Return indices of `listings` passing every set selector.
///
/// Always evaluated against the full slice handed in, never against a
/// previous result, so selectors can be set and cleared in any order.
pub fn filtered_indices(listings: &[Listing], filter: &FilterState) -> Vec<usize> {
    if filter.is_empty() {
        return (0..listings.len()).collect();
    }
    listings
        .iter()
        .enumerate()
        .filter(|(_, l)| filter.matches(l))
        .map(|(i, _)| i)
        .collect()
}
