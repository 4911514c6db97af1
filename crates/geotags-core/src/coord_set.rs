// crates/geotags-core/src/coord_set.rs

//! Coordinates collected for one page while its content is processed.

use crate::config::GeoConfig;
use crate::coord::Coord;

/// Why a coordinate was not accepted as given.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetWarning {
    /// The page already holds the configured maximum.
    LimitExceeded { limit: usize },
    /// A second primary coordinate. It is kept as a secondary one.
    MultiplePrimary,
}

impl SetWarning {
    pub fn tracking_category(&self) -> &'static str {
        match self {
            SetWarning::LimitExceeded { .. } => "geotags-limit-exceeded",
            SetWarning::MultiplePrimary => "geotags-multiple-primary",
        }
    }
}

/// Result of [`CoordinateSet::add`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Accepted,
    /// Report this once to the user.
    Warned(SetWarning),
    /// Rejected for a reason that was already reported.
    AlreadyWarned,
}

impl AddOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, AddOutcome::Accepted)
    }
}

/// At most one primary coordinate plus ordered secondary ones, capped at a
/// configured total.
#[derive(Debug, Clone, Default)]
pub struct CoordinateSet {
    primary: Option<Coord>,
    secondary: Vec<Coord>,
    limit: usize,
    limit_exceeded: bool,
}

impl CoordinateSet {
    pub fn new(limit: usize) -> Self {
        Self {
            primary: None,
            secondary: Vec::new(),
            limit,
            limit_exceeded: false,
        }
    }

    pub fn from_config(config: &GeoConfig) -> Self {
        Self::new(config.max_coordinates_per_page)
    }

    /// Builds a set from already validated coordinates, e.g. rows read back
    /// from storage. Outcomes other than `Accepted` are dropped.
    pub fn from_coords(limit: usize, coords: impl IntoIterator<Item = Coord>) -> Self {
        let mut set = Self::new(limit);
        for coord in coords {
            set.add(coord);
        }
        set
    }

    pub fn add(&mut self, mut coord: Coord) -> AddOutcome {
        if self.len() >= self.limit {
            if self.limit_exceeded {
                return AddOutcome::AlreadyWarned;
            }
            self.limit_exceeded = true;
            return AddOutcome::Warned(SetWarning::LimitExceeded { limit: self.limit });
        }

        if coord.primary {
            if self.primary.is_some() {
                coord.primary = false;
                self.secondary.push(coord);
                return AddOutcome::Warned(SetWarning::MultiplePrimary);
            }
            self.primary = Some(coord);
        } else {
            self.secondary.push(coord);
        }
        AddOutcome::Accepted
    }

    pub fn len(&self) -> usize {
        usize::from(self.primary.is_some()) + self.secondary.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn limit_exceeded(&self) -> bool {
        self.limit_exceeded
    }

    pub fn primary(&self) -> Option<&Coord> {
        self.primary.as_ref()
    }

    pub fn secondary(&self) -> &[Coord] {
        &self.secondary
    }

    /// Primary first, then secondaries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Coord> {
        self.primary.iter().chain(self.secondary.iter())
    }

    pub fn into_vec(self) -> Vec<Coord> {
        self.primary.into_iter().chain(self.secondary).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primary_comes_first() {
        let mut set = CoordinateSet::new(10);
        assert_eq!(set.add(Coord::earth(1.0, 1.0)), AddOutcome::Accepted);
        assert_eq!(set.add(Coord::earth(2.0, 2.0).with_primary(true)), AddOutcome::Accepted);
        let lats: Vec<f64> = set.iter().map(|c| c.lat).collect();
        assert_eq!(lats, vec![2.0, 1.0]);
    }

    #[test]
    fn second_primary_is_demoted() {
        let mut set = CoordinateSet::new(10);
        set.add(Coord::earth(1.0, 1.0).with_primary(true));
        let outcome = set.add(Coord::earth(2.0, 2.0).with_primary(true));
        assert_eq!(outcome, AddOutcome::Warned(SetWarning::MultiplePrimary));
        assert_eq!(set.len(), 2);
        assert_eq!(set.primary().map(|c| c.lat), Some(1.0));
        assert!(!set.secondary()[0].primary);
    }

    #[test]
    fn limit_warns_once_and_keeps_accepted() {
        let mut set = CoordinateSet::new(2);
        assert!(set.add(Coord::earth(1.0, 1.0)).is_accepted());
        assert!(set.add(Coord::earth(2.0, 2.0)).is_accepted());
        assert_eq!(
            set.add(Coord::earth(3.0, 3.0)),
            AddOutcome::Warned(SetWarning::LimitExceeded { limit: 2 })
        );
        assert_eq!(set.add(Coord::earth(4.0, 4.0)), AddOutcome::AlreadyWarned);
        assert!(set.limit_exceeded());
        assert_eq!(set.len(), 2);
        assert_eq!(set.into_vec().len(), 2);
    }

    #[test]
    fn zero_limit_rejects_everything() {
        let mut set = CoordinateSet::new(0);
        assert!(!set.add(Coord::earth(1.0, 1.0)).is_accepted());
        assert!(set.is_empty());
    }
}
