//! Fuel-range bookkeeping for one route query.
//!
//! A plane leaves its origin with a full tank. Flying to a waypoint burns
//! the edge's length from the remaining range; landing at an airport refuels
//! to full. An edge longer than the remaining range cannot be flown.
//!
//! Every airport landed at is remembered in a [`PersistentSet`], keyed by
//! position, and may not be landed at again on the same route. The origin
//! counts as landed. Sibling search branches share the set's common part.

use crate::graph::pathfinder::Step;
use crate::route::place::{Airport, AirportKey, Place};
use crate::tree::persistent_set::PersistentSet;

#[derive(Clone, Debug)]
pub struct FlightState {
    remaining: f64,
    full_range: f64,
    landed: PersistentSet<AirportKey>,
}

impl FlightState {
    /// State on departure from `origin` with a full tank of `plane_range`.
    pub fn new(plane_range: f64, origin: &Airport) -> Self {
        FlightState {
            remaining: plane_range,
            full_range: plane_range,
            landed: PersistentSet::new().insert(AirportKey::from(origin)),
        }
    }

    pub fn remaining(&self) -> f64 {
        self.remaining
    }

    pub fn full_range(&self) -> f64 {
        self.full_range
    }

    pub fn has_landed(&self, airport: &Airport) -> bool {
        self.landed.contains(&AirportKey::from(airport))
    }

    /// Successor state after flying `step`, or `None` if it cannot be flown.
    pub fn transition(&self, step: Step<'_, Place>) -> Option<FlightState> {
        let cost = step.edge.cost;
        if cost > self.remaining {
            return None;
        }
        match step.to {
            Place::Airport(airport) => {
                let key = AirportKey::from(airport);
                if self.landed.contains(&key) {
                    return None;
                }
                Some(FlightState {
                    remaining: self.full_range,
                    full_range: self.full_range,
                    landed: self.landed.insert(key),
                })
            }
            Place::Waypoint(_) => Some(FlightState {
                remaining: self.remaining - cost,
                full_range: self.full_range,
                landed: self.landed.clone(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::graph::{Edge, NodeId};
    use crate::route::place::Waypoint;
    use crate::sphere::nvector::Location;

    fn airport(name: &str, lat: f64, lon: f64) -> Place {
        Place::Airport(Airport {
            name: name.into(),
            aliases: vec![name.into()],
            location: Location::from_lat_lon_degrees(lat, lon),
        })
    }

    fn waypoint() -> Place {
        Place::Waypoint(Waypoint {
            location: Location::from_lat_lon_degrees(1.0, 1.0),
            airports: [NodeId(0), NodeId(1)],
            label: "A/B".into(),
        })
    }

    fn fly(state: &FlightState, from: &Place, to: &Place, cost: f64) -> Option<FlightState> {
        let edge = Edge {
            from: NodeId(0),
            to: NodeId(1),
            cost,
        };
        state.transition(Step {
            edge: &edge,
            from,
            to,
        })
    }

    #[test]
    fn waypoint_burns_range_and_airport_refuels() {
        let a = airport("A", 0.0, 0.0);
        let b = airport("B", 0.0, 2.0);
        let w = waypoint();
        let start = FlightState::new(300.0, a.as_airport().unwrap());

        let at_waypoint = fly(&start, &a, &w, 120.0).expect("in range");
        assert_eq!(at_waypoint.remaining(), 180.0);
        assert_eq!(at_waypoint.full_range(), 300.0);

        assert!(fly(&at_waypoint, &w, &b, 180.5).is_none());
        let at_b = fly(&at_waypoint, &w, &b, 180.0).expect("exactly in range");
        assert_eq!(at_b.remaining(), 300.0);
        assert!(at_b.has_landed(b.as_airport().unwrap()));
        assert!(!at_waypoint.has_landed(b.as_airport().unwrap()));
    }

    #[test]
    fn edge_longer_than_remaining_is_rejected() {
        let a = airport("A", 0.0, 0.0);
        let b = airport("B", 0.0, 5.0);
        let start = FlightState::new(500.0, a.as_airport().unwrap());
        assert!(fly(&start, &a, &b, 500.1).is_none());
        assert!(fly(&start, &a, &b, 500.0).is_some());
    }

    #[test]
    fn never_lands_twice_at_the_same_position() {
        let a = airport("A", 10.0, 10.0);
        let alias = airport("A-north-field", 10.0, 10.0);
        let b = airport("B", 10.0, 12.0);
        let start = FlightState::new(1000.0, a.as_airport().unwrap());

        assert!(fly(&start, &b, &alias, 10.0).is_none());
        let at_b = fly(&start, &a, &b, 200.0).unwrap();
        assert!(fly(&at_b, &b, &a, 200.0).is_none());
    }
}
