use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::graph::graph::NodeId;
use crate::sphere::nvector::Location;

/// Airport as read from input, before it becomes a graph node.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AirportSpec {
    /// All names the airport may be referred to by; the first is canonical.
    pub names: Vec<String>,
    pub longitude: f64,
    pub latitude: f64,
}

impl AirportSpec {
    pub fn location(&self) -> Location {
        Location::from_lat_lon_degrees(self.latitude, self.longitude)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Airport {
    pub name: String,
    pub aliases: Vec<String>,
    pub location: Location,
}

/// Point where the service circles of two airports cross.
#[derive(Clone, Debug, PartialEq)]
pub struct Waypoint {
    pub location: Location,
    /// The two airports whose circles meet here.
    pub airports: [NodeId; 2],
    pub label: String,
}

/// Record stored on every node of the route graph.
#[derive(Clone, Debug, PartialEq)]
pub enum Place {
    Airport(Airport),
    Waypoint(Waypoint),
}

impl Place {
    pub fn location(&self) -> &Location {
        match self {
            Place::Airport(a) => &a.location,
            Place::Waypoint(w) => &w.location,
        }
    }

    pub fn as_airport(&self) -> Option<&Airport> {
        match self {
            Place::Airport(a) => Some(a),
            Place::Waypoint(_) => None,
        }
    }

    pub fn is_airport(&self) -> bool {
        self.as_airport().is_some()
    }
}

impl fmt::Display for Place {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Place::Airport(a) => f.write_str(&a.name),
            Place::Waypoint(w) => f.write_str(&w.label),
        }
    }
}

/// Identity of an airport by position, usable as an ordered set key.
///
/// Two airports listed at exactly the same coordinates share a key. Keys
/// are ordered by [`Location::lex_cmp`].
#[derive(Clone, Copy, Debug)]
pub struct AirportKey(Location);

impl PartialEq for AirportKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for AirportKey {}

impl PartialOrd for AirportKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for AirportKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.lex_cmp(&other.0)
    }
}

impl From<&Location> for AirportKey {
    fn from(location: &Location) -> Self {
        AirportKey(*location)
    }
}

impl From<&Airport> for AirportKey {
    fn from(airport: &Airport) -> Self {
        AirportKey::from(&airport.location)
    }
}
