use std::collections::HashMap;

use log::{debug, trace, warn};
use serde::Serialize;

use crate::error::RouteError;
use crate::graph::graph::{Graph, NodeId};
use crate::graph::pathfinder::{traverse, PathStep};
use crate::numeric::interpolate::interpolate;
use crate::polyline::polyline::Polyline;
use crate::route::flight::FlightState;
use crate::route::place::{Airport, AirportSpec, Place, Waypoint};
use crate::route::RouteConfig;
use crate::sphere::nvector::Location;

/// Service-circle measurements shared by every airport of a case.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ServiceCircle {
    pub sphere_radius: f64,
    /// Radius of the flat circle bounding the service area.
    pub circle_radius: f64,
    /// Distance from the sphere centre to the plane of that circle.
    pub plane_offset: f64,
}

impl ServiceCircle {
    pub fn new(max_radius: f64, sphere_radius: f64) -> Self {
        let angle = max_radius / sphere_radius;
        ServiceCircle {
            sphere_radius,
            circle_radius: angle.sin() * sphere_radius,
            plane_offset: angle.cos() * sphere_radius,
        }
    }
}

/// Outcome of intersecting two service circles.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Intersection {
    Pair(Location, Location),
    /// One root search converged and the other did not.
    Single,
    Disjoint,
}

impl Intersection {
    /// Classifies the crossing points found searching up and down the
    /// line shared by both circle planes.
    pub fn from_roots(up: Option<Location>, down: Option<Location>) -> Self {
        match (up, down) {
            (Some(u), Some(d)) => Intersection::Pair(u, d),
            (None, None) => Intersection::Disjoint,
            _ => Intersection::Single,
        }
    }
}

/// Intersects the service circles around two distinct locations.
///
/// Both circle planes contain the line through the point where they meet
/// on the bisector of the two centres, running along `loc1 × loc2`. The two
/// crossing points are where that line pierces the sphere, found by solving
/// for the offset along it in either direction.
pub fn service_circle_intersections(
    loc1: &Location,
    loc2: &Location,
    circle: &ServiceCircle,
    precision: f64,
) -> Intersection {
    let perp = *loc1.cross(loc2).normalize().as_vector();
    let to_meet = perp.cross(loc1.as_vector());
    let half_angle = loc1.angle_between(loc2) / 2.0;
    let meet_point =
        loc1.scale_to(circle.plane_offset) + to_meet.scale_to(half_angle.tan() * circle.plane_offset);
    trace!("disc meet point {meet_point}");

    let along = |s: f64| meet_point + perp.scale_by(s);
    let radius_at = |s: f64| along(s).magnitude();
    let up = interpolate(
        0.0,
        circle.circle_radius,
        circle.sphere_radius,
        precision,
        radius_at,
    );
    let down = interpolate(
        0.0,
        -circle.circle_radius,
        circle.sphere_radius,
        precision,
        radius_at,
    );

    Intersection::from_roots(
        up.map(|s| along(s).normalize()),
        down.map(|s| along(s).normalize()),
    )
}

/// A found route: total distance and every stop, origin first.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Route {
    pub distance: f64,
    pub stops: Vec<PathStep>,
}

impl Route {
    pub fn nodes(&self) -> Vec<NodeId> {
        self.stops.iter().map(|s| s.node).collect()
    }
}

/// One stop of a [`Route`] in human-readable form.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StopView {
    pub name: String,
    pub airport: bool,
    pub latitude: f64,
    pub longitude: f64,
    /// Distance flown so far on arrival.
    pub distance: f64,
}

/// Airports, service-circle waypoints and the edges between them for one
/// case. Read-only once built.
#[derive(Clone, Debug)]
pub struct RouteGraph {
    graph: Graph<Place>,
    airports: Vec<NodeId>,
    by_name: HashMap<String, NodeId>,
    waypoint_count: usize,
    max_radius: f64,
    circle: ServiceCircle,
    config: RouteConfig,
}

impl RouteGraph {
    /// Builds the graph for `airports` with service circles of `max_radius`.
    ///
    /// Every pair of distinct airports at most `2 * max_radius` apart gets a
    /// direct edge, and the two points where their service circles cross
    /// become waypoints. A waypoint is linked to both parent airports at
    /// cost `max_radius` and to every waypoint already attached to either
    /// parent at their great-circle distance.
    pub fn build(
        airports: &[AirportSpec],
        max_radius: f64,
        config: RouteConfig,
    ) -> Result<Self, RouteError> {
        let circle = ServiceCircle::new(max_radius, config.sphere_radius_km);
        debug!(
            "circle radius = {:.3}; circle plane offset = {:.3}",
            circle.circle_radius, circle.plane_offset
        );

        let mut route_graph = RouteGraph {
            graph: Graph::new(),
            airports: Vec::with_capacity(airports.len()),
            by_name: HashMap::new(),
            waypoint_count: 0,
            max_radius,
            circle,
            config,
        };

        for (idx, spec) in airports.iter().enumerate() {
            route_graph.add_airport(idx + 1, spec);
        }

        let mut attached: Vec<Vec<NodeId>> = vec![Vec::new(); route_graph.airports.len()];
        for i in 0..route_graph.airports.len() {
            for j in (i + 1)..route_graph.airports.len() {
                route_graph.connect_pair(i, j, &mut attached)?;
            }
        }

        debug!(
            "route graph ready: {} airports, {} waypoints, {} edges",
            route_graph.airports.len(),
            route_graph.waypoint_count,
            route_graph.graph.edge_count()
        );
        Ok(route_graph)
    }

    fn add_airport(&mut self, index: usize, spec: &AirportSpec) {
        let mut aliases = spec.names.clone();
        if aliases.is_empty() {
            aliases.push(format!("Airport {index}"));
        }
        let airport = Airport {
            name: aliases[0].clone(),
            aliases: aliases.clone(),
            location: spec.location(),
        };
        let id = self.graph.add_node(Place::Airport(airport));
        for name in aliases {
            if let Some(previous) = self.by_name.insert(name.clone(), id) {
                warn!("airport name {name:?} reassigned from {previous} to {id}");
            }
        }
        self.airports.push(id);
    }

    fn connect_pair(
        &mut self,
        i: usize,
        j: usize,
        attached: &mut [Vec<NodeId>],
    ) -> Result<(), RouteError> {
        let (id1, id2) = (self.airports[i], self.airports[j]);
        let (name1, loc1) = self.airport_name_and_location(id1)?;
        let (name2, loc2) = self.airport_name_and_location(id2)?;

        let distance = loc1.distance(&loc2, self.circle.sphere_radius);
        if distance == 0.0 {
            debug!("airports {name1} and {name2} coincide; not connecting them");
            return Ok(());
        }
        if distance > 2.0 * self.max_radius {
            trace!("airports {name1} and {name2} are {distance:.3} apart; too far");
            return Ok(());
        }
        debug!("airports {name1} and {name2} are {distance:.3} apart; connecting");
        self.graph.connect_bidirectional(id1, id2, distance)?;

        match service_circle_intersections(
            &loc1,
            &loc2,
            &self.circle,
            self.config.interpolation_precision,
        ) {
            Intersection::Pair(p1, p2) => {
                let label = format!("{name1}/{name2}");
                let mut created = [id1; 2];
                for (slot, location) in created.iter_mut().zip([p1, p2]) {
                    *slot = self.graph.add_node(Place::Waypoint(Waypoint {
                        location,
                        airports: [id1, id2],
                        label: label.clone(),
                    }));
                    self.waypoint_count += 1;
                }
                for waypoint in created {
                    self.attach_waypoint(id1, waypoint, &attached[i])?;
                    self.attach_waypoint(id2, waypoint, &attached[j])?;
                }
                attached[i].extend(created);
                attached[j].extend(created);
                Ok(())
            }
            Intersection::Disjoint => {
                warn!("service circles of {name1} and {name2} overlap but no crossing was found");
                Ok(())
            }
            Intersection::Single => Err(RouteError::InconsistentIntersection {
                first: name1,
                second: name2,
            }),
        }
    }

    fn attach_waypoint(
        &mut self,
        airport: NodeId,
        waypoint: NodeId,
        existing: &[NodeId],
    ) -> Result<(), RouteError> {
        self.graph
            .connect_bidirectional(airport, waypoint, self.max_radius)?;
        let here = *self.graph.record(waypoint)?.location();
        for &other in existing {
            let there = self.graph.record(other)?;
            let distance = here.distance(there.location(), self.circle.sphere_radius);
            trace!("connecting waypoints {there} and {waypoint} at {distance:.3}");
            self.graph.connect_bidirectional(other, waypoint, distance)?;
        }
        Ok(())
    }

    fn airport_name_and_location(&self, id: NodeId) -> Result<(String, Location), RouteError> {
        let airport = self.airport(id)?;
        Ok((airport.name.clone(), airport.location))
    }

    pub fn graph(&self) -> &Graph<Place> {
        &self.graph
    }

    pub fn config(&self) -> &RouteConfig {
        &self.config
    }

    pub fn max_radius(&self) -> f64 {
        self.max_radius
    }

    pub fn service_circle_geometry(&self) -> &ServiceCircle {
        &self.circle
    }

    /// Airport nodes in input order.
    pub fn airports(&self) -> &[NodeId] {
        &self.airports
    }

    pub fn waypoint_count(&self) -> usize {
        self.waypoint_count
    }

    /// Looks up an airport by its 1-based input position.
    pub fn airport_by_index(&self, index: usize) -> Option<NodeId> {
        index
            .checked_sub(1)
            .and_then(|i| self.airports.get(i))
            .copied()
    }

    /// Looks up an airport by any of its names.
    pub fn airport_by_name(&self, name: &str) -> Option<NodeId> {
        self.by_name.get(name).copied()
    }

    pub fn place(&self, id: NodeId) -> Result<&Place, RouteError> {
        Ok(self.graph.record(id)?)
    }

    pub fn airport(&self, id: NodeId) -> Result<&Airport, RouteError> {
        self.place(id)?
            .as_airport()
            .ok_or(RouteError::NotAnAirport(id))
    }

    /// Cheapest route a plane with `plane_range` can fly from `from` to `to`.
    ///
    /// `Ok(None)` means no feasible route exists.
    pub fn find_route(
        &self,
        from: NodeId,
        to: NodeId,
        plane_range: f64,
    ) -> Result<Option<Route>, RouteError> {
        let origin = self.airport(from)?;
        let destination = self.airport(to)?;
        debug!(
            "from {} to {} with max plane range of {plane_range:.3}",
            origin.name, destination.name
        );

        let state = FlightState::new(plane_range, origin);
        let found = traverse(&self.graph, state, from, to, |state, step| {
            state.transition(step)
        })?;
        Ok(found.map(|traversal| Route {
            distance: traversal.cost,
            stops: traversal.path,
        }))
    }

    /// Stops of `route` with names, coordinates and running distance.
    pub fn describe(&self, route: &Route) -> Result<Vec<StopView>, RouteError> {
        route
            .stops
            .iter()
            .map(|step| {
                let place = self.place(step.node)?;
                let (latitude, longitude) = place.location().to_lat_lon_degrees();
                Ok(StopView {
                    name: place.to_string(),
                    airport: place.is_airport(),
                    latitude,
                    longitude,
                    distance: step.cost,
                })
            })
            .collect()
    }

    pub fn polyline(&self, route: &Route) -> Result<Polyline, RouteError> {
        let mut line = Polyline::new();
        for step in &route.stops {
            line.push_location(self.place(step.node)?.location());
        }
        Ok(line)
    }

    /// Closed polyline approximating the service circle of `airport`.
    pub fn service_circle(&self, airport: NodeId, points: usize) -> Result<Polyline, RouteError> {
        let center = self.airport(airport)?.location;
        let mut line: Polyline = center
            .circle_on_sphere(self.circle.sphere_radius, self.max_radius, points)
            .into_iter()
            .collect();
        line.close_path = true;
        Ok(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    const R: f64 = 6370.0;

    fn spec(name: &str, lat: f64, lon: f64) -> AirportSpec {
        AirportSpec {
            names: vec![name.into()],
            longitude: lon,
            latitude: lat,
        }
    }

    /// Airport on the equator `km` east of (0, 0).
    fn east_of_origin(name: &str, km: f64) -> AirportSpec {
        spec(name, 0.0, (km / R).to_degrees())
    }

    #[test]
    fn service_circle_measurements() {
        let c = ServiceCircle::new(300.0, R);
        assert_approx_eq!(c.circle_radius.hypot(c.plane_offset), R, 1e-9);
        assert!(c.circle_radius < 300.0);
    }

    #[test]
    fn intersections_lie_on_both_circles() {
        let a = Location::from_lat_lon_degrees(40.0, -100.0);
        let b = Location::from_lat_lon_degrees(42.0, -97.0);
        let d = a.distance(&b, R);
        let radius = d * 0.75;
        let circle = ServiceCircle::new(radius, R);
        match service_circle_intersections(&a, &b, &circle, 1e-8) {
            Intersection::Pair(p, q) => {
                for x in [p, q] {
                    assert_approx_eq!(a.distance(&x, R), radius, 1e-6);
                    assert_approx_eq!(b.distance(&x, R), radius, 1e-6);
                }
                assert!(p.distance(&q, R) > 1.0);
            }
            other => panic!("expected a pair, got {other:?}"),
        }
    }

    #[test]
    fn root_outcomes_classify_the_intersection() {
        let p = Location::from_lat_lon_degrees(1.0, 2.0);
        let q = Location::from_lat_lon_degrees(-1.0, 2.0);
        assert_eq!(Intersection::from_roots(Some(p), Some(q)), Intersection::Pair(p, q));
        assert_eq!(Intersection::from_roots(Some(p), None), Intersection::Single);
        assert_eq!(Intersection::from_roots(None, Some(q)), Intersection::Single);
        assert_eq!(Intersection::from_roots(None, None), Intersection::Disjoint);
    }

    #[test]
    fn single_crossing_is_reported_with_both_airports() {
        let err = RouteError::InconsistentIntersection {
            first: "A".into(),
            second: "B".into(),
        };
        assert_eq!(
            err.to_string(),
            "found only one service-circle intersection between A and B"
        );
    }

    #[test]
    fn barely_overlapping_circles_keep_only_the_direct_edge() {
        let airports = [spec("A", 0.0, 0.0), east_of_origin("B", 600.0 - 1e-5)];
        let rg = RouteGraph::build(&airports, 300.0, RouteConfig::default()).unwrap();
        let (a, b) = (rg.airports()[0], rg.airports()[1]);

        assert_eq!(rg.waypoint_count(), 0);
        assert_eq!(rg.graph().node_count(), 2);
        assert_eq!(rg.graph().edge_count(), 2);
        let direct = rg.graph().edges(a).unwrap()[0];
        assert_eq!(direct.to, b);
        assert_approx_eq!(direct.cost, 600.0, 1e-4);

        let route = rg.find_route(a, b, 600.0).unwrap().expect("direct leg");
        assert_eq!(route.nodes(), vec![a, b]);
    }

    #[test]
    fn two_airports_500_km_apart_with_300_km_circles() {
        let airports = [spec("A", 0.0, 0.0), east_of_origin("B", 500.0)];
        let rg = RouteGraph::build(&airports, 300.0, RouteConfig::default()).unwrap();
        let (a, b) = (rg.airports()[0], rg.airports()[1]);

        assert_eq!(rg.waypoint_count(), 2);
        assert_eq!(rg.graph().node_count(), 4);
        // direct edge both ways plus each waypoint to each airport both ways
        assert_eq!(rg.graph().edge_count(), 10);

        let direct = rg.graph().edges(a).unwrap()[0];
        assert_eq!(direct.to, b);
        assert_approx_eq!(direct.cost, 500.0, 1e-6);

        for (id, node) in rg.graph().nodes() {
            let Place::Waypoint(w) = &node.record else {
                continue;
            };
            assert_eq!(w.airports, [a, b]);
            assert_eq!(w.label, "A/B");
            let parents: Vec<_> = node.edges.iter().map(|e| (e.to, e.cost)).collect();
            assert_eq!(parents, vec![(a, 300.0), (b, 300.0)]);
            for parent in [a, b] {
                let p = rg.place(parent).unwrap().location();
                assert_approx_eq!(p.distance(&w.location, R), 300.0, 1e-6);
            }
            assert_approx_eq!(w.location.to_lat_lon_degrees().1, (250.0 / R).to_degrees(), 1e-6);
            assert!(rg.airport(id).is_err());
        }

        // Enough range for the direct 500 km leg.
        let route = rg.find_route(a, b, 600.0).unwrap().expect("feasible");
        assert_approx_eq!(route.distance, 500.0, 1e-6);
        assert!(route.distance <= 600.0);
        assert_eq!(route.nodes(), vec![a, b]);

        // 400 km is short of the direct leg, and a waypoint leaves only
        // 100 km for the 300 km leg onward.
        assert_eq!(rg.find_route(a, b, 400.0).unwrap(), None);
        // 300 km reaches a waypoint but never the far airport.
        assert_eq!(rg.find_route(a, b, 300.0).unwrap(), None);
    }

    #[test]
    fn far_apart_airports_get_no_edges() {
        let airports = [spec("A", 0.0, 0.0), east_of_origin("B", 700.0)];
        let rg = RouteGraph::build(&airports, 300.0, RouteConfig::default()).unwrap();
        assert_eq!(rg.waypoint_count(), 0);
        assert_eq!(rg.graph().edge_count(), 0);
        let (a, b) = (rg.airports()[0], rg.airports()[1]);
        assert_eq!(rg.find_route(a, b, 10_000.0).unwrap(), None);
    }

    #[test]
    fn waypoints_link_to_earlier_waypoints_of_shared_airport() {
        let airports = [
            spec("A", 0.0, 0.0),
            east_of_origin("B", 400.0),
            east_of_origin("C", 800.0),
        ];
        let rg = RouteGraph::build(&airports, 300.0, RouteConfig::default()).unwrap();
        assert_eq!(rg.waypoint_count(), 4);

        let waypoints: Vec<NodeId> = rg
            .graph()
            .nodes()
            .filter(|(_, n)| !n.record.is_airport())
            .map(|(id, _)| id)
            .collect();
        // B/C waypoints are created after A/B ones and link to both of them.
        let bc = waypoints[2];
        let linked: Vec<NodeId> = rg
            .graph()
            .edges(bc)
            .unwrap()
            .iter()
            .map(|e| e.to)
            .filter(|to| waypoints.contains(to))
            .collect();
        assert_eq!(linked.len(), 2);
        assert!(linked.contains(&waypoints[0]) && linked.contains(&waypoints[1]));

        // A-B-C with a refuel at B.
        let (a, b, c) = (rg.airports()[0], rg.airports()[1], rg.airports()[2]);
        let route = rg.find_route(a, c, 450.0).unwrap().expect("feasible");
        assert_eq!(route.nodes(), vec![a, b, c]);
        assert_approx_eq!(route.distance, 800.0, 1e-6);
        assert_eq!(rg.find_route(a, c, 350.0).unwrap(), None);

        let stops = rg.describe(&route).unwrap();
        assert_eq!(stops.iter().map(|s| s.name.as_str()).collect::<Vec<_>>(), ["A", "B", "C"]);
        assert_approx_eq!(stops[2].distance, 800.0, 1e-6);
        assert_eq!(rg.polyline(&route).unwrap().len(), 3);
    }

    #[test]
    fn coincident_airports_share_landing_history() {
        let mut alias = spec("A2", 0.0, 0.0);
        alias.names.push("Alpha".into());
        let airports = [spec("A", 0.0, 0.0), east_of_origin("B", 200.0), alias];
        let rg = RouteGraph::build(&airports, 300.0, RouteConfig::default()).unwrap();
        let (a, b, a2) = (rg.airports()[0], rg.airports()[1], rg.airports()[2]);

        assert!(rg.graph().edges(a).unwrap().iter().all(|e| e.to != a2));
        assert_eq!(rg.airport_by_name("Alpha"), Some(a2));
        // B -> A2 alone is fine, but A -> B -> A2 would land at A's spot twice.
        assert!(rg.find_route(b, a2, 500.0).unwrap().is_some());
        assert_eq!(rg.find_route(a, a2, 500.0).unwrap(), None);
        assert!(rg.find_route(a, b, 500.0).unwrap().is_some());
    }

    #[test]
    fn lookups_and_default_names() {
        let airports = [
            AirportSpec {
                names: vec![],
                longitude: 0.0,
                latitude: 0.0,
            },
            spec("LAX", 33.94, -118.40),
        ];
        let rg = RouteGraph::build(&airports, 100.0, RouteConfig::default()).unwrap();
        assert_eq!(rg.airport_by_index(0), None);
        assert_eq!(rg.airport_by_index(1), rg.airport_by_name("Airport 1"));
        assert_eq!(rg.airport_by_index(2), rg.airport_by_name("LAX"));
        assert_eq!(rg.airport_by_index(3), None);
    }

    #[test]
    fn service_circle_polyline_is_closed() {
        let rg = RouteGraph::build(&[spec("A", 42.28, -83.75)], 10.0, RouteConfig::default())
            .unwrap();
        let line = rg.service_circle(rg.airports()[0], 6).unwrap();
        assert_eq!(line.len(), 6);
        assert!(line.close_path);
        assert!(!line.encode().is_empty());
    }
}
