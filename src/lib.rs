pub mod data;
pub mod error;
pub mod graph;
pub mod numeric;
pub mod polyline;
pub mod queue;
pub mod route;
pub mod sphere;
pub mod tree;

pub use data::{parse_cases, read_cases_from_file, AirportRef, Case, DataError, QuerySpec};
pub use error::RouteError;
pub use route::{Route, RouteConfig, RouteGraph};
