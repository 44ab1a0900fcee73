#[allow(clippy::module_inception)]
pub mod polyline;
