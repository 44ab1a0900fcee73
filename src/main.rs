use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::{info, LevelFilter};
use serde::Serialize;

use waypoint_router::data::{read_cases_from_file, Case};
use waypoint_router::route::{RouteConfig, RouteGraph, StopView};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Shortest flights between airports with limited plane range")]
struct Cli {
    /// Case file to read.
    #[arg(short, long, default_value = "sample.in")]
    file: PathBuf,

    /// Log graph construction at debug level unless RUST_LOG says otherwise.
    #[arg(short, long)]
    verbose: bool,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// List every stop of each route found.
    #[arg(long)]
    show_route: bool,

    /// Print the encoded polyline of each route found.
    #[arg(long)]
    polyline: bool,

    /// Print each airport's service circle as a closed polyline of N points.
    #[arg(long, value_name = "N")]
    circles: Option<usize>,

    #[arg(long, default_value_t = waypoint_router::route::EARTH_RADIUS_KM)]
    sphere_radius_km: f64,

    /// Tolerance for locating service-circle intersections, in km.
    #[arg(long, default_value_t = waypoint_router::route::INTERPOLATION_PRECISION)]
    precision: f64,
}

#[derive(Debug, Serialize)]
struct CaseReport {
    case: usize,
    queries: Vec<QueryReport>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    circles: Vec<CircleReport>,
}

#[derive(Debug, Serialize)]
struct QueryReport {
    from: String,
    to: String,
    plane_range: f64,
    /// `None` when no route exists.
    distance: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    route: Option<Vec<StopView>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    polyline: Option<String>,
}

#[derive(Debug, Serialize)]
struct CircleReport {
    airport: String,
    polyline: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = RouteConfig {
        sphere_radius_km: cli.sphere_radius_km,
        interpolation_precision: cli.precision,
    };
    let cases = read_cases_from_file(&cli.file)
        .with_context(|| format!("failed to read cases from {}", cli.file.display()))?;
    info!("read {} cases from {}", cases.len(), cli.file.display());

    let mut reports = Vec::with_capacity(cases.len());
    for (idx, case) in cases.iter().enumerate() {
        let report = run_case(idx + 1, case, config, &cli)
            .with_context(|| format!("case {} failed", idx + 1))?;
        match cli.format {
            OutputFormat::Text => print_text(&report),
            OutputFormat::Json => reports.push(report),
        }
    }

    if cli.format == OutputFormat::Json {
        let json = serde_json::to_string_pretty(&reports).context("failed to encode report")?;
        println!("{json}");
    }
    Ok(())
}

fn run_case(number: usize, case: &Case, config: RouteConfig, cli: &Cli) -> Result<CaseReport> {
    let graph = RouteGraph::build(&case.airports, case.max_radius_km, config)?;
    info!(
        "case {number}: {} airports, {} waypoints",
        graph.airports().len(),
        graph.waypoint_count()
    );

    let mut queries = Vec::with_capacity(case.queries.len());
    for query in &case.queries {
        let from = query.from.resolve(&graph)?;
        let to = query.to.resolve(&graph)?;
        let found = graph.find_route(from, to, query.plane_range)?;

        let mut report = QueryReport {
            from: graph.airport(from)?.name.clone(),
            to: graph.airport(to)?.name.clone(),
            plane_range: query.plane_range,
            distance: found.as_ref().map(|r| r.distance),
            route: None,
            polyline: None,
        };
        if let Some(route) = &found {
            if cli.show_route {
                report.route = Some(graph.describe(route)?);
            }
            if cli.polyline {
                report.polyline = Some(graph.polyline(route)?.encode());
            }
        }
        queries.push(report);
    }

    let mut circles = Vec::new();
    if let Some(points) = cli.circles {
        for &airport in graph.airports() {
            circles.push(CircleReport {
                airport: graph.airport(airport)?.name.clone(),
                polyline: graph.service_circle(airport, points)?.encode(),
            });
        }
    }

    Ok(CaseReport {
        case: number,
        queries,
        circles,
    })
}

fn print_text(report: &CaseReport) {
    println!("Case {}:", report.case);
    for query in &report.queries {
        match query.distance {
            Some(distance) => println!("{distance:.3}"),
            None => println!("impossible"),
        }
        for stop in query.route.iter().flatten() {
            println!(
                "    {} ({:.5}, {:.5}) @ {:.3}",
                stop.name, stop.latitude, stop.longitude, stop.distance
            );
        }
        if let Some(line) = &query.polyline {
            println!("    polyline: {line}");
        }
    }
    for circle in &report.circles {
        println!("  circle {}: {}", circle.airport, circle.polyline);
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_level(default)
        .parse_default_env()
        .init();
}
