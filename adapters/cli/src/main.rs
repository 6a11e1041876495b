#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter for exploring overland maps.
//!
//! Loads a TOML map, bakes it, and drives the pathfinding, movement and
//! fog-of-war systems against it, printing the results as ASCII maps.

mod render;

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use overland_core::{
    AgentId, Command, EnterMask8, Event, FogOfWarState, GridCoord, StopReason, TileDataProvider,
};
use overland_system_fog_of_war::{FogOfWar, FogSnapshot};
use overland_system_movement::{EntryRules, MovementLedger, PathAgent};
use overland_system_pathfinding::{path_cost, CornerCutting, Pathfinder, PathfinderConfig};
use overland_world::{self as world, query, MapContent, World};
use tracing_subscriber::EnvFilter;

/// Explore overland maps from the terminal.
#[derive(Parser, Debug)]
#[command(name = "overland", version, long_about = None)]
struct Cli {
    /// TOML map file to load.
    #[arg(short, long, value_name = "FILE", global = true, default_value = "maps/demo.toml")]
    map: PathBuf,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Subcommand, Debug)]
enum CliCommand {
    /// Find the cheapest route between two cells.
    Path(PathArgs),
    /// Plan a route and walk it over several days.
    Walk(WalkArgs),
    /// Reveal the map from a viewpoint and print the fog.
    Fog(FogArgs),
}

#[derive(clap::Args, Debug)]
struct RouteArgs {
    /// Starting cell as `X,Y`.
    #[arg(long, value_parser = parse_coord)]
    from: GridCoord,

    /// Destination cell as `X,Y`.
    #[arg(long, value_parser = parse_coord)]
    to: GridCoord,

    /// Restrict movement to the four cardinal directions.
    #[arg(long)]
    four_way: bool,

    /// Permit diagonal steps that squeeze between two blocked cells.
    #[arg(long)]
    allow_corner_cutting: bool,
}

impl RouteArgs {
    fn allowed(&self) -> EnterMask8 {
        if self.four_way {
            EnterMask8::CARDINAL
        } else {
            EnterMask8::ALL
        }
    }

    fn corner_cutting(&self) -> CornerCutting {
        if self.allow_corner_cutting {
            CornerCutting::Allow
        } else {
            CornerCutting::Disallow
        }
    }

    fn pathfinder(&self) -> Pathfinder {
        Pathfinder::new(PathfinderConfig::new(self.corner_cutting()))
    }
}

#[derive(clap::Args, Debug)]
struct PathArgs {
    #[command(flatten)]
    route: RouteArgs,
}

#[derive(clap::Args, Debug)]
struct WalkArgs {
    #[command(flatten)]
    route: RouteArgs,

    /// Movement points granted each day.
    #[arg(long, value_name = "N")]
    movement_points: u32,

    /// Number of days to walk.
    #[arg(long, value_name = "D", default_value_t = 1)]
    days: u32,
}

#[derive(clap::Args, Debug)]
struct FogArgs {
    /// Viewpoint cell as `X,Y`.
    #[arg(long, value_parser = parse_coord)]
    at: GridCoord,

    /// Vision radius in cells.
    #[arg(long, default_value_t = 4)]
    radius: u32,

    /// Turn visible cells into explored ones before printing.
    #[arg(long)]
    forget: bool,

    /// Snapshot to apply before revealing, in text or JSON form.
    #[arg(long, value_name = "SNAPSHOT")]
    import: Option<String>,

    /// Print the resulting snapshot.
    #[arg(long)]
    export: bool,

    /// Format used by `--export`.
    #[arg(long, value_enum, default_value = "text")]
    format: SnapshotFormat,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum SnapshotFormat {
    /// Single-line `fog:v1:<W>x<H>:<base64>` form.
    Text,
    /// JSON object with width, height and state bytes.
    Json,
}

/// Entry point for the overland command-line interface.
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let content = load_map(&cli.map)?;
    let mut world = World::new();
    let mut events = Vec::new();
    let _ = world.bake(Some(&content), &mut events);
    tracing::info!(map = %cli.map.display(), "map loaded");

    match cli.command {
        CliCommand::Path(args) => run_path(&world, &args),
        CliCommand::Walk(args) => run_walk(&mut world, &args),
        CliCommand::Fog(args) => run_fog(&world, &args),
    }
}

fn load_map(path: &Path) -> Result<MapContent> {
    let source = fs::read_to_string(path)
        .with_context(|| format!("failed to read map file {}", path.display()))?;
    MapContent::from_toml_str(&source)
        .with_context(|| format!("failed to load map file {}", path.display()))
}

fn parse_coord(value: &str) -> Result<GridCoord, String> {
    let (x, y) = value
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y but found '{value}'"))?;
    let x = x
        .trim()
        .parse()
        .map_err(|_| format!("invalid x coordinate in '{value}'"))?;
    let y = y
        .trim()
        .parse()
        .map_err(|_| format!("invalid y coordinate in '{value}'"))?;
    Ok(GridCoord::new(x, y))
}

fn run_path(world: &World, args: &PathArgs) -> Result<()> {
    let route = &args.route;
    let tiles = query::tiles(world);
    let mut pathfinder = route.pathfinder();
    let path = pathfinder.find_path(tiles, route.from, route.to, route.allowed());
    if path.is_empty() {
        bail!("no path from {:?} to {:?}", route.from, route.to);
    }

    let cost = path_cost(tiles, &path).context("path contains a gap")?;
    let stats = pathfinder.last_search();
    println!(
        "{} steps, cost {cost} (expanded {}, pushed {})",
        path.len() - 1,
        stats.expanded,
        stats.pushed
    );
    println!("{}", format_path(&path));
    print!(
        "{}",
        render::render(tiles, |cell| route_marker(&path, cell, route.from, route.to))
    );
    Ok(())
}

fn run_walk(world: &mut World, args: &WalkArgs) -> Result<()> {
    let route = &args.route;
    let agent = AgentId::new(1);
    let mut events = Vec::new();
    world::apply(
        world,
        Command::PlaceAgent {
            agent,
            cell: route.from,
        },
        &mut events,
    );
    if let Some(Event::PlacementRejected { reason, .. }) = events.first() {
        bail!("cannot place walker at {:?}: {reason:?}", route.from);
    }

    let path = route.pathfinder().find_path(
        &query::overlay_excluding(world, agent),
        route.from,
        route.to,
        route.allowed(),
    );
    let mut walker = PathAgent::new(
        agent,
        route.from,
        EntryRules::new(route.allowed()).with_corner_cutting(route.corner_cutting()),
        MovementLedger::new(args.movement_points),
    );
    if !walker.set_path(query::tiles(world), &path) {
        bail!("no path from {:?} to {:?}", route.from, route.to);
    }

    for day in 1..=args.days {
        walker.ledger_mut().set_max(args.movement_points, true);
        let mut steps = Vec::new();
        let report =
            walker.advance_all_available(query::tiles(world), query::occupancy(world), &mut steps);

        for step in &steps {
            if let Event::AgentStepped { from, to, cost, .. } = step {
                println!("day {day}: {from:?} -> {to:?} ({cost} mp)");
            }
        }
        println!(
            "day {day}: stopped at {:?} after {} steps, {} mp spent, {} mp left: {:?}",
            report.position,
            report.steps_committed,
            report.spent,
            walker.ledger().current(),
            report.stop_reason
        );

        if report.steps_committed > 0 {
            events.clear();
            world::apply(
                world,
                Command::RelocateAgent {
                    agent,
                    to: report.position,
                },
                &mut events,
            );
        }
        if matches!(
            report.stop_reason,
            StopReason::ReachedGoal | StopReason::NoPath
        ) {
            break;
        }
    }

    let remaining: Vec<_> = walker.pending_path().collect();
    print!(
        "{}",
        render::render(query::tiles(world), |cell| {
            if cell == walker.position() {
                Some('@')
            } else if remaining.contains(&cell) {
                Some('*')
            } else {
                None
            }
        })
    );
    Ok(())
}

fn run_fog(world: &World, args: &FogArgs) -> Result<()> {
    let tiles = query::tiles(world);
    let mut fog = FogOfWar::new();
    let mut events = Vec::new();
    let _ = fog.sync_bounds(tiles, &mut events);

    if let Some(encoded) = &args.import {
        let snapshot = decode_snapshot(encoded)?;
        fog.apply(&snapshot, &mut events)
            .context("snapshot does not fit the map")?;
    }

    fog.reveal_area(tiles, args.at, args.radius, &mut events);
    if args.forget {
        fog.clear_transient_visibility(tiles, &mut events);
    }

    let changed = events
        .iter()
        .filter(|event| matches!(event, Event::FogStateChanged { .. }))
        .count();
    tracing::debug!(changed, "fog updated");

    let viewer = tiles.bounds().clamp(args.at);
    print!(
        "{}",
        render::render(tiles, |cell| match fog.state(cell) {
            FogOfWarState::Unknown => Some(render::UNKNOWN_GLYPH),
            _ if cell == viewer => Some('@'),
            _ => None,
        })
    );

    if args.export {
        let snapshot = fog.capture();
        match args.format {
            SnapshotFormat::Text => println!("{}", snapshot.encode()),
            SnapshotFormat::Json => println!(
                "{}",
                serde_json::to_string(&snapshot).context("failed to serialize snapshot")?
            ),
        }
    }
    Ok(())
}

fn decode_snapshot(encoded: &str) -> Result<FogSnapshot> {
    if encoded.trim_start().starts_with('{') {
        serde_json::from_str(encoded).context("failed to parse JSON snapshot")
    } else {
        FogSnapshot::decode(encoded).context("failed to decode snapshot")
    }
}

fn route_marker(path: &[GridCoord], cell: GridCoord, from: GridCoord, to: GridCoord) -> Option<char> {
    if cell == from {
        Some('S')
    } else if cell == to {
        Some('G')
    } else if path.contains(&cell) {
        Some('*')
    } else {
        None
    }
}

fn format_path(path: &[GridCoord]) -> String {
    path.iter()
        .map(|cell| format!("({},{})", cell.x(), cell.y()))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinates_parse_with_optional_spaces() {
        assert_eq!(parse_coord("3,4"), Ok(GridCoord::new(3, 4)));
        assert_eq!(parse_coord(" -1, 2"), Ok(GridCoord::new(-1, 2)));
        assert!(parse_coord("3;4").is_err());
        assert!(parse_coord("x,4").is_err());
    }

    #[test]
    fn paths_print_as_coordinate_lists() {
        let path = [GridCoord::new(0, 0), GridCoord::new(1, 1)];
        assert_eq!(format_path(&path), "(0,0) (1,1)");
    }

    #[test]
    fn snapshots_import_from_either_form() {
        let snapshot = FogSnapshot {
            width: 2,
            height: 1,
            states: vec![1, 2],
        };
        let json = serde_json::to_string(&snapshot).expect("serializes");

        assert_eq!(decode_snapshot(&snapshot.encode()).expect("text"), snapshot);
        assert_eq!(decode_snapshot(&json).expect("json"), snapshot);
        assert!(decode_snapshot("not a snapshot").is_err());
    }

    #[test]
    fn cli_arguments_are_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
