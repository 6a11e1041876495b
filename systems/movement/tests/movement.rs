use overland_core::{
    AgentId, Command, CornerCutting, EnterMask8, Event, GridBounds, GridCoord, NoOccupancy,
    StopReason, TerrainKind, TileData, TileDataProvider,
};
use overland_system_movement::{EntryRules, MovementLedger, PathAgent};
use overland_world::{self as world, query, MapContent, TerrainCatalog, World};

/// Tile provider whose cells can be swapped after a path was validated.
struct EditableTiles {
    bounds: GridBounds,
    tiles: Vec<TileData>,
}

impl EditableTiles {
    fn from_rows(rows: &[&str]) -> Self {
        let content = MapContent::from_rows(rows).expect("map content");
        let catalog = TerrainCatalog::standard();
        Self {
            bounds: content.bounds(),
            tiles: content
                .terrain()
                .iter()
                .map(|&kind| catalog.get(kind))
                .collect(),
        }
    }

    fn set(&mut self, cell: GridCoord, kind: TerrainKind) {
        let index = self.bounds.index_of(cell).expect("cell in bounds");
        self.tiles[index] = TerrainCatalog::standard().get(kind);
    }
}

impl TileDataProvider for EditableTiles {
    fn bounds(&self) -> GridBounds {
        self.bounds
    }

    fn tile(&self, coord: GridCoord) -> Option<TileData> {
        self.bounds
            .index_of(coord)
            .and_then(|index| self.tiles.get(index).copied())
    }
}

fn line(length: i32) -> Vec<GridCoord> {
    (0..length).map(|x| GridCoord::new(x, 0)).collect()
}

fn agent_at(position: GridCoord, movement_points: u32) -> PathAgent {
    PathAgent::new(
        AgentId::new(1),
        position,
        EntryRules::default(),
        MovementLedger::new(movement_points),
    )
}

#[test]
fn step_blocked_after_planning_commits_nothing() {
    let mut tiles = EditableTiles::from_rows(&["...."]);
    let mut agent = agent_at(GridCoord::new(0, 0), 100);
    assert!(agent.set_path(&tiles, &line(4)));

    tiles.set(GridCoord::new(1, 0), TerrainKind::Water);
    let mut events = Vec::new();
    let report = agent.advance_all_available(&tiles, &NoOccupancy, &mut events);

    assert_eq!(report.steps_committed, 0);
    assert_eq!(report.stop_reason, StopReason::BlockedByTerrain);
    assert_eq!(report.position, GridCoord::new(0, 0));
    assert_eq!(report.spent, 0);
    assert_eq!(agent.ledger().current(), 100);
    assert_eq!(agent.pending_path().len(), 3);
    assert!(events.is_empty());
}

#[test]
fn insufficient_points_keep_the_remainder_for_the_next_day() {
    let tiles = EditableTiles::from_rows(&["....."]);
    let mut agent = agent_at(GridCoord::new(0, 0), 25);
    assert!(agent.set_path(&tiles, &line(5)));
    let mut events = Vec::new();

    let first_day = agent.advance_all_available(&tiles, &NoOccupancy, &mut events);
    assert_eq!(first_day.steps_committed, 2);
    assert_eq!(first_day.spent, 20);
    assert_eq!(first_day.position, GridCoord::new(2, 0));
    assert_eq!(first_day.stop_reason, StopReason::InsufficientMovePoints);
    assert_eq!(agent.ledger().current(), 5);
    assert_eq!(
        agent.pending_path().collect::<Vec<_>>(),
        vec![GridCoord::new(3, 0), GridCoord::new(4, 0)]
    );

    agent.ledger_mut().set_max(25, true);
    let second_day = agent.advance_all_available(&tiles, &NoOccupancy, &mut events);
    assert_eq!(second_day.steps_committed, 2);
    assert_eq!(second_day.position, GridCoord::new(4, 0));
    assert_eq!(second_day.stop_reason, StopReason::ReachedGoal);
    assert!(!agent.has_path());
    assert_eq!(agent.ledger().current(), 5);
    assert_eq!(events.len(), 4);
}

#[test]
fn committed_steps_are_announced_with_their_cost() {
    let tiles = EditableTiles::from_rows(&["..", ".:"]);
    let mut agent = agent_at(GridCoord::new(0, 0), 50);
    let path = [GridCoord::new(0, 0), GridCoord::new(1, 1)];
    assert!(agent.set_path(&tiles, &path));
    assert_eq!(agent.next_step_cost(&tiles), Some(21));

    let mut events = Vec::new();
    let report = agent.advance_all_available(&tiles, &NoOccupancy, &mut events);

    assert_eq!(report.stop_reason, StopReason::ReachedGoal);
    assert_eq!(
        events,
        vec![Event::AgentStepped {
            agent: AgentId::new(1),
            from: GridCoord::new(0, 0),
            to: GridCoord::new(1, 1),
            cost: 21,
        }]
    );
    assert_eq!(agent.next_step_cost(&tiles), None);
}

#[test]
fn other_agents_stop_the_walk_without_rollback() {
    let content = MapContent::from_rows(&["....."]).expect("content");
    let mut world = World::new();
    let mut events = Vec::new();
    let _ = world.bake(Some(&content), &mut events);

    let walker = AgentId::new(1);
    let blocker = AgentId::new(2);
    for (agent, x) in [(walker, 0), (blocker, 3)] {
        world::apply(
            &mut world,
            Command::PlaceAgent {
                agent,
                cell: GridCoord::new(x, 0),
            },
            &mut events,
        );
    }

    let mut agent = PathAgent::new(
        walker,
        GridCoord::new(0, 0),
        EntryRules::default(),
        MovementLedger::new(100),
    );
    assert!(agent.set_path(query::tiles(&world), &line(5)));

    events.clear();
    let report =
        agent.advance_all_available(query::tiles(&world), query::occupancy(&world), &mut events);

    assert_eq!(report.steps_committed, 2);
    assert_eq!(report.position, GridCoord::new(2, 0));
    assert_eq!(report.stop_reason, StopReason::BlockedByOccupant);
    assert_eq!(agent.pending_path().len(), 2);
    assert_eq!(agent.ledger().current(), 80);
}

#[test]
fn illegal_paths_are_rejected_without_side_effects() {
    let tiles = EditableTiles::from_rows(&[".|.~", "...."]);
    let mut agent = agent_at(GridCoord::new(0, 1), 100);
    let accepted = [GridCoord::new(0, 1), GridCoord::new(1, 1)];
    assert!(agent.set_path(&tiles, &accepted));

    let rejected: [&[GridCoord]; 5] = [
        &[],
        &[GridCoord::new(1, 1), GridCoord::new(2, 1)],
        &[GridCoord::new(0, 1), GridCoord::new(2, 1)],
        &[GridCoord::new(0, 1), GridCoord::new(0, 0), GridCoord::new(1, 0)],
        &[
            GridCoord::new(0, 1),
            GridCoord::new(1, 1),
            GridCoord::new(2, 1),
            GridCoord::new(3, 0),
        ],
    ];
    for candidate in rejected {
        assert!(!agent.set_path(&tiles, candidate), "{candidate:?}");
        assert_eq!(
            agent.pending_path().collect::<Vec<_>>(),
            vec![GridCoord::new(1, 1)]
        );
    }
}

#[test]
fn agent_rules_restrict_directions() {
    let tiles = EditableTiles::from_rows(&["..", ".."]);
    let mut agent = PathAgent::new(
        AgentId::new(4),
        GridCoord::new(0, 0),
        EntryRules::new(EnterMask8::CARDINAL),
        MovementLedger::new(100),
    );

    assert!(!agent.set_path(&tiles, &[GridCoord::new(0, 0), GridCoord::new(1, 1)]));
    assert!(agent.set_path(
        &tiles,
        &[GridCoord::new(0, 0), GridCoord::new(1, 0), GridCoord::new(1, 1)]
    ));
}

#[test]
fn ramp_entered_from_the_south_is_walkable() {
    let tiles = EditableTiles::from_rows(&["|", "."]);
    let mut agent = agent_at(GridCoord::new(0, 1), 12);
    assert!(agent.set_path(&tiles, &[GridCoord::new(0, 1), GridCoord::new(0, 0)]));

    let mut events = Vec::new();
    let report = agent.advance_all_available(&tiles, &NoOccupancy, &mut events);

    assert_eq!(report.stop_reason, StopReason::ReachedGoal);
    assert_eq!(report.spent, 12);
    assert!(agent.ledger().is_exhausted());
}

#[test]
fn idle_agents_report_no_path() {
    let tiles = EditableTiles::from_rows(&["..."]);
    let mut agent = agent_at(GridCoord::new(1, 0), 10);
    assert!(agent.set_path(&tiles, &[GridCoord::new(1, 0)]));
    assert!(!agent.has_path());

    let mut events = Vec::new();
    let report = agent.advance_all_available(&tiles, &NoOccupancy, &mut events);
    assert_eq!(report.stop_reason, StopReason::NoPath);
    assert_eq!(report.steps_committed, 0);

    assert!(agent.set_path(&tiles, &[GridCoord::new(1, 0), GridCoord::new(2, 0)]));
    agent.clear_path();
    let report = agent.advance_all_available(&tiles, &NoOccupancy, &mut events);
    assert_eq!(report.stop_reason, StopReason::NoPath);
    assert!(events.is_empty());
}

#[test]
fn diagonal_squeeze_between_walls_is_rejected_unless_allowed() {
    let tiles = EditableTiles::from_rows(&[".#", "#."]);
    let squeeze = [GridCoord::new(0, 0), GridCoord::new(1, 1)];

    let mut strict = agent_at(GridCoord::new(0, 0), 100);
    assert!(!strict.set_path(&tiles, &squeeze));
    assert!(!strict.has_path());

    let mut relaxed = PathAgent::new(
        AgentId::new(1),
        GridCoord::new(0, 0),
        EntryRules::default().with_corner_cutting(CornerCutting::Allow),
        MovementLedger::new(100),
    );
    assert!(relaxed.set_path(&tiles, &squeeze));
    let mut events = Vec::new();
    let report = relaxed.advance_all_available(&tiles, &NoOccupancy, &mut events);
    assert_eq!(report.stop_reason, StopReason::ReachedGoal);
    assert_eq!(report.spent, 14);
}

#[test]
fn corner_walled_after_planning_blocks_the_diagonal() {
    let mut tiles = EditableTiles::from_rows(&["..", ".."]);
    let mut agent = agent_at(GridCoord::new(0, 0), 100);
    assert!(agent.set_path(&tiles, &[GridCoord::new(0, 0), GridCoord::new(1, 1)]));

    tiles.set(GridCoord::new(0, 1), TerrainKind::Rock);
    let mut events = Vec::new();
    let report = agent.advance_all_available(&tiles, &NoOccupancy, &mut events);

    assert_eq!(report.stop_reason, StopReason::BlockedByTerrain);
    assert_eq!(report.position, GridCoord::new(0, 0));
    assert_eq!(agent.next_step_cost(&tiles), None);
    assert_eq!(agent.ledger().current(), 100);
    assert!(events.is_empty());
}

#[test]
fn agent_moving_into_a_corner_blocks_the_diagonal() {
    let content = MapContent::from_rows(&["..", ".."]).expect("content");
    let mut world = World::new();
    let mut events = Vec::new();
    let _ = world.bake(Some(&content), &mut events);

    let walker = AgentId::new(1);
    world::apply(
        &mut world,
        Command::PlaceAgent {
            agent: walker,
            cell: GridCoord::new(0, 0),
        },
        &mut events,
    );
    let mut agent = PathAgent::new(
        walker,
        GridCoord::new(0, 0),
        EntryRules::default(),
        MovementLedger::new(100),
    );
    assert!(agent.set_path(
        query::tiles(&world),
        &[GridCoord::new(0, 0), GridCoord::new(1, 1)]
    ));

    world::apply(
        &mut world,
        Command::PlaceAgent {
            agent: AgentId::new(2),
            cell: GridCoord::new(1, 0),
        },
        &mut events,
    );
    events.clear();
    let report =
        agent.advance_all_available(query::tiles(&world), query::occupancy(&world), &mut events);

    assert_eq!(report.stop_reason, StopReason::BlockedByOccupant);
    assert_eq!(report.steps_committed, 0);
    assert_eq!(agent.pending_path().len(), 1);
    assert!(events.is_empty());
}
