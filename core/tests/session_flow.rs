use std::time::Duration;

use snake3d_core::*;

/// Renderer whose handles are the cells it last drew.
#[derive(Default)]
struct Scene {
    created: usize,
    updated: Vec<CellUpdate>,
}

impl CellRenderer for Scene {
    type Handle = Cell;

    fn create_cell(&mut self, _coords: Coord2, cell: Cell) -> Cell {
        self.created += 1;
        cell
    }

    fn update_cell(&mut self, handle: &mut Cell, update: CellUpdate) {
        assert_ne!(*handle, update.cell, "renderer got a no-op update");
        *handle = update.cell;
        self.updated.push(update);
    }
}

type TestSession = Session<MemoryStorage, Scene>;

fn period() -> TickPeriod {
    TickPeriod::from_millis(100)
}

fn tick(session: &mut TestSession) -> u32 {
    session.advance(Duration::from_millis(100))
}

fn layout_session(size: Coord2, body: &[Coord2], heading: Direction, apple: Option<Coord2>) -> TestSession {
    let snake = Snake::new(body.iter().copied(), heading).unwrap();
    let engine = SnakeEngine::from_layout(GameConfig::new(size, 1, 11), snake, apple).unwrap();
    Session::from_engine(engine, period(), MemoryStorage::new(), Scene::default())
}

fn assert_render_matches_board(session: &TestSession) {
    for (coords, cell) in session.engine().board().iter() {
        assert_eq!(session.render_sync().handle(coords), Some(&cell), "at {:?}", coords);
    }
}

#[test]
fn eating_from_the_corner() {
    let mut session = layout_session((10, 10), &[(0, 0)], Direction::Right, Some((0, 1)));
    assert_eq!(session.renderer().created, 100);

    assert_eq!(tick(&mut session), 1);

    let engine = session.engine();
    assert_eq!(engine.score(), 1);
    assert_eq!(engine.cell_at((0, 1)).unwrap(), Cell::SnakeBody);
    assert_eq!(engine.snake().len(), 2);
    let apple = engine.apple().unwrap();
    assert_ne!(apple, (0, 1));
    assert!(!engine.snake().contains(apple));

    let events = session.take_events();
    let GameEvent::BoardChanged(updates) = &events[0] else {
        panic!("expected a board change first, got {:?}", events);
    };
    assert_eq!(updates.len(), 2);
    assert!(updates.contains(&CellUpdate {
        coords: (0, 1),
        cell: Cell::SnakeBody
    }));
    assert!(updates.contains(&CellUpdate {
        coords: apple,
        cell: Cell::Apple
    }));
    assert_eq!(&events[1..], [GameEvent::ScoreChanged(1), GameEvent::AppleEaten]);
    assert_eq!(session.renderer().updated.len(), 2);
    assert_render_matches_board(&session);
}

#[test]
fn non_eating_moves_shift_the_body() {
    let mut session = layout_session(
        (10, 10),
        &[(5, 5), (5, 4), (5, 3)],
        Direction::Right,
        Some((0, 0)),
    );

    tick(&mut session);
    session.set_direction(Direction::Down);
    tick(&mut session);
    tick(&mut session);

    let body: Vec<_> = session.engine().snake().iter().collect();
    assert_eq!(body, [(7, 6), (6, 6), (5, 6)]);
    assert_eq!(session.engine().board().count(Cell::SnakeBody), 3);
    assert_eq!(session.score(), 0);

    // every move clears one cell and fills one
    for event in session.take_events() {
        let GameEvent::BoardChanged(updates) = event else {
            panic!("unexpected event {:?}", event);
        };
        assert_eq!(updates.len(), 2);
    }
    assert_render_matches_board(&session);
}

#[test]
fn collision_freezes_the_board() {
    let mut session = layout_session((4, 4), &[(0, 1), (0, 0)], Direction::Up, Some((3, 3)));
    let before = session.engine().board().clone();

    assert_eq!(tick(&mut session), 1);
    assert_eq!(session.state(), EngineState::GameOver);
    assert_eq!(session.take_events(), [GameEvent::GameOver { score: 0 }]);

    session.set_direction(Direction::Right);
    assert_eq!(session.advance(Duration::from_secs(10)), 0);
    assert_eq!(session.step(), None);
    assert_eq!(session.engine().board(), &before);
    assert!(session.take_events().is_empty());
    assert!(session.renderer().updated.is_empty());
}

#[test]
fn restart_resets_everything_and_rearms() {
    let mut session = layout_session((6, 6), &[(0, 1), (0, 0)], Direction::Right, Some((0, 2)));
    session.set_tick_period(TickPeriod::from_millis(300));
    session.advance(Duration::from_millis(100));
    assert_eq!(session.score(), 1);

    // run into the right wall, possibly eating on the way
    while session.state().is_running() {
        session.advance(Duration::from_millis(300));
    }
    let final_score = session.score();
    assert!(final_score >= 1);
    assert_eq!(session.best_score(), final_score);
    session.take_events();

    session.restart();

    assert_eq!(session.state(), EngineState::Running);
    assert_eq!(session.score(), 0);
    let board = session.engine().board();
    assert_eq!(board.count(Cell::SnakeBody), 1);
    assert_eq!(board.count(Cell::Apple), 1);
    assert_eq!(board.count(Cell::Empty), 34);
    assert!(session.scheduler().is_armed());
    assert_eq!(session.scheduler().period().as_millis(), 300);
    assert_eq!(session.best_score(), final_score);

    let events = session.take_events();
    assert_eq!(events[0], GameEvent::Restarted);
    assert!(matches!(events[1], GameEvent::BoardChanged(_)));
    assert_render_matches_board(&session);

    assert_eq!(session.advance(Duration::from_millis(299)), 0);
    assert_eq!(session.advance(Duration::from_millis(1)), 1);
}

#[test]
fn restart_is_idempotent_while_running() {
    let config = SessionConfig {
        game: GameConfig::new((8, 8), 2, 5),
        tick_period: period(),
    };
    let mut session = Session::new(config, MemoryStorage::new(), Scene::default());

    session.restart();
    session.restart();
    session.apply(Command::Restart);

    assert_eq!(session.state(), EngineState::Running);
    assert_eq!(session.engine().board().count(Cell::SnakeBody), 2);
    assert_eq!(session.engine().board().count(Cell::Apple), 1);
    assert_render_matches_board(&session);
}

#[test]
fn filling_the_board_is_a_win() {
    let mut session = layout_session((1, 3), &[(0, 1), (0, 0)], Direction::Right, Some((0, 2)));

    tick(&mut session);

    assert_eq!(session.state(), EngineState::Won);
    let events = session.take_events();
    assert_eq!(
        &events[1..],
        [
            GameEvent::ScoreChanged(1),
            GameEvent::AppleEaten,
            GameEvent::Win { score: 1 }
        ]
    );
    assert!(!session.scheduler().is_armed());
    assert_eq!(session.best_score(), 1);
}

#[test]
fn full_board_at_restart_is_an_immediate_win() {
    let config = SessionConfig {
        game: GameConfig::new((1, 1), 1, 2),
        tick_period: period(),
    };
    let mut session = Session::new(config, MemoryStorage::new(), Scene::default());

    session.restart();

    assert_eq!(session.state(), EngineState::Won);
    assert!(!session.scheduler().is_armed());
    let expected_board: CellUpdates = [CellUpdate {
        coords: (0, 0),
        cell: Cell::SnakeBody,
    }]
    .into_iter()
    .collect();
    assert_eq!(
        session.take_events(),
        [
            GameEvent::Restarted,
            GameEvent::BoardChanged(expected_board),
            GameEvent::Win { score: 0 },
        ]
    );
    assert_eq!(session.advance(Duration::from_secs(1)), 0);
}

#[test]
fn zero_width_config_still_plays() {
    let game: GameConfig =
        serde_json::from_str(r#"{"size":[5,0],"initial_length":1,"seed":0}"#).unwrap();
    let config = SessionConfig {
        game,
        tick_period: period(),
    };
    let mut session = Session::new(config, MemoryStorage::new(), Scene::default());

    assert_eq!(session.config().game.size, (5, 1));
    assert_eq!(session.renderer().created, 5);
    session.restart();
    assert_eq!(session.state(), EngineState::Running);
    assert_render_matches_board(&session);
}

#[test]
fn period_change_applies_after_the_running_interval() {
    let mut session = layout_session((10, 10), &[(5, 0)], Direction::Right, Some((0, 0)));

    session.advance(Duration::from_millis(50));
    session.apply(Command::SetTickPeriodMs(400));
    assert_eq!(session.advance(Duration::from_millis(50)), 1);
    assert_eq!(session.advance(Duration::from_millis(399)), 0);
    assert_eq!(session.advance(Duration::from_millis(1)), 1);
}

#[test]
fn events_serialize_as_json() {
    let event = GameEvent::BoardChanged(
        [CellUpdate {
            coords: (1, 2),
            cell: Cell::Apple,
        }]
        .into_iter()
        .collect(),
    );

    let json = serde_json::to_string(&event).unwrap();
    assert_eq!(
        json,
        r#"{"BoardChanged":[{"coords":[1,2],"cell":"Apple"}]}"#
    );
    let command: Command = serde_json::from_str(r#"{"SetDirection":"Up"}"#).unwrap();
    assert_eq!(command, Command::SetDirection(Direction::Up));
}
