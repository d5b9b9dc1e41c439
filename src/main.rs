//! Arcade Sim entry point
//!
//! Plays one game headlessly with a simple autopilot feeding commands, then
//! prints the final snapshot as JSON.
//!
//! Usage: `arcade-sim [snake|tetris|pong] [frames]`

use arcade_sim::consts::pong::PADDLE_HEIGHT;
use arcade_sim::highscores::{GameId, HighScores};
use arcade_sim::persistence::JsonFile;
use arcade_sim::platform::Driver;
use arcade_sim::sim::{Command, Direction, Engine, Phase, Pong, Session, Snake, Tetris};
use arcade_sim::{AudioManager, Settings};

/// Simulated display refresh
const FRAME_MS: f64 = 1000.0 / 60.0;
const DEFAULT_FRAMES: u32 = 60 * 60;

fn main() {
    #[cfg(not(target_arch = "wasm32"))]
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let game = args
        .next()
        .and_then(|s| GameId::from_str(&s))
        .unwrap_or(GameId::Snake);
    let frames = args
        .next()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_FRAMES);

    let settings = Settings::load(JsonFile::in_data_dir(Settings::FILE_NAME));
    let mut scores = HighScores::load(JsonFile::in_data_dir(HighScores::FILE_NAME));
    let seed = settings.session_seed();
    let difficulty = settings.pong_difficulty;
    let mut audio = AudioManager::with_settings(settings);
    log::info!("Playing {} for up to {} frames (seed {})", game.as_str(), frames, seed);

    let result = match game {
        GameId::Snake => run(Snake::new(seed), frames, &mut scores, &mut audio, steer_snake),
        GameId::Tetris => run(Tetris::new(seed), frames, &mut scores, &mut audio, stack_tetris),
        GameId::Pong => run(
            Pong::new(difficulty, seed),
            frames,
            &mut scores,
            &mut audio,
            track_ball,
        ),
    };

    match result {
        Ok(json) => println!("{json}"),
        Err(e) => log::error!("Failed to encode snapshot: {}", e),
    }
}

/// Drive one session until game over or the frame budget runs out
fn run<E: Engine>(
    engine: E,
    frames: u32,
    scores: &mut HighScores,
    audio: &mut AudioManager,
    pilot: fn(&E, u32) -> Vec<Command>,
) -> serde_json::Result<String> {
    let mut driver = Driver::new(Session::new(engine, &*scores));
    driver.push(Command::Start);

    for frame in 0..frames {
        for command in pilot(driver.session().engine(), frame) {
            driver.push(command);
        }
        driver.frame(FRAME_MS, scores, audio);
        driver.session().engine().save_preferences(audio.settings_mut());
        if driver.session().phase() == Phase::GameOver {
            log::info!("Game over after {} frames", frame + 1);
            break;
        }
    }

    log::info!("{} sound effects played", audio.drain().len());
    serde_json::to_string_pretty(&driver.session().snapshot())
}

/// Greedy: step toward the food, never into a wall or the body
fn steer_snake(snake: &Snake, _frame: u32) -> Vec<Command> {
    let head = snake.head();
    let food = snake.food();
    [Direction::Up, Direction::Down, Direction::Left, Direction::Right]
        .into_iter()
        .filter(|d| !d.is_reverse_of(snake.direction()))
        .filter(|d| {
            let next = head + d.delta();
            snake.grid().contains(next) && !snake.body().contains(&next)
        })
        .min_by_key(|d| (head + d.delta() - food).abs().element_sum())
        .map(Command::Move)
        .into_iter()
        .collect()
}

/// Rotate, slide and drop on a fixed rhythm
fn stack_tetris(tetris: &Tetris, frame: u32) -> Vec<Command> {
    let slide = if (frame / 30) % 2 == 0 {
        Direction::Left
    } else {
        Direction::Right
    };
    match frame % 30 {
        0 => vec![Command::Rotate],
        10 => vec![Command::Move(slide)],
        20 if tetris.active().origin.y > 2 => vec![Command::HardDrop],
        _ => Vec::new(),
    }
}

/// Keep the paddle center on the ball
fn track_ball(pong: &Pong, _frame: u32) -> Vec<Command> {
    let center = pong.player_y() + PADDLE_HEIGHT / 2.0;
    let ball_y = pong.ball().pos.y;
    if ball_y < center - 10.0 {
        vec![Command::Release(Direction::Down), Command::Move(Direction::Up)]
    } else if ball_y > center + 10.0 {
        vec![Command::Release(Direction::Up), Command::Move(Direction::Down)]
    } else {
        vec![Command::Release(Direction::Up), Command::Release(Direction::Down)]
    }
}
