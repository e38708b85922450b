// Core game logic and configuration management
// Handles the board, mole spawn scheduling, scoring, and configuration persistence

use directories::ProjectDirs;
use rand::prelude::*;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Board edge length (the classic game is a 3x3 grid)
pub const BOARD_SIZE: usize = 3;
/// Points awarded for whacking an active mole
pub const HIT_POINTS: u32 = 10;
/// Number of misses that ends the session
pub const MAX_MISSES: u32 = 5;
/// How often the mole relocates while playing
pub const SPAWN_INTERVAL: Duration = Duration::from_millis(1000);

/// Session phase driven by user actions and the miss counter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Start,    // start menu shown, spawner idle
    Playing,  // board active, spawner running
    GameOver, // miss limit reached, spawner halted
}

/// Result of a whack attempt, reported back to the UI for feedback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WhackOutcome {
    Hit,       // active mole whacked, points awarded
    Miss,      // empty cell whacked, miss counted
    OutOfPlay, // not in the Playing phase, nothing happened
}

/// A single cell on the board
/// Position is implied by the cell's index in the board vector
#[derive(Clone, Copy, Default)]
pub struct Cell {
    pub active: bool, // a mole is currently up in this cell
}

/// Main game state
#[derive(Clone)]
pub struct Game {
    pub size: usize,            // Board edge length (size x size cells)
    pub board: Vec<Cell>,       // Board cells, row-major
    pub score: u32,             // Current point total
    pub misses: u32,            // Wrong whacks so far this session
    pub max_misses: u32,        // Miss limit that ends the session
    pub phase: Phase,           // Current session phase
    pub cursor: (usize, usize), // Current cursor position (for keyboard play)
    prev_mole: Option<usize>,   // Index of the most recently spawned mole
}

impl Game {
    /// Create a new game on the start menu with an empty board
    pub fn new(size: usize) -> Self {
        Game {
            size,
            board: vec![Cell::default(); size * size],
            score: 0,
            misses: 0,
            max_misses: MAX_MISSES,
            phase: Phase::Start,
            cursor: (0, 0),
            prev_mole: None,
        }
    }

    /// Convert (x, y) coordinates to flat array index
    pub fn index(&self, x: usize, y: usize) -> usize {
        y * self.size + x
    }

    /// Begin playing from the start menu
    pub fn start(&mut self) {
        if self.phase == Phase::Start {
            self.phase = Phase::Playing;
        }
    }

    /// Relocate the mole: deactivate the previous cell and activate a new,
    /// different, randomly chosen one
    /// Invoked on the spawn interval while playing; a no-op in any other phase
    ///
    /// A mole timing out unclaimed is not penalized - only wrong whacks
    /// count as misses
    pub fn spawn_tick(&mut self, rng: &mut impl Rng) {
        if self.phase != Phase::Playing {
            return;
        }
        if let Some(prev) = self.prev_mole {
            self.board[prev].active = false;
        }
        let n = self.size * self.size;
        // Rejection sampling: the new mole must differ from the previous one.
        // With 9 cells the expected number of resamples is about 1/8.
        let mut i = rng.gen_range(0..n);
        while n > 1 && Some(i) == self.prev_mole {
            i = rng.gen_range(0..n);
        }
        self.board[i].active = true;
        self.prev_mole = Some(i);
    }

    /// Whack the cell at (x, y)
    /// - Active cell: mole goes down, points awarded
    /// - Inactive cell: miss counted; reaching the limit ends the session
    pub fn whack(&mut self, x: usize, y: usize) -> WhackOutcome {
        if self.phase != Phase::Playing {
            return WhackOutcome::OutOfPlay;
        }
        let idx = self.index(x, y);
        if self.board[idx].active {
            self.board[idx].active = false;
            // prev_mole is kept so the next spawn still avoids this cell
            self.score += HIT_POINTS;
            WhackOutcome::Hit
        } else {
            self.misses += 1;
            if self.misses >= self.max_misses {
                self.end_session();
            }
            WhackOutcome::Miss
        }
    }

    /// Restart after game over: counters cleared, board emptied, playing again
    pub fn restart(&mut self) {
        self.score = 0;
        self.misses = 0;
        self.prev_mole = None;
        for c in self.board.iter_mut() {
            c.active = false;
        }
        self.phase = Phase::Playing;
    }

    /// Position of the currently active mole, if one is up
    pub fn active_cell(&self) -> Option<(usize, usize)> {
        self.board
            .iter()
            .position(|c| c.active)
            .map(|i| (i % self.size, i / self.size))
    }

    pub fn step_cursor(&mut self, dx: isize, dy: isize) {
        let nx = (self.cursor.0 as isize + dx).clamp(0, (self.size - 1) as isize) as usize;
        let ny = (self.cursor.1 as isize + dy).clamp(0, (self.size - 1) as isize) as usize;
        self.cursor = (nx, ny);
    }

    /// End the session: halt spawning and take any remaining mole down
    fn end_session(&mut self) {
        for c in self.board.iter_mut() {
            c.active = false;
        }
        self.phase = Phase::GameOver;
    }
}

/// User configuration (preferences only; no game data is stored)
/// Persisted to disk as TOML
#[derive(Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub ascii_icons: bool,    // Use ASCII fallback glyphs
    pub show_indicator: bool, // Show cursor position indicator
    pub language: String,     // Language code ("en" or "zh")
}

impl Default for Config {
    fn default() -> Self {
        // Auto-detect system language on first run
        let system_lang = sys_locale::get_locale().unwrap_or_else(|| "en".to_string());
        let lang = if system_lang.to_lowercase().starts_with("zh") {
            "zh".to_string()
        } else {
            "en".to_string()
        };

        Config {
            ascii_icons: false,
            show_indicator: false,
            language: lang,
        }
    }
}

/// Get the configuration file path
/// Uses platform-specific config directory (e.g., ~/.config/xtwamo/xtwamo.toml on Linux)
/// Falls back to current directory if ProjectDirs is unavailable
pub fn config_path() -> Option<PathBuf> {
    // ProjectDirs::from("com","xhbl", exe_name) -> config_dir/<exe_name>.toml
    if let Ok(exe) = env::current_exe() {
        if let Some(name) = exe.file_stem().and_then(|s| s.to_str()) {
            if let Some(proj) = ProjectDirs::from("com", "xhbl", name) {
                let mut path = proj.config_dir().to_path_buf();
                path.push(format!("{}.toml", name));
                return Some(path);
            } else {
                // fallback to current directory
                if let Ok(mut path) = env::current_dir() {
                    path.push(format!("{}.toml", name));
                    return Some(path);
                }
            }
        }
    }
    None
}

/// Load configuration from disk, or create default if not found
pub fn load_or_create_config() -> Config {
    if let Some(path) = config_path() {
        if path.exists() {
            if let Ok(s) = fs::read_to_string(&path) {
                if let Ok(cfg) = toml::from_str::<Config>(&s) {
                    return cfg;
                }
            }
        }
        let cfg = Config::default();
        if let Ok(s) = toml::to_string(&cfg) {
            if let Some(parent) = path.parent() {
                let _ = fs::create_dir_all(parent);
            }
            let _ = fs::write(&path, s);
        }
        return cfg;
    }
    Config::default()
}

/// Save configuration to disk as TOML
pub fn save_config(cfg: &Config) {
    if let Some(path) = config_path() {
        if let Ok(s) = toml::to_string(cfg) {
            if let Some(parent) = path.parent() {
                let _ = fs::create_dir_all(parent);
            }
            let _ = fs::write(&path, s);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn playing_game() -> Game {
        let mut g = Game::new(BOARD_SIZE);
        g.start();
        g
    }

    fn active_count(g: &Game) -> usize {
        g.board.iter().filter(|c| c.active).count()
    }

    #[test]
    fn new_game_starts_on_menu_with_empty_board() {
        let g = Game::new(BOARD_SIZE);
        assert_eq!(g.phase, Phase::Start);
        assert_eq!(g.score, 0);
        assert_eq!(g.misses, 0);
        assert_eq!(active_count(&g), 0);
        assert_eq!(g.active_cell(), None);
    }

    #[test]
    fn spawn_activates_exactly_one_cell() {
        let mut g = playing_game();
        let mut rng = StdRng::seed_from_u64(7);
        g.spawn_tick(&mut rng);
        assert_eq!(active_count(&g), 1);
        assert!(g.active_cell().is_some());
    }

    #[test]
    fn spawn_never_repeats_previous_cell() {
        let mut g = playing_game();
        let mut rng = StdRng::seed_from_u64(42);
        let mut prev: Option<(usize, usize)> = None;
        for _ in 0..200 {
            g.spawn_tick(&mut rng);
            let cur = g.active_cell();
            assert!(cur.is_some());
            assert_eq!(active_count(&g), 1);
            if prev.is_some() {
                assert_ne!(cur, prev);
            }
            prev = cur;
        }
    }

    #[test]
    fn spawn_is_a_noop_before_start() {
        let mut g = Game::new(BOARD_SIZE);
        let mut rng = StdRng::seed_from_u64(1);
        g.spawn_tick(&mut rng);
        assert_eq!(active_count(&g), 0);
    }

    #[test]
    fn single_cell_board_can_respawn_in_place() {
        let mut g = Game::new(1);
        g.start();
        let mut rng = StdRng::seed_from_u64(3);
        g.spawn_tick(&mut rng);
        assert_eq!(g.active_cell(), Some((0, 0)));
        // With only one cell the previous-cell rule cannot apply
        g.spawn_tick(&mut rng);
        assert_eq!(g.active_cell(), Some((0, 0)));
    }

    #[test]
    fn hit_awards_points_and_lowers_mole() {
        let mut g = playing_game();
        let mut rng = StdRng::seed_from_u64(9);
        g.spawn_tick(&mut rng);
        let (x, y) = g.active_cell().unwrap();
        assert_eq!(g.whack(x, y), WhackOutcome::Hit);
        assert_eq!(g.score, HIT_POINTS);
        assert_eq!(g.misses, 0);
        assert_eq!(active_count(&g), 0);
    }

    #[test]
    fn whack_on_empty_cell_counts_miss_not_score() {
        let mut g = playing_game();
        let mut rng = StdRng::seed_from_u64(9);
        g.spawn_tick(&mut rng);
        let (ax, ay) = g.active_cell().unwrap();
        let (x, y) = if ax == 0 && ay == 0 { (1, 1) } else { (0, 0) };
        assert_eq!(g.whack(x, y), WhackOutcome::Miss);
        assert_eq!(g.misses, 1);
        assert_eq!(g.score, 0);
        // The mole is still up where it was
        assert_eq!(g.active_cell(), Some((ax, ay)));
    }

    #[test]
    fn next_spawn_avoids_the_cell_just_hit() {
        let mut g = playing_game();
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..100 {
            g.spawn_tick(&mut rng);
            let hit = g.active_cell().unwrap();
            assert_eq!(g.whack(hit.0, hit.1), WhackOutcome::Hit);
            g.spawn_tick(&mut rng);
            assert_ne!(g.active_cell().unwrap(), hit);
        }
    }

    #[test]
    fn reaching_miss_limit_ends_the_session() {
        let mut g = playing_game();
        let mut rng = StdRng::seed_from_u64(5);
        g.spawn_tick(&mut rng);
        let (ax, ay) = g.active_cell().unwrap();
        let (x, y) = if ax == 0 && ay == 0 { (1, 1) } else { (0, 0) };
        for i in 1..=MAX_MISSES {
            assert_eq!(g.whack(x, y), WhackOutcome::Miss);
            assert_eq!(g.misses, i);
        }
        assert_eq!(g.phase, Phase::GameOver);
        // Board cleared and spawner halted
        assert_eq!(active_count(&g), 0);
        g.spawn_tick(&mut rng);
        assert_eq!(active_count(&g), 0);
        // Further whacks change nothing
        assert_eq!(g.whack(x, y), WhackOutcome::OutOfPlay);
        assert_eq!(g.misses, MAX_MISSES);
    }

    #[test]
    fn restart_resets_counters_and_resumes_play() {
        let mut g = playing_game();
        let mut rng = StdRng::seed_from_u64(5);
        g.spawn_tick(&mut rng);
        let (ax, ay) = g.active_cell().unwrap();
        assert_eq!(g.whack(ax, ay), WhackOutcome::Hit);
        let (x, y) = if ax == 0 && ay == 0 { (1, 1) } else { (0, 0) };
        for _ in 0..MAX_MISSES {
            g.whack(x, y);
        }
        assert_eq!(g.phase, Phase::GameOver);
        g.restart();
        assert_eq!(g.phase, Phase::Playing);
        assert_eq!(g.score, 0);
        assert_eq!(g.misses, 0);
        assert_eq!(active_count(&g), 0);
        // A new spawn cycle begins
        g.spawn_tick(&mut rng);
        assert_eq!(active_count(&g), 1);
    }

    // Full session walkthrough: start, hit, relocation, game over, restart
    #[test]
    fn full_session_scenario() {
        let mut g = Game::new(BOARD_SIZE);
        let mut rng = StdRng::seed_from_u64(2024);
        g.start();
        assert_eq!(g.phase, Phase::Playing);

        g.spawn_tick(&mut rng);
        assert_eq!(active_count(&g), 1);
        let first = g.active_cell().unwrap();
        assert_eq!(g.whack(first.0, first.1), WhackOutcome::Hit);
        assert_eq!(g.score, 10);
        assert_eq!(g.misses, 0);

        g.spawn_tick(&mut rng);
        let second = g.active_cell().unwrap();
        assert_ne!(second, first);

        let wrong = (0..BOARD_SIZE * BOARD_SIZE)
            .map(|i| (i % BOARD_SIZE, i / BOARD_SIZE))
            .find(|&c| c != second)
            .unwrap();
        for _ in 0..MAX_MISSES {
            g.whack(wrong.0, wrong.1);
        }
        assert_eq!(g.phase, Phase::GameOver);
        assert_eq!(g.score, 10);
        assert_eq!(g.misses, 5);

        g.restart();
        assert_eq!(g.phase, Phase::Playing);
        assert_eq!(g.score, 0);
        assert_eq!(g.misses, 0);
    }

    #[test]
    fn cursor_stays_on_the_board() {
        let mut g = Game::new(BOARD_SIZE);
        g.step_cursor(-1, -1);
        assert_eq!(g.cursor, (0, 0));
        g.step_cursor(5, 5);
        assert_eq!(g.cursor, (2, 2));
        g.step_cursor(-1, 0);
        assert_eq!(g.cursor, (1, 2));
    }
}
