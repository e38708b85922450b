// Entry point for the Whack-A-Mole TUI application
// Initializes configuration, language settings, and launches the main UI

use std::error::Error;

// Module declarations
mod xtw_color; // Cross-platform color matching utilities
mod xtw_game;  // Core game logic and configuration
mod xtw_lang;  // Multi-language string resources
mod xtw_ui;    // Terminal UI rendering and event handling

use xtw_game::load_or_create_config;
use xtw_lang::Lang;
use xtw_ui::run as run_ui;

fn main() -> Result<(), Box<dyn Error>> {
    // Load or create user configuration (preferences only)
    let mut cfg = load_or_create_config();

    // Initialize language resources based on saved or system language
    let mut lang = Lang::new(&cfg.language);

    // Launch the main UI loop
    run_ui(&mut cfg, &mut lang)
}
