use crossterm::event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEventKind};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Span, Spans, Text};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Terminal;
use std::error::Error;
use std::io;
use std::time::{Duration, Instant};

use crate::xtw_color::WTMatch;
use crate::xtw_game::{save_config, Config, Game, Phase, WhackOutcome, BOARD_SIZE, SPAWN_INTERVAL};
use crate::xtw_lang::Lang;
use rand::prelude::*;
use unicode_width::UnicodeWidthStr;

// Character dimensions of one board cell block (gaps between blocks are 1 char)
const CELL_W: usize = 7;
const CELL_H: usize = 3;

/// Fill successive `{}` placeholders in a localized format string
fn fill(fmt: &str, args: &[&str]) -> String {
    let mut out = fmt.to_string();
    for a in args {
        out = out.replacen("{}", a, 1);
    }
    out
}

fn reset_ui_after_new_game(game: &mut Game, ui: &mut UiState) {
    ui.reset_after_new_game();
    ui.cursor_indicator = Some(game.cursor);
}

// Group runtime UI variables into a single structure to simplify passing them around
#[derive(Debug)]
struct UiState {
    left_press: Option<(usize, usize)>,
    // simulate key release timer for terminals that don't emit release events
    key_timer: Option<Instant>,
    // runtime detection whether real key-release events are supported by the terminal
    supports_key_release: bool,
    // cursor indicator position (cell coords) for TUI
    cursor_indicator: Option<(usize, usize)>,
    // short feedback highlight on whacked cells: (cell, start, was_hit)
    whack_flash: Option<((usize, usize), Instant, bool)>,
    clicked_index: Option<usize>,
    click_instant: Option<Instant>,
    hover_index: Option<usize>,
    modal_close_hovered: bool,
    modal_close_pressed: bool,
    modal_rect: Option<Rect>,
    modal_close_rect: Option<Rect>,
    showing_help: bool,
    showing_about: bool,
    showing_options: bool,
    options_ascii: bool,
    options_indicator: bool,
    options_lang_zh: bool,
    options_ascii_rect: Option<Rect>,
    options_indicator_rect: Option<Rect>,
    options_lang_rect: Option<Rect>,
    options_focus: Option<u8>,
    exit_menu_item_down: bool, // Track when exit menu item is pressed, wait for release
    exit_status_hovered: bool,
    // start / restart / quit panel buttons (0=start, 1=restart, 2=quit)
    panel_hover: Option<u8>,
    panel_pressed: Option<u8>,
    start_btn_rect: Option<Rect>,
    restart_btn_rect: Option<Rect>,
    quit_btn_rect: Option<Rect>,
}

impl UiState {
    fn new() -> Self {
        UiState {
            left_press: None,
            key_timer: None,
            supports_key_release: cfg!(windows),
            cursor_indicator: None,
            whack_flash: None,
            clicked_index: None,
            click_instant: None,
            hover_index: None,
            modal_close_hovered: false,
            modal_close_pressed: false,
            modal_rect: None,
            modal_close_rect: None,
            showing_help: false,
            showing_about: false,
            showing_options: false,
            options_ascii: false,
            options_indicator: false,
            options_lang_zh: false,
            options_ascii_rect: None,
            options_indicator_rect: None,
            options_lang_rect: None,
            options_focus: None,
            exit_menu_item_down: false,
            exit_status_hovered: false,
            panel_hover: None,
            panel_pressed: None,
            start_btn_rect: None,
            restart_btn_rect: None,
            quit_btn_rect: None,
        }
    }

    fn reset_after_new_game(&mut self) {
        self.left_press = None;
        self.key_timer = None;
        self.supports_key_release = cfg!(windows);
        self.cursor_indicator = None;
        self.whack_flash = None;
        self.clicked_index = None;
        self.click_instant = None;
        self.hover_index = None;
        self.modal_close_hovered = false;
        self.modal_close_pressed = false;
        self.modal_rect = None;
        self.modal_close_rect = None;
        self.showing_help = false;
        self.showing_about = false;
        self.showing_options = false;
        self.options_ascii = false;
        self.options_indicator = false;
        self.options_lang_zh = false;
        self.options_ascii_rect = None;
        self.options_indicator_rect = None;
        self.options_lang_rect = None;
        self.options_focus = None;
        self.exit_menu_item_down = false;
        self.panel_hover = None;
        self.panel_pressed = None;
        self.start_btn_rect = None;
        self.restart_btn_rect = None;
        self.quit_btn_rect = None;
    }
}

/// Apply a whack to the board and record visual feedback for the cell
fn whack_cell(game: &mut Game, ui: &mut UiState, x: usize, y: usize) {
    match game.whack(x, y) {
        WhackOutcome::Hit => ui.whack_flash = Some(((x, y), Instant::now(), true)),
        WhackOutcome::Miss => ui.whack_flash = Some(((x, y), Instant::now(), false)),
        WhackOutcome::OutOfPlay => {}
    }
}

pub fn run(cfg: &mut Config, lang: &mut Lang) -> Result<(), Box<dyn Error>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnableMouseCapture, terminal::EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut game = Game::new(BOARD_SIZE);
    // grouped runtime UI state
    let mut ui = UiState::new();
    ui.cursor_indicator = Some(game.cursor);
    let mut menu_rect: Option<Rect> = None;
    let mut board_rect: Option<Rect> = None;
    let mut status_rect: Option<Rect> = None;
    let mut exit_requested: bool = false;

    let mut rng = thread_rng();
    // spawn scheduling marker; only consulted while playing
    let mut last_spawn = Instant::now();

    // Glyph computation helper: compute glyphs based on ascii_icons setting.
    let make_glyphs = |ascii: bool| {
        (
            (if ascii { "@" } else { "◉" }, Color::Yellow.wtmatch()),  // mole up
            (if ascii { "." } else { "·" }, Color::Gray.wtmatch()),    // empty hole
            (if ascii { "*" } else { "✶" }, Color::LightGreen.wtmatch()), // whacked
        )
    };

    // initialize glyphs once from current config
    let g_init = make_glyphs(cfg.ascii_icons);
    let mut glyph_mole = g_init.0;
    let mut glyph_hole = g_init.1;
    let mut glyph_hit = g_init.2;

    // Background color for the board (change this variable to alter background)
    let board_bg = Color::DarkGray.wtmatch();
    // Cursor background color (centralized)
    let cursor_bg = Color::LightBlue.wtmatch();
    // Flash colors for whack feedback
    let hit_bg = Color::Green.wtmatch();
    let miss_bg = Color::Red.wtmatch();
    let flash_fg = Color::White.wtmatch();
    // Menu / key label colors (centralized)
    let menu_key_fg = Color::Yellow.wtmatch();
    let menu_key_bg_hover = Color::LightBlue.wtmatch();
    let menu_key_bg_pressed = Color::Green.wtmatch();
    let menu_key_fg_pressed = Color::Black.wtmatch();
    // cursor indicator appearance
    let indicator_char = "▸";
    let indicator_fg = Color::Yellow.wtmatch();

    let tick_rate = Duration::from_millis(100);
    let mut last_tick = Instant::now();

    loop {
        // Centralized menu/key items (key, rest). Include Esc here so status can reuse it.
        let menu_items = [
            ("F1", lang.assets.menu_help),
            ("F2", lang.assets.menu_new),
            ("F7", lang.assets.menu_options),
            ("F9", lang.assets.menu_about),
            ("Esc", lang.assets.menu_exit),
        ];
        let assets = lang.assets.clone();

        terminal.draw(|f| {
            let size = f.size();
            let min_twidth = 60u16;
            let min_theight = 20u16;
            // If terminal too small, render a centered warning and skip normal UI
            if size.width < min_twidth || size.height < min_theight {
                let tw = format!("{}", min_twidth);
                let th = format!("{}", min_theight);
                let warn_lines = vec![
                    Spans::from(Span::raw(assets.tsmsg_line1)),
                    Spans::from(Span::raw(fill(assets.tsmsg_line2, &[&tw, &th]))),
                ];
                let warn = Paragraph::new(Text::from(warn_lines))
                    .block(Block::default().borders(Borders::ALL).title(assets.tsmsg_title))
                    .alignment(Alignment::Center);
                f.render_widget(Clear, size);
                let w = 40u16.min(size.width.saturating_sub(2));
                let h = 5u16.min(size.height.saturating_sub(2));
                let area = center_rect(w, h, size);
                f.render_widget(warn, area);
                return;
            }

            // layout: top menu row, center board, bottom status
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .margin(0)
                .constraints([Constraint::Length(3), Constraint::Min(6), Constraint::Length(3)].as_ref())
                .split(size);

            // menu row (per-item styled so hover/click mapping aligns with mouse offsets)
            let mut spans_vec: Vec<Span> = Vec::new();
            for (i, (label_key, label_rest)) in menu_items.iter().take(4).enumerate() {
                if i > 0 {
                    spans_vec.push(Span::raw("   "));
                }
                let (key_style, rest_style) = if Some(i) == ui.clicked_index {
                    (Style::default().bg(menu_key_bg_pressed).fg(menu_key_fg_pressed).add_modifier(Modifier::BOLD), Style::default().bg(menu_key_bg_pressed).fg(menu_key_fg_pressed))
                } else if Some(i) == ui.hover_index {
                    (Style::default().bg(menu_key_bg_hover).fg(menu_key_fg_pressed).add_modifier(Modifier::BOLD), Style::default().bg(menu_key_bg_hover).fg(menu_key_fg_pressed))
                } else {
                    (Style::default().fg(menu_key_fg).add_modifier(Modifier::BOLD), Style::default())
                };

                spans_vec.push(Span::styled(label_key.to_string(), key_style));
                spans_vec.push(Span::styled(format!(": {}", label_rest), rest_style));
            }
            // add one-space padding left and right inside the menu block
            spans_vec.insert(0, Span::raw(" "));
            spans_vec.push(Span::raw(" "));
            let menu = Paragraph::new(Spans::from(spans_vec)).block(Block::default().borders(Borders::ALL)).alignment(Alignment::Left);
            f.render_widget(menu, chunks[0]);
            menu_rect = Some(chunks[0]);

            // status row (left info + right-aligned Esc: Exit)
            let score_s = format!("{}", game.score);
            let miss_s = format!("{}", game.misses);
            let max_s = format!("{}", game.max_misses);
            let left_text = fill(assets.status_fmt, &[&score_s, &miss_s, &max_s]);
            let esc = menu_items[4];
            let right_key = esc.0;
            let right_rest = esc.1;
            let inner_w = chunks[2].width.saturating_sub(2) as usize;
            let left_w = left_text.as_str().width();
            // account for the ": " we add when rendering the right-hand key/rest
            let right_w = right_key.width() + 2 + right_rest.width();
            let mid_spaces = if inner_w > left_w + right_w + 1 { inner_w - left_w - right_w - 1 } else { 1 };
            let mut status_spans: Vec<Span> = Vec::new();
            status_spans.push(Span::raw(left_text));
            status_spans.push(Span::raw(" ".repeat(mid_spaces)));
            let mut key_style = Style::default().fg(menu_key_fg).add_modifier(Modifier::BOLD);
            let mut rest_style = Style::default();
            if ui.exit_menu_item_down {
                key_style = Style::default().bg(menu_key_bg_pressed).fg(menu_key_fg_pressed).add_modifier(Modifier::BOLD);
                rest_style = Style::default().bg(menu_key_bg_pressed).fg(menu_key_fg_pressed);
            } else if ui.exit_status_hovered {
                key_style = Style::default().bg(menu_key_bg_hover).fg(menu_key_fg_pressed).add_modifier(Modifier::BOLD);
                rest_style = Style::default().bg(menu_key_bg_hover).fg(menu_key_fg_pressed);
            }
            status_spans.push(Span::styled(right_key.to_string(), key_style));
            status_spans.push(Span::styled(format!(": {}", right_rest), rest_style));
            status_spans.push(Span::raw(" "));
            let status = Paragraph::new(Text::from(Spans::from(status_spans)))
                .block(Block::default().borders(Borders::ALL))
                .alignment(Alignment::Left);
            f.render_widget(status, chunks[2]);
            status_rect = Some(chunks[2]);

            // panel button rects are recomputed per frame
            ui.start_btn_rect = None;
            ui.restart_btn_rect = None;
            ui.quit_btn_rect = None;

            if game.phase == Phase::Start {
                // start panel instead of the board
                board_rect = None;
                let prect = center_rect(36, 9, chunks[1]);
                f.render_widget(Clear, prect);
                f.render_widget(Block::default().borders(Borders::ALL), prect);
                let inner = Rect::new(prect.x + 1, prect.y + 1, prect.width.saturating_sub(2), prect.height.saturating_sub(2));
                let lines = vec![
                    Spans::from(Span::raw("")),
                    Spans::from(Span::styled(assets.start_title, Style::default().fg(menu_key_fg).add_modifier(Modifier::BOLD))),
                    Spans::from(Span::raw("")),
                    Spans::from(Span::raw(assets.start_hint)),
                ];
                let p = Paragraph::new(Text::from(lines)).alignment(Alignment::Center);
                f.render_widget(p, inner);
                // START button
                let btn_w = assets.btn_start.width() as u16;
                let bx = inner.x + (inner.width.saturating_sub(btn_w)) / 2;
                let by = inner.y + inner.height.saturating_sub(1);
                let btn_rect = Rect::new(bx, by, btn_w, 1);
                ui.start_btn_rect = Some(btn_rect);
                let mut btn_style = Style::default().bg(Color::Gray).fg(Color::Black).add_modifier(Modifier::BOLD);
                if ui.panel_pressed == Some(0) { btn_style = Style::default().bg(Color::Green).fg(Color::Black).add_modifier(Modifier::BOLD); }
                else if ui.panel_hover == Some(0) { btn_style = Style::default().bg(Color::White).fg(Color::Black).add_modifier(Modifier::BOLD); }
                let btn = Paragraph::new(Spans::from(Span::styled(assets.btn_start, btn_style))).alignment(Alignment::Center).block(Block::default());
                f.render_widget(btn, btn_rect);
            } else {
                // board area: cells separated by one-char gaps
                let board_w = (BOARD_SIZE * CELL_W + (BOARD_SIZE - 1)) as u16 + 2;
                let board_h = (BOARD_SIZE * CELL_H + (BOARD_SIZE - 1)) as u16 + 2;
                let board_area = center_rect(board_w, board_h, chunks[1]);
                board_rect = Some(board_area);
                let mut lines = vec![];
                for y in 0..BOARD_SIZE {
                    for ly in 0..CELL_H {
                        let mut spans = vec![];
                        for x in 0..BOARD_SIZE {
                            if x > 0 {
                                spans.push(Span::raw(" "));
                            }
                            let idx = game.index(x, y);
                            let mut style = Style::default().bg(board_bg);
                            if game.cursor == (x, y) && game.phase == Phase::Playing {
                                style = style.bg(cursor_bg);
                            }
                            // apply flash style if this cell was just whacked
                            let mut flashed_hit = false;
                            if let Some(((fx, fy), t0, hit)) = ui.whack_flash {
                                if fx == x && fy == y && t0.elapsed() < Duration::from_millis(350) {
                                    style = style.bg(if hit { hit_bg } else { miss_bg }).fg(flash_fg).add_modifier(Modifier::BOLD);
                                    flashed_hit = hit;
                                }
                            }
                            if ly == CELL_H / 2 {
                                // middle line carries the glyph, centered in the block
                                let (glyph, gfg) = if flashed_hit {
                                    glyph_hit
                                } else if game.board[idx].active {
                                    glyph_mole
                                } else {
                                    glyph_hole
                                };
                                let pad = (CELL_W - 1) / 2;
                                // render cursor indicator if enabled and cursor is over this cell
                                if cfg.show_indicator && ui.cursor_indicator == Some((x, y)) && game.phase == Phase::Playing {
                                    let indicator_style = style.fg(indicator_fg).add_modifier(Modifier::BOLD);
                                    spans.push(Span::styled(indicator_char.to_string(), indicator_style));
                                    spans.push(Span::styled(" ".repeat(pad.saturating_sub(1)), style));
                                } else {
                                    spans.push(Span::styled(" ".repeat(pad), style));
                                }
                                spans.push(Span::styled(glyph.to_string(), style.fg(gfg)));
                                spans.push(Span::styled(" ".repeat(CELL_W - pad - 1), style));
                            } else {
                                spans.push(Span::styled(" ".repeat(CELL_W), style));
                            }
                        }
                        lines.push(Spans::from(spans));
                    }
                    if y + 1 < BOARD_SIZE {
                        lines.push(Spans::from(Span::raw("")));
                    }
                }
                let paragraph = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL).title(assets.start_title).title_alignment(Alignment::Center)).alignment(Alignment::Left);
                f.render_widget(paragraph, board_area);
            }

            if game.phase == Phase::GameOver {
                let gb = bottom_centered_block(40, 9, size);
                f.render_widget(Clear, gb);
                f.render_widget(Block::default().borders(Borders::ALL).title(assets.over_title), gb);
                let inner = Rect::new(gb.x + 1, gb.y + 1, gb.width.saturating_sub(2), gb.height.saturating_sub(2));
                let score_s = format!("{}", game.score);
                let lines = vec![
                    Spans::from(Span::raw("")),
                    Spans::from(Span::raw(assets.over_message)),
                    Spans::from(Span::raw(fill(assets.over_score_fmt, &[&score_s]))),
                ];
                let p = Paragraph::new(Text::from(lines)).alignment(Alignment::Center);
                f.render_widget(p, inner);
                // RESTART / QUIT buttons side by side
                let rw = assets.btn_restart.width() as u16;
                let qw = assets.btn_quit.width() as u16;
                let gap = 4u16;
                let total = rw + gap + qw;
                let bx = inner.x + (inner.width.saturating_sub(total)) / 2;
                let by = inner.y + inner.height.saturating_sub(1);
                let r_rect = Rect::new(bx, by, rw, 1);
                let q_rect = Rect::new(bx + rw + gap, by, qw, 1);
                ui.restart_btn_rect = Some(r_rect);
                ui.quit_btn_rect = Some(q_rect);
                let mut r_style = Style::default().bg(Color::Gray).fg(Color::Black).add_modifier(Modifier::BOLD);
                if ui.panel_pressed == Some(1) { r_style = Style::default().bg(Color::Green).fg(Color::Black).add_modifier(Modifier::BOLD); }
                else if ui.panel_hover == Some(1) { r_style = Style::default().bg(Color::White).fg(Color::Black).add_modifier(Modifier::BOLD); }
                let mut q_style = Style::default().bg(Color::Gray).fg(Color::Black).add_modifier(Modifier::BOLD);
                if ui.panel_pressed == Some(2) { q_style = Style::default().bg(Color::Green).fg(Color::Black).add_modifier(Modifier::BOLD); }
                else if ui.panel_hover == Some(2) { q_style = Style::default().bg(Color::White).fg(Color::Black).add_modifier(Modifier::BOLD); }
                f.render_widget(Paragraph::new(Spans::from(Span::styled(assets.btn_restart, r_style))), r_rect);
                f.render_widget(Paragraph::new(Spans::from(Span::styled(assets.btn_quit, q_style))), q_rect);
            }

            // modals
            ui.modal_close_rect = None;
            if ui.showing_options {
                let mrect = center_rect(32, 8, size);
                ui.modal_rect = Some(mrect);
                f.render_widget(Clear, mrect);
                f.render_widget(Block::default().borders(Borders::ALL).title(menu_items[2].1), mrect);
                let inner = Rect::new(mrect.x + 1, mrect.y + 1, mrect.width.saturating_sub(2), mrect.height.saturating_sub(2));
                let mut lines = vec![];
                let cb0 = if ui.options_indicator { "[x]" } else { "[ ]" };
                let cb1 = if ui.options_ascii { "[x]" } else { "[ ]" };
                let lang_name = if ui.options_lang_zh { assets.lang_chinese } else { assets.lang_english };
                let focus0 = ui.options_focus == Some(0);
                let focus1 = ui.options_focus == Some(1);
                let focus2 = ui.options_focus == Some(2);
                let focus_style = Style::default().bg(menu_key_bg_hover).fg(menu_key_fg_pressed).add_modifier(Modifier::BOLD);
                let label0 = format!("{} {}", cb0, assets.opt_show_indicator);
                let label1 = format!("{} {}", cb1, assets.opt_ascii_icons);
                let label2 = format!("{}: {}", assets.opt_language, lang_name);
                lines.push(Spans::from(Span::raw("")));
                lines.push(Spans::from(vec![Span::raw(" "), if focus0 { Span::styled(label0.clone(), focus_style) } else { Span::raw(label0.clone()) }]));
                lines.push(Spans::from(vec![Span::raw(" "), if focus1 { Span::styled(label1.clone(), focus_style) } else { Span::raw(label1.clone()) }]));
                lines.push(Spans::from(vec![Span::raw(" "), if focus2 { Span::styled(label2.clone(), focus_style) } else { Span::raw(label2.clone()) }]));
                let p = Paragraph::new(Text::from(lines)).alignment(Alignment::Left);
                f.render_widget(p, inner);
                // checkbox rects for mouse interaction
                // Only make the clickable area cover the visible label text, not the whole line
                ui.options_indicator_rect = Some(Rect::new(inner.x + 1, inner.y + 1, label0.as_str().width() as u16, 1));
                ui.options_ascii_rect = Some(Rect::new(inner.x + 1, inner.y + 2, label1.as_str().width() as u16, 1));
                ui.options_lang_rect = Some(Rect::new(inner.x + 1, inner.y + 3, label2.as_str().width() as u16, 1));
                // OK button
                let btn_w = assets.btn_ok.width() as u16;
                let bx = inner.x + (inner.width.saturating_sub(btn_w)) / 2;
                let by = inner.y + inner.height.saturating_sub(1);
                let btn_rect = Rect::new(bx, by, btn_w, 1);
                ui.modal_close_rect = Some(btn_rect);
                let mut btn_style = Style::default().bg(Color::Gray).fg(Color::Black).add_modifier(Modifier::BOLD);
                if ui.modal_close_pressed { btn_style = Style::default().bg(Color::Green).fg(Color::Black).add_modifier(Modifier::BOLD); }
                else if ui.modal_close_hovered { btn_style = Style::default().bg(Color::White).fg(Color::Black).add_modifier(Modifier::BOLD); }
                let btn = Paragraph::new(Spans::from(Span::styled(assets.btn_ok, btn_style))).alignment(Alignment::Center).block(Block::default());
                f.render_widget(btn, btn_rect);
            }

            if ui.showing_about {
                let mrect = center_rect(48, 9, size);
                ui.modal_rect = Some(mrect);
                f.render_widget(Clear, mrect);
                f.render_widget(Block::default().borders(Borders::ALL).title(menu_items[3].1), mrect);
                let inner = Rect::new(mrect.x + 1, mrect.y + 1, mrect.width.saturating_sub(2), mrect.height.saturating_sub(2));
                let ver = fill(assets.about_version_fmt, &[env!("CARGO_PKG_VERSION"), env!("CARGO_PKG_AUTHORS")]);
                let lines = vec![
                    Spans::from(Span::raw("")),
                    Spans::from(Span::raw(assets.about_description)),
                    Spans::from(Span::raw("")),
                    Spans::from(Span::raw(ver)),
                ];
                let p = Paragraph::new(Text::from(lines)).alignment(Alignment::Center);
                f.render_widget(p, inner);
                // close button
                let btn_w = assets.btn_close.width() as u16;
                let bx = inner.x + (inner.width.saturating_sub(btn_w)) / 2;
                let by = inner.y + inner.height.saturating_sub(1);
                let btn_rect = Rect::new(bx, by, btn_w, 1);
                ui.modal_close_rect = Some(btn_rect);
                let mut btn_style = Style::default().bg(Color::Gray).fg(Color::Black).add_modifier(Modifier::BOLD);
                if ui.modal_close_pressed { btn_style = Style::default().bg(Color::Green).fg(Color::Black).add_modifier(Modifier::BOLD); }
                else if ui.modal_close_hovered { btn_style = Style::default().bg(Color::White).fg(Color::Black).add_modifier(Modifier::BOLD); }
                let btn = Paragraph::new(Spans::from(Span::styled(assets.btn_close, btn_style))).alignment(Alignment::Center).block(Block::default());
                f.render_widget(btn, btn_rect);
            }

            if ui.showing_help {
                let mrect = center_rect(48, 11, size);
                ui.modal_rect = Some(mrect);
                f.render_widget(Clear, mrect);
                f.render_widget(Block::default().borders(Borders::ALL).title(menu_items[0].1), mrect);
                let inner = Rect::new(mrect.x + 1, mrect.y + 1, mrect.width.saturating_sub(2), mrect.height.saturating_sub(2));
                let help_lines = vec![
                    Spans::from(Span::raw("")),
                    Spans::from(Span::raw(assets.help_controls)),
                    Spans::from(Span::raw(assets.help_move)),
                    Spans::from(Span::raw(assets.help_whack)),
                    Spans::from(Span::raw("")),
                    Spans::from(Span::raw(assets.help_goal)),
                    Spans::from(Span::raw(assets.help_miss)),
                ];
                let p = Paragraph::new(Text::from(help_lines)).alignment(Alignment::Left);
                f.render_widget(p, inner);
                // close button
                let btn_w = assets.btn_close.width() as u16;
                let bx = inner.x + (inner.width.saturating_sub(btn_w)) / 2;
                let by = inner.y + inner.height.saturating_sub(1);
                let btn_rect = Rect::new(bx, by, btn_w, 1);
                ui.modal_close_rect = Some(btn_rect);
                let mut btn_style = Style::default().bg(Color::Gray).fg(Color::Black).add_modifier(Modifier::BOLD);
                if ui.modal_close_pressed { btn_style = Style::default().bg(Color::Green).fg(Color::Black).add_modifier(Modifier::BOLD); }
                else if ui.modal_close_hovered { btn_style = Style::default().bg(Color::White).fg(Color::Black).add_modifier(Modifier::BOLD); }
                let btn = Paragraph::new(Spans::from(Span::styled(assets.btn_close, btn_style))).alignment(Alignment::Center).block(Block::default());
                f.render_widget(btn, btn_rect);
            }
        })?;

        // bind cursor indicator to current logical cursor each frame so it's always synced
        ui.cursor_indicator = Some(game.cursor);

        // If no modal was rendered this frame, ensure close button state is cleared
        if !ui.showing_help && !ui.showing_about && !ui.showing_options {
            ui.modal_rect = None;
            ui.modal_close_hovered = false;
            ui.modal_close_pressed = false;
        }

        let timeout = tick_rate.checked_sub(last_tick.elapsed()).unwrap_or_else(|| Duration::from_secs(0));
        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(KeyEvent { code, kind, .. }) => {
                    match kind {
                        KeyEventKind::Press => {
                            if ui.showing_options {
                                match code {
                                    KeyCode::Esc => { ui.showing_options = false; ui.modal_rect = None; ui.modal_close_rect = None; ui.modal_close_pressed = false; ui.hover_index = None; ui.options_focus = None }
                                    KeyCode::Enter => {
                                        cfg.show_indicator = ui.options_indicator;
                                        cfg.ascii_icons = ui.options_ascii;
                                        cfg.language = if ui.options_lang_zh { "zh".to_string() } else { "en".to_string() };
                                        lang.switch_to(&cfg.language);
                                        // update glyphs when ascii_icons changes
                                        let g = make_glyphs(cfg.ascii_icons);
                                        glyph_mole = g.0;
                                        glyph_hole = g.1;
                                        glyph_hit = g.2;
                                        save_config(cfg);
                                        ui.showing_options = false;
                                        ui.modal_rect = None; ui.modal_close_rect = None; ui.modal_close_pressed = false; ui.hover_index = None; ui.options_focus = None
                                    }
                                    KeyCode::Up => {
                                        let fc = ui.options_focus.unwrap_or(0);
                                        ui.options_focus = Some(if fc == 0 { 2 } else { fc - 1 });
                                    }
                                    KeyCode::Down => {
                                        let fc = ui.options_focus.unwrap_or(0);
                                        ui.options_focus = Some((fc + 1) % 3);
                                    }
                                    KeyCode::Char(' ') => {
                                        match ui.options_focus.unwrap_or(0) {
                                            0 => ui.options_indicator = !ui.options_indicator,
                                            1 => ui.options_ascii = !ui.options_ascii,
                                            2 => ui.options_lang_zh = !ui.options_lang_zh,
                                            _ => {}
                                        }
                                    }
                                    _ => {}
                                }
                            } else if ui.showing_about {
                                // any key closes
                                ui.showing_about = false; ui.modal_rect = None; ui.modal_close_rect = None; ui.modal_close_pressed = false; ui.hover_index = None
                            } else if ui.showing_help {
                                ui.showing_help = false; ui.modal_rect = None; ui.modal_close_rect = None; ui.modal_close_pressed = false; ui.hover_index = None
                            } else {
                                match game.phase {
                                    Phase::Start => {
                                        match code {
                                            KeyCode::Esc => { break }
                                            KeyCode::Enter | KeyCode::Char(' ') => { game.start(); last_spawn = Instant::now(); }
                                            KeyCode::F(1) => { ui.showing_help = true }
                                            KeyCode::F(7) => { ui.options_ascii = cfg.ascii_icons; ui.options_indicator = cfg.show_indicator; ui.options_lang_zh = cfg.language == "zh"; ui.options_focus = Some(0); ui.showing_options = true }
                                            KeyCode::F(9) => { ui.showing_about = true }
                                            _ => {}
                                        }
                                    }
                                    Phase::GameOver => {
                                        match code {
                                            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => { break }
                                            KeyCode::Enter | KeyCode::Char('r') | KeyCode::Char('R') => {
                                                game.restart();
                                                reset_ui_after_new_game(&mut game, &mut ui);
                                                last_spawn = Instant::now();
                                            }
                                            KeyCode::F(1) => { ui.showing_help = true }
                                            KeyCode::F(2) => { game = Game::new(BOARD_SIZE); reset_ui_after_new_game(&mut game, &mut ui); }
                                            KeyCode::F(7) => { ui.options_ascii = cfg.ascii_icons; ui.options_indicator = cfg.show_indicator; ui.options_lang_zh = cfg.language == "zh"; ui.options_focus = Some(0); ui.showing_options = true }
                                            KeyCode::F(9) => { ui.showing_about = true }
                                            _ => {}
                                        }
                                    }
                                    Phase::Playing => {
                                        match code {
                                            KeyCode::Esc => { break }
                                            KeyCode::F(1) => { ui.showing_help = true }
                                            KeyCode::F(2) => { game = Game::new(BOARD_SIZE); reset_ui_after_new_game(&mut game, &mut ui); }
                                            KeyCode::F(7) => { ui.options_ascii = cfg.ascii_icons; ui.options_indicator = cfg.show_indicator; ui.options_lang_zh = cfg.language == "zh"; ui.options_focus = Some(0); ui.showing_options = true }
                                            KeyCode::F(9) => { ui.showing_about = true }
                                            KeyCode::Left => { game.step_cursor(-1, 0); ui.cursor_indicator = Some(game.cursor); }
                                            KeyCode::Right => { game.step_cursor(1, 0); ui.cursor_indicator = Some(game.cursor); }
                                            KeyCode::Up => { game.step_cursor(0, -1); ui.cursor_indicator = Some(game.cursor); }
                                            KeyCode::Down => { game.step_cursor(0, 1); ui.cursor_indicator = Some(game.cursor); }
                                            KeyCode::Char(' ') | KeyCode::Enter => {
                                                // press: show the press at the current cursor, whack on release
                                                ui.left_press = Some(game.cursor);
                                                if !ui.supports_key_release { ui.key_timer = Some(Instant::now()); }
                                            }
                                            _ => {}
                                        }
                                    }
                                }
                            }
                        }
                        KeyEventKind::Release => {
                            // handle key releases for whacks (ignored while a modal is open)
                            if !ui.showing_help && !ui.showing_about && !ui.showing_options {
                                match code {
                                    KeyCode::Char(' ') | KeyCode::Enter => {
                                        if let Some((px, py)) = ui.left_press {
                                            let (cx, cy) = game.cursor;
                                            if px == cx && py == cy {
                                                whack_cell(&mut game, &mut ui, cx, cy);
                                            }
                                        }
                                        ui.left_press = None;
                                        ui.key_timer = None;
                                        ui.supports_key_release = true;
                                    }
                                    _ => {}
                                }
                            }
                        }
                        _ => {}
                    }
                }
                Event::Mouse(me) => {
                    // if a modal is open, only respond to mouse events inside modal; otherwise handle menu
                    if let Some(mrect) = ui.modal_rect {
                        match me.kind {
                            MouseEventKind::Moved => {
                                let inside = me.column >= mrect.x && me.column <= mrect.x + mrect.width.saturating_sub(1) && me.row >= mrect.y && me.row <= mrect.y + mrect.height.saturating_sub(1);
                                if !inside {
                                    // ignore hover outside modal
                                    ui.modal_close_hovered = false;
                                } else {
                                    // if over close button, set hovered
                                    if let Some(btn) = ui.modal_close_rect {
                                        let in_btn = me.column >= btn.x && me.column <= btn.x + btn.width.saturating_sub(1) && me.row >= btn.y && me.row <= btn.y + btn.height.saturating_sub(1);
                                        ui.modal_close_hovered = in_btn;
                                    } else {
                                        ui.modal_close_hovered = false;
                                    }
                                    // Option rows follow the mouse while the options modal is shown
                                    if ui.showing_options {
                                        if let Some(rect) = ui.options_indicator_rect {
                                            if me.column >= rect.x && me.column <= rect.x + rect.width.saturating_sub(1) && me.row == rect.y {
                                                ui.options_focus = Some(0);
                                            }
                                        }
                                        if let Some(rect) = ui.options_ascii_rect {
                                            if me.column >= rect.x && me.column <= rect.x + rect.width.saturating_sub(1) && me.row == rect.y {
                                                ui.options_focus = Some(1);
                                            }
                                        }
                                        if let Some(rect) = ui.options_lang_rect {
                                            if me.column >= rect.x && me.column <= rect.x + rect.width.saturating_sub(1) && me.row == rect.y {
                                                ui.options_focus = Some(2);
                                            }
                                        }
                                    }
                                }
                            }
                            MouseEventKind::Down(MouseButton::Left) => {
                                let inside = me.column >= mrect.x && me.column <= mrect.x + mrect.width.saturating_sub(1) && me.row >= mrect.y && me.row <= mrect.y + mrect.height.saturating_sub(1);
                                if inside {
                                    // if click hits the CLOSE/OK button rect, mark pressed
                                    if let Some(btn) = ui.modal_close_rect {
                                        let in_btn = me.column >= btn.x && me.column <= btn.x + btn.width.saturating_sub(1) && me.row >= btn.y && me.row <= btn.y + btn.height.saturating_sub(1);
                                        if in_btn {
                                            ui.modal_close_pressed = true;
                                            continue;
                                        }
                                    }
                                    // Options modal click handling: toggle the row that was hit
                                    if ui.showing_options {
                                        if let Some(rect) = ui.options_indicator_rect {
                                            if me.column >= rect.x && me.column <= rect.x + rect.width.saturating_sub(1) && me.row == rect.y {
                                                ui.options_indicator = !ui.options_indicator;
                                                ui.options_focus = Some(0);
                                                continue;
                                            }
                                        }
                                        if let Some(rect) = ui.options_ascii_rect {
                                            if me.column >= rect.x && me.column <= rect.x + rect.width.saturating_sub(1) && me.row == rect.y {
                                                ui.options_ascii = !ui.options_ascii;
                                                ui.options_focus = Some(1);
                                                continue;
                                            }
                                        }
                                        if let Some(rect) = ui.options_lang_rect {
                                            if me.column >= rect.x && me.column <= rect.x + rect.width.saturating_sub(1) && me.row == rect.y {
                                                ui.options_lang_zh = !ui.options_lang_zh;
                                                ui.options_focus = Some(2);
                                                continue;
                                            }
                                        }
                                    }
                                }
                            }
                            MouseEventKind::Up(_) => {
                                // if we had pressed the close/OK button, check release inside button
                                if ui.modal_close_pressed {
                                    if let Some(btn) = ui.modal_close_rect {
                                        let in_btn = me.column >= btn.x && me.column <= btn.x + btn.width.saturating_sub(1) && me.row >= btn.y && me.row <= btn.y + btn.height.saturating_sub(1);
                                        if in_btn {
                                            if ui.showing_options {
                                                // apply option changes
                                                cfg.show_indicator = ui.options_indicator;
                                                cfg.ascii_icons = ui.options_ascii;
                                                cfg.language = if ui.options_lang_zh { "zh".to_string() } else { "en".to_string() };
                                                lang.switch_to(&cfg.language);
                                                let g = make_glyphs(cfg.ascii_icons);
                                                glyph_mole = g.0;
                                                glyph_hole = g.1;
                                                glyph_hit = g.2;
                                                save_config(cfg);
                                                ui.showing_options = false;
                                            } else {
                                                ui.showing_about = false;
                                                ui.showing_help = false;
                                            }
                                            // clear modal geometry so following mouse events are handled by main UI
                                            ui.modal_rect = None;
                                            ui.modal_close_rect = None;
                                            ui.hover_index = None;
                                        }
                                    }
                                    ui.modal_close_pressed = false;
                                }
                            }
                            MouseEventKind::Down(MouseButton::Right) => {
                                // Right-click anywhere in a modal closes it (like Esc)
                                ui.showing_help = false;
                                ui.showing_about = false;
                                ui.showing_options = false;
                                ui.modal_rect = None;
                                ui.modal_close_rect = None;
                                ui.modal_close_pressed = false;
                                ui.hover_index = None;
                            }
                            _ => {}
                        }
                    } else {
                        // no modal: decide whether the mouse targets the menu, status, a panel or the board
                        let menu_handled = if let Some(rect) = menu_rect {
                            // detect whether mouse is over the menu row
                            let start_x = rect.x + 2; // account for one-space left padding inside menu
                            let y = rect.y + 1;
                            if me.row == y {
                                match me.kind {
                                    MouseEventKind::Moved => {
                                        let mut offset = start_x;
                                        let mut found: Option<usize> = None;
                                        for (i, (k, r)) in menu_items.iter().take(4).enumerate() {
                                            if i > 0 { offset += 3; }
                                            // account for the ": " we add when rendering (use display width)
                                            let full_len = (k.width() + 2 + r.width()) as u16;
                                            let end = offset + full_len - 1;
                                            if me.column >= offset && me.column <= end {
                                                found = Some(i);
                                                break;
                                            }
                                            offset = end + 1;
                                        }
                                        ui.hover_index = found;
                                        // when over menu, clear board indicator
                                        ui.cursor_indicator = None;
                                        true
                                    }
                                    MouseEventKind::Down(MouseButton::Left) => {
                                        let mut consumed = false;
                                        let mut offset = start_x;
                                        for (i, (k, r)) in menu_items.iter().take(4).enumerate() {
                                            if i > 0 { offset += 3; }
                                            let full_len = (k.width() + 2 + r.width()) as u16;
                                            let end = offset + full_len - 1;
                                            if me.column >= offset && me.column <= end {
                                                ui.clicked_index = Some(i);
                                                ui.click_instant = Some(Instant::now());
                                                match i {
                                                    0 => ui.showing_help = true,
                                                    1 => { game = Game::new(BOARD_SIZE); reset_ui_after_new_game(&mut game, &mut ui); }
                                                    2 => { ui.options_ascii = cfg.ascii_icons; ui.options_indicator = cfg.show_indicator; ui.options_lang_zh = cfg.language == "zh"; ui.options_focus = Some(0); ui.showing_options = true }
                                                    3 => ui.showing_about = true,
                                                    _ => {}
                                                }
                                                consumed = true;
                                                break;
                                            }
                                            offset = end + 1;
                                        }
                                        consumed
                                    }
                                    MouseEventKind::Up(_) => {
                                        // Consume all Up events on menu row
                                        true
                                    }
                                    _ => false,
                                }
                            } else {
                                // mouse not on menu row -> clear hover
                                if let MouseEventKind::Moved = me.kind { ui.hover_index = None; }
                                false
                            }
                        } else { false };

                        if !menu_handled {
                            // handle status bar Esc: Exit mouse interactions (right-aligned label)
                            if let Some(srect) = status_rect {
                                let status_row = srect.y + 1;
                                if me.row == status_row {
                                    // compute positions matching rendering logic
                                    let score_s = format!("{}", game.score);
                                    let miss_s = format!("{}", game.misses);
                                    let max_s = format!("{}", game.max_misses);
                                    let left_text = fill(lang.assets.status_fmt, &[&score_s, &miss_s, &max_s]);
                                    let right_w = menu_items[4].0.width() + 2 + menu_items[4].1.width();
                                    let inner_w = srect.width.saturating_sub(2) as usize;
                                    let left_w = left_text.as_str().width();
                                    let mid_spaces = if inner_w > left_w + right_w + 1 { inner_w - left_w - right_w - 1 } else { 1 };
                                    let start_x = srect.x + 1 + left_w as u16 + mid_spaces as u16;
                                    let end_x = start_x + (right_w as u16).saturating_sub(1);
                                    match me.kind {
                                        MouseEventKind::Moved => {
                                            ui.exit_status_hovered = me.column >= start_x && me.column <= end_x;
                                        }
                                        MouseEventKind::Down(MouseButton::Left) => {
                                            if me.column >= start_x && me.column <= end_x {
                                                ui.exit_menu_item_down = true;
                                            }
                                        }
                                        MouseEventKind::Up(MouseButton::Left) => {
                                            if ui.exit_menu_item_down {
                                                ui.exit_menu_item_down = false;
                                                if me.column >= start_x && me.column <= end_x {
                                                    exit_requested = true;
                                                }
                                            }
                                        }
                                        _ => {}
                                    }
                                } else {
                                    ui.exit_status_hovered = false;
                                }
                            }

                            // panel buttons (start / restart / quit)
                            let hit_btn = |rect: Option<Rect>| -> bool {
                                match rect {
                                    Some(r) => me.column >= r.x && me.column <= r.x + r.width.saturating_sub(1) && me.row == r.y,
                                    None => false,
                                }
                            };
                            match me.kind {
                                MouseEventKind::Moved => {
                                    ui.panel_hover = if hit_btn(ui.start_btn_rect) { Some(0) }
                                        else if hit_btn(ui.restart_btn_rect) { Some(1) }
                                        else if hit_btn(ui.quit_btn_rect) { Some(2) }
                                        else { None };
                                }
                                MouseEventKind::Down(MouseButton::Left) => {
                                    if hit_btn(ui.start_btn_rect) { ui.panel_pressed = Some(0); }
                                    else if hit_btn(ui.restart_btn_rect) { ui.panel_pressed = Some(1); }
                                    else if hit_btn(ui.quit_btn_rect) { ui.panel_pressed = Some(2); }
                                }
                                MouseEventKind::Up(MouseButton::Left) => {
                                    if let Some(pressed) = ui.panel_pressed {
                                        ui.panel_pressed = None;
                                        match pressed {
                                            0 if hit_btn(ui.start_btn_rect) => {
                                                game.start();
                                                last_spawn = Instant::now();
                                            }
                                            1 if hit_btn(ui.restart_btn_rect) => {
                                                game.restart();
                                                reset_ui_after_new_game(&mut game, &mut ui);
                                                last_spawn = Instant::now();
                                            }
                                            2 if hit_btn(ui.quit_btn_rect) => {
                                                exit_requested = true;
                                            }
                                            _ => {}
                                        }
                                    }
                                }
                                _ => {}
                            }

                            // board interactions only while playing
                            if game.phase == Phase::Playing {
                                if let Some(brect) = board_rect {
                                    // map a mouse position to a cell, skipping the gap rows/columns
                                    let cell_at = |col: u16, row: u16| -> Option<(usize, usize)> {
                                        let inner = Rect::new(brect.x + 1, brect.y + 1, brect.width.saturating_sub(2), brect.height.saturating_sub(2));
                                        let inside = col >= inner.x && col <= inner.x + inner.width.saturating_sub(1) && row >= inner.y && row <= inner.y + inner.height.saturating_sub(1);
                                        if !inside {
                                            return None;
                                        }
                                        let local_x = (col - inner.x) as usize;
                                        let local_y = (row - inner.y) as usize;
                                        let cx = local_x / (CELL_W + 1);
                                        let cy = local_y / (CELL_H + 1);
                                        if local_x % (CELL_W + 1) == CELL_W || local_y % (CELL_H + 1) == CELL_H {
                                            return None; // gap between cell blocks
                                        }
                                        if cx < BOARD_SIZE && cy < BOARD_SIZE {
                                            Some((cx, cy))
                                        } else {
                                            None
                                        }
                                    };
                                    match me.kind {
                                        MouseEventKind::Moved => {
                                            if let Some((cx, cy)) = cell_at(me.column, me.row) {
                                                game.cursor = (cx, cy);
                                                ui.cursor_indicator = Some((cx, cy));
                                            }
                                        }
                                        MouseEventKind::Down(MouseButton::Left) => {
                                            if let Some((cx, cy)) = cell_at(me.column, me.row) {
                                                ui.left_press = Some((cx, cy));
                                            }
                                        }
                                        MouseEventKind::Up(MouseButton::Left) => {
                                            if let Some((cx, cy)) = cell_at(me.column, me.row) {
                                                if ui.left_press == Some((cx, cy)) {
                                                    whack_cell(&mut game, &mut ui, cx, cy);
                                                }
                                            }
                                            ui.left_press = None;
                                        }
                                        _ => {}
                                    }
                                }
                            }
                        }
                    }
                }
                _ => {}
            }
            if exit_requested { break; }
        }

        // handle simulated key release timer (100ms) for terminals that don't emit release events
        if let Some(t0) = ui.key_timer {
            if t0.elapsed() >= Duration::from_millis(100) {
                if let Some((px, py)) = ui.left_press {
                    let (cx, cy) = game.cursor;
                    if px == cx && py == cy {
                        whack_cell(&mut game, &mut ui, cx, cy);
                    }
                }
                ui.left_press = None;
                ui.key_timer = None;
            }
        }

        // clear click feedback after short duration
        if let Some(t0) = ui.click_instant {
            if t0.elapsed() > Duration::from_millis(200) {
                ui.clicked_index = None;
                ui.click_instant = None;
            }
        }

        // spawn scheduling: relocate the mole on the fixed interval while playing.
        // Runs on the same loop as input handling, so the tick and the click
        // handler never execute concurrently.
        if game.phase == Phase::Playing && last_spawn.elapsed() >= SPAWN_INTERVAL {
            game.spawn_tick(&mut rng);
            last_spawn = Instant::now();
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }
    }

    // Save current preferences before exiting
    save_config(cfg);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), DisableMouseCapture, terminal::LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

fn center_rect(width: u16, height: u16, r: Rect) -> Rect {
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + (r.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

fn bottom_centered_block(width: u16, height: u16, r: Rect) -> Rect {
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + r.height.saturating_sub(height);
    Rect::new(x, y, width, height)
}
