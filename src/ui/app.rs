//! Main UI Application
//!
//! Draws the map and sidebar and turns key presses into session operations.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use rand::Rng;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use super::colors::{biome_color, feature_glyph, glyph_color};
use crate::editor::{EditError, MapEditorSession, SessionState};
use crate::save::MapStore;
use crate::scene::SceneMaterializer;
use crate::world::Feature;

/// Screen columns per map cell
const CELL_WIDTH: u16 = 2;

/// Main UI application
pub struct App {
    /// Cell under the cursor
    cursor: (u32, u32),
    /// Index into the session's template list
    template_cursor: usize,
    /// Last status line message
    status: String,
    /// Fixed generation seed, or random per generate
    terrain_seed: Option<u64>,
}

impl App {
    pub fn new(terrain_seed: Option<u64>) -> Self {
        Self {
            cursor: (0, 0),
            template_cursor: 0,
            status: "Tab to pick a template, Space to paint".to_string(),
            terrain_seed,
        }
    }

    pub fn cursor(&self) -> (u32, u32) {
        self.cursor
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    /// Handle a key press, returning true when the editor should quit
    pub fn handle_input<S: MapStore, M: SceneMaterializer>(
        &mut self,
        key: KeyEvent,
        session: &mut MapEditorSession<S, M>,
    ) -> Result<bool> {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Ok(true);
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => {
                if session.is_dirty() {
                    log::warn!("Quitting with uncommitted edits to '{}'", session.map_name());
                }
                return Ok(true);
            }
            KeyCode::Left | KeyCode::Char('h') => self.move_cursor(session, -1, 0),
            KeyCode::Right | KeyCode::Char('l') => self.move_cursor(session, 1, 0),
            KeyCode::Up | KeyCode::Char('k') => self.move_cursor(session, 0, -1),
            KeyCode::Down | KeyCode::Char('j') => self.move_cursor(session, 0, 1),
            KeyCode::Tab => self.cycle_template(session, 1),
            KeyCode::BackTab => self.cycle_template(session, -1),
            KeyCode::Char(' ') | KeyCode::Enter => {
                let (x, y) = self.cursor;
                match session.paint(x, y) {
                    Ok(true) => self.status = format!("Painted ({}, {})", x, y),
                    Ok(false) => self.status = format!("({}, {}) unchanged", x, y),
                    Err(e) => self.report(e),
                }
            }
            KeyCode::Char(c @ '1'..='5') => {
                let feature = Feature::ALL[(c as u8 - b'1') as usize];
                let (x, y) = self.cursor;
                match session.toggle_feature(x, y, feature) {
                    Ok(true) => self.status = format!("Added {} at ({}, {})", feature.name(), x, y),
                    Ok(false) => self.status = format!("Removed {} at ({}, {})", feature.name(), x, y),
                    Err(e) => self.report(e),
                }
            }
            KeyCode::Char('r') => {
                let grid = session.reset_to_default();
                self.status = format!("Reset to {}x{} default", grid.width(), grid.height());
                self.clamp_cursor(session);
            }
            KeyCode::Char('g') => {
                let seed = self.terrain_seed.unwrap_or_else(|| rand::thread_rng().gen());
                match session.generate(seed) {
                    Ok(_) => self.status = format!("Generated terrain (seed {})", seed),
                    Err(e) => self.report(e),
                }
            }
            KeyCode::Char('+') | KeyCode::Char('=') => self.resize_by(session, 1),
            KeyCode::Char('-') => self.resize_by(session, -1),
            KeyCode::Char('s') => match session.commit() {
                Ok(()) => self.status = format!("Committed '{}'", session.map_name()),
                Err(e) => self.report(e),
            },
            _ => {}
        }

        Ok(false)
    }

    fn report(&mut self, error: EditError) {
        log::warn!("Edit failed: {}", error);
        self.status = error.to_string();
    }

    fn move_cursor<S: MapStore, M: SceneMaterializer>(
        &mut self,
        session: &MapEditorSession<S, M>,
        dx: i64,
        dy: i64,
    ) {
        let Some((width, height)) = session.dimensions() else {
            return;
        };
        let x = (self.cursor.0 as i64 + dx).clamp(0, width as i64 - 1);
        let y = (self.cursor.1 as i64 + dy).clamp(0, height as i64 - 1);
        self.cursor = (x as u32, y as u32);
    }

    fn clamp_cursor<S: MapStore, M: SceneMaterializer>(&mut self, session: &MapEditorSession<S, M>) {
        self.move_cursor(session, 0, 0);
    }

    fn cycle_template<S: MapStore, M: SceneMaterializer>(
        &mut self,
        session: &mut MapEditorSession<S, M>,
        step: isize,
    ) {
        let count = session.templates().len();
        if count == 0 {
            self.status = "No templates loaded".to_string();
            return;
        }
        // The first Tab selects the template under the cursor rather than skipping it
        let next = if session.active_template().is_none() {
            self.template_cursor % count
        } else {
            (self.template_cursor as isize + step).rem_euclid(count as isize) as usize
        };
        self.template_cursor = next;

        let id = session.templates()[next].id.clone();
        match session.select_template(&id) {
            Ok(template) => self.status = format!("Selected {}", template.id),
            Err(e) => self.report(e),
        }
    }

    fn resize_by<S: MapStore, M: SceneMaterializer>(&mut self, session: &mut MapEditorSession<S, M>, delta: i64) {
        let Some((width, height)) = session.dimensions() else {
            self.report(EditError::NotInitialized("resize"));
            return;
        };
        let width = (width as i64 + delta).max(0) as u32;
        let height = (height as i64 + delta).max(0) as u32;
        match session.resize(width, height) {
            Ok(()) => {
                self.status = format!("Resized to {}x{}", width, height);
                self.clamp_cursor(session);
            }
            Err(e) => self.report(e),
        }
    }

    /// Render the editor
    pub fn render<S: MapStore, M: SceneMaterializer>(&self, frame: &mut Frame, session: &MapEditorSession<S, M>) {
        frame.render_widget(Clear, frame.area());

        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(20), Constraint::Length(28)])
            .split(frame.area());

        let left_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(5), Constraint::Length(3)])
            .split(chunks[0]);

        self.render_map(frame, session, left_chunks[0]);
        self.render_status(frame, left_chunks[1]);
        self.render_sidebar(frame, session, chunks[1]);
    }

    fn render_map<S: MapStore, M: SceneMaterializer>(
        &self,
        frame: &mut Frame,
        session: &MapEditorSession<S, M>,
        area: Rect,
    ) {
        let dirty = if session.is_dirty() { "*" } else { "" };
        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!(" {}{} ", session.map_name(), dirty))
            .border_style(Style::default().fg(Color::DarkGray));

        let inner = block.inner(area);
        frame.render_widget(block, area);

        let Some(grid) = session.grid() else {
            frame.render_widget(Paragraph::new("No map loaded"), inner);
            return;
        };

        // Scroll so the cursor stays in view
        let view_cols = (inner.width / CELL_WIDTH) as u32;
        let view_rows = inner.height as u32;
        let cam_x = scroll_offset(self.cursor.0, view_cols, grid.width());
        let cam_y = scroll_offset(self.cursor.1, view_rows, grid.height());

        let buf = frame.buffer_mut();
        for screen_y in 0..view_rows.min(grid.height() - cam_y) {
            for screen_x in 0..view_cols.min(grid.width() - cam_x) {
                let (map_x, map_y) = (cam_x + screen_x, cam_y + screen_y);
                let Ok(tile) = grid.get(map_x, map_y) else {
                    continue;
                };

                let mut style = Style::default()
                    .fg(glyph_color(tile.biome))
                    .bg(biome_color(tile.biome));
                if (map_x, map_y) == self.cursor {
                    style = style.add_modifier(Modifier::REVERSED | Modifier::BOLD);
                }

                let cell_x = inner.x + screen_x as u16 * CELL_WIDTH;
                let cell_y = inner.y + screen_y as u16;
                buf[(cell_x, cell_y)].set_char(feature_glyph(tile.features));
                buf[(cell_x, cell_y)].set_style(style);
                buf[(cell_x + 1, cell_y)].set_char(' ');
                buf[(cell_x + 1, cell_y)].set_style(style);
            }
        }
    }

    fn render_status(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray));
        let para = Paragraph::new(Span::styled(&self.status, Style::default().fg(Color::Cyan))).block(block);
        frame.render_widget(para, area);
    }

    fn render_sidebar<S: MapStore, M: SceneMaterializer>(
        &self,
        frame: &mut Frame,
        session: &MapEditorSession<S, M>,
        area: Rect,
    ) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(" Editor ")
            .border_style(Style::default().fg(Color::DarkGray));

        let label = Style::default().fg(Color::DarkGray);
        let mut lines = Vec::new();

        let state = match session.state() {
            SessionState::Uninitialized => "no map",
            SessionState::Loaded => "saved",
            SessionState::Editing => "modified",
            SessionState::Committing => "committing",
        };
        lines.push(Line::from(vec![Span::styled("State: ", label), Span::raw(state)]));

        if let Some(grid) = session.grid() {
            lines.push(Line::from(vec![
                Span::styled("Size:  ", label),
                Span::raw(format!("{}x{}", grid.width(), grid.height())),
            ]));
            let (x, y) = self.cursor;
            if let Ok(tile) = grid.get(x, y) {
                lines.push(Line::from(vec![
                    Span::styled("Cell:  ", label),
                    Span::raw(format!("{},{} {}", x, y, tile.tile_type_id)),
                ]));
                let features: Vec<&str> = tile.features.iter().map(|f| f.name()).collect();
                if !features.is_empty() {
                    lines.push(Line::from(Span::raw(format!("       {}", features.join(" ")))));
                }
            }
        }

        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled("Templates", Style::default().add_modifier(Modifier::BOLD))));
        let active = session.active_template().map(|t| t.id.as_str());
        for template in session.templates() {
            let selected = active == Some(template.id.as_str());
            let marker = if selected { "> " } else { "  " };
            let style = if selected {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            lines.push(Line::from(vec![
                Span::raw(marker),
                Span::styled("  ", Style::default().bg(biome_color(template.biome))),
                Span::styled(format!(" {}", template.id), style),
            ]));
        }

        lines.push(Line::from(""));
        for help in [
            "Space paint  Tab template",
            "1-5 feature  g generate",
            "+/- resize   r reset",
            "s commit     q quit",
        ] {
            lines.push(Line::from(Span::styled(help, label)));
        }

        frame.render_widget(Paragraph::new(lines).block(block), area);
    }
}

/// First visible index so `cursor` sits mid-view without scrolling past the edge
fn scroll_offset(cursor: u32, view: u32, len: u32) -> u32 {
    if view >= len {
        return 0;
    }
    cursor.saturating_sub(view / 2).min(len - view)
}
