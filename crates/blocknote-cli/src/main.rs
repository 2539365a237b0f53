use anyhow::Result;
use blocknote_config::{Config, ConfirmSetting};
use blocknote_engine::editing::{
    ConfirmPolicy, Document, EditSession, Key, Modifiers, Snapshot, SurfaceRequest, policy,
};
use blocknote_engine::registry::{BlockKind, TypeInfo};
use crossterm::{
    event::{self, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};
use std::{io::stdout, process};

/// One terminal rendering surface driving the editing engine. The engine
/// never sees the terminal: it gets focus/content/key events and hands back
/// snapshots, surface requests and deferred focus targets.
struct App {
    doc: Document,
    session: EditSession,
    /// Caret position as a byte offset into the focused block's live
    /// content.
    caret: usize,
}

impl App {
    fn new(initial_kind: BlockKind, confirm_policy: ConfirmPolicy) -> Self {
        let doc = Document::new(initial_kind);
        let mut session = EditSession::with_confirm_policy(confirm_policy);
        let first = doc.blocks()[0].id;
        let request = session.on_focus(&doc, first);
        let mut app = Self {
            doc,
            session,
            caret: 0,
        };
        app.honor(request);
        app
    }

    fn honor(&mut self, request: Option<SurfaceRequest>) {
        match request {
            Some(SurfaceRequest::CursorToStart(_)) => self.caret = 0,
            // The terminal relays out every frame; no explicit resize step
            Some(SurfaceRequest::Resize(_)) | None => {}
        }
    }

    fn live(&self) -> String {
        match self.session.focused() {
            Some(id) => self
                .session
                .live_content(&self.doc, id)
                .unwrap_or_default()
                .to_string(),
            None => String::new(),
        }
    }

    fn insert_char(&mut self, c: char) {
        let Some(id) = self.session.focused() else {
            return;
        };
        let mut content = self.live();
        let at = self.caret.min(content.len());
        content.insert(at, c);
        self.caret = at + c.len_utf8();
        let request = self.session.on_content_change(&mut self.doc, id, &content);
        self.honor(request);
    }

    fn delete_char_before_caret(&mut self) -> bool {
        let Some(id) = self.session.focused() else {
            return false;
        };
        let content = self.live();
        if self.caret == 0 || content.is_empty() {
            return false;
        }
        let at = self.caret.min(content.len());
        let prev = content[..at]
            .char_indices()
            .next_back()
            .map(|(i, _)| i)
            .unwrap_or(0);
        let mut edited = content;
        edited.replace_range(prev..at, "");
        self.caret = prev;
        let request = self.session.on_content_change(&mut self.doc, id, &edited);
        self.honor(request);
        true
    }

    fn send_key(&mut self, key: Key, modifiers: Modifiers) {
        if let Some(id) = self.session.focused() {
            self.session
                .on_key_down(&mut self.doc, id, key, modifiers, self.caret);
        }
    }

    /// Move focus one block up or down, going through the engine's
    /// blur-then-focus path like any surface would.
    fn move_focus(&mut self, delta: isize) {
        let Some(current) = self.session.focused() else {
            return;
        };
        let Some(index) = self.doc.index_of(current) else {
            return;
        };
        let target = index as isize + delta;
        if target < 0 || target >= self.doc.len() as isize {
            return;
        }
        let target_id = self.doc.blocks()[target as usize].id;
        self.session.on_blur(&mut self.doc, current);
        let request = self.session.on_focus(&self.doc, target_id);
        self.caret = self.live().len();
        self.honor(request);
    }

    /// Cycle the focused block's kind through the registry.
    fn cycle_kind(&mut self) {
        let Some(id) = self.session.focused() else {
            return;
        };
        let Some(block) = self.doc.get(id) else {
            return;
        };
        let kinds = TypeInfo::all();
        let current = kinds
            .iter()
            .position(|info| info.kind == block.kind)
            .unwrap_or(0);
        let next = kinds[(current + 1) % kinds.len()].kind;
        let _ = self.doc.set_kind(id, next);
    }

    /// Run after each draw: the new widgets exist now, so deferred focus
    /// requests can be honored.
    fn settle_deferred_focus(&mut self) {
        for id in self.session.drain_deferred_focus(&self.doc) {
            let request = self.session.on_focus(&self.doc, id);
            self.caret = self.live().len();
            self.honor(request);
        }
    }

    fn snapshot(&self) -> Snapshot {
        policy::snapshot(&self.doc, &self.session, None)
    }
}

fn main() -> Result<()> {
    let config = match Config::load() {
        Ok(Some(config)) => config,
        Ok(None) => Config::default(),
        Err(e) => {
            eprintln!("Error: Failed to load config file: {e}");
            process::exit(1);
        }
    };

    let initial_kind = match BlockKind::from_name(&config.initial_block) {
        Ok(kind) => kind,
        Err(e) => {
            eprintln!(
                "Error: invalid initial_block in {}: {e}",
                Config::config_path().display()
            );
            process::exit(1);
        }
    };
    let confirm_policy = match config.confirm {
        ConfirmSetting::Split => ConfirmPolicy::SplitBlock,
        ConfirmSetting::Passthrough => ConfirmPolicy::Passthrough,
    };

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(initial_kind, confirm_policy);

    // Main loop
    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{err:?}");
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()>
where
    B::Error: Send + Sync + 'static,
{
    loop {
        terminal.draw(|f| ui(f, app))?;

        // The draw has committed: pending focus targets exist on screen now
        app.settle_deferred_focus();

        if let Event::Key(key) = event::read()? {
            let shift = key.modifiers.contains(KeyModifiers::SHIFT);
            match key.code {
                KeyCode::Esc => return Ok(()),
                KeyCode::Char('q') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    return Ok(());
                }
                KeyCode::Up => app.move_focus(-1),
                KeyCode::Down => app.move_focus(1),
                KeyCode::Left => {
                    let content = app.live();
                    let at = app.caret.min(content.len());
                    app.caret = content[..at]
                        .char_indices()
                        .next_back()
                        .map(|(i, _)| i)
                        .unwrap_or(0);
                }
                KeyCode::Right => {
                    let content = app.live();
                    let at = app.caret.min(content.len());
                    app.caret = content[at..]
                        .chars()
                        .next()
                        .map(|c| at + c.len_utf8())
                        .unwrap_or(content.len());
                }
                KeyCode::Tab => app.cycle_kind(),
                KeyCode::Enter => app.send_key(Key::Enter, Modifiers { shift }),
                KeyCode::Backspace => {
                    // Local text editing first; at the block boundary the
                    // engine decides whether to merge
                    if !app.delete_char_before_caret() {
                        app.send_key(Key::Backspace, Modifiers { shift });
                    }
                }
                KeyCode::Char(c) => app.insert_char(c),
                _ => {}
            }
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([Constraint::Min(0), Constraint::Length(2)].as_ref())
        .split(f.area());

    let snapshot = app.snapshot();
    let mut lines: Vec<Line> = Vec::new();

    for block in &snapshot.blocks {
        // Heading-adjacent paragraphs sit tight under their heading;
        // everything else gets a blank spacer line
        if !lines.is_empty() && !block.flush_top {
            lines.push(Line::from(""));
        }

        let gutter = if block.show_menu { "+ " } else { "  " };
        let mut spans = vec![Span::raw(gutter)];

        if block.is_empty {
            let tag = block.label.unwrap_or(block.placeholder);
            spans.push(Span::styled(
                format!("[{tag}]"),
                Style::default().fg(Color::DarkGray),
            ));
        } else {
            let style = if block.kind.is_heading() {
                Style::default().add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            spans.push(Span::styled(block.content.clone(), style));
        }

        let mut line = Line::from(spans);
        if block.focused {
            line = line.style(Style::default().bg(Color::Rgb(40, 40, 40)));
        }
        lines.push(line);
    }

    let editor = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("blocknote"))
        .wrap(ratatui::widgets::Wrap { trim: false });
    f.render_widget(editor, chunks[0]);

    let help = Line::from(vec![
        Span::raw("Esc: Quit | "),
        Span::raw("↑/↓: Move focus | "),
        Span::raw("Enter: Split | "),
        Span::raw("Backspace on empty: Merge | "),
        Span::raw("Tab: Cycle block type"),
    ]);
    f.render_widget(Paragraph::new(vec![help]), chunks[1]);
}
