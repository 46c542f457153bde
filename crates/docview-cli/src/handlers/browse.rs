use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode as TermKeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use docview_engine::{Command, ContentPipeline, ScreenView, SessionState, Theme, load_tree};
use docview_runtime::{AppConfig, read_bounded_blocking};
use docview_types::{Key, KeyCode, SessionEvent};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::info;

type Term = Terminal<CrosstermBackend<io::Stdout>>;

/// Run one session on the local terminal.
pub fn handle(config: &AppConfig) -> Result<()> {
    let root = config.root_path()?;
    let tree = Arc::new(load_tree(&root, &config.filter())?);
    let theme = config.theme()?;
    let pipeline = ContentPipeline::new(theme.clone()).with_max_bytes(config.documents.max_bytes);
    let state = SessionState::new(tree, config.layout());
    info!(root = %root.display(), "browsing locally");

    ctrlc::set_handler(move || {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        std::process::exit(0);
    })?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

    let result = event_loop(&mut terminal, state, &pipeline, &theme, config.read_timeout());

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn event_loop(
    terminal: &mut Term,
    mut state: SessionState,
    pipeline: &ContentPipeline,
    theme: &Theme,
    read_timeout: Duration,
) -> Result<()> {
    let (width, height) = crossterm::terminal::size()?;
    let mut event = SessionEvent::Resize { width, height };

    loop {
        let (next, command) = state.update(&event);
        state = next;

        match command {
            Command::Quit => return Ok(()),
            Command::None => {}
            Command::Render => draw(terminal, &state, theme)?,
            Command::Reload { reset_scroll } => {
                state.reload(pipeline, reset_scroll, |path, max_bytes| {
                    read_bounded_blocking(path, max_bytes, read_timeout)
                });
                draw(terminal, &state, theme)?;
            }
        }

        event = next_event()?;
    }
}

fn draw(terminal: &mut Term, state: &SessionState, theme: &Theme) -> Result<()> {
    terminal.draw(|f| f.render_widget(ScreenView::new(state, theme), f.area()))?;
    Ok(())
}

/// Block until the terminal produces something the session understands.
fn next_event() -> Result<SessionEvent> {
    loop {
        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                if let Some(key) = map_key(&key) {
                    return Ok(SessionEvent::Key(key));
                }
            }
            Event::Resize(width, height) => return Ok(SessionEvent::Resize { width, height }),
            _ => {}
        }
    }
}

fn map_key(key: &KeyEvent) -> Option<Key> {
    let code = match key.code {
        TermKeyCode::Char(c) => KeyCode::Char(c),
        TermKeyCode::Up => KeyCode::Up,
        TermKeyCode::Down => KeyCode::Down,
        TermKeyCode::Left => KeyCode::Left,
        TermKeyCode::Right => KeyCode::Right,
        TermKeyCode::Enter => KeyCode::Enter,
        TermKeyCode::Tab => KeyCode::Tab,
        TermKeyCode::BackTab => KeyCode::BackTab,
        TermKeyCode::Esc => KeyCode::Esc,
        TermKeyCode::Backspace => KeyCode::Backspace,
        TermKeyCode::PageUp => KeyCode::PageUp,
        TermKeyCode::PageDown => KeyCode::PageDown,
        TermKeyCode::Home => KeyCode::Home,
        TermKeyCode::End => KeyCode::End,
        _ => return None,
    };
    Some(Key {
        code,
        ctrl: key.modifiers.contains(KeyModifiers::CONTROL),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_key() {
        let q = KeyEvent::new(TermKeyCode::Char('q'), KeyModifiers::NONE);
        assert_eq!(map_key(&q), Some(Key::char('q')));

        let ctrl_c = KeyEvent::new(TermKeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(map_key(&ctrl_c), Some(Key::ctrl('c')));

        let pgdn = KeyEvent::new(TermKeyCode::PageDown, KeyModifiers::NONE);
        assert_eq!(map_key(&pgdn), Some(Key::new(KeyCode::PageDown)));

        let f1 = KeyEvent::new(TermKeyCode::F(1), KeyModifiers::NONE);
        assert_eq!(map_key(&f1), None);
    }
}
