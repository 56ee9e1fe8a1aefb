use std::io;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::prelude::*;
use tracing::{error, info};

use ffa_terminal::config::DashConfig;
use ffa_terminal::demo_feed::DemoSource;
use ffa_terminal::fetch::{HttpSource, LeagueSource};
use ffa_terminal::logging;
use ffa_terminal::provider::spawn_provider;
use ffa_terminal::state::{AppState, Delta, InputMode, ProviderCommand, Tab, apply_delta};
use ffa_terminal::ui;

struct App {
    state: AppState,
    should_quit: bool,
    cmd_tx: Option<mpsc::Sender<ProviderCommand>>,
    config: DashConfig,
}

impl App {
    fn new(cmd_tx: Option<mpsc::Sender<ProviderCommand>>, config: DashConfig) -> Self {
        Self {
            state: AppState::new(),
            should_quit: false,
            cmd_tx,
            config,
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        if self.state.input_mode == InputMode::Editing {
            self.on_edit_key(key);
            return;
        }
        if self.state.help_overlay {
            match key.code {
                KeyCode::Char('q') => self.should_quit = true,
                _ => self.state.help_overlay = false,
            }
            return;
        }
        if self.state.modal.is_some() {
            self.on_modal_key(key);
            return;
        }

        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('/') | KeyCode::Char('i') => {
                self.state.input_mode = InputMode::Editing;
            }
            KeyCode::Enter => self.state.open_selected_detail(),
            KeyCode::Tab => self.state.cycle_tab(),
            KeyCode::Char(c @ '1'..='4') => {
                let idx = c as usize - '1' as usize;
                self.state.tab = Tab::ALL[idx];
            }
            KeyCode::Char('j') | KeyCode::Down => self.state.select_next(),
            KeyCode::Char('k') | KeyCode::Up => self.state.select_prev(),
            KeyCode::Char('e') => {
                let cmd = self.state.export_command(&self.config.export_dir);
                self.send(cmd);
            }
            KeyCode::Char('?') => self.state.help_overlay = true,
            _ => {}
        }
    }

    fn on_edit_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => {
                self.state.input_mode = InputMode::Normal;
                self.submit();
            }
            KeyCode::Esc => self.state.input_mode = InputMode::Normal,
            KeyCode::Backspace => {
                self.state.input.pop();
            }
            KeyCode::Char(c) if !c.is_control() => self.state.input.push(c),
            _ => {}
        }
    }

    fn on_modal_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Esc | KeyCode::Enter => self.state.close_modal(),
            KeyCode::Char('j') | KeyCode::Down => {
                let max = self.state.modal.as_ref().map(ui::modal_max_scroll).unwrap_or(0);
                self.state.scroll_modal_down(max);
            }
            KeyCode::Char('k') | KeyCode::Up => self.state.scroll_modal_up(),
            _ => {}
        }
    }

    fn submit(&mut self) {
        let cmd = self.state.begin_analysis();
        self.send(cmd);
    }

    fn send(&mut self, cmd: Option<ProviderCommand>) {
        let Some(cmd) = cmd else {
            return;
        };
        let Some(tx) = self.cmd_tx.as_ref() else {
            self.state.push_log("[WARN] No provider available");
            return;
        };
        if tx.send(cmd).is_err() {
            error!("provider channel closed");
            self.state.push_log("[WARN] Provider stopped; restart the dashboard");
            self.cmd_tx = None;
        }
    }
}

fn main() -> io::Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let config = DashConfig::from_env();
    let logging_enabled = match logging::init(&config) {
        Ok(enabled) => enabled,
        Err(err) => {
            eprintln!("warning: logging disabled: {err:#}");
            false
        }
    };

    let source: Box<dyn LeagueSource> = if config.demo {
        Box::new(DemoSource)
    } else {
        Box::new(HttpSource::new(
            config.endpoint.clone(),
            config.request_timeout,
        ))
    };
    let source_label = source.label();
    info!(
        source = source_label,
        endpoint = %config.endpoint,
        logging_enabled,
        "dashboard starting"
    );

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    spawn_provider(tx, cmd_rx, source);

    let mut app = App::new(Some(cmd_tx), config);
    app.state.source_label = source_label;
    if let Some(league_id) = app.config.initial_league_id.clone() {
        app.state.input = league_id;
        app.submit();
    }

    let res = run_app(&mut terminal, &mut app, rx);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    rx: mpsc::Receiver<Delta>,
) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        while let Ok(delta) = rx.try_recv() {
            apply_delta(&mut app.state, delta);
        }

        terminal.draw(|f| ui::draw(f, &app.state))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.on_key(key);
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}
