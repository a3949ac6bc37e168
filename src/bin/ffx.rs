// Native binary for ffx - terminal chart mode plus table/json dumps

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::{fs::File, io, sync::Arc, time::Duration};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

use ffx::{
    api::fetch_rows,
    app::{Action, App},
    categories::{Collection, Taxonomy},
    chart,
    config::{load, Config, Output},
    source::run_source,
    time_range::TimeRange,
    types::AppEvent,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (safe to ignore if not found)
    let _ = dotenvy::dotenv();

    let cfg = load().context("Failed to load configuration")?;
    init_logging(&cfg)?;
    cfg.log_summary();

    // Category maps are built once and shared
    let taxonomy = Arc::new(Taxonomy::canonical());

    match cfg.output {
        Output::Json => {
            let rows = fetch_rows(&cfg, &taxonomy, cfg.collection, cfg.range).await?;
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
        Output::Table => {
            let rows = fetch_rows(&cfg, &taxonomy, cfg.collection, cfg.range).await?;
            let map = taxonomy.map(cfg.collection);
            print!("{}", chart::render_table(&rows, map.categories(), cfg.range));
            println!();
            print!("{}", chart::render_key(map));
        }
        Output::Tui => run_tui(cfg, taxonomy).await?,
    }
    Ok(())
}

/// Stderr for one-shot output. The TUI owns the screen, so it only logs to a file.
fn init_logging(cfg: &Config) -> Result<()> {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    match (&cfg.log_file, cfg.output) {
        (Some(path), _) => {
            let file =
                File::create(path).with_context(|| format!("Failed to open log file {path}"))?;
            builder.target(env_logger::Target::Pipe(Box::new(file)));
        }
        (None, Output::Tui) => return Ok(()),
        (None, _) => {}
    }
    builder.init();
    Ok(())
}

async fn run_tui(cfg: Config, taxonomy: Arc<Taxonomy>) -> Result<()> {
    let (req_tx, req_rx) = unbounded_channel::<(Collection, TimeRange)>();
    let (tx, rx) = unbounded_channel::<AppEvent>();

    let mut app = App::new(cfg.collection, cfg.range, cfg.theme, taxonomy.clone());
    let source_task = tokio::spawn(run_source(cfg, taxonomy, req_rx, tx));
    let _ = req_tx.send(app.request());

    // terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let result = run_loop(&mut app, &mut terminal, rx, &req_tx).await;

    // cleanup (always, even when the loop failed)
    source_task.abort();
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    result
}

async fn run_loop(
    app: &mut App,
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    mut rx: UnboundedReceiver<AppEvent>,
    req_tx: &UnboundedSender<(Collection, TimeRange)>,
) -> Result<()> {
    let tick = Duration::from_millis(100);
    loop {
        terminal.draw(|f| chart::draw(f, &*app))?;

        if event::poll(tick)? {
            if let Event::Key(k) = event::read()? {
                if k.kind == KeyEventKind::Press {
                    if let Some(action) = key_action(k) {
                        if let Some(req) = app.handle(action) {
                            let _ = req_tx.send(req);
                        }
                    }
                }
            }
        }
        while let Ok(ev) = rx.try_recv() {
            app.apply(ev);
        }
        if app.should_quit() {
            return Ok(());
        }
        // let the source task make progress on the runtime
        tokio::task::yield_now().await;
    }
}

fn key_action(k: KeyEvent) -> Option<Action> {
    match (k.code, k.modifiers) {
        (KeyCode::Char('c'), KeyModifiers::CONTROL) => Some(Action::Quit),
        (KeyCode::Esc, _) => Some(Action::Quit),
        (KeyCode::Tab, _) => Some(Action::NextCollection),
        (KeyCode::Char(c), _) => Action::from_char(c),
        _ => None,
    }
}
