mod app;
mod host;
mod renderer;

use std::collections::VecDeque;
use std::fs::File;
use std::io::stdout;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result, bail, ensure};
use crossterm::event::{self, DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use lifeline_core::parsers::load_trace;
use lifeline_core::render::{NullHost, RenderConfig, RenderOutcome, TracePainter};
use lifeline_core::svg::render_svg;
use lifeline_core::time::Time;
use lifeline_core::view::TraceView;
use lifeline_protocol::DeviceSize;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tracing_subscriber::EnvFilter;

use crate::app::{Action, App};

/// Printed page size in device pixels.
const PAGE: DeviceSize = DeviceSize {
    width: 1131,
    height: 1600,
};

const USAGE: &str = "Usage: lifeline <trace.json> [--config cfg.json] [--log file] [--svg out-prefix] [--time-per-page N]";

#[derive(Debug, Default)]
struct Args {
    trace: PathBuf,
    config: Option<PathBuf>,
    log: Option<PathBuf>,
    svg: Option<String>,
    time_per_page: Option<i64>,
}

fn parse_args() -> Result<Args> {
    let mut args = Args::default();
    let mut trace = None;
    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        let mut value = |name: &str| it.next().with_context(|| format!("{name} needs a value"));
        match arg.as_str() {
            "--config" => args.config = Some(PathBuf::from(value("--config")?)),
            "--log" => args.log = Some(PathBuf::from(value("--log")?)),
            "--svg" => args.svg = Some(value("--svg")?),
            "--time-per-page" => {
                let raw = value("--time-per-page")?;
                let tpp: i64 = raw
                    .parse()
                    .with_context(|| format!("invalid --time-per-page {raw:?}"))?;
                if tpp <= 0 {
                    bail!("--time-per-page must be positive");
                }
                args.time_per_page = Some(tpp);
            }
            "-h" | "--help" => bail!("{USAGE}"),
            _ if trace.is_none() && !arg.starts_with("--") => trace = Some(PathBuf::from(&arg)),
            _ => bail!("unexpected argument {arg:?}\n{USAGE}"),
        }
    }
    args.trace = trace.with_context(|| USAGE.to_string())?;
    Ok(args)
}

/// Logs go to a file; the terminal belongs to the viewer.
fn init_logging(path: Option<&PathBuf>) -> Result<()> {
    let Some(path) = path else {
        return Ok(());
    };
    let file = File::create(path).with_context(|| format!("creating log file {}", path.display()))?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

/// Layout divides by these; reject values no font can have.
fn validate_config(config: &RenderConfig) -> Result<()> {
    let text = &config.text;
    ensure!(text.char_width > 0, "text.char_width must be positive, got {}", text.char_width);
    ensure!(text.height > 0, "text.height must be positive, got {}", text.height);
    ensure!(
        (0..=text.height).contains(&text.ascent),
        "text.ascent must lie within 0..={}, got {}",
        text.height,
        text.ascent
    );
    ensure!(text.font_size > 0.0, "text.font_size must be positive");
    ensure!(config.right_margin >= 0, "right_margin must not be negative");
    Ok(())
}

fn parse_config(data: &[u8]) -> Result<RenderConfig> {
    let config: RenderConfig = serde_json::from_slice(data)?;
    validate_config(&config)?;
    Ok(config)
}

fn load_config(path: Option<&PathBuf>) -> Result<RenderConfig> {
    match path {
        Some(path) => {
            let data = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
            parse_config(&data).with_context(|| format!("loading {}", path.display()))
        }
        None => Ok(RenderConfig::default()),
    }
}

/// Write every page of the print layout as `<prefix>-<n>.svg`.
fn export_svg(view: &TraceView, config: RenderConfig, prefix: &str, time_per_page: Option<i64>) -> Result<()> {
    let unit = view.source().time_unit();
    let span = (view.max_time() - view.min_time()).raw().max(1);
    let tpp = Time::new(time_per_page.unwrap_or(span), unit);

    let mut painter = TracePainter::new(config);
    let layout = painter.page_layout(view, PAGE, tpp);
    tracing::info!(pages = layout.page_count(), "exporting print layout");
    for index in 0..layout.page_count() {
        let outcome = painter.render_page(view, PAGE, tpp, index, &mut NullHost);
        let RenderOutcome::Completed { surface, .. } = outcome else {
            bail!("page {} was canceled", index + 1);
        };
        let path = format!("{prefix}-{}.svg", index + 1);
        std::fs::write(&path, render_svg(&surface, false)).with_context(|| format!("writing {path}"))?;
    }
    Ok(())
}

fn run_interactive(mut app: App) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = (|| -> Result<()> {
        // input that arrived while a pass was drawing
        let mut queued = VecDeque::new();
        let mut stale = true;
        loop {
            if stale {
                queued.extend(app.redraw(&mut terminal)?);
            }
            let next = match queued.pop_front() {
                Some(event) => event,
                None => event::read()?,
            };
            match app.handle_event(next) {
                Action::Quit => return Ok(()),
                Action::Continue => stale = true,
                Action::Ignored => stale = false,
            }
        }
    })();

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;
    result
}

fn main() -> Result<()> {
    let args = parse_args()?;
    init_logging(args.log.as_ref())?;
    let config = load_config(args.config.as_ref())?;

    let data = std::fs::read(&args.trace).with_context(|| format!("reading {}", args.trace.display()))?;
    let trace = load_trace(&data).with_context(|| format!("loading {}", args.trace.display()))?;
    let view = TraceView::new(Arc::new(trace));

    if let Some(prefix) = &args.svg {
        return export_svg(&view, config, prefix, args.time_per_page);
    }

    run_interactive(App::new(view, config))
}
