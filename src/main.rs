mod config;
mod services;

use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use floorplan::doc::{Shape, TableId, TableState, format_decimal};
use floorplan::hit::ResizeAnchor;
use floorplan::render;
use floorplan::store::{StoreError, TableStore};
use floorplan::transform::{PlanSize, Point};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use config::{AppConfig, ConfigError};
use services::api::HttpTableStore;
use services::session::{EditSession, GestureReport, SessionError};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error("table {0} was not saved; its previous geometry was restored")]
    NotPersisted(TableId),
}

#[derive(Parser, Debug)]
#[command(name = "seating", about = "Floor-plan table editor driver")]
struct Cli {
    /// Table API base URL (overrides SEATING_API_URL).
    #[arg(long)]
    api_url: Option<String>,

    /// Plan width in pixels used to project percentages.
    #[arg(long, env = "SEATING_PLAN_WIDTH", default_value_t = 1000.0)]
    plan_width: f64,

    /// Plan height in pixels used to project percentages.
    #[arg(long, env = "SEATING_PLAN_HEIGHT", default_value_t = 800.0)]
    plan_height: f64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List tables with stored and projected geometry.
    Show,
    /// Drag a table so its top-left corner lands on pixel (X, Y).
    Move {
        id: TableId,
        #[arg(long)]
        x: f64,
        #[arg(long)]
        y: f64,
    },
    /// Drag one resize handle by (DX, DY) pixels.
    Resize {
        id: TableId,
        #[arg(long, value_enum, default_value_t = HandleArg::Se)]
        handle: HandleArg,
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        dx: f64,
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        dy: f64,
    },
    /// Turn a table clockwise by D degrees.
    Rotate {
        id: TableId,
        #[arg(long, allow_negative_numbers = true)]
        degrees: f64,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum HandleArg {
    N,
    Ne,
    E,
    Se,
    S,
    Sw,
    W,
    Nw,
}

impl From<HandleArg> for ResizeAnchor {
    fn from(value: HandleArg) -> Self {
        match value {
            HandleArg::N => Self::N,
            HandleArg::Ne => Self::Ne,
            HandleArg::E => Self::E,
            HandleArg::Se => Self::Se,
            HandleArg::S => Self::S,
            HandleArg::Sw => Self::Sw,
            HandleArg::W => Self::W,
            HandleArg::Nw => Self::Nw,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let dotenv = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();
    match dotenv {
        Ok(path) => debug!(path = %path.display(), ".env loaded"),
        Err(e) if e.not_found() => {}
        Err(e) => warn!(error = %e, ".env could not be read"),
    }

    let cli = Cli::parse();
    let mut config = AppConfig::from_env()?;
    if let Some(url) = cli.api_url.as_deref() {
        config = config.with_api_url(url)?;
    }

    let http = HttpTableStore::new(&config)?;
    debug!(api_url = http.base_url(), "table store ready");
    let store: Arc<dyn TableStore> = Arc::new(http);
    let plan = PlanSize::new(cli.plan_width, cli.plan_height);
    let mut session = EditSession::open(store, config.editor, plan).await?;

    match cli.command {
        Command::Show => {
            print_tables(&session);
            Ok(())
        }
        Command::Move { id, x, y } => {
            let report = session.drag(id, Point::new(x, y)).await?;
            finish(&mut session, report).await
        }
        Command::Resize { id, handle, dx, dy } => {
            let report = session.resize(id, handle.into(), Point::new(dx, dy)).await?;
            finish(&mut session, report).await
        }
        Command::Rotate { id, degrees } => {
            let report = session.rotate(id, degrees).await?;
            finish(&mut session, report).await
        }
    }
}

fn print_tables(session: &EditSession) {
    println!(
        "{:>5}  {:<24} {:<18} {:>7} {:>7} {:>7} {:>7} {:>7}  {:>6}  pixels",
        "id", "label", "shape", "posX", "posY", "width", "height", "rot", "seats"
    );
    for view in render::scene(session.provider()) {
        let Some(controller) = session.provider().controller(view.table_id) else {
            continue;
        };
        let state = controller.committed();
        println!(
            "{:>5}  {:<24} {:<18} {:>7} {:>7} {:>7} {:>7} {:>7}  {:>2}/{:<3}  {:.1},{:.1} {:.1}x{:.1}",
            view.table_id,
            view.label,
            shape_name(view.shape),
            format_decimal(state.pos_x),
            format_decimal(state.pos_y),
            format_decimal(state.width),
            format_decimal(state.height),
            format_decimal(state.rotation),
            view.occupancy,
            view.capacity,
            view.rect.x,
            view.rect.y,
            view.rect.width,
            view.rect.height,
        );
    }
}

fn shape_name(shape: Shape) -> &'static str {
    match shape {
        Shape::Circle => "circle",
        Shape::Oval => "oval",
        Shape::Rectangle => "rectangle",
        Shape::RoundedRectangle => "rounded-rectangle",
    }
}

/// Print the gesture outcome, then refetch to show what the store now holds.
async fn finish(session: &mut EditSession, report: GestureReport) -> Result<(), CliError> {
    if report.saves.is_empty() {
        println!("table {}: no change", report.table_id);
        return Ok(());
    }
    println!("table {}: committed {} ({:?})", report.table_id, describe(&report.committed), report.indicator);
    for save in &report.saves {
        if let Some(e) = &save.error {
            println!("table {}: save #{} failed: {e}", save.table_id, save.seq);
        }
    }

    session.reload().await?;
    if let Some(controller) = session.provider().controller(report.table_id) {
        println!("table {}: stored    {}", report.table_id, describe(&controller.table().state()));
    }
    if report.persisted() { Ok(()) } else { Err(CliError::NotPersisted(report.table_id)) }
}

fn describe(state: &TableState) -> String {
    format!(
        "posX={} posY={} width={} height={} rotation={}",
        format_decimal(state.pos_x),
        format_decimal(state.pos_y),
        format_decimal(state.width),
        format_decimal(state.height),
        format_decimal(state.rotation),
    )
}
