//! CLI definition and dispatch.

use chrono::{DateTime, Local, TimeZone, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use std::fmt::Write as _;
use std::path::PathBuf;
use std::process::ExitCode;
use uuid::Uuid;

use crate::adapters::csv_export;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::json_feed_adapter::JsonFeedAdapter;
use crate::adapters::json_state_adapter::JsonStateAdapter;
use crate::adapters::persistence_observer::PersistenceObserver;
use crate::adapters::static_feed::StaticFeed;
use crate::domain::alert::{AlertTrigger, Direction};
use crate::domain::app_config::{AppConfig, StorageBackend};
use crate::domain::config_validation::validate_config;
use crate::domain::desk::{hydrate, Desk, OrderOutcome};
use crate::domain::error::OunceError;
use crate::domain::feed::{FeedStatus, PriceFeedSnapshot};
use crate::domain::money::{display_money, format_number, from_display};
use crate::domain::state::DisplayCurrency;
use crate::domain::trade::Side;
use crate::logging;
use crate::ports::config_port::ConfigPort;
use crate::ports::state_port::StatePort;

#[derive(Parser, Debug)]
#[command(name = "ouncebook", about = "Paper trading with guardrails and price alerts")]
pub struct Cli {
    /// INI config file; built-in defaults apply when omitted
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show cash, position, valuation and guardrails
    Status,
    /// Buy at the current spot price
    Buy {
        #[arg(short, long)]
        quantity: f64,
        #[arg(short, long)]
        note: Option<String>,
    },
    /// Sell at the current spot price
    Sell {
        #[arg(short, long)]
        quantity: f64,
        #[arg(short, long)]
        note: Option<String>,
    },
    /// Manage price and move alerts
    Alert {
        #[command(subcommand)]
        action: AlertAction,
    },
    /// Change display currency and guardrails
    Settings {
        #[arg(long, value_enum)]
        currency: Option<CurrencyArg>,
        #[arg(long)]
        daily_limit: Option<f64>,
        #[arg(long)]
        max_position: Option<f64>,
        #[arg(long)]
        toggle_cooling_off: bool,
    },
    /// List executed trades, newest first
    History {
        #[arg(short, long)]
        export: Option<PathBuf>,
    },
    /// What a holding would be worth after a percent move
    Preview {
        #[arg(short, long)]
        quantity: f64,
        #[arg(short, long, default_value_t = 3.0, allow_negative_numbers = true)]
        move_pct: f64,
    },
}

#[derive(Subcommand, Debug)]
pub enum AlertAction {
    /// Add an alert; PRICE thresholds are in the display currency
    Add {
        #[arg(long, value_enum)]
        kind: AlertKindArg,
        #[arg(long, value_enum)]
        direction: DirectionArg,
        #[arg(long)]
        threshold: f64,
    },
    /// Remove an alert by id
    Remove { id: Uuid },
    /// List alerts and whether each is triggered
    List,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum AlertKindArg {
    Price,
    Move,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum DirectionArg {
    Above,
    Below,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum CurrencyArg {
    Primary,
    Secondary,
}

impl From<DirectionArg> for Direction {
    fn from(arg: DirectionArg) -> Self {
        match arg {
            DirectionArg::Above => Direction::Above,
            DirectionArg::Below => Direction::Below,
        }
    }
}

impl From<CurrencyArg> for DisplayCurrency {
    fn from(arg: CurrencyArg) -> Self {
        match arg {
            CurrencyArg::Primary => DisplayCurrency::Primary,
            CurrencyArg::Secondary => DisplayCurrency::Secondary,
        }
    }
}

pub fn run(cli: Cli) -> ExitCode {
    let config = match load_app_config(cli.config.as_ref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    logging::init(&config.log_level);

    let mut desk = match open_desk(&config) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    match dispatch(&mut desk, cli.command, Local::now()) {
        Ok(output) => {
            print!("{output}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

pub fn load_app_config(path: Option<&PathBuf>) -> Result<AppConfig, OunceError> {
    let adapter = match path {
        Some(path) => FileConfigAdapter::from_file(path)?,
        None => FileConfigAdapter::empty(),
    };
    validate_config(&adapter)?;
    build_app_config(&adapter)
}

pub fn build_app_config(adapter: &dyn ConfigPort) -> Result<AppConfig, OunceError> {
    let defaults = AppConfig::default();

    let storage_backend = match adapter.get_string("storage", "backend") {
        Some(raw) => StorageBackend::parse(&raw).ok_or_else(|| OunceError::ConfigInvalid {
            section: "storage".into(),
            key: "backend".into(),
            reason: format!("unknown backend '{raw}'"),
        })?,
        None => defaults.storage_backend,
    };
    let storage_path = adapter
        .get_string("storage", "path")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(storage_backend.default_path()));

    Ok(AppConfig {
        storage_backend,
        storage_path,
        feed_path: adapter.get_string("feed", "path").map(PathBuf::from),
        initial_cash: adapter.get_double("account", "initial_cash", defaults.initial_cash),
        fx_rate: adapter.get_double("account", "fx_rate", defaults.fx_rate),
        daily_trade_limit: adapter.get_int(
            "guardrails",
            "daily_trade_limit",
            i64::from(defaults.daily_trade_limit),
        ) as u32,
        max_position: adapter.get_double("guardrails", "max_position", defaults.max_position),
        cooling_off: adapter.get_bool("guardrails", "cooling_off", defaults.cooling_off),
        log_level: adapter
            .get_string("logging", "level")
            .unwrap_or(defaults.log_level),
    })
}

pub fn open_store(config: &AppConfig) -> Result<Box<dyn StatePort>, OunceError> {
    match config.storage_backend {
        StorageBackend::Json => Ok(Box::new(JsonStateAdapter::new(&config.storage_path))),
        #[cfg(feature = "sqlite")]
        StorageBackend::Sqlite => {
            use crate::adapters::sqlite_adapter::SqliteAdapter;
            let path = config.storage_path.to_string_lossy();
            Ok(Box::new(SqliteAdapter::open(&path)?))
        }
        #[cfg(not(feature = "sqlite"))]
        StorageBackend::Sqlite => Err(OunceError::ConfigInvalid {
            section: "storage".into(),
            key: "backend".into(),
            reason: "sqlite feature is not enabled".into(),
        }),
    }
}

/// Hydrate the state, subscribe persistence, and take a first feed reading.
pub fn open_desk(config: &AppConfig) -> Result<Desk, OunceError> {
    let store = open_store(config)?;
    let state = hydrate(store.as_ref(), config.fresh_state());

    let mut desk = Desk::new(state);
    desk.subscribe(Box::new(PersistenceObserver::new(store)));

    match &config.feed_path {
        Some(path) => desk.refresh_feed(&JsonFeedAdapter::new(path)),
        None => {
            // built-in prices quoted at the account's own fx rate
            let mut snapshot = PriceFeedSnapshot::fallback();
            snapshot.fx_rate = desk.state().fx_rate;
            desk.refresh_feed(&StaticFeed::new(snapshot))
        }
    };
    Ok(desk)
}

/// Run one command against the desk and return what should be printed.
pub fn dispatch<Tz: TimeZone>(
    desk: &mut Desk,
    command: Command,
    now: DateTime<Tz>,
) -> Result<String, OunceError> {
    match command {
        Command::Status => Ok(render_status(desk, &now)),
        Command::Buy { quantity, note } => place(desk, Side::Buy, quantity, note, now),
        Command::Sell { quantity, note } => place(desk, Side::Sell, quantity, note, now),
        Command::Alert { action } => run_alert(desk, action, now.with_timezone(&Utc)),
        Command::Settings {
            currency,
            daily_limit,
            max_position,
            toggle_cooling_off,
        } => Ok(run_settings(
            desk,
            currency,
            daily_limit,
            max_position,
            toggle_cooling_off,
        )),
        Command::History { export } => run_history(desk, export),
        Command::Preview { quantity, move_pct } => {
            let preview = desk.risk_preview(quantity, move_pct);
            let state = desk.state();
            let mut out = String::new();
            let _ = writeln!(out, "If the price moves {}%:", format_number(move_pct, 1));
            let _ = writeln!(out, "  Position value: {}", display_money(preview.before, state));
            let _ = writeln!(out, "  After move:     {}", display_money(preview.after, state));
            let _ = writeln!(out, "  Change:         {}", display_money(preview.change, state));
            Ok(out)
        }
    }
}

fn place<Tz: TimeZone>(
    desk: &mut Desk,
    side: Side,
    quantity: f64,
    note: Option<String>,
    now: DateTime<Tz>,
) -> Result<String, OunceError> {
    let order = desk.market_order(side, quantity, note);
    match desk.place_order_at(&order, now)? {
        OrderOutcome::Denied(reason) => Err(OunceError::InvalidOrder {
            reason: reason.to_string(),
        }),
        OrderOutcome::Executed {
            trade,
            exceeds_max_position,
        } => {
            let state = desk.state();
            let mut out = String::new();
            let _ = writeln!(
                out,
                "{} {} @ {} = {}",
                trade.side,
                format_number(trade.quantity, 2),
                display_money(trade.unit_price, state),
                display_money(trade.total(), state),
            );
            let _ = writeln!(out, "Cash: {}", display_money(state.cash_balance, state));
            if exceeds_max_position {
                let _ = writeln!(
                    out,
                    "warning: position {} exceeds max position {}",
                    format_number(state.position_quantity, 2),
                    format_number(state.max_position_quantity, 0),
                );
            }
            Ok(out)
        }
    }
}

pub fn render_status<Tz: TimeZone>(desk: &Desk, now: &DateTime<Tz>) -> String {
    let state = desk.state();
    let feed = desk.feed();
    let valuation = desk.valuation();
    let mut out = String::new();

    let freshness = match desk.feed_status() {
        FeedStatus::Fresh => "",
        FeedStatus::Stale => " (stale)",
    };
    let _ = writeln!(
        out,
        "Spot:            {} ({}%){}",
        display_money(feed.spot_price, state),
        format_number(feed.change_pct, 2),
        freshness
    );
    let _ = writeln!(out, "Cash:            {}", display_money(state.cash_balance, state));
    let _ = writeln!(
        out,
        "Position:        {} @ {}",
        format_number(state.position_quantity, 2),
        display_money(state.average_cost_per_unit, state)
    );
    let _ = writeln!(out, "Position value:  {}", display_money(valuation.position_value, state));
    let _ = writeln!(out, "Unrealized P/L:  {}", display_money(valuation.unrealized_pnl, state));
    let _ = writeln!(out, "Daily P/L:       {}", display_money(valuation.daily_pnl, state));
    let _ = writeln!(
        out,
        "Total return:    {}%",
        format_number(valuation.total_return_pct, 2)
    );
    let _ = writeln!(out, "Total value:     {}", display_money(valuation.total_value, state));
    let _ = writeln!(
        out,
        "Trades today:    {} remaining of {}",
        desk.trades_remaining(now),
        state.daily_trade_limit
    );
    let _ = writeln!(
        out,
        "Cooling off:     {}",
        if state.cooling_off { "on" } else { "off" }
    );
    let _ = writeln!(
        out,
        "Max position:    {}",
        format_number(state.max_position_quantity, 0)
    );

    if let Some(trade) = state.last_trade() {
        let _ = writeln!(
            out,
            "Last trade:      {} {} @ {}",
            trade.side,
            format_number(trade.quantity, 2),
            display_money(trade.unit_price, state)
        );
    }

    let triggered = desk.triggered_alerts();
    if !triggered.is_empty() {
        let _ = writeln!(out, "Triggered alerts: {}", triggered.len());
    }
    out
}

fn run_alert(desk: &mut Desk, action: AlertAction, now: DateTime<Utc>) -> Result<String, OunceError> {
    match action {
        AlertAction::Add {
            kind,
            direction,
            threshold,
        } => {
            let direction = Direction::from(direction);
            let trigger = match kind {
                AlertKindArg::Price => AlertTrigger::Price {
                    direction,
                    threshold: from_display(threshold, desk.state()),
                },
                AlertKindArg::Move => AlertTrigger::Move {
                    direction,
                    threshold,
                },
            };
            let alert = desk.ledger_mut().add_alert(trigger, now)?;
            Ok(format!("Added alert {}\n", alert.id))
        }
        AlertAction::Remove { id } => {
            if desk.ledger_mut().remove_alert(id) {
                Ok(format!("Removed alert {id}\n"))
            } else {
                Ok(format!("No alert with id {id}\n"))
            }
        }
        AlertAction::List => {
            let state = desk.state();
            let statuses = desk.alert_statuses();
            if statuses.is_empty() {
                return Ok("No alerts\n".to_string());
            }
            let mut out = String::new();
            for status in statuses {
                let target = match status.alert.trigger {
                    AlertTrigger::Price { threshold, .. } => display_money(threshold, state),
                    AlertTrigger::Move { threshold, .. } => {
                        format!("{}%", format_number(threshold, 2))
                    }
                };
                let kind = match status.alert.trigger {
                    AlertTrigger::Price { .. } => "PRICE",
                    AlertTrigger::Move { .. } => "MOVE",
                };
                let _ = writeln!(
                    out,
                    "{}  {:<5} {:<5} {:>12}  {}",
                    status.alert.id,
                    kind,
                    status.alert.trigger.direction().to_string(),
                    target,
                    if status.triggered { "TRIGGERED" } else { "watching" }
                );
            }
            Ok(out)
        }
    }
}

fn run_settings(
    desk: &mut Desk,
    currency: Option<CurrencyArg>,
    daily_limit: Option<f64>,
    max_position: Option<f64>,
    toggle_cooling_off: bool,
) -> String {
    let mut out = String::new();
    let ledger = desk.ledger_mut();

    if let Some(currency) = currency {
        ledger.set_display_currency(currency.into());
    }
    if let Some(limit) = daily_limit {
        if !ledger.set_daily_trade_limit(limit) {
            let _ = writeln!(out, "warning: ignored daily limit {limit}");
        }
    }
    if let Some(limit) = max_position {
        if !ledger.set_max_position_quantity(limit) {
            let _ = writeln!(out, "warning: ignored max position {limit}");
        }
    }
    if toggle_cooling_off {
        ledger.toggle_cooling_off();
    }

    let state = ledger.state();
    let _ = writeln!(out, "Currency:      {:?}", state.display_currency);
    let _ = writeln!(out, "Daily limit:   {}", state.daily_trade_limit);
    let _ = writeln!(
        out,
        "Max position:  {}",
        format_number(state.max_position_quantity, 2)
    );
    let _ = writeln!(
        out,
        "Cooling off:   {}",
        if state.cooling_off { "on" } else { "off" }
    );
    out
}

fn run_history(desk: &Desk, export: Option<PathBuf>) -> Result<String, OunceError> {
    let state = desk.state();
    if let Some(path) = export {
        csv_export::export_trades(&state.trade_history, &path)?;
        return Ok(format!(
            "Exported {} trades to {}\n",
            state.trade_history.len(),
            path.display()
        ));
    }

    if state.trade_history.is_empty() {
        return Ok("No trades yet\n".to_string());
    }
    let mut out = String::new();
    for trade in &state.trade_history {
        let _ = writeln!(
            out,
            "{}  {:<4} {:>10} @ {:>10}  {}",
            trade.timestamp.with_timezone(&Local).format("%Y-%m-%d %H:%M"),
            trade.side.as_str(),
            format_number(trade.quantity, 2),
            display_money(trade.unit_price, state),
            trade.note.as_deref().unwrap_or("")
        );
    }
    Ok(out)
}
