//! Trade history export as CSV.

use crate::domain::error::OunceError;
use crate::domain::trade::Trade;
use chrono::SecondsFormat;
use csv::{QuoteStyle, WriterBuilder};
use std::fs::File;
use std::io::Write;
use std::path::Path;

const HEADER: [&str; 6] = ["timestamp", "side", "quantity", "unit_price", "total", "note"];

fn export_err(e: impl std::fmt::Display) -> OunceError {
    OunceError::Export {
        reason: e.to_string(),
    }
}

/// Write trades in the order given (newest first for ledger history).
pub fn write_trades<W: Write>(trades: &[Trade], writer: W) -> Result<(), OunceError> {
    let mut wtr = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .from_writer(writer);

    wtr.write_record(HEADER).map_err(export_err)?;
    for trade in trades {
        wtr.write_record([
            trade.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
            trade.side.to_string(),
            format!("{:.2}", trade.quantity),
            format!("{:.2}", trade.unit_price),
            format!("{:.2}", trade.total()),
            trade.note.clone().unwrap_or_default(),
        ])
        .map_err(export_err)?;
    }
    wtr.flush().map_err(export_err)?;
    Ok(())
}

pub fn export_trades(trades: &[Trade], path: &Path) -> Result<(), OunceError> {
    let file = File::create(path).map_err(|e| OunceError::Export {
        reason: format!("failed to create {}: {}", path.display(), e),
    })?;
    write_trades(trades, file)
}
