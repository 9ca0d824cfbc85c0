//! Roster loading from JSON (`[...]` or `{ "players": [...] }`) and CSV.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::balance::attributes::{Attribute, Player, PlayerRatings};
use crate::error::DataError;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RosterFile {
    List(Vec<Player>),
    Wrapped { players: Vec<Player> },
}

pub fn parse_roster_json(raw: &str) -> Result<Vec<Player>, DataError> {
    let parsed: RosterFile = serde_json::from_str(raw)?;
    Ok(match parsed {
        RosterFile::List(players) | RosterFile::Wrapped { players } => players,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Column {
    Id,
    Name,
    Rating(Attribute),
    Ignored,
}

fn classify_header(header: &str) -> Column {
    match header.trim().to_ascii_lowercase().as_str() {
        "id" | "player_id" | "playerid" => Column::Id,
        "name" | "display_name" => Column::Name,
        other => other
            .parse::<Attribute>()
            .map(Column::Rating)
            .unwrap_or(Column::Ignored),
    }
}

/// Header-driven CSV: `id` is required, `name` and the six rating columns are optional,
/// unknown columns are ignored and blank rating cells read as absent.
pub fn parse_roster_csv(raw: &str) -> Result<Vec<Player>, DataError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(raw.as_bytes());
    let columns: Vec<Column> = reader.headers()?.iter().map(classify_header).collect();
    if !columns.contains(&Column::Id) {
        return Err(DataError::MissingIdColumn);
    }

    let mut players = Vec::new();
    for (index, result) in reader.records().enumerate() {
        let record = result?;
        let row = index + 1;
        let mut id = String::new();
        let mut name = String::new();
        let mut ratings = PlayerRatings::default();

        for (column, cell) in columns.iter().zip(record.iter()) {
            match column {
                Column::Id => id = cell.to_string(),
                Column::Name => name = cell.to_string(),
                Column::Rating(attribute) if !cell.is_empty() => {
                    let value = cell.parse::<f64>().map_err(|_| DataError::InvalidField {
                        row,
                        column: attribute.to_string(),
                        value: cell.to_string(),
                    })?;
                    ratings.set(*attribute, Some(value));
                }
                Column::Rating(_) | Column::Ignored => {}
            }
        }

        if id.is_empty() && name.is_empty() && ratings == PlayerRatings::default() {
            continue;
        }
        players.push(Player::new(id, name, ratings));
    }
    Ok(players)
}

/// Loads a roster, picking the parser from the file extension.
pub fn load_roster(path: &str) -> Result<Vec<Player>, DataError> {
    let raw = fs::read_to_string(path).map_err(|source| DataError::Io {
        path: path.to_string(),
        source,
    })?;
    let extension = Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("json") => parse_roster_json(&raw),
        Some("csv") => parse_roster_csv(&raw),
        _ => Err(DataError::UnsupportedFormat(path.to_string())),
    }
}
