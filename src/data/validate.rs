use std::collections::HashSet;
use std::fmt;

use serde::Serialize;

use crate::balance::attributes::{Attribute, Player};
use crate::balance::check_team_size;

/// Ratings outside this range are accepted but flagged.
pub const RATING_RANGE: (f64, f64) = (1.0, 5.0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationSeverity {
    Error,
    Warning,
    Info,
}

impl ValidationSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }
}

impl fmt::Display for ValidationSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationDiagnostic {
    pub severity: ValidationSeverity,
    pub context: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    pub diagnostics: Vec<ValidationDiagnostic>,
}

impl ValidationReport {
    pub fn push(
        &mut self,
        severity: ValidationSeverity,
        context: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.diagnostics.push(ValidationDiagnostic {
            severity,
            context: context.into(),
            message: message.into(),
        });
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|diag| diag.severity == ValidationSeverity::Error)
    }

    pub fn count(&self, severity: ValidationSeverity) -> usize {
        self.diagnostics
            .iter()
            .filter(|diag| diag.severity == severity)
            .count()
    }
}

/// Pre-flight check of a roster. Errors block balancing; warnings and info do not.
pub fn validate_roster(players: &[Player], team_size: usize) -> ValidationReport {
    let mut report = ValidationReport::default();

    if players.len() < 2 {
        report.push(
            ValidationSeverity::Error,
            "roster",
            format!("at least 2 players are required, found {}", players.len()),
        );
    }
    if let Err(err) = check_team_size(team_size) {
        report.push(ValidationSeverity::Error, "team_size", err.to_string());
    } else if team_size.checked_mul(2) != Some(players.len()) {
        report.push(
            ValidationSeverity::Warning,
            "roster",
            format!(
                "{} players for two teams of {team_size}; the split may be uneven",
                players.len()
            ),
        );
    }

    let mut seen = HashSet::new();
    for (index, player) in players.iter().enumerate() {
        let context = if player.id.is_empty() {
            format!("players[{index}]")
        } else {
            format!("players[{index}] ({})", player.id)
        };

        if player.id.trim().is_empty() {
            report.push(ValidationSeverity::Error, &context, "missing player id");
        } else if !seen.insert(player.id.as_str()) {
            report.push(
                ValidationSeverity::Error,
                &context,
                format!("duplicate player id '{}'", player.id),
            );
        }

        let mut defaulted = Vec::new();
        for attribute in Attribute::ALL {
            match player.ratings.get(attribute) {
                None => defaulted.push(attribute.as_str()),
                Some(value) if !value.is_finite() => report.push(
                    ValidationSeverity::Error,
                    &context,
                    format!("{attribute} rating is not a finite number"),
                ),
                Some(value) if value < RATING_RANGE.0 || value > RATING_RANGE.1 => report.push(
                    ValidationSeverity::Warning,
                    &context,
                    format!(
                        "{attribute} rating {value} is outside {}-{}",
                        RATING_RANGE.0, RATING_RANGE.1
                    ),
                ),
                Some(_) => {}
            }
        }
        if !defaulted.is_empty() {
            report.push(
                ValidationSeverity::Info,
                &context,
                format!("unrated, using default 3: {}", defaulted.join(", ")),
            );
        }
    }

    report
}
