use std::fmt;

use serde::{Deserialize, Serialize};

use crate::balance::attributes::{BalanceWeight, Player, PositionGroup, WeightTable};
use crate::balance::optimizer::SearchLimits;
use crate::balance::report::{balance_percent, BalanceReport};
use crate::balance::scorer::{score_assignment, ScoreBreakdown, TeamStats};
use crate::balance::slots::{SlotAssignment, SlotLayout, Team, MAX_TEAM_SIZE};
use crate::balance::template::PositionTemplate;
use crate::balance::{balance_scenario, check_team_size, BalanceScenario, SearchStrategy};
use crate::data::config::{config_path, load_balance_config_or_default, BalanceConfig};
use crate::error::BalanceError;

pub const MAX_ATTEMPTS: usize = 100_000;
pub const MAX_WORKERS: usize = 64;

#[derive(Debug, Clone, Deserialize)]
pub struct BalanceRequest {
    pub roster: Vec<Player>,
    #[serde(alias = "teamSize")]
    pub team_size: usize,
    pub template: Option<PositionTemplate>,
    pub weights: Option<Vec<BalanceWeight>>,
    pub seed: Option<u64>,
    #[serde(alias = "maxAttempts")]
    pub max_attempts: Option<usize>,
    #[serde(alias = "earlyExitThreshold")]
    pub early_exit_threshold: Option<f64>,
    pub workers: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScoreRequest {
    pub roster: Vec<Player>,
    #[serde(alias = "teamSize")]
    pub team_size: usize,
    #[serde(alias = "slotAssignments")]
    pub slot_assignments: Vec<SlotAssignment>,
    pub weights: Option<Vec<BalanceWeight>>,
    /// Used to read positions from slot numbers when an assignment has none.
    pub template: Option<PositionTemplate>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BalanceResponse {
    pub status: &'static str,
    #[serde(flatten)]
    pub report: BalanceReport,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScoreResponse {
    pub status: &'static str,
    pub team_size: usize,
    pub balance_score: f64,
    pub balance_percent: f64,
    pub breakdown: ScoreBreakdown,
    pub team_a: TeamStats,
    pub team_b: TeamStats,
}

#[derive(Debug, Clone, Serialize)]
pub struct SlotRange {
    pub first: u32,
    pub last: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct GroupSlots {
    pub position: PositionGroup,
    pub count: usize,
    pub team_a_base: u32,
    pub team_b_base: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct TemplateResponse {
    pub status: &'static str,
    pub team_size: usize,
    /// False when the fallback heuristic produced the template.
    pub configured: bool,
    pub template: PositionTemplate,
    pub team_a_slots: SlotRange,
    pub team_b_slots: SlotRange,
    pub groups: Vec<GroupSlots>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidationIssue {
    pub field: &'static str,
    pub messages: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidationErrorResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub errors: Vec<ValidationIssue>,
}

impl ValidationErrorResponse {
    fn new(errors: Vec<ValidationIssue>) -> Self {
        Self {
            status: "error",
            message: "Validation failed",
            errors,
        }
    }
}

impl From<BalanceError> for ValidationErrorResponse {
    fn from(err: BalanceError) -> Self {
        Self::new(vec![ValidationIssue {
            field: err.field(),
            messages: vec![err.to_string()],
        }])
    }
}

#[derive(Debug)]
pub enum PayloadError {
    Parse(serde_json::Error),
    Validation(ValidationErrorResponse),
}

impl fmt::Display for PayloadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "{err}"),
            Self::Validation(_) => write!(f, "invalid request"),
        }
    }
}

impl std::error::Error for PayloadError {}

impl From<BalanceError> for PayloadError {
    fn from(err: BalanceError) -> Self {
        Self::Validation(err.into())
    }
}

pub fn health_payload() -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&serde_json::json!({
        "status": "ok",
        "service": "fairplay-api",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

fn current_config() -> BalanceConfig {
    load_balance_config_or_default(&config_path())
}

/// `GET /api/templates/{team_size}`; `segment` is everything after the prefix.
pub fn template_payload(segment: &str) -> Result<String, PayloadError> {
    let raw = segment.split(['/', '?']).next().unwrap_or("");
    let team_size = match raw.parse::<usize>() {
        Ok(size) if check_team_size(size).is_ok() => size,
        _ => {
            return Err(PayloadError::Validation(ValidationErrorResponse::new(vec![
                ValidationIssue {
                    field: "team_size",
                    messages: vec![format!(
                        "'{raw}' is not an integer between 1 and {MAX_TEAM_SIZE}"
                    )],
                },
            ])))
        }
    };

    let catalog = current_config().catalog();
    let configured = catalog.configured(team_size);
    let template = configured.unwrap_or_else(|| PositionTemplate::fallback(team_size));
    let layout = SlotLayout::new(team_size, template);

    let range = |team: Team| {
        let slots = layout.team_range(team);
        SlotRange {
            first: *slots.start(),
            last: *slots.end(),
        }
    };
    let response = TemplateResponse {
        status: "ok",
        team_size,
        configured: configured.is_some(),
        template,
        team_a_slots: range(Team::A),
        team_b_slots: range(Team::B),
        groups: PositionGroup::ALL
            .into_iter()
            .map(|position| GroupSlots {
                position,
                count: template.count(position),
                team_a_base: layout.base_slot(Team::A, position),
                team_b_base: layout.base_slot(Team::B, position),
            })
            .collect(),
    };
    serde_json::to_string_pretty(&response).map_err(PayloadError::Parse)
}

pub fn balance_payload(body: &str) -> Result<String, PayloadError> {
    let request: BalanceRequest = serde_json::from_str(body).map_err(PayloadError::Parse)?;
    validate_balance_request(&request)?;

    let config = current_config();
    let weights = request.weights.clone().unwrap_or_else(|| config.weights.clone());
    let template = request
        .template
        .unwrap_or_else(|| config.catalog().resolve(request.team_size));

    let defaults = config.limits();
    let limits = SearchLimits {
        max_attempts: request.max_attempts.unwrap_or(defaults.max_attempts),
        early_exit_threshold: request
            .early_exit_threshold
            .unwrap_or(defaults.early_exit_threshold),
        ..defaults
    };
    let strategy = match request.workers {
        Some(0) => SearchStrategy::Sequential,
        Some(workers) => SearchStrategy::Parallel { workers },
        None => config.strategy(),
    };

    let report = balance_scenario(&BalanceScenario {
        roster: &request.roster,
        team_size: request.team_size,
        template: Some(template),
        weights: &weights,
        limits,
        seed: request.seed,
        strategy,
    })?;

    serde_json::to_string_pretty(&BalanceResponse {
        status: "ok",
        report,
    })
    .map_err(PayloadError::Parse)
}

fn validate_balance_request(request: &BalanceRequest) -> Result<(), PayloadError> {
    let mut errors: Vec<ValidationIssue> = Vec::new();

    if check_team_size(request.team_size).is_err() {
        errors.push(ValidationIssue {
            field: "team_size",
            messages: vec![format!("must be between 1 and {MAX_TEAM_SIZE}")],
        });
    }

    if request.roster.len() < 2 {
        errors.push(ValidationIssue {
            field: "roster",
            messages: vec!["must contain at least 2 players".to_string()],
        });
    }

    if let Some(attempts) = request.max_attempts {
        if !(1..=MAX_ATTEMPTS).contains(&attempts) {
            errors.push(ValidationIssue {
                field: "max_attempts",
                messages: vec![format!("must be between 1 and {MAX_ATTEMPTS}")],
            });
        }
    }

    if let Some(threshold) = request.early_exit_threshold {
        if !threshold.is_finite() || threshold < 0.0 {
            errors.push(ValidationIssue {
                field: "early_exit_threshold",
                messages: vec!["must be a finite, non-negative number".to_string()],
            });
        }
    }

    if request.workers.is_some_and(|workers| workers > MAX_WORKERS) {
        errors.push(ValidationIssue {
            field: "workers",
            messages: vec![format!("must be at most {MAX_WORKERS}")],
        });
    }

    if errors.is_empty() {
        return Ok(());
    }
    Err(PayloadError::Validation(ValidationErrorResponse::new(errors)))
}

pub fn score_payload(body: &str) -> Result<String, PayloadError> {
    let request: ScoreRequest = serde_json::from_str(body).map_err(PayloadError::Parse)?;
    check_team_size(request.team_size)?;

    let config = current_config();
    let template = request
        .template
        .unwrap_or_else(|| config.catalog().resolve(request.team_size));
    template.validate(request.team_size)?;
    let layout = SlotLayout::new(request.team_size, template);
    layout.check_sides(&request.slot_assignments)?;
    let assignments = layout.with_slot_positions(&request.slot_assignments);

    let weights = request.weights.unwrap_or(config.weights);
    let scored = score_assignment(
        &request.roster,
        &assignments,
        &WeightTable::from_weights(&weights),
    )?;

    serde_json::to_string_pretty(&ScoreResponse {
        status: "ok",
        team_size: request.team_size,
        balance_score: scored.breakdown.total,
        balance_percent: balance_percent(scored.breakdown.total),
        breakdown: scored.breakdown,
        team_a: scored.team_a,
        team_b: scored.team_b,
    })
    .map_err(PayloadError::Parse)
}
