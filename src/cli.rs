use std::collections::HashMap;
use std::env;
use std::fs;

use serde::Deserialize;

use crate::balance::attributes::{Player, WeightTable};
use crate::balance::report::{balance_percent, BalanceReport};
use crate::balance::scorer::score_assignment;
use crate::balance::slots::{SlotAssignment, SlotLayout, Team};
use crate::balance::{balance_scenario, check_team_size, BalanceScenario};
use crate::data::config::{config_path, load_balance_config_or_default};
use crate::data::roster::load_roster;
use crate::data::validate::validate_roster;
use crate::server;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Serve,
    Balance,
    Score,
    Template,
    Validate,
}

pub fn parse_command(args: &[String]) -> Option<Command> {
    match args.get(1).map(String::as_str) {
        Some("serve") => Some(Command::Serve),
        Some("balance") => Some(Command::Balance),
        Some("score") => Some(Command::Score),
        Some("template") => Some(Command::Template),
        Some("validate") => Some(Command::Validate),
        _ => None,
    }
}

pub fn run_with_args(args: &[String]) -> i32 {
    match parse_command(args) {
        Some(Command::Serve) => handle_serve(),
        Some(Command::Balance) => handle_balance(args),
        Some(Command::Score) => handle_score(args),
        Some(Command::Template) => handle_template(args),
        Some(Command::Validate) => handle_validate(args),
        None => {
            eprintln!("usage: fairplay <serve|balance|score|template|validate>");
            2
        }
    }
}

/// Arguments after the command name, with `--flags` removed.
fn positional(args: &[String]) -> Vec<&String> {
    args.iter().skip(2).filter(|arg| !arg.starts_with("--")).collect()
}

fn handle_serve() -> i32 {
    let bind_addr =
        env::var("FAIRPLAY_BIND").unwrap_or_else(|_| server::DEFAULT_BIND_ADDR.to_string());
    match server::run_server(&bind_addr) {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("server error: {err}");
            1
        }
    }
}

fn read_roster(path: &str) -> Option<Vec<Player>> {
    match load_roster(path) {
        Ok(players) => Some(players),
        Err(err) => {
            eprintln!("failed to load roster: {err}");
            None
        }
    }
}

fn default_team_size(roster_len: usize) -> usize {
    roster_len.div_ceil(2).max(1)
}

fn handle_balance(args: &[String]) -> i32 {
    let positional = positional(args);
    let Some(path) = positional.first() else {
        eprintln!("usage: fairplay balance <roster.json|roster.csv> [team_size] [seed] [--table]");
        return 2;
    };
    let as_table = args.iter().any(|arg| arg == "--table");

    let Some(roster) = read_roster(path) else {
        return 1;
    };
    let team_size = parse_usize_arg(
        positional.get(1).copied(),
        "team_size",
        default_team_size(roster.len()),
    );
    let seed = positional.get(2).and_then(|raw| match raw.parse::<u64>() {
        Ok(seed) => Some(seed),
        Err(_) => {
            eprintln!("invalid seed '{raw}', drawing a random one");
            None
        }
    });

    let config = load_balance_config_or_default(&config_path());
    let report = match balance_scenario(&BalanceScenario {
        roster: &roster,
        team_size,
        template: Some(config.catalog().resolve(team_size)),
        weights: &config.weights,
        limits: config.limits(),
        seed,
        strategy: config.strategy(),
    }) {
        Ok(report) => report,
        Err(err) => {
            eprintln!("balance failed: {err}");
            return 1;
        }
    };

    if as_table {
        print!("{}", render_table(&report, &roster));
        return 0;
    }
    match serde_json::to_string_pretty(&report) {
        Ok(payload) => {
            println!("{payload}");
            0
        }
        Err(err) => {
            eprintln!("failed to serialize balance report: {err}");
            1
        }
    }
}

fn render_table(report: &BalanceReport, roster: &[Player]) -> String {
    let names: HashMap<&str, &str> = roster
        .iter()
        .map(|p| (p.id.as_str(), p.name.as_str()))
        .collect();
    let mut out = String::from("slot\tteam\tposition\tplayer_id\tname\n");
    for assignment in &report.slot_assignments {
        let position = assignment
            .position
            .map(|p| p.as_str())
            .unwrap_or("flex");
        let name = names.get(assignment.player_id.as_str()).copied().unwrap_or("");
        out.push_str(&format!(
            "{}\t{}\t{}\t{}\t{}\n",
            assignment.slot_number, assignment.team, position, assignment.player_id, name
        ));
    }
    out.push_str(&format!(
        "score\t{:.6}\tbalance\t{:.1}%\tattempts\t{}\tseed\t{}\n",
        report.balance_score, report.balance_percent, report.attempts, report.seed
    ));
    out
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum AssignmentFile {
    List(Vec<SlotAssignment>),
    Wrapped {
        #[serde(alias = "slotAssignments")]
        slot_assignments: Vec<SlotAssignment>,
    },
}

fn handle_score(args: &[String]) -> i32 {
    let positional = positional(args);
    let (Some(roster_path), Some(assignments_path)) = (positional.first(), positional.get(1)) else {
        eprintln!("usage: fairplay score <roster.json|roster.csv> <assignments.json> [team_size]");
        return 2;
    };

    let Some(roster) = read_roster(roster_path) else {
        return 1;
    };
    let assignments = match fs::read_to_string(assignments_path.as_str())
        .map_err(|err| err.to_string())
        .and_then(|raw| {
            serde_json::from_str::<AssignmentFile>(&raw).map_err(|err| err.to_string())
        }) {
        Ok(AssignmentFile::List(list)) | Ok(AssignmentFile::Wrapped { slot_assignments: list }) => list,
        Err(err) => {
            eprintln!("failed to load assignments '{assignments_path}': {err}");
            return 1;
        }
    };
    let team_size = parse_usize_arg(
        positional.get(2).copied(),
        "team_size",
        default_team_size(roster.len()),
    );

    let config = load_balance_config_or_default(&config_path());
    let template = config.catalog().resolve(team_size);
    let scored = check_team_size(team_size)
        .and_then(|()| template.validate(team_size))
        .map(|()| SlotLayout::new(team_size, template))
        .and_then(|layout| {
            layout.check_sides(&assignments)?;
            let assignments = layout.with_slot_positions(&assignments);
            score_assignment(&roster, &assignments, &WeightTable::from_weights(&config.weights))
        });
    let scored = match scored {
        Ok(scored) => scored,
        Err(err) => {
            eprintln!("score failed: {err}");
            return 1;
        }
    };

    let payload = serde_json::json!({
        "team_size": team_size,
        "balance_score": scored.breakdown.total,
        "balance_percent": balance_percent(scored.breakdown.total),
        "breakdown": scored.breakdown,
        "team_a": scored.team_a,
        "team_b": scored.team_b,
    });
    match serde_json::to_string_pretty(&payload) {
        Ok(payload) => {
            println!("{payload}");
            0
        }
        Err(err) => {
            eprintln!("failed to serialize score: {err}");
            1
        }
    }
}

fn handle_template(args: &[String]) -> i32 {
    let Some(team_size) = args
        .get(2)
        .and_then(|raw| raw.parse::<usize>().ok())
        .filter(|size| *size > 0)
    else {
        eprintln!("usage: fairplay template <team_size>");
        return 2;
    };
    if let Err(err) = check_team_size(team_size) {
        eprintln!("template failed: {err}");
        return 1;
    }

    let catalog = load_balance_config_or_default(&config_path()).catalog();
    let source = if catalog.configured(team_size).is_some() {
        "configured"
    } else {
        "fallback"
    };
    let template = catalog.resolve(team_size);
    let layout = SlotLayout::new(team_size, template);

    println!(
        "team_size={team_size} ({source}): defenders={} midfielders={} attackers={}",
        template.defenders, template.midfielders, template.attackers
    );
    for team in [Team::A, Team::B] {
        let range = layout.team_range(team);
        println!("team {team}: slots {}-{}", range.start(), range.end());
    }
    0
}

fn handle_validate(args: &[String]) -> i32 {
    let positional = positional(args);
    let Some(path) = positional.first() else {
        eprintln!("usage: fairplay validate <roster.json|roster.csv> [team_size]");
        return 2;
    };
    let Some(roster) = read_roster(path) else {
        return 1;
    };
    let team_size = parse_usize_arg(
        positional.get(1).copied(),
        "team_size",
        default_team_size(roster.len()),
    );

    let report = validate_roster(&roster, team_size);
    for diag in &report.diagnostics {
        eprintln!("- [{}] {}: {}", diag.severity, diag.context, diag.message);
    }
    if report.has_errors() {
        eprintln!("validation failed: {} issue(s)", report.diagnostics.len());
        1
    } else {
        println!("validation passed: {path} ({} players)", roster.len());
        0
    }
}

fn parse_usize_arg(raw: Option<&String>, name: &str, default: usize) -> usize {
    raw.and_then(|value| value.parse::<usize>().ok())
        .unwrap_or_else(|| {
            if let Some(value) = raw {
                eprintln!("invalid {name} '{value}', defaulting to {default}");
            }
            default
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parses_known_commands() {
        assert_eq!(parse_command(&args(&["fairplay", "balance"])), Some(Command::Balance));
        assert_eq!(parse_command(&args(&["fairplay", "template"])), Some(Command::Template));
        assert_eq!(parse_command(&args(&["fairplay", "launch"])), None);
        assert_eq!(parse_command(&args(&["fairplay"])), None);
    }

    #[test]
    fn positional_skips_flags() {
        let list = args(&["fairplay", "balance", "--table", "roster.json", "9"]);
        let positional = positional(&list);
        assert_eq!(positional, vec!["roster.json", "9"]);
    }

    #[test]
    fn default_team_size_rounds_up() {
        assert_eq!(default_team_size(18), 9);
        assert_eq!(default_team_size(19), 10);
        assert_eq!(default_team_size(0), 1);
    }

    #[test]
    fn usage_errors_exit_with_two() {
        assert_eq!(run_with_args(&args(&["fairplay"])), 2);
        assert_eq!(run_with_args(&args(&["fairplay", "template", "zero"])), 2);
        assert_eq!(run_with_args(&args(&["fairplay", "balance"])), 2);
    }

    #[test]
    fn oversized_template_request_fails_without_panicking() {
        assert_eq!(run_with_args(&args(&["fairplay", "template", "2147483648"])), 1);
        assert_eq!(run_with_args(&args(&["fairplay", "template", "65"])), 1);
    }
}
