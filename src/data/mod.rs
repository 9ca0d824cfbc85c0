pub mod config;
pub mod roster;
pub mod validate;

pub use config::{
    config_path, load_balance_config, load_balance_config_or_default, BalanceConfig,
    SearchSettings, DEFAULT_CONFIG_PATH,
};
pub use roster::{load_roster, parse_roster_csv, parse_roster_json};
pub use validate::{validate_roster, ValidationDiagnostic, ValidationReport, ValidationSeverity};
