//! Sidecar configuration

use crate::error::{LedgerError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable naming an optional TOML config file.
pub const CONFIG_ENV: &str = "TUITIOND_CONFIG";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Workspace opened at startup, before any `workspace.select`.
    pub workspace: Option<PathBuf>,
    pub scoring: ScoringConfig,
    pub payroll: PayrollConfig,
    pub codes: CodesConfig,
    pub dashboard: DashboardConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub passing_percentage: i64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            passing_percentage: 35,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PayrollConfig {
    /// Flat day length used for hourly staff; no per-hour tracking exists.
    pub hours_per_day: f64,
}

impl Default for PayrollConfig {
    fn default() -> Self {
        Self { hours_per_day: 8.0 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CodesConfig {
    pub student_prefix: String,
    pub student_start: u64,
    pub staff_prefix: String,
    pub receipt_prefix: String,
}

impl Default for CodesConfig {
    fn default() -> Self {
        Self {
            student_prefix: "DT-".to_string(),
            student_start: 1001,
            staff_prefix: "DT-S-".to_string(),
            receipt_prefix: "TMS".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub trailing_months: u32,
    pub recent_payments_shown: usize,
    pub subject_chart_limit: usize,
    pub dashboard_payments_window: usize,
    pub analytics_payments_window: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            trailing_months: 6,
            recent_payments_shown: 5,
            subject_chart_limit: 8,
            dashboard_payments_window: 50,
            analytics_payments_window: 100,
        }
    }
}

impl Config {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let cfg: Config = toml::from_str(text).map_err(|e| LedgerError::Config(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            LedgerError::Config(format!("failed to read {}: {}", path.to_string_lossy(), e))
        })?;
        Self::from_toml_str(&text)
    }

    /// Reads the file named by `TUITIOND_CONFIG`, or returns defaults when unset.
    pub fn load_from_env() -> Result<Self> {
        match std::env::var_os(CONFIG_ENV) {
            Some(p) if !p.is_empty() => Self::from_file(Path::new(&p)),
            _ => Ok(Self::default()),
        }
    }

    fn validate(&self) -> Result<()> {
        if !(0..=100).contains(&self.scoring.passing_percentage) {
            return Err(LedgerError::Config(
                "scoring.passing_percentage must be between 0 and 100".to_string(),
            ));
        }
        if !self.payroll.hours_per_day.is_finite() || self.payroll.hours_per_day <= 0.0 {
            return Err(LedgerError::Config(
                "payroll.hours_per_day must be positive".to_string(),
            ));
        }
        if self.dashboard.trailing_months == 0 {
            return Err(LedgerError::Config(
                "dashboard.trailing_months must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_yields_defaults() {
        let cfg = Config::from_toml_str("").expect("parse");
        assert_eq!(cfg.scoring.passing_percentage, 35);
        assert_eq!(cfg.payroll.hours_per_day, 8.0);
        assert_eq!(cfg.codes.student_prefix, "DT-");
        assert_eq!(cfg.codes.student_start, 1001);
        assert_eq!(cfg.dashboard.trailing_months, 6);
        assert!(cfg.workspace.is_none());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let cfg = Config::from_toml_str(
            r#"
            workspace = "/tmp/tuition"

            [scoring]
            passing_percentage = 40

            [dashboard]
            trailing_months = 12
            "#,
        )
        .expect("parse");
        assert_eq!(cfg.workspace, Some(PathBuf::from("/tmp/tuition")));
        assert_eq!(cfg.scoring.passing_percentage, 40);
        assert_eq!(cfg.dashboard.trailing_months, 12);
        assert_eq!(cfg.dashboard.recent_payments_shown, 5);
        assert_eq!(cfg.payroll.hours_per_day, 8.0);
    }

    #[test]
    fn out_of_range_threshold_is_rejected() {
        let err = Config::from_toml_str("[scoring]\npassing_percentage = 120\n")
            .expect_err("must fail");
        assert!(matches!(err, LedgerError::Config(_)));
    }
}
