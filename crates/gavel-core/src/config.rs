use crate::errors::EvalError;
use crate::model::{PipelineMode, QueryCategory, TestCase};
use crate::thresholds::{Thresholds, DEFAULT_AUDIT_SAMPLE_RATE};
use regex::RegexBuilder;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const SUPPORTED_CONFIG_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    pub parallel: Option<usize>,
    pub timeout_seconds: Option<u64>,
    pub seed: Option<u64>,
    pub sample_rate: Option<f64>,
}

impl Settings {
    pub fn sample_rate(&self) -> f64 {
        self.sample_rate.unwrap_or(DEFAULT_AUDIT_SAMPLE_RATE)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteConfig {
    pub version: u32,
    pub suite: String,
    #[serde(default)]
    pub mode: PipelineMode,
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub thresholds: Thresholds,
    pub cases: Vec<TestCase>,
}

pub fn load_suite(path: &Path) -> Result<SuiteConfig, EvalError> {
    let raw = std::fs::read_to_string(path).map_err(|e| {
        EvalError::config(format!("failed to read suite {}: {}", path.display(), e))
    })?;
    let cfg: SuiteConfig = serde_yaml::from_str(&raw)
        .map_err(|e| EvalError::config(format!("failed to parse YAML: {}", e)))?;
    validate_suite(&cfg)?;
    Ok(cfg)
}

/// All validation happens before any evaluation starts. In particular every
/// guardrail regex must compile now: a broken guardrail that surfaced
/// mid-batch could silently pass a safety rule.
pub fn validate_suite(cfg: &SuiteConfig) -> Result<(), EvalError> {
    if cfg.version != SUPPORTED_CONFIG_VERSION {
        return Err(EvalError::config(format!(
            "unsupported suite version {} (supported: {})",
            cfg.version, SUPPORTED_CONFIG_VERSION
        )));
    }
    if cfg.cases.is_empty() {
        return Err(EvalError::config("suite has no cases"));
    }

    for case in &cfg.cases {
        for pattern in case
            .mandatory_patterns
            .iter()
            .chain(case.forbidden_patterns.iter())
        {
            compile_pattern(pattern).map_err(|e| EvalError::InvalidPattern {
                case_id: case.id.clone(),
                pattern: pattern.clone(),
                detail: e.to_string(),
            })?;
        }

        if case.category == QueryCategory::Other && case.rubric.is_empty() {
            return Err(EvalError::config(format!(
                "case '{}' is tier B but declares no rubric criteria",
                case.id
            )));
        }
    }

    Ok(())
}

/// Guardrail patterns match case-insensitively, mirroring how the safety
/// rules are authored ("coupon" must catch "Coupon").
pub fn compile_pattern(pattern: &str) -> Result<regex::Regex, regex::Error> {
    RegexBuilder::new(pattern).case_insensitive(true).build()
}
