use crate::compiler::schedule::{Budget, Deadline, StepBudget, Unlimited};
use crate::error::OptionsError;
use serde::Deserialize;
use std::fs;
use std::time::Duration;

/// Settings that shape the generated script.
///
/// Every field has a default, so an options file only needs the keys it
/// wants to change.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ConverterOptions {
    pub budget: BudgetConfig,
    /// Output variables are named `{variable_prefix}{node id}`.
    pub variable_prefix: String,
    /// Path a sink writes to when it has none configured.
    pub default_output_path: String,
    /// Lines written at the top of every script.
    pub imports: Vec<String>,
}

impl Default for ConverterOptions {
    fn default() -> Self {
        Self {
            budget: BudgetConfig::default(),
            variable_prefix: "df_tool_".to_string(),
            default_output_path: "output.csv".to_string(),
            imports: vec![
                "import pandas as pd".to_string(),
                "import requests".to_string(),
                "from io import StringIO".to_string(),
                "import numpy as np".to_string(),
                "from geopy.distance import great_circle".to_string(),
            ],
        }
    }
}

impl ConverterOptions {
    /// Load options from a JSON file.
    pub fn from_file(path: &str) -> Result<Self, OptionsError> {
        let content = fs::read_to_string(path).map_err(|source| OptionsError::Io {
            path: path.to_string(),
            source,
        })?;
        Self::from_json(&content)
    }

    pub fn from_json(json: &str) -> Result<Self, OptionsError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// How long the scheduler may keep dequeuing nodes.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum BudgetConfig {
    Unlimited,
    Steps { max_steps: usize },
    Deadline { millis: u64 },
}

impl Default for BudgetConfig {
    fn default() -> Self {
        BudgetConfig::Deadline { millis: 10_000 }
    }
}

impl BudgetConfig {
    /// Creates a fresh budget; a deadline starts counting now.
    pub fn start(self) -> Box<dyn Budget> {
        match self {
            BudgetConfig::Unlimited => Box::new(Unlimited),
            BudgetConfig::Steps { max_steps } => Box::new(StepBudget::new(max_steps)),
            BudgetConfig::Deadline { millis } => {
                Box::new(Deadline::starting_now(Duration::from_millis(millis)))
            }
        }
    }
}
