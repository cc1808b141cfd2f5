use std::sync::RwLock;

use serde::Serialize;
use serde_json::{Value, json};

pub const DEFAULT_SAVINGS_RATE: f64 = 0.50;
pub const DEFAULT_MONTHLY_SAVINGS: f64 = 200.0;
pub const DEFAULT_CURRENT_AGE: u32 = 30;

/// User preferences that feed the education charts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Savings account interest, percent.
    pub savings_rate: f64,
    pub monthly_savings: f64,
    pub current_age: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            savings_rate: DEFAULT_SAVINGS_RATE,
            monthly_savings: DEFAULT_MONTHLY_SAVINGS,
            current_age: DEFAULT_CURRENT_AGE,
        }
    }
}

fn non_zero_number(doc: &Value, key: &str) -> Option<f64> {
    doc.get(key)
        .and_then(Value::as_f64)
        .filter(|v| v.is_finite() && *v != 0.0)
}

impl Settings {
    /// Reads a stored settings document. Fields that are missing, zero, not a
    /// number, or a document that does not parse at all fall back to the
    /// defaults field by field.
    pub fn from_json(raw: &str) -> Self {
        let Ok(doc) = serde_json::from_str::<Value>(raw) else {
            tracing::warn!("stored settings are not valid JSON, using defaults");
            return Self::default();
        };

        let defaults = Self::default();
        let current_age = non_zero_number(&doc, "currentAge")
            .filter(|age| *age >= 1.0)
            .map(|age| age.min(u32::MAX as f64) as u32)
            .unwrap_or(defaults.current_age);

        Self {
            savings_rate: non_zero_number(&doc, "savingsRate").unwrap_or(defaults.savings_rate),
            monthly_savings: non_zero_number(&doc, "monthlySavings")
                .unwrap_or(defaults.monthly_savings),
            current_age,
        }
    }

    pub fn to_json(&self) -> String {
        json!({
            "savingsRate": self.savings_rate,
            "monthlySavings": self.monthly_savings,
            "currentAge": self.current_age,
        })
        .to_string()
    }
}

/// Key-value persistence for the settings document.
pub trait SettingsStore: Send + Sync {
    fn load(&self) -> Settings;
    fn save(&self, settings: &Settings);
}

/// Keeps the serialized document in memory; nothing survives a restart.
#[derive(Debug, Default)]
pub struct InMemorySettingsStore {
    document: RwLock<Option<String>>,
}

impl InMemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(raw: impl Into<String>) -> Self {
        Self {
            document: RwLock::new(Some(raw.into())),
        }
    }
}

impl SettingsStore for InMemorySettingsStore {
    fn load(&self) -> Settings {
        let guard = self.document.read().unwrap_or_else(|e| e.into_inner());
        guard
            .as_deref()
            .map(Settings::from_json)
            .unwrap_or_default()
    }

    fn save(&self, settings: &Settings) {
        let mut guard = self.document.write().unwrap_or_else(|e| e.into_inner());
        *guard = Some(settings.to_json());
    }
}
