//! User preferences saved alongside strategies

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    #[default]
    Line,
    Bar,
    Area,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    #[default]
    Dark,
}

/// Front-end preferences. Missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UserPreferences {
    /// Trials per run when the caller does not say
    pub default_simulation_count: usize,
    pub chart_type: ChartType,
    pub theme: Theme,
    pub show_probabilities: bool,
    pub animate_simulations: bool,
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            default_simulation_count: 1000,
            chart_type: ChartType::Line,
            theme: Theme::Dark,
            show_probabilities: true,
            animate_simulations: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let prefs = UserPreferences::default();
        assert_eq!(prefs.default_simulation_count, 1000);
        assert_eq!(prefs.chart_type, ChartType::Line);
        assert_eq!(prefs.theme, Theme::Dark);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let prefs: UserPreferences = serde_json::from_str(r#"{"chartType":"area","theme":"light"}"#).unwrap();
        assert_eq!(prefs.chart_type, ChartType::Area);
        assert_eq!(prefs.theme, Theme::Light);
        assert_eq!(prefs.default_simulation_count, 1000);
        assert!(prefs.animate_simulations);
    }
}
