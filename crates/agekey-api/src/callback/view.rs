use serde::Serialize;

use super::CallbackResult;

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct ThresholdRow {
    pub label: String,
    pub verified: bool,
}

/// Template context for `callback.html`.
#[derive(Debug, Serialize)]
pub struct CallbackView {
    pub outcome: &'static str,
    pub flow: &'static str,
    pub message: String,
    pub thresholds: Vec<ThresholdRow>,
}

impl From<&CallbackResult> for CallbackView {
    fn from(result: &CallbackResult) -> Self {
        let mut thresholds: Vec<ThresholdRow> = result
            .age_thresholds()
            .into_iter()
            .flatten()
            .map(|(label, verified)| ThresholdRow {
                label: label.clone(),
                verified: *verified,
            })
            .collect();

        // "8" sorts after "18" as text
        thresholds.sort_by_key(|row| (row.label.parse::<u32>().unwrap_or(u32::MAX), row.label.clone()));

        Self {
            outcome: result.outcome().as_str(),
            flow: result.flow_label(),
            message: result.message().to_string(),
            thresholds,
        }
    }
}
