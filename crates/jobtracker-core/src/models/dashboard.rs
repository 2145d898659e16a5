//! Aggregates returned by `GET /api/job-applications/dashboard_stats/`.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DashboardStats {
    #[serde(default)]
    pub status_counts: Vec<StatusCount>,
    #[serde(default)]
    pub recent_applications: u64,
    #[serde(default)]
    pub upcoming_interviews: u64,
    #[serde(default)]
    pub total_applications: u64,
    #[serde(default)]
    pub monthly_applications: Vec<MonthlyCount>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusCount {
    pub status: String,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlyCount {
    /// Calendar month, 1-12.
    #[serde(default, deserialize_with = "deserialize_month")]
    pub month: Option<u32>,
    pub count: u64,
}

// The month comes out of a SQL EXTRACT, so depending on the database it is
// an integer, a float, or a decimal rendered as a string.
fn deserialize_month<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let month = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(month
        .filter(|m| m.fract() == 0.0 && (1.0..=12.0).contains(m))
        .map(|m| m as u32))
}

impl DashboardStats {
    /// Count for one status code, 0 when the backend reported none.
    pub fn count_for(&self, status: &str) -> u64 {
        self.status_counts
            .iter()
            .find(|c| c.status.eq_ignore_ascii_case(status))
            .map(|c| c.count)
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_dashboard_stats() {
        let stats: DashboardStats = serde_json::from_value(json!({
            "status_counts": [
                {"status": "applied", "count": 4},
                {"status": "offer", "count": 1}
            ],
            "recent_applications": 3,
            "upcoming_interviews": 2,
            "total_applications": 5,
            "monthly_applications": [
                {"month": "4", "count": 2},
                {"month": 5.0, "count": 3},
                {"month": 13, "count": 1}
            ]
        }))
        .unwrap();

        assert_eq!(stats.count_for("applied"), 4);
        assert_eq!(stats.count_for("rejected"), 0);
        assert_eq!(stats.monthly_applications[0].month, Some(4));
        assert_eq!(stats.monthly_applications[1].month, Some(5));
        assert_eq!(stats.monthly_applications[2].month, None);
    }

    #[test]
    fn test_empty_dashboard() {
        let stats: DashboardStats = serde_json::from_str("{}").unwrap();
        assert_eq!(stats.total_applications, 0);
        assert!(stats.status_counts.is_empty());
    }
}
