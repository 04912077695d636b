//! Maintenance tasks extracted from a manual.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Urgency of a maintenance task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    /// All priorities in dashboard order.
    pub const ALL: [Priority; 3] = [Priority::High, Priority::Medium, Priority::Low];

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One preventive maintenance task found in the manual.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaintenanceItem {
    /// Component or subsystem the task applies to
    pub component: String,
    /// How often the task is due, as written in the manual
    pub interval: String,
    /// What the technician has to do
    pub task: String,
    pub priority: Priority,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_deserializes_from_schema_shape() {
        let json = r#"{"component":"Hydraulic pump","interval":"Every 500 hours","task":"Replace filter","priority":"High"}"#;
        let item: MaintenanceItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.component, "Hydraulic pump");
        assert_eq!(item.priority, Priority::High);
    }

    #[test]
    fn test_unknown_priority_is_rejected() {
        let json = r#"{"component":"Belt","interval":"Weekly","task":"Inspect","priority":"Urgent"}"#;
        assert!(serde_json::from_str::<MaintenanceItem>(json).is_err());
    }
}
