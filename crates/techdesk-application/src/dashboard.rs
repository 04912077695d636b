//! Maintenance dashboard summary.

use serde::Serialize;
use techdesk_core::maintenance::{MaintenanceItem, Priority};
use techdesk_core::session::Session;

/// What the dashboard should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DashboardState {
    /// Extraction still running.
    Analyzing,
    /// Extraction finished (or failed) with nothing to show.
    Empty,
    Ready,
}

/// Task count for one priority bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PriorityCount {
    pub priority: Priority,
    pub count: usize,
}

/// Priority distribution plus the task table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardSummary {
    pub state: DashboardState,
    /// Always High, Medium, Low in that order.
    pub counts: Vec<PriorityCount>,
    pub items: Vec<MaintenanceItem>,
}

impl DashboardSummary {
    pub fn from_items(items: &[MaintenanceItem], is_analyzing: bool) -> Self {
        let counts = Priority::ALL
            .iter()
            .map(|&priority| PriorityCount {
                priority,
                count: items.iter().filter(|item| item.priority == priority).count(),
            })
            .collect();

        let state = if is_analyzing {
            DashboardState::Analyzing
        } else if items.is_empty() {
            DashboardState::Empty
        } else {
            DashboardState::Ready
        };

        Self {
            state,
            counts,
            items: items.to_vec(),
        }
    }

    pub fn from_session(session: &Session) -> Self {
        Self::from_items(session.maintenance_items(), session.is_analyzing())
    }

    pub fn total(&self) -> usize {
        self.items.len()
    }

    pub fn count(&self, priority: Priority) -> usize {
        self.counts
            .iter()
            .find(|c| c.priority == priority)
            .map(|c| c.count)
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(priority: Priority) -> MaintenanceItem {
        MaintenanceItem {
            component: "Conveyor".to_string(),
            interval: "Weekly".to_string(),
            task: "Check belt tension".to_string(),
            priority,
        }
    }

    #[test]
    fn test_counts_by_priority() {
        let items = vec![
            item(Priority::High),
            item(Priority::Low),
            item(Priority::High),
        ];
        let summary = DashboardSummary::from_items(&items, false);

        assert_eq!(summary.state, DashboardState::Ready);
        assert_eq!(summary.total(), 3);
        assert_eq!(summary.count(Priority::High), 2);
        assert_eq!(summary.count(Priority::Medium), 0);
        assert_eq!(summary.count(Priority::Low), 1);
        let order: Vec<Priority> = summary.counts.iter().map(|c| c.priority).collect();
        assert_eq!(order, Priority::ALL.to_vec());
    }

    #[test]
    fn test_states() {
        assert_eq!(
            DashboardSummary::from_items(&[], true).state,
            DashboardState::Analyzing
        );
        assert_eq!(
            DashboardSummary::from_items(&[], false).state,
            DashboardState::Empty
        );
    }
}
