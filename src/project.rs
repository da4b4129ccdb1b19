use serde::{Deserialize, Serialize};

pub use crate::shared::ids::ProjectId;

/// Committed progress values for one project, as reported by the server.
///
/// The server is the sole writer of this state. The client only ever replaces
/// it wholesale with the project object embedded in a successful submit
/// response.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectProgressState {
    pub id: ProjectId,
    #[serde(default)]
    pub name: String,
    /// Physical progress percentage, 0–100.
    pub progress: f64,
    /// Cumulative bill amount submitted against the estimated cost.
    pub bill_amount_submitted: f64,
    /// Estimated total cost, fixed at project creation. Always > 0.
    pub estimated_cost: f64,
}

impl ProjectProgressState {
    /// Bill amount expressed as a percentage of estimated cost.
    pub fn financial_percent(&self) -> f64 {
        if self.estimated_cost <= 0.0 {
            return 0.0;
        }
        self.bill_amount_submitted / self.estimated_cost * 100.0
    }

    pub fn is_physically_complete(&self) -> bool {
        self.progress == 100.0
    }

    pub fn is_financially_complete(&self) -> bool {
        self.financial_percent() == 100.0
    }
}
