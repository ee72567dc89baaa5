mod alert;
mod holding;
mod returns;
mod risk;
mod stress;

pub use alert::{AlertType, RiskAlert};
pub use holding::{total_value, HoldingSnapshot};
pub use returns::{AlignedReturns, ReturnHistory, ReturnPoint};
pub use risk::{DataQuality, RiskLevel, RiskMetrics, RiskProfile};
pub use stress::{
    HoldingImpact, ScenarioCatalogue, ScenarioKind, StressScenario, StressTestResult,
};
