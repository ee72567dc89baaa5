pub mod config;
pub mod errors;
pub mod logging;
pub mod models;
pub mod services;

pub use config::{AlertThresholds, EngineConfig, Sector, SectorTable};
pub use errors::RiskError;
pub use models::{
    AlertType, AlignedReturns, DataQuality, HoldingImpact, HoldingSnapshot, ReturnHistory,
    ReturnPoint, RiskAlert, RiskLevel, RiskMetrics, RiskProfile, ScenarioCatalogue, ScenarioKind,
    StressScenario, StressTestResult,
};
pub use services::assessment_service::{assess, check_alerts, run_assessment, stress_test, Assessment};
pub use services::stress_service::StressTestEngine;
