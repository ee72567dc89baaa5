pub mod alert_service;
pub mod assessment_service;
pub mod returns_service;
pub mod risk_service;
pub mod stress_service;
