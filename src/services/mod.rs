//! Business logic services

pub mod assessment_service;

pub use assessment_service::AssessmentService;
