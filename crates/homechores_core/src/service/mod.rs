//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Keep the CLI and other callers decoupled from storage details.

pub mod availability_service;
pub mod distribution_service;
pub mod family_service;
pub mod member_service;
pub mod task_service;
