//! Service crate for the movie-match recommendation engine.
//!
//! This crate contains the orchestrator that coordinates one user
//! interaction: filter the catalog, narrow the recommender with the
//! result, and produce the ranked lists shown to the user.

pub mod orchestrator;

pub use orchestrator::{FilterOptions, MovieSummary, OrchestratorConfig, RecommendationOrchestrator};
