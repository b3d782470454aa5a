//! Biker Safety AI
//!
//! Sends a biker photo to the Gemini API and returns a structured safety
//! report (helmet usage, traffic-rule compliance) through an explicit view
//! state machine. Presentation is left to the embedding front-end, which
//! renders the published [`ViewState`].

pub mod analyzer;
pub mod api;
pub mod config;
pub mod controller;
pub mod error;
pub mod image;
pub mod types;

pub use analyzer::Analyzer;
pub use api::GeminiClient;
pub use config::Config;
pub use controller::{SafetyController, ViewState};
pub use error::{Error, Result};
pub use image::{encode, AssetId, EncodedPayload, ImageAsset, MimeType};
pub use types::{AnalysisResult, HelmetStatus, RuleCompliance};
