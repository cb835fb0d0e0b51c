//! Diagnosis: the ensemble classifier client, the generative advice client,
//! and the built-in disease catalog used when no generative advice is
//! available.

pub mod advice;
pub mod catalog;
pub mod ensemble;

pub use advice::{AdviceClient, AdviceConfig};
pub use catalog::{static_advice, DiseaseClass, DISEASE_CLASSES};
pub use ensemble::{synthesize_breakdown, EnsembleClassifier, EnsembleConfig, ModelOffset};
