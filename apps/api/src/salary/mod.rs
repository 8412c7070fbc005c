//! Salary prediction: feature extraction, the classifier boundary, and the predictor
//! that maps class labels to salary ranges.

pub mod classifier;
pub mod features;
pub mod predictor;
