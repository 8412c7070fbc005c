//! Salary classifier boundary: the model trait, the exported tree-ensemble artifact,
//! the label encoder, and artifact loading from the model directory.
//!
//! The engine treats the model as opaque: it hands over one [`FeatureRow`] and gets a
//! class index back. Implementations must be `Send + Sync` because one loaded model is
//! shared by every concurrent request. An implementation whose inference is not
//! thread-safe has to serialise calls itself.

use std::collections::HashSet;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::salary::features::FeatureRow;

pub const MODEL_FILE: &str = "salary_prediction_model.json";
pub const ENCODER_FILE: &str = "salary_label_encoder.json";

#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("model has no trees")]
    EmptyModel,

    #[error("tree {tree} references missing node {node}")]
    MissingNode { tree: usize, node: usize },

    #[error("tree {tree} does not reach a leaf")]
    NoLeaf { tree: usize },

    #[error("tree {tree} leaf has {found} votes, expected {expected}")]
    VoteShape {
        tree: usize,
        found: usize,
        expected: usize,
    },

    #[error("class index {0} is not known to the label encoder")]
    UnknownClass(usize),
}

/// A trained salary classifier.
pub trait SalaryModel: Send + Sync {
    /// Predicted class index for one feature row.
    fn predict(&self, row: &FeatureRow) -> Result<usize, ClassifierError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Label encoder
// ────────────────────────────────────────────────────────────────────────────

/// Maps class indices back to the labels seen at training time.
#[derive(Debug, Clone, Deserialize)]
pub struct LabelEncoder {
    pub classes: Vec<String>,
}

impl LabelEncoder {
    pub fn inverse_transform(&self, class_index: usize) -> Result<&str, ClassifierError> {
        self.classes
            .get(class_index)
            .map(String::as_str)
            .ok_or(ClassifierError::UnknownClass(class_index))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tree ensemble
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumericFeature {
    ExperienceNum,
    SkillCount,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextFeature {
    JobType,
    KeySkills,
    Location,
    JobDesig,
}

/// One node of an exported decision tree. Child fields are indices into the tree's node list.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TreeNode {
    /// Left when `value <= threshold`.
    Numeric {
        feature: NumericFeature,
        threshold: f64,
        left: usize,
        right: usize,
    },
    /// Right when the column's token set contains `token`.
    Token {
        feature: TextFeature,
        token: String,
        left: usize,
        right: usize,
    },
    Leaf {
        votes: Vec<f64>,
    },
}

#[derive(Debug, Clone, Deserialize)]
pub struct DecisionTree {
    pub nodes: Vec<TreeNode>,
}

/// Random-forest style classifier exported by the training pipeline.
#[derive(Debug, Clone, Deserialize)]
pub struct ForestModel {
    pub n_classes: usize,
    pub trees: Vec<DecisionTree>,
}

static TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\w\w+\b").unwrap());

/// Lower-cased unigrams and bigrams of a text column.
fn tokens(value: &str) -> HashSet<String> {
    let value = value.to_lowercase();
    let words: Vec<&str> = TOKEN.find_iter(&value).map(|m| m.as_str()).collect();
    let mut set: HashSet<String> = words.iter().map(|w| w.to_string()).collect();
    set.extend(words.windows(2).map(|pair| pair.join(" ")));
    set
}

struct RowView<'a> {
    row: &'a FeatureRow,
    text_tokens: [HashSet<String>; 4],
}

impl<'a> RowView<'a> {
    fn new(row: &'a FeatureRow) -> Self {
        Self {
            row,
            text_tokens: [
                tokens(&row.job_type),
                tokens(&row.key_skills),
                tokens(&row.location),
                tokens(&row.job_desig),
            ],
        }
    }

    fn numeric(&self, feature: NumericFeature) -> f64 {
        match feature {
            NumericFeature::ExperienceNum => self.row.experience_num,
            NumericFeature::SkillCount => f64::from(self.row.skill_count),
        }
    }

    fn has_token(&self, feature: TextFeature, token: &str) -> bool {
        let idx = match feature {
            TextFeature::JobType => 0,
            TextFeature::KeySkills => 1,
            TextFeature::Location => 2,
            TextFeature::JobDesig => 3,
        };
        self.text_tokens[idx].contains(token)
    }
}

impl DecisionTree {
    fn leaf_votes(&self, tree: usize, row: &RowView<'_>) -> Result<&[f64], ClassifierError> {
        let mut idx = 0;
        // More lookups than nodes means the tree loops.
        for _ in 0..=self.nodes.len() {
            let node = self
                .nodes
                .get(idx)
                .ok_or(ClassifierError::MissingNode { tree, node: idx })?;
            idx = match node {
                TreeNode::Leaf { votes } => return Ok(votes.as_slice()),
                TreeNode::Numeric {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if row.numeric(*feature) <= *threshold {
                        *left
                    } else {
                        *right
                    }
                }
                TreeNode::Token {
                    feature,
                    token,
                    left,
                    right,
                } => {
                    if row.has_token(*feature, token) {
                        *right
                    } else {
                        *left
                    }
                }
            };
        }
        Err(ClassifierError::NoLeaf { tree })
    }
}

impl SalaryModel for ForestModel {
    fn predict(&self, row: &FeatureRow) -> Result<usize, ClassifierError> {
        if self.trees.is_empty() {
            return Err(ClassifierError::EmptyModel);
        }

        let view = RowView::new(row);
        let mut proba = vec![0.0_f64; self.n_classes];

        for (t, tree) in self.trees.iter().enumerate() {
            let votes = tree.leaf_votes(t, &view)?;
            if votes.len() != self.n_classes {
                return Err(ClassifierError::VoteShape {
                    tree: t,
                    found: votes.len(),
                    expected: self.n_classes,
                });
            }
            let total: f64 = votes.iter().sum();
            if total > 0.0 {
                for (p, v) in proba.iter_mut().zip(votes) {
                    *p += v / total;
                }
            }
        }

        // Lowest index wins ties.
        let best = proba
            .iter()
            .enumerate()
            .fold((0, f64::NEG_INFINITY), |best, (i, &p)| {
                if p > best.1 {
                    (i, p)
                } else {
                    best
                }
            });
        Ok(best.0)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Artifact loading
// ────────────────────────────────────────────────────────────────────────────

/// The loaded model and its label encoder.
pub struct ClassifierArtifacts {
    pub model: Box<dyn SalaryModel>,
    pub encoder: LabelEncoder,
}

/// Loads both artifacts from `dir`.
///
/// Returns `Ok(None)` when either file is absent; a present file that cannot be read or
/// parsed is an error.
pub fn load_artifacts(dir: &Path) -> Result<Option<ClassifierArtifacts>, ClassifierError> {
    let model_path = dir.join(MODEL_FILE);
    let encoder_path = dir.join(ENCODER_FILE);

    for path in [&model_path, &encoder_path] {
        if !path.exists() {
            warn!("Salary model artifact not found: {}", path.display());
            return Ok(None);
        }
    }

    let model: ForestModel = read_json(&model_path)?;
    let encoder: LabelEncoder = read_json(&encoder_path)?;
    info!(
        "Salary model loaded ({} trees, classes: {})",
        model.trees.len(),
        encoder.classes.join(", ")
    );

    Ok(Some(ClassifierArtifacts {
        model: Box::new(model),
        encoder,
    }))
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ClassifierError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ClassifierError::Io {
        path: path.display().to_string(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| ClassifierError::Parse {
        path: path.display().to_string(),
        source,
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde_json::json;

    /// Two-tree forest over classes ["high", "low", "mid"]: experience drives the first
    /// tree, a `kubernetes` skill token the second.
    pub(crate) fn sample_model_json() -> serde_json::Value {
        json!({
            "n_classes": 3,
            "trees": [
                {"nodes": [
                    {"kind": "numeric", "feature": "experience_num", "threshold": 2.0, "left": 1, "right": 2},
                    {"kind": "leaf", "votes": [0.0, 1.0, 0.0]},
                    {"kind": "numeric", "feature": "experience_num", "threshold": 8.0, "left": 3, "right": 4},
                    {"kind": "leaf", "votes": [0.0, 0.0, 1.0]},
                    {"kind": "leaf", "votes": [1.0, 0.0, 0.0]}
                ]},
                {"nodes": [
                    {"kind": "token", "feature": "key_skills", "token": "kubernetes", "left": 1, "right": 2},
                    {"kind": "leaf", "votes": [0.2, 0.4, 0.4]},
                    {"kind": "leaf", "votes": [3.0, 0.0, 1.0]}
                ]}
            ]
        })
    }

    pub(crate) fn sample_encoder_json() -> serde_json::Value {
        json!({"classes": ["high", "low", "mid"]})
    }

    fn model() -> ForestModel {
        serde_json::from_value(sample_model_json()).unwrap()
    }

    fn row(experience: f64, key_skills: &str) -> FeatureRow {
        FeatureRow {
            experience_num: experience,
            job_type: "Software Development".to_string(),
            key_skills: key_skills.to_string(),
            location: "Istanbul".to_string(),
            job_desig: "Software Engineer".to_string(),
            skill_count: if key_skills.is_empty() { 0 } else { 1 },
        }
    }

    #[test]
    fn test_forest_votes_average_across_trees() {
        let m = model();
        // tree 1 → low; tree 2 → [0.2, 0.4, 0.4]; low wins
        assert_eq!(m.predict(&row(1.0, "python")).unwrap(), 1);
        // tree 1 → mid; tree 2 → [0.2, 0.4, 0.4]; mid wins
        assert_eq!(m.predict(&row(5.0, "python")).unwrap(), 2);
        // tree 1 → mid; tree 2 → [0.75, 0, 0.25]; mid 1.25 vs high 0.75
        assert_eq!(m.predict(&row(5.0, "kubernetes, docker")).unwrap(), 2);
        // tree 1 → high; tree 2 → high
        assert_eq!(m.predict(&row(10.0, "kubernetes")).unwrap(), 0);
    }

    #[test]
    fn test_token_split_matches_bigrams() {
        let set = tokens("Google Cloud, AWS");
        assert!(set.contains("google cloud"));
        assert!(set.contains("aws"));
        assert!(!set.contains("a"));
    }

    #[test]
    fn test_missing_node_is_error() {
        let m: ForestModel = serde_json::from_value(json!({
            "n_classes": 2,
            "trees": [{"nodes": [
                {"kind": "numeric", "feature": "skill_count", "threshold": 1.0, "left": 5, "right": 6}
            ]}]
        }))
        .unwrap();
        let err = m.predict(&row(1.0, "")).unwrap_err();
        assert!(matches!(err, ClassifierError::MissingNode { tree: 0, node: 5 }));
    }

    #[test]
    fn test_cycle_is_error() {
        let m: ForestModel = serde_json::from_value(json!({
            "n_classes": 2,
            "trees": [{"nodes": [
                {"kind": "numeric", "feature": "skill_count", "threshold": 1.0, "left": 0, "right": 0}
            ]}]
        }))
        .unwrap();
        assert!(matches!(
            m.predict(&row(1.0, "")),
            Err(ClassifierError::NoLeaf { tree: 0 })
        ));
    }

    #[test]
    fn test_vote_shape_mismatch_is_error() {
        let m: ForestModel = serde_json::from_value(json!({
            "n_classes": 3,
            "trees": [{"nodes": [{"kind": "leaf", "votes": [1.0, 0.0]}]}]
        }))
        .unwrap();
        assert!(matches!(
            m.predict(&row(1.0, "")),
            Err(ClassifierError::VoteShape { found: 2, expected: 3, .. })
        ));
    }

    #[test]
    fn test_empty_forest_is_error() {
        let m = ForestModel {
            n_classes: 3,
            trees: vec![],
        };
        assert!(matches!(
            m.predict(&row(1.0, "")),
            Err(ClassifierError::EmptyModel)
        ));
    }

    #[test]
    fn test_label_encoder_inverse_transform() {
        let enc: LabelEncoder = serde_json::from_value(sample_encoder_json()).unwrap();
        assert_eq!(enc.inverse_transform(1).unwrap(), "low");
        assert!(matches!(
            enc.inverse_transform(7),
            Err(ClassifierError::UnknownClass(7))
        ));
    }

    #[test]
    fn test_load_artifacts_missing_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_artifacts(dir.path()).unwrap().is_none());

        std::fs::write(dir.path().join(MODEL_FILE), sample_model_json().to_string()).unwrap();
        assert!(
            load_artifacts(dir.path()).unwrap().is_none(),
            "encoder still missing"
        );
    }

    #[test]
    fn test_load_artifacts_present() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(MODEL_FILE), sample_model_json().to_string()).unwrap();
        std::fs::write(dir.path().join(ENCODER_FILE), sample_encoder_json().to_string()).unwrap();

        let artifacts = load_artifacts(dir.path()).unwrap().unwrap();
        let class = artifacts.model.predict(&row(10.0, "kubernetes")).unwrap();
        assert_eq!(artifacts.encoder.inverse_transform(class).unwrap(), "high");
    }

    #[test]
    fn test_load_artifacts_malformed_is_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(MODEL_FILE), "{not json").unwrap();
        std::fs::write(dir.path().join(ENCODER_FILE), sample_encoder_json().to_string()).unwrap();
        assert!(matches!(
            load_artifacts(dir.path()),
            Err(ClassifierError::Parse { .. })
        ));
    }
}
