//! Classifier Artifact
//!
//! Supported model families, selected by the `kind` tag in the JSON file:
//! - `decision_tree`: single CART tree, leaf class counts
//! - `random_forest`: averaged per-tree leaf probabilities
//! - `linear`: one-vs-rest linear decision function
//! - `gaussian_nb`: Gaussian naive Bayes joint log likelihood
//!
//! Every family ends in an argmax over `classes`; ties go to the lower index.

use serde::Deserialize;
use std::f64::consts::PI;

use super::{Artifact, Predict};
use crate::error::InferenceError;
use crate::labels::ClassCode;

/// One node of a flattened decision tree. Node 0 is the root.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Node {
    /// Go `left` when `x[feature] <= threshold`, else `right`
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    /// Per-class weights (counts or probabilities)
    Leaf { value: Vec<f64> },
}

#[derive(Debug, Clone, Deserialize)]
pub struct Tree {
    pub nodes: Vec<Node>,
}

/// Check tree structure. Children must sit after their parent, which also
/// rules out cycles.
fn validate_nodes(nodes: &[Node], n_classes: usize, n_features: usize) -> Result<(), String> {
    if nodes.is_empty() {
        return Err("tree has no nodes".to_string());
    }

    for (i, node) in nodes.iter().enumerate() {
        match node {
            Node::Split { feature, threshold, left, right } => {
                if *feature >= n_features {
                    return Err(format!(
                        "node {} splits on feature {} but the model has {} features",
                        i, feature, n_features
                    ));
                }
                if !threshold.is_finite() {
                    return Err(format!("node {} has a non-finite threshold", i));
                }
                for child in [*left, *right] {
                    if child <= i || child >= nodes.len() {
                        return Err(format!("node {} has invalid child index {}", i, child));
                    }
                }
            }
            Node::Leaf { value } => {
                if value.len() != n_classes {
                    return Err(format!(
                        "leaf {} has {} values but there are {} classes",
                        i,
                        value.len(),
                        n_classes
                    ));
                }
                if value.iter().any(|v| !v.is_finite() || *v < 0.0) {
                    return Err(format!("leaf {} has a negative or non-finite value", i));
                }
            }
        }
    }

    Ok(())
}

/// Walk from the root to the leaf for `x`.
///
/// `None` when the walk leaves the node array, reads past the end of `x` or
/// takes more steps than there are nodes.
fn leaf_value<'a>(nodes: &'a [Node], x: &[f64]) -> Option<&'a [f64]> {
    let mut index = 0;
    for _ in 0..nodes.len() {
        match nodes.get(index)? {
            Node::Split { feature, threshold, left, right } => {
                index = if *x.get(*feature)? <= *threshold { *left } else { *right };
            }
            Node::Leaf { value } => return Some(value),
        }
    }
    None
}

fn broken_tree() -> InferenceError {
    InferenceError::Malformed("decision path does not end in a leaf".to_string())
}

#[derive(Debug, Clone, Deserialize)]
pub struct DecisionTree {
    pub classes: Vec<ClassCode>,
    pub n_features: usize,
    pub nodes: Vec<Node>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RandomForest {
    pub classes: Vec<ClassCode>,
    pub n_features: usize,
    pub trees: Vec<Tree>,
}

/// `scores = coef · x + intercept`. A single coefficient row with two classes
/// is the binary form: positive score picks `classes[1]`.
#[derive(Debug, Clone, Deserialize)]
pub struct LinearModel {
    pub classes: Vec<ClassCode>,
    pub coef: Vec<Vec<f64>>,
    pub intercept: Vec<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GaussianNb {
    pub classes: Vec<ClassCode>,
    /// Per-class feature means
    pub theta: Vec<Vec<f64>>,
    /// Per-class feature variances
    pub var: Vec<Vec<f64>>,
    pub class_prior: Vec<f64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Classifier {
    DecisionTree(DecisionTree),
    RandomForest(RandomForest),
    Linear(LinearModel),
    GaussianNb(GaussianNb),
}

impl Classifier {
    pub fn classes(&self) -> &[ClassCode] {
        match self {
            Classifier::DecisionTree(m) => &m.classes,
            Classifier::RandomForest(m) => &m.classes,
            Classifier::Linear(m) => &m.classes,
            Classifier::GaussianNb(m) => &m.classes,
        }
    }

    fn width(&self) -> usize {
        match self {
            Classifier::DecisionTree(m) => m.n_features,
            Classifier::RandomForest(m) => m.n_features,
            Classifier::Linear(m) => m.coef.first().map_or(0, |row| row.len()),
            Classifier::GaussianNb(m) => m.theta.first().map_or(0, |row| row.len()),
        }
    }

    /// Per-class scores for one sample; higher wins
    fn scores(&self, x: &[f64]) -> Result<Vec<f64>, InferenceError> {
        let scores: Vec<f64> = match self {
            Classifier::DecisionTree(m) => {
                leaf_value(&m.nodes, x).ok_or_else(broken_tree)?.to_vec()
            }
            Classifier::RandomForest(m) => {
                if m.trees.is_empty() {
                    return Err(InferenceError::Malformed("random forest has no trees".to_string()));
                }
                let mut proba = vec![0.0; m.classes.len()];
                for tree in &m.trees {
                    let value = leaf_value(&tree.nodes, x).ok_or_else(broken_tree)?;
                    if value.len() != proba.len() {
                        return Err(InferenceError::Malformed(format!(
                            "leaf has {} values but there are {} classes",
                            value.len(),
                            proba.len()
                        )));
                    }
                    let total: f64 = value.iter().sum();
                    let norm = if total > 0.0 { total } else { 1.0 };
                    for (p, v) in proba.iter_mut().zip(value) {
                        *p += v / norm;
                    }
                }
                let n_trees = m.trees.len() as f64;
                proba.iter().map(|p| p / n_trees).collect()
            }
            Classifier::Linear(m) => {
                let raw: Vec<f64> = m
                    .coef
                    .iter()
                    .zip(&m.intercept)
                    .map(|(row, b)| dot(row, x) + b)
                    .collect();
                if raw.len() == 1 && m.classes.len() == 2 {
                    vec![-raw[0], raw[0]]
                } else {
                    raw
                }
            }
            Classifier::GaussianNb(m) => m
                .theta
                .iter()
                .zip(&m.var)
                .zip(&m.class_prior)
                .map(|((theta, var), prior)| {
                    let log_norm: f64 = var.iter().map(|v| (2.0 * PI * v).ln()).sum();
                    let sq: f64 = x
                        .iter()
                        .zip(theta)
                        .zip(var)
                        .map(|((xi, t), v)| (xi - t).powi(2) / v)
                        .sum();
                    prior.ln() - 0.5 * log_norm - 0.5 * sq
                })
                .collect(),
        };
        Ok(scores)
    }

    fn predict_one(&self, x: &[f64]) -> Result<ClassCode, InferenceError> {
        let scores = self.scores(x)?;
        let classes = self.classes();
        if scores.len() != classes.len() {
            return Err(InferenceError::Malformed(format!(
                "{} scores for {} classes",
                scores.len(),
                classes.len()
            )));
        }

        argmax(&scores)
            .and_then(|best| classes.get(best).copied())
            .ok_or_else(|| InferenceError::Malformed("classifier has no classes".to_string()))
    }
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Index of the largest score; the first one wins on ties
fn argmax(scores: &[f64]) -> Option<usize> {
    let (first, rest) = scores.split_first()?;
    let mut best = (0, *first);
    for (i, &s) in rest.iter().enumerate() {
        if s > best.1 {
            best = (i + 1, s);
        }
    }
    Some(best.0)
}

fn check_rows(name: &str, rows: &[Vec<f64>], n_rows: usize, width: usize) -> Result<(), String> {
    if rows.len() != n_rows {
        return Err(format!("{} has {} rows but there are {} classes", name, rows.len(), n_rows));
    }
    for (i, row) in rows.iter().enumerate() {
        if row.len() != width {
            return Err(format!("{}[{}] has {} values, expected {}", name, i, row.len(), width));
        }
        if row.iter().any(|v| !v.is_finite()) {
            return Err(format!("{}[{}] contains a non-finite value", name, i));
        }
    }
    Ok(())
}

impl Artifact for Classifier {
    const NAME: &'static str = "classifier";

    fn validate(&self) -> Result<(), String> {
        let n_classes = self.classes().len();
        if n_classes == 0 {
            return Err("classifier has no classes".to_string());
        }
        let width = self.width();
        if width == 0 {
            return Err("classifier has zero input features".to_string());
        }

        match self {
            Classifier::DecisionTree(m) => validate_nodes(&m.nodes, n_classes, width),
            Classifier::RandomForest(m) => {
                if m.trees.is_empty() {
                    return Err("random forest has no trees".to_string());
                }
                for (i, tree) in m.trees.iter().enumerate() {
                    validate_nodes(&tree.nodes, n_classes, width)
                        .map_err(|e| format!("tree {}: {}", i, e))?;
                }
                Ok(())
            }
            Classifier::Linear(m) => {
                let binary = m.coef.len() == 1 && n_classes == 2;
                let n_rows = if binary { 1 } else { n_classes };
                check_rows("coef", &m.coef, n_rows, width)?;
                if m.intercept.len() != n_rows {
                    return Err(format!(
                        "intercept has {} values, expected {}",
                        m.intercept.len(),
                        n_rows
                    ));
                }
                if m.intercept.iter().any(|v| !v.is_finite()) {
                    return Err("intercept contains a non-finite value".to_string());
                }
                Ok(())
            }
            Classifier::GaussianNb(m) => {
                check_rows("theta", &m.theta, n_classes, width)?;
                check_rows("var", &m.var, n_classes, width)?;
                if m.var.iter().flatten().any(|v| *v <= 0.0) {
                    return Err("var must be strictly positive".to_string());
                }
                if m.class_prior.len() != n_classes {
                    return Err(format!(
                        "class_prior has {} values but there are {} classes",
                        m.class_prior.len(),
                        n_classes
                    ));
                }
                if m.class_prior.iter().any(|p| !p.is_finite() || *p <= 0.0) {
                    return Err("class_prior must be strictly positive".to_string());
                }
                Ok(())
            }
        }
    }
}

impl Predict for Classifier {
    fn predict(&self, samples: &[Vec<f64>]) -> Result<Vec<ClassCode>, InferenceError> {
        let expected = self.width();
        if let Some(row) = samples.iter().find(|row| row.len() != expected) {
            return Err(InferenceError::FeatureCount {
                expected,
                actual: row.len(),
            });
        }

        samples.iter().map(|x| self.predict_one(x)).collect()
    }

    fn n_features(&self) -> Option<usize> {
        Some(self.width())
    }

    fn kind(&self) -> &'static str {
        match self {
            Classifier::DecisionTree(_) => "decision_tree",
            Classifier::RandomForest(_) => "random_forest",
            Classifier::Linear(_) => "linear",
            Classifier::GaussianNb(_) => "gaussian_nb",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split(feature: usize, threshold: f64, left: usize, right: usize) -> Node {
        Node::Split { feature, threshold, left, right }
    }

    fn leaf(value: &[f64]) -> Node {
        Node::Leaf { value: value.to_vec() }
    }

    /// x[0] <= 0.5 -> class 3, else class 7
    fn stump() -> Classifier {
        Classifier::DecisionTree(DecisionTree {
            classes: vec![3, 7],
            n_features: 2,
            nodes: vec![split(0, 0.5, 1, 2), leaf(&[10.0, 2.0]), leaf(&[1.0, 9.0])],
        })
    }

    #[test]
    fn test_decision_tree_predicts_by_threshold() {
        let model = stump();
        model.validate().unwrap();

        let out = model
            .predict(&[vec![0.5, 100.0], vec![0.51, -100.0]])
            .unwrap();
        assert_eq!(out, vec![3, 7]);
    }

    #[test]
    fn test_decision_tree_decodes_from_json() {
        let json = r#"{
            "kind": "decision_tree",
            "classes": [1, 2],
            "n_features": 1,
            "nodes": [
                {"type": "split", "feature": 0, "threshold": 0.0, "left": 1, "right": 2},
                {"type": "leaf", "value": [0, 5]},
                {"type": "leaf", "value": [5, 0]}
            ]
        }"#;
        let model: Classifier = serde_json::from_str(json).unwrap();
        model.validate().unwrap();

        assert_eq!(model.kind(), "decision_tree");
        assert_eq!(model.predict(&[vec![-1.0], vec![1.0]]).unwrap(), vec![2, 1]);
    }

    #[test]
    fn test_random_forest_averages_probabilities() {
        // Tree A is confident in class 1; trees B and C lean weakly to class 2.
        let model = Classifier::RandomForest(RandomForest {
            classes: vec![1, 2],
            n_features: 1,
            trees: vec![
                Tree { nodes: vec![leaf(&[100.0, 0.0])] },
                Tree { nodes: vec![leaf(&[4.0, 6.0])] },
                Tree { nodes: vec![leaf(&[0.45, 0.55])] },
            ],
        });
        model.validate().unwrap();

        // mean proba: class 1 = (1 + 0.4 + 0.45) / 3, class 2 = (0 + 0.6 + 0.55) / 3
        assert_eq!(model.predict(&[vec![0.0]]).unwrap(), vec![1]);
    }

    #[test]
    fn test_linear_multiclass_and_binary() {
        let multi = Classifier::Linear(LinearModel {
            classes: vec![5, 6, 7],
            coef: vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![-1.0, -1.0]],
            intercept: vec![0.0, 0.0, 0.5],
        });
        multi.validate().unwrap();
        assert_eq!(
            multi.predict(&[vec![2.0, 1.0], vec![1.0, 3.0], vec![-1.0, -1.0]]).unwrap(),
            vec![5, 6, 7]
        );

        let binary = Classifier::Linear(LinearModel {
            classes: vec![10, 20],
            coef: vec![vec![1.0]],
            intercept: vec![-1.0],
        });
        binary.validate().unwrap();
        assert_eq!(binary.predict(&[vec![0.0], vec![2.0]]).unwrap(), vec![10, 20]);
    }

    #[test]
    fn test_gaussian_nb_picks_nearest_mean() {
        let model = Classifier::GaussianNb(GaussianNb {
            classes: vec![1, 2],
            theta: vec![vec![0.0, 0.0], vec![5.0, 5.0]],
            var: vec![vec![1.0, 1.0], vec![1.0, 1.0]],
            class_prior: vec![0.5, 0.5],
        });
        model.validate().unwrap();
        assert_eq!(
            model.predict(&[vec![0.4, -0.2], vec![4.0, 6.0]]).unwrap(),
            vec![1, 2]
        );
    }

    #[test]
    fn test_ties_resolve_to_first_class() {
        let model = Classifier::DecisionTree(DecisionTree {
            classes: vec![9, 8],
            n_features: 1,
            nodes: vec![leaf(&[1.0, 1.0])],
        });
        assert_eq!(model.predict(&[vec![0.0]]).unwrap(), vec![9]);
    }

    #[test]
    fn test_wrong_width_is_inference_error() {
        let err = stump().predict(&[vec![1.0; 7]]).unwrap_err();
        assert_eq!(err, InferenceError::FeatureCount { expected: 2, actual: 7 });
    }

    #[test]
    fn test_unvalidated_models_return_errors() {
        let dangling_child = Classifier::DecisionTree(DecisionTree {
            classes: vec![1, 2],
            n_features: 1,
            nodes: vec![split(0, 0.0, 1, 5), leaf(&[1.0, 0.0])],
        });
        assert!(matches!(
            dangling_child.predict(&[vec![1.0]]),
            Err(InferenceError::Malformed(_))
        ));

        // Self-loop on the root must not spin forever
        let cyclic = Classifier::DecisionTree(DecisionTree {
            classes: vec![1, 2],
            n_features: 1,
            nodes: vec![split(0, 0.0, 0, 0), leaf(&[1.0, 0.0])],
        });
        assert!(matches!(cyclic.predict(&[vec![1.0]]), Err(InferenceError::Malformed(_))));

        let feature_past_width = Classifier::DecisionTree(DecisionTree {
            classes: vec![1, 2],
            n_features: 1,
            nodes: vec![split(4, 0.0, 1, 2), leaf(&[1.0, 0.0]), leaf(&[0.0, 1.0])],
        });
        assert!(matches!(
            feature_past_width.predict(&[vec![1.0]]),
            Err(InferenceError::Malformed(_))
        ));

        let long_leaf = Classifier::DecisionTree(DecisionTree {
            classes: vec![1],
            n_features: 1,
            nodes: vec![leaf(&[0.0, 5.0])],
        });
        assert!(matches!(long_leaf.predict(&[vec![1.0]]), Err(InferenceError::Malformed(_))));

        let no_classes = Classifier::DecisionTree(DecisionTree {
            classes: vec![],
            n_features: 1,
            nodes: vec![leaf(&[])],
        });
        assert!(matches!(no_classes.predict(&[vec![1.0]]), Err(InferenceError::Malformed(_))));

        let empty_forest = Classifier::RandomForest(RandomForest {
            classes: vec![1],
            n_features: 1,
            trees: vec![],
        });
        assert!(matches!(empty_forest.predict(&[vec![1.0]]), Err(InferenceError::Malformed(_))));
    }

    #[test]
    fn test_validation_rejects_bad_trees() {
        let cyclic = Classifier::DecisionTree(DecisionTree {
            classes: vec![1, 2],
            n_features: 1,
            nodes: vec![split(0, 0.0, 0, 1), leaf(&[1.0, 0.0])],
        });
        assert!(cyclic.validate().unwrap_err().contains("invalid child index"));

        let bad_feature = Classifier::DecisionTree(DecisionTree {
            classes: vec![1, 2],
            n_features: 1,
            nodes: vec![split(3, 0.0, 1, 2), leaf(&[1.0, 0.0]), leaf(&[0.0, 1.0])],
        });
        assert!(bad_feature.validate().unwrap_err().contains("feature 3"));

        let short_leaf = Classifier::DecisionTree(DecisionTree {
            classes: vec![1, 2, 3],
            n_features: 1,
            nodes: vec![leaf(&[1.0, 0.0])],
        });
        assert!(short_leaf.validate().is_err());

        let no_classes = Classifier::DecisionTree(DecisionTree {
            classes: vec![],
            n_features: 1,
            nodes: vec![leaf(&[])],
        });
        assert!(no_classes.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_bad_parameters() {
        let zero_var = Classifier::GaussianNb(GaussianNb {
            classes: vec![1],
            theta: vec![vec![0.0]],
            var: vec![vec![0.0]],
            class_prior: vec![1.0],
        });
        assert!(zero_var.validate().is_err());

        let ragged = Classifier::Linear(LinearModel {
            classes: vec![1, 2, 3],
            coef: vec![vec![1.0, 0.0], vec![0.0], vec![1.0, 1.0]],
            intercept: vec![0.0; 3],
        });
        assert!(ragged.validate().is_err());

        let empty_forest = Classifier::RandomForest(RandomForest {
            classes: vec![1],
            n_features: 1,
            trees: vec![],
        });
        assert!(empty_forest.validate().is_err());
    }
}
