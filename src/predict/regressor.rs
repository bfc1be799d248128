use serde::Deserialize;

// ---------------------------------------------------------------------------
// Regressor contract
// ---------------------------------------------------------------------------

/// A fitted regression model evaluated one row at a time.
pub trait Regress {
    /// Check the model is well-formed for rows of `n_features` values.
    fn validate(&self, n_features: usize) -> Result<(), String>;

    /// Predict the target for one row. The row must have passed `validate`'s
    /// width.
    fn predict_row(&self, row: &[f64]) -> f64;
}

/// The regressor component of a bundle.
///
/// ```json
/// { "kind": "linear", "intercept": 0.0, "coefficients": [...],
///   "feature_names": ["model_year", ...] }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Regressor {
    /// Column order the model was fitted with, when recorded.
    #[serde(default)]
    pub feature_names: Option<Vec<String>>,
    #[serde(flatten)]
    pub model: RegressionModel,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RegressionModel {
    Linear(LinearModel),
    TreeEnsemble(TreeEnsemble),
}

impl Regress for RegressionModel {
    fn validate(&self, n_features: usize) -> Result<(), String> {
        match self {
            RegressionModel::Linear(m) => m.validate(n_features),
            RegressionModel::TreeEnsemble(m) => m.validate(n_features),
        }
    }

    fn predict_row(&self, row: &[f64]) -> f64 {
        match self {
            RegressionModel::Linear(m) => m.predict_row(row),
            RegressionModel::TreeEnsemble(m) => m.predict_row(row),
        }
    }
}

// ---------------------------------------------------------------------------
// Linear model
// ---------------------------------------------------------------------------

/// `y = intercept + Σ coefficients[i] * x[i]`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LinearModel {
    pub intercept: f64,
    pub coefficients: Vec<f64>,
}

impl Regress for LinearModel {
    fn validate(&self, n_features: usize) -> Result<(), String> {
        if self.coefficients.len() != n_features {
            return Err(format!(
                "linear model has {} coefficients but {n_features} features",
                self.coefficients.len()
            ));
        }
        Ok(())
    }

    fn predict_row(&self, row: &[f64]) -> f64 {
        self.coefficients
            .iter()
            .zip(row)
            .fold(self.intercept, |acc, (c, x)| acc + c * x)
    }
}

// ---------------------------------------------------------------------------
// Tree ensemble
// ---------------------------------------------------------------------------

/// Regression trees combined as a forest average or a boosted sum.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TreeEnsemble {
    pub trees: Vec<Tree>,
    pub combine: Combine,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Combine {
    /// Random forest: mean of the tree outputs.
    Mean,
    /// Gradient boosting: `base_score + learning_rate * Σ tree outputs`.
    Boosted { base_score: f64, learning_rate: f64 },
}

/// Flat node list; node 0 is the root.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct Tree {
    pub nodes: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Node {
    /// `row[feature] <= threshold` descends to `left`, otherwise `right`.
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf { leaf: f64 },
}

impl Tree {
    /// Children must point forward, so every walk from the root terminates.
    fn validate(&self, n_features: usize) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("tree has no nodes".to_string());
        }
        for (i, node) in self.nodes.iter().enumerate() {
            if let Node::Split {
                feature, left, right, ..
            } = *node
            {
                if feature >= n_features {
                    return Err(format!("node {i} splits on feature {feature} of {n_features}"));
                }
                for child in [left, right] {
                    if child <= i || child >= self.nodes.len() {
                        return Err(format!("node {i} has invalid child {child}"));
                    }
                }
            }
        }
        Ok(())
    }

    fn evaluate(&self, row: &[f64]) -> f64 {
        let mut i = 0;
        loop {
            match self.nodes[i] {
                Node::Leaf { leaf } => return leaf,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => i = if row[feature] <= threshold { left } else { right },
            }
        }
    }
}

impl Regress for TreeEnsemble {
    fn validate(&self, n_features: usize) -> Result<(), String> {
        if self.trees.is_empty() {
            return Err("tree ensemble has no trees".to_string());
        }
        for (t, tree) in self.trees.iter().enumerate() {
            tree.validate(n_features).map_err(|e| format!("tree {t}: {e}"))?;
        }
        Ok(())
    }

    fn predict_row(&self, row: &[f64]) -> f64 {
        let total: f64 = self.trees.iter().map(|t| t.evaluate(row)).sum();
        match self.combine {
            Combine::Mean => total / self.trees.len() as f64,
            Combine::Boosted {
                base_score,
                learning_rate,
            } => base_score + learning_rate * total,
        }
    }
}
