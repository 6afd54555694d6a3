//! Fitted decision tree model and Graphviz DOT rendering.
//!
//! The JSON layout mirrors the flat per-node arrays a fitted scikit-learn tree
//! exposes (`children_left`, `children_right`, `feature`, `threshold`, ...), so a
//! model can be dumped from a notebook with a couple of `tolist()` calls.

use std::path::Path;

use serde::Deserialize;

use crate::error::TreeError;

/// Child index marking a leaf.
pub const LEAF: i64 = -1;

#[derive(Debug, Deserialize)]
struct RawDecisionTree {
    feature_names: Vec<String>,
    #[serde(default = "default_class_names")]
    class_names: Vec<String>,
    #[serde(default = "default_criterion")]
    criterion: String,
    children_left: Vec<i64>,
    children_right: Vec<i64>,
    feature: Vec<i64>,
    threshold: Vec<f64>,
    impurity: Vec<f64>,
    n_node_samples: Vec<u64>,
    value: Vec<Vec<f64>>,
}

fn default_class_names() -> Vec<String> {
    vec!["0".to_string(), "1".to_string()]
}

fn default_criterion() -> String {
    "gini".to_string()
}

/// A validated binary decision tree. Node 0 is the root and every child index is
/// greater than its parent's, so walking the tree always terminates.
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionTree {
    feature_names: Vec<String>,
    class_names: Vec<String>,
    criterion: String,
    nodes: Vec<TreeNode>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TreeNode {
    pub split: Option<Split>,
    pub impurity: f64,
    pub samples: u64,
    pub value: Vec<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Split {
    pub feature: usize,
    pub threshold: f64,
    pub left: usize,
    pub right: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DotOptions {
    /// Colour nodes by majority class, shaded by purity.
    pub filled: bool,
    /// Decimal places for thresholds, impurity and class weights.
    pub precision: usize,
}

impl Default for DotOptions {
    fn default() -> Self {
        Self {
            filled: true,
            precision: 3,
        }
    }
}

impl DecisionTree {
    pub fn from_json_str(json: &str) -> Result<Self, TreeError> {
        let raw: RawDecisionTree = serde_json::from_str(json)?;
        Self::from_raw(raw)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, TreeError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn class_names(&self) -> &[String] {
        &self.class_names
    }

    pub fn nodes(&self) -> &[TreeNode] {
        &self.nodes
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Index into [`Self::class_names`] of the class predicted for `sample`.
    ///
    /// Samples go left when `sample[feature] <= threshold`.
    pub fn predict(&self, sample: &[f64]) -> Result<usize, TreeError> {
        if sample.len() != self.feature_names.len() {
            return Err(TreeError::Invalid(format!(
                "sample has {} features, model expects {}",
                sample.len(),
                self.feature_names.len()
            )));
        }

        let mut index = 0;
        while let Some(split) = self.nodes[index].split {
            index = if sample[split.feature] <= split.threshold {
                split.left
            } else {
                split.right
            };
        }
        Ok(majority_class(&self.nodes[index].value))
    }

    /// Renders the tree as Graphviz DOT, nodes in depth-first order with the
    /// left (`True`) branch first.
    pub fn to_dot(&self, options: &DotOptions) -> String {
        let palette = color_brew(self.class_names.len());
        let mut out = String::new();
        out.push_str("digraph Tree {\n");
        if options.filled {
            out.push_str(
                "node [shape=box, style=\"filled\", color=\"black\", fontname=\"helvetica\"] ;\n",
            );
        } else {
            out.push_str("node [shape=box, color=\"black\", fontname=\"helvetica\"] ;\n");
        }
        out.push_str("edge [fontname=\"helvetica\"] ;\n");

        let mut stack: Vec<(usize, Option<usize>)> = vec![(0, None)];
        while let Some((index, parent)) = stack.pop() {
            let node = &self.nodes[index];
            let label = escape_label(&self.node_label(node, options.precision));
            if options.filled {
                let fill = node_color(&node.value, &palette);
                out.push_str(&format!(
                    "{index} [label=\"{label}\", fillcolor=\"{fill}\"] ;\n"
                ));
            } else {
                out.push_str(&format!("{index} [label=\"{label}\"] ;\n"));
            }

            if let Some(parent) = parent {
                if parent == 0 {
                    let (angle, head) = if index == self.root_left() {
                        (45, "True")
                    } else {
                        (-45, "False")
                    };
                    out.push_str(&format!(
                        "{parent} -> {index} [labeldistance=2.5, labelangle={angle}, headlabel=\"{head}\"] ;\n"
                    ));
                } else {
                    out.push_str(&format!("{parent} -> {index} ;\n"));
                }
            }

            if let Some(split) = node.split {
                stack.push((split.right, Some(index)));
                stack.push((split.left, Some(index)));
            }
        }

        out.push('}');
        out
    }

    fn root_left(&self) -> usize {
        self.nodes[0].split.map(|split| split.left).unwrap_or(0)
    }

    fn node_label(&self, node: &TreeNode, precision: usize) -> String {
        let mut lines = Vec::with_capacity(5);
        if let Some(split) = node.split {
            lines.push(format!(
                "{} <= {}",
                self.feature_names[split.feature],
                format_number(split.threshold, precision)
            ));
        }
        lines.push(format!(
            "{} = {}",
            self.criterion,
            format_number(node.impurity, precision)
        ));
        lines.push(format!("samples = {}", node.samples));
        let values: Vec<String> = node
            .value
            .iter()
            .map(|weight| format_number(*weight, precision))
            .collect();
        lines.push(format!("value = [{}]", values.join(", ")));
        lines.push(format!(
            "class = {}",
            self.class_names[majority_class(&node.value)]
        ));
        lines.join("\\n")
    }
}

impl DecisionTree {
    fn from_raw(raw: RawDecisionTree) -> Result<Self, TreeError> {
        let count = raw.children_left.len();
        if count == 0 {
            return Err(TreeError::Invalid("tree has no nodes".to_string()));
        }
        if raw.class_names.is_empty() {
            return Err(TreeError::Invalid(
                "class_names must not be empty".to_string(),
            ));
        }

        let lengths = [
            ("children_right", raw.children_right.len()),
            ("feature", raw.feature.len()),
            ("threshold", raw.threshold.len()),
            ("impurity", raw.impurity.len()),
            ("n_node_samples", raw.n_node_samples.len()),
            ("value", raw.value.len()),
        ];
        for (name, len) in lengths {
            if len != count {
                return Err(TreeError::Invalid(format!(
                    "{name} has {len} entries, children_left has {count}"
                )));
            }
        }

        let mut has_parent = vec![false; count];
        let mut nodes = Vec::with_capacity(count);
        for index in 0..count {
            let left = raw.children_left[index];
            let right = raw.children_right[index];
            let value = raw.value[index].clone();
            if value.len() != raw.class_names.len() {
                return Err(TreeError::Invalid(format!(
                    "node {index} has {} class weights for {} classes",
                    value.len(),
                    raw.class_names.len()
                )));
            }

            let split = match (left, right) {
                (LEAF, LEAF) => None,
                (LEAF, _) | (_, LEAF) => {
                    return Err(TreeError::Invalid(format!(
                        "node {index} has only one child"
                    )));
                }
                (left, right) => {
                    let left = child_index(index, left, count)?;
                    let right = child_index(index, right, count)?;
                    for child in [left, right] {
                        if has_parent[child] {
                            return Err(TreeError::Invalid(format!(
                                "node {child} has more than one parent"
                            )));
                        }
                        has_parent[child] = true;
                    }
                    let feature = usize::try_from(raw.feature[index])
                        .ok()
                        .filter(|feature| *feature < raw.feature_names.len())
                        .ok_or_else(|| {
                            TreeError::Invalid(format!(
                                "node {index} splits on unknown feature {}",
                                raw.feature[index]
                            ))
                        })?;
                    Some(Split {
                        feature,
                        threshold: raw.threshold[index],
                        left,
                        right,
                    })
                }
            };

            nodes.push(TreeNode {
                split,
                impurity: raw.impurity[index],
                samples: raw.n_node_samples[index],
                value,
            });
        }

        Ok(Self {
            feature_names: raw.feature_names,
            class_names: raw.class_names,
            criterion: raw.criterion,
            nodes,
        })
    }
}

fn child_index(parent: usize, child: i64, count: usize) -> Result<usize, TreeError> {
    usize::try_from(child)
        .ok()
        .filter(|child| *child > parent && *child < count)
        .ok_or_else(|| TreeError::Invalid(format!("node {parent} points at invalid child {child}")))
}

/// First class with the highest weight.
fn majority_class(value: &[f64]) -> usize {
    let mut best = 0;
    for (index, weight) in value.iter().enumerate() {
        if *weight > value[best] {
            best = index;
        }
    }
    best
}

fn format_number(value: f64, precision: usize) -> String {
    let text = format!("{value:.precision$}");
    if !text.contains('.') {
        return text;
    }
    let trimmed = text.trim_end_matches('0').trim_end_matches('.');
    if trimmed == "-0" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

fn escape_label(label: &str) -> String {
    label.replace('"', "\\\"")
}

/// Evenly spaced hues, one per class.
fn color_brew(n: usize) -> Vec<[u8; 3]> {
    let (saturation, lightness) = (0.75_f64, 0.9_f64);
    let chroma = saturation * lightness;
    let offset = lightness - chroma;

    (0..n)
        .map(|class| {
            let hue = (25.0 + 360.0 * class as f64 / n as f64).floor();
            let h_bar = hue / 60.0;
            let x = chroma * (1.0 - ((h_bar % 2.0) - 1.0).abs());
            let (r, g, b) = match h_bar as usize {
                0 => (chroma, x, 0.0),
                1 => (x, chroma, 0.0),
                2 => (0.0, chroma, x),
                3 => (0.0, x, chroma),
                4 => (x, 0.0, chroma),
                5 => (chroma, 0.0, x),
                _ => (chroma, x, 0.0),
            };
            [r, g, b].map(|channel| (255.0 * (channel + offset)) as u8)
        })
        .collect()
}

fn node_color(value: &[f64], palette: &[[u8; 3]]) -> String {
    let total: f64 = value.iter().sum();
    if total <= 0.0 {
        return "#ffffff".to_string();
    }

    let class = majority_class(value);
    let mut proportions: Vec<f64> = value.iter().map(|weight| weight / total).collect();
    proportions.sort_by(|a, b| b.total_cmp(a));
    let alpha = match proportions.as_slice() {
        [only] => *only,
        [first, second, ..] if *second < 1.0 => (first - second) / (1.0 - second),
        _ => 0.0,
    };

    let [r, g, b] = palette[class].map(|channel| {
        (alpha * f64::from(channel) + (1.0 - alpha) * 255.0).round() as u8
    });
    format!("#{r:02x}{g:02x}{b:02x}")
}
