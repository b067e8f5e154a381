use serde::{Deserialize, Serialize};

/// Fixed id of the sentinel root node.
pub const ROOT_ID: &str = "root";

/// One deduction item in the rubric tree.
///
/// Field names follow the saved-session format (`defaultFeedback`,
/// `subDeductions`) so existing grading files keep loading.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DeductionNode {
    pub id: String,
    pub description: String,
    pub points: f64,
    pub default_feedback: String,
    #[serde(rename = "subDeductions", default)]
    pub children: Vec<DeductionNode>,
}

impl DeductionNode {
    pub fn new(
        id: impl Into<String>,
        description: impl Into<String>,
        points: f64,
        default_feedback: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            points,
            default_feedback: default_feedback.into(),
            children: Vec::new(),
        }
    }

    pub fn is_root(&self) -> bool {
        self.id == ROOT_ID
    }

    /// Number of nodes in this subtree, including `self`.
    pub fn subtree_len(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(DeductionNode::subtree_len)
            .sum::<usize>()
    }

    /// Collect every id in this subtree in pre-order.
    pub fn collect_ids<'a>(&'a self, out: &mut Vec<&'a str>) {
        out.push(self.id.as_str());
        for child in &self.children {
            child.collect_ids(out);
        }
    }
}

pub fn default_rubric() -> DeductionNode {
    DeductionNode::new(ROOT_ID, "Rubric", 0.0, "")
}
