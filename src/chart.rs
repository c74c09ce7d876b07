//! Chart data extraction.
//!
//! Turns a CHART node into ordered label/value points and a table for
//! text-based output.

use crate::model::{ContentNode, NodeKind};

/// Parsed chart data
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartData {
    /// Chart type from the `charttype` attribute (e.g. "bar", "pie")
    pub chart_type: Option<String>,
    /// Data points in document order
    pub points: Vec<ChartPoint>,
}

/// A labelled data point
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartPoint {
    /// Category label
    pub label: String,
    /// Value as written
    pub value: String,
    /// Numeric value, when the written value parses as one
    pub number: Option<f64>,
}

impl ChartPoint {
    fn new(label: String, value: String) -> Self {
        let number = parse_number(&value);
        Self {
            label,
            value,
            number,
        }
    }
}

impl ChartData {
    /// Extract chart data from a CHART node.
    ///
    /// Points come from DATA children holding a LABEL and a VALUE. LABEL and
    /// VALUE nodes placed directly in the chart are paired in order.
    /// Returns `None` for nodes of any other kind.
    pub fn from_node(node: &ContentNode) -> Option<Self> {
        if node.kind != NodeKind::Chart {
            return None;
        }

        let mut points = Vec::new();
        let mut loose_labels = Vec::new();
        let mut loose_values = Vec::new();

        for child in node.child_nodes() {
            match child.kind {
                NodeKind::ChartData => {
                    let label = first_text(child, &NodeKind::ChartLabel);
                    let value = first_text(child, &NodeKind::ChartValue);
                    if label.is_some() || value.is_some() {
                        points.push(ChartPoint::new(
                            label.unwrap_or_default(),
                            value.unwrap_or_default(),
                        ));
                    }
                }
                NodeKind::ChartLabel => loose_labels.push(child.plain_text()),
                NodeKind::ChartValue => loose_values.push(child.plain_text()),
                _ => {}
            }
        }

        let loose = loose_labels.len().max(loose_values.len());
        let mut labels = loose_labels.into_iter();
        let mut values = loose_values.into_iter();
        for _ in 0..loose {
            points.push(ChartPoint::new(
                labels.next().unwrap_or_default(),
                values.next().unwrap_or_default(),
            ));
        }

        Some(Self {
            chart_type: node
                .attribute("charttype")
                .map(|t| t.trim().to_ascii_lowercase())
                .filter(|t| !t.is_empty()),
            points,
        })
    }

    /// Convert chart data to table rows; the first row is the header.
    ///
    /// Values appear as written, units and separators included.
    pub fn to_table(&self) -> Vec<Vec<String>> {
        let mut rows = Vec::with_capacity(self.points.len() + 1);
        rows.push(vec!["Label".to_string(), "Value".to_string()]);
        for point in &self.points {
            rows.push(vec![point.label.clone(), point.value.trim().to_string()]);
        }
        rows
    }

    /// Sum of all numeric values
    pub fn total(&self) -> f64 {
        self.points.iter().filter_map(|p| p.number).sum()
    }

    /// Check if chart data is empty
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

fn first_text(node: &ContentNode, kind: &NodeKind) -> Option<String> {
    node.child_nodes()
        .find(|child| &child.kind == kind)
        .map(ContentNode::plain_text)
}

/// Parse a written value such as `150`, `1,200` or `42.5%`.
fn parse_number(value: &str) -> Option<f64> {
    let cleaned: String = value
        .trim()
        .trim_end_matches('%')
        .chars()
        .filter(|c| *c != ',' && *c != '_')
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|n| n.is_finite())
}
