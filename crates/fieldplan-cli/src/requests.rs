//! JSON documents accepted and produced by the CLI beyond the core models.

use fieldplan_core::{Node, Waypoint};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsRequest {
    pub path: Vec<Waypoint>,
    pub coverage_radius: f64,
    #[serde(default)]
    pub spraying_rate: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisualizeRequest {
    pub path: Vec<Waypoint>,
    pub field_width: f64,
    pub field_height: f64,
    pub coverage_radius: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteResponse {
    pub path: Vec<Node>,
    pub length: usize,
}

impl From<Vec<Node>> for RouteResponse {
    fn from(path: Vec<Node>) -> Self {
        Self {
            length: path.len(),
            path,
        }
    }
}
