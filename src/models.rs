use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct ClickRequest {
    pub label: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ClickResponse {
    pub label: String,
    pub count: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CountEntry {
    pub label: String,
    pub display_label: String,
    pub count: u64,
    pub activated: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CountsResponse {
    pub counts: Vec<CountEntry>,
}
