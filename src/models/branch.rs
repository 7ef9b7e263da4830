use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Branch {
    pub name: String,
    pub remote: bool,
    pub current: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracking: Option<String>,
}

impl Branch {
    /// Branch name without the remote prefix (`origin/main` → `main`).
    pub fn display_name(&self) -> &str {
        if self.remote {
            self.name.split_once('/').map(|(_, rest)| rest).unwrap_or(&self.name)
        } else {
            &self.name
        }
    }
}
