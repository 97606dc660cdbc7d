use serde::{Deserialize, Serialize};

/// Error body the game server attaches to non-2xx responses.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ApiErrorBody {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: Some(detail.into()),
        }
    }

    /// Message shown to the player: the server's detail, or a status fallback.
    pub fn describe(&self, status: u16) -> String {
        match self.detail.as_deref() {
            Some(detail) if !detail.trim().is_empty() => detail.to_string(),
            _ => format!("HTTP error! status: {status}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falls_back_to_status_when_detail_missing() {
        let body: ApiErrorBody = serde_json::from_str("{}").expect("body");
        assert_eq!(body.describe(502), "HTTP error! status: 502");
        assert_eq!(
            ApiErrorBody::new("Game session not found").describe(404),
            "Game session not found"
        );
    }
}
