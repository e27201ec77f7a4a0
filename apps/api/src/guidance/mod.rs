// Survey outcome — the recommended career that feeds market insights.

pub mod handlers;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::errors::AppError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuidanceResult {
    pub recommended_career: String,
}

impl GuidanceResult {
    pub fn new(recommended_career: &str) -> Result<Self, AppError> {
        let recommended_career = recommended_career.trim();
        if recommended_career.is_empty() {
            return Err(AppError::Validation(
                "recommended_career cannot be empty".to_string(),
            ));
        }
        Ok(Self {
            recommended_career: recommended_career.to_string(),
        })
    }
}

/// Latest survey outcome for the signed-in user. `None` until the survey is taken.
#[derive(Debug, Default)]
pub struct GuidanceStore {
    current: RwLock<Option<GuidanceResult>>,
}

impl GuidanceStore {
    pub async fn get(&self) -> Option<GuidanceResult> {
        self.current.read().await.clone()
    }

    pub async fn recommended_career(&self) -> Option<String> {
        self.current
            .read()
            .await
            .as_ref()
            .map(|g| g.recommended_career.clone())
    }

    /// Stores `result`, returning whether the recommended career changed.
    pub async fn set(&self, result: GuidanceResult) -> bool {
        let mut current = self.current.write().await;
        let changed = current.as_ref() != Some(&result);
        *current = Some(result);
        changed
    }

    /// Clears the outcome, returning whether there was one.
    pub async fn clear(&self) -> bool {
        self.current.write().await.take().is_some()
    }
}
