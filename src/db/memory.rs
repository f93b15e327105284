use std::sync::Arc;

use tokio::sync::RwLock;

use crate::{
    error::AppResult,
    models::{Feedback, Interaction, Persona},
};

use super::{FeedbackStore, InteractionStore};

/// In-process interaction and feedback logs
///
/// Used when no database is configured, and in tests. Contents are lost on
/// restart.
#[derive(Clone, Default)]
pub struct MemoryStore {
    interactions: Arc<RwLock<Vec<Interaction>>>,
    feedback: Arc<RwLock<Vec<Feedback>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl InteractionStore for MemoryStore {
    async fn append_interaction(&self, interaction: &Interaction) -> AppResult<()> {
        self.interactions.write().await.push(interaction.clone());
        Ok(())
    }

    async fn all_interactions(&self) -> AppResult<Vec<Interaction>> {
        Ok(self.interactions.read().await.clone())
    }

    async fn recent_interactions(&self, limit: usize) -> AppResult<Vec<Interaction>> {
        let interactions = self.interactions.read().await;
        Ok(interactions.iter().rev().take(limit).cloned().collect())
    }
}

#[async_trait::async_trait]
impl FeedbackStore for MemoryStore {
    async fn append_feedback(&self, feedback: &Feedback) -> AppResult<()> {
        self.feedback.write().await.push(feedback.clone());
        Ok(())
    }

    async fn feedback_for_persona(&self, persona: Persona) -> AppResult<Vec<Feedback>> {
        let feedback = self.feedback.read().await;
        Ok(feedback
            .iter()
            .filter(|f| f.persona == persona)
            .cloned()
            .collect())
    }

    async fn feedback_for_user(&self, user_id: &str) -> AppResult<Vec<Feedback>> {
        let feedback = self.feedback.read().await;
        Ok(feedback
            .iter()
            .rev()
            .filter(|f| f.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn recent_feedback(&self, limit: usize) -> AppResult<Vec<Feedback>> {
        let feedback = self.feedback.read().await;
        Ok(feedback.iter().rev().take(limit).cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FeedbackKind, NewFeedback, NewInteraction};

    #[tokio::test]
    async fn test_interactions_keep_log_order() {
        let store = MemoryStore::new();
        for car_id in 1..=3 {
            store
                .append_interaction(&NewInteraction::new("u1", car_id, "view").into_interaction())
                .await
                .unwrap();
        }

        let all: Vec<u32> = store
            .all_interactions()
            .await
            .unwrap()
            .iter()
            .map(|i| i.car_id)
            .collect();
        assert_eq!(all, vec![1, 2, 3]);

        let recent: Vec<u32> = store
            .recent_interactions(2)
            .await
            .unwrap()
            .iter()
            .map(|i| i.car_id)
            .collect();
        assert_eq!(recent, vec![3, 2]);
    }

    #[tokio::test]
    async fn test_feedback_filters() {
        let store = MemoryStore::new();
        let entries = [
            ("u1", 1, Persona::Eco, FeedbackKind::Like),
            ("u2", 2, Persona::Eco, FeedbackKind::Dislike),
            ("u1", 3, Persona::Luxury, FeedbackKind::Like),
        ];
        for (user_id, car_id, persona, kind) in entries {
            let feedback = NewFeedback {
                user_id: user_id.to_string(),
                car_id,
                persona,
                kind,
            }
            .into_feedback();
            store.append_feedback(&feedback).await.unwrap();
        }

        assert_eq!(store.feedback_for_persona(Persona::Eco).await.unwrap().len(), 2);
        assert!(store
            .feedback_for_persona(Persona::Budget)
            .await
            .unwrap()
            .is_empty());

        let mine: Vec<u32> = store
            .feedback_for_user("u1")
            .await
            .unwrap()
            .iter()
            .map(|f| f.car_id)
            .collect();
        assert_eq!(mine, vec![3, 1]);

        assert_eq!(store.recent_feedback(1).await.unwrap()[0].car_id, 3);
    }
}
