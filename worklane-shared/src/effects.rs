/// Side-effect intents and their dispatcher
///
/// Mutating operations return their primary result plus a list of intents
/// (audit entries, mention scans, member fan-outs) instead of performing
/// those writes inline. [`dispatch`] executes the intents afterwards,
/// best-effort: a failed intent is reported through `tracing::error!` and
/// the rest still run. The primary operation has already succeeded by the
/// time intents execute, so nothing here can roll it back.
use sqlx::PgPool;
use tracing::error;
use uuid::Uuid;

use crate::audit;
use crate::mentions;
use crate::models::action_log::AppendEntry;
use crate::models::notification::{CreateNotification, Notification, NotificationKind};

/// A deferred, best-effort side effect of a successful operation
#[derive(Debug, Clone)]
pub enum SideEffect {
    /// Append one audit entry
    Audit(AppendEntry),

    /// Scan text for @mentions and notify resolved members
    ScanMentions {
        org_id: Uuid,
        actor_id: Uuid,
        task_human_id: String,
        text: String,
    },

    /// Deliver one notification to each listed recipient
    NotifyMembers {
        org_id: Uuid,
        recipients: Vec<Uuid>,
        kind: NotificationKind,
        content: String,
        link: Option<String>,
    },
}

/// The result of a mutating engine operation: the primary value plus the
/// side effects it wants dispatched
#[derive(Debug)]
pub struct WorkflowOutcome<T> {
    pub value: T,
    pub effects: Vec<SideEffect>,
}

impl<T> WorkflowOutcome<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            effects: Vec::new(),
        }
    }

    pub fn with_effects(value: T, effects: Vec<SideEffect>) -> Self {
        Self { value, effects }
    }
}

/// Executes a batch of intents, swallowing individual failures
pub async fn dispatch(pool: &PgPool, effects: Vec<SideEffect>) {
    for effect in effects {
        match effect {
            SideEffect::Audit(entry) => {
                audit::record(pool, entry).await;
            }
            SideEffect::ScanMentions {
                org_id,
                actor_id,
                task_human_id,
                text,
            } => {
                if let Err(e) =
                    mentions::resolve_and_notify(pool, &text, org_id, &task_human_id, actor_id)
                        .await
                {
                    error!(%org_id, task = %task_human_id, "Mention fan-out failed: {}", e);
                }
            }
            SideEffect::NotifyMembers {
                org_id,
                recipients,
                kind,
                content,
                link,
            } => {
                let batch: Vec<CreateNotification> = recipients
                    .into_iter()
                    .map(|recipient_id| CreateNotification {
                        recipient_id,
                        org_id,
                        kind,
                        content: content.clone(),
                        link: link.clone(),
                    })
                    .collect();

                if let Err(e) = Notification::create_many(pool, batch).await {
                    error!(%org_id, "Member notification fan-out failed: {}", e);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_constructors() {
        let outcome = WorkflowOutcome::new(42);
        assert_eq!(outcome.value, 42);
        assert!(outcome.effects.is_empty());

        let outcome = WorkflowOutcome::with_effects(
            "done",
            vec![SideEffect::NotifyMembers {
                org_id: Uuid::new_v4(),
                recipients: vec![Uuid::new_v4()],
                kind: NotificationKind::System,
                content: "hello".to_string(),
                link: None,
            }],
        );
        assert_eq!(outcome.effects.len(), 1);
    }
}
