/// Sequence allocator
///
/// Issues gapless per-project task numbers by bumping `projects.task_count`
/// in a single `UPDATE ... RETURNING` statement. The read-modify-write is
/// indivisible at the storage layer, so two concurrent allocations for the
/// same project can never return the same number. Because the counter
/// never decreases, a number is never handed out twice even after the task
/// that carried it is deleted.
///
/// This module is the only code allowed to touch `task_count`.
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{DomainError, DomainResult};

/// Result of one allocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceAllocation {
    /// The freshly issued per-project sequence number (1-based)
    pub sequence: i64,

    /// The project's short code, e.g. "PRO"
    pub project_key: String,
}

impl SequenceAllocation {
    /// The display identifier for a task carrying this allocation
    pub fn human_id(&self) -> String {
        format!("{}-{}", self.project_key, self.sequence)
    }
}

/// Atomically allocates the next task number for a project
///
/// Fails with `NotFound` when the project does not exist; the caller must
/// not create a task in that case.
pub async fn next_task_sequence(
    pool: &PgPool,
    project_id: Uuid,
) -> DomainResult<SequenceAllocation> {
    let row: Option<(i64, String)> = sqlx::query_as(
        r#"
        UPDATE projects
        SET task_count = task_count + 1
        WHERE id = $1
        RETURNING task_count, key
        "#,
    )
    .bind(project_id)
    .fetch_optional(pool)
    .await?;

    let (sequence, project_key) = row.ok_or(DomainError::NotFound("project"))?;

    Ok(SequenceAllocation {
        sequence,
        project_key,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_human_id_format() {
        let allocation = SequenceAllocation {
            sequence: 17,
            project_key: "PRO".to_string(),
        };
        assert_eq!(allocation.human_id(), "PRO-17");
    }

    // Gaplessness under concurrent allocation is exercised against a real
    // database in tests/engine_tests.rs.
}
