/// Mention and hashtag scanning
///
/// Free text (task descriptions) carries two inline vocabularies:
/// `@username` references resolved against the org's membership roster, and
/// `#hashtag` labels folded into the task's tag list. Extraction is pure;
/// [`resolve_and_notify`] turns resolved mentions into notification rows.
use regex::Regex;
use sqlx::PgPool;
use std::sync::LazyLock;
use uuid::Uuid;

use crate::models::membership::Membership;
use crate::models::notification::{CreateNotification, Notification, NotificationKind};

static MENTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@[A-Za-z0-9_]+").expect("mention pattern is valid"));

static HASHTAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#[A-Za-z0-9_]+").expect("hashtag pattern is valid"));

/// Extracts `@username` references, in document order, `@` stripped
///
/// Duplicates are kept; resolution works per membership row, so repeated
/// mentions of one member collapse there.
pub fn extract_mentions(text: &str) -> Vec<String> {
    MENTION_RE
        .find_iter(text)
        .map(|m| m.as_str()[1..].to_string())
        .collect()
}

/// Extracts `#hashtag` labels, in document order, `#` stripped
pub fn extract_hashtags(text: &str) -> Vec<String> {
    HASHTAG_RE
        .find_iter(text)
        .map(|m| m.as_str()[1..].to_string())
        .collect()
}

/// Unions explicit tags with hashtags from a description
///
/// Explicit tags come first; case is preserved and duplicates are dropped
/// by exact string match only.
pub fn union_tags(explicit: Vec<String>, description: Option<&str>) -> Vec<String> {
    let mut seen = Vec::new();
    let hashtags = description.map(extract_hashtags).unwrap_or_default();

    for tag in explicit.into_iter().chain(hashtags) {
        if !seen.contains(&tag) {
            seen.push(tag);
        }
    }

    seen
}

/// Resolves mentions in `text` and fans out one `mention` notification per
/// resolved member, skipping the actor
///
/// Unresolved usernames are silently ignored. Returns the number of
/// notifications created.
pub async fn resolve_and_notify(
    pool: &PgPool,
    text: &str,
    org_id: Uuid,
    task_human_id: &str,
    actor_id: Uuid,
) -> Result<u64, sqlx::Error> {
    let mentions = extract_mentions(text);
    if mentions.is_empty() {
        return Ok(0);
    }

    let memberships = Membership::find_by_usernames(pool, org_id, &mentions).await?;

    let batch: Vec<CreateNotification> = memberships
        .into_iter()
        .filter(|m| m.user_id != actor_id)
        .map(|m| CreateNotification {
            recipient_id: m.user_id,
            org_id,
            kind: NotificationKind::Mention,
            content: format!("You were mentioned in task {}", task_human_id),
            link: Some(format!("/dashboard?taskId={}", task_human_id)),
        })
        .collect();

    Notification::create_many(pool, batch).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_mentions_basic() {
        assert_eq!(
            extract_mentions("ping @bob about the release"),
            vec!["bob".to_string()]
        );
    }

    #[test]
    fn test_extract_mentions_multiple_and_duplicates() {
        // Extraction does not deduplicate
        assert_eq!(
            extract_mentions("@alice @bob @alice"),
            vec!["alice", "bob", "alice"]
        );
    }

    #[test]
    fn test_extract_mentions_charset() {
        assert_eq!(extract_mentions("@under_score9 ok"), vec!["under_score9"]);
        // Punctuation terminates the handle
        assert_eq!(extract_mentions("thanks @eve!"), vec!["eve"]);
        // Bare @ matches nothing
        assert!(extract_mentions("a @ b").is_empty());
        assert!(extract_mentions("no handles here").is_empty());
    }

    #[test]
    fn test_extract_hashtags() {
        assert_eq!(
            extract_hashtags("ping @bob about #urgent work"),
            vec!["urgent"]
        );
        assert_eq!(extract_hashtags("#a #B #a"), vec!["a", "B", "a"]);
        assert!(extract_hashtags("nothing tagged").is_empty());
    }

    #[test]
    fn test_union_tags_dedup_and_order() {
        let tags = union_tags(
            vec!["infra".to_string(), "urgent".to_string()],
            Some("fix the #urgent #build issue"),
        );
        assert_eq!(tags, vec!["infra", "urgent", "build"]);
    }

    #[test]
    fn test_union_tags_case_preserved() {
        // Dedup is exact-match only: "Urgent" and "urgent" both survive
        let tags = union_tags(vec!["Urgent".to_string()], Some("#urgent"));
        assert_eq!(tags, vec!["Urgent", "urgent"]);
    }

    #[test]
    fn test_union_tags_no_description() {
        let tags = union_tags(vec!["solo".to_string()], None);
        assert_eq!(tags, vec!["solo"]);
    }
}
