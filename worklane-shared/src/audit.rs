/// Audit log reads and writes
///
/// Writes go through [`record`], which never fails the caller; an audit
/// entry that cannot be written is logged and dropped. Reads serve a capped
/// window: only the newest [`HARD_CAP`] entries per organization are
/// reachable through paging, regardless of how many rows exist.
use sqlx::PgPool;
use tracing::error;
use uuid::Uuid;

use crate::models::action_log::{ActionLogEntry, AppendEntry};

/// Entries per page
pub const PAGE_SIZE: i64 = 30;

/// Newest entries reachable through paging, per organization
pub const HARD_CAP: i64 = 500;

/// One page of an org's audit log
#[derive(Debug, Clone, serde::Serialize)]
pub struct AuditPage {
    pub entries: Vec<ActionLogEntry>,
    pub page: i64,
    pub total_pages: i64,
}

/// Appends an audit entry, best-effort
///
/// Audit writes ride along with a primary operation that has already
/// succeeded, so a failure here is reported and swallowed.
pub async fn record(pool: &PgPool, entry: AppendEntry) {
    let org_id = entry.org_id;
    if let Err(e) = ActionLogEntry::append(pool, entry).await {
        error!(%org_id, "Failed to append audit entry: {}", e);
    }
}

/// The LIMIT/OFFSET window for a page under the cap, or `None` when the
/// page starts at or past the cap
///
/// Checked arithmetic: a page number large enough to overflow the offset
/// is necessarily past the cap.
fn capped_window(page: i64) -> Option<(i64, i64)> {
    let offset = page.max(1).checked_sub(1)?.checked_mul(PAGE_SIZE)?;
    if offset >= HARD_CAP {
        return None;
    }
    let limit = PAGE_SIZE.min(HARD_CAP - offset);
    Some((limit, offset))
}

/// Page count as seen through the cap
fn capped_total_pages(count: i64) -> i64 {
    let visible = count.min(HARD_CAP);
    (visible + PAGE_SIZE - 1) / PAGE_SIZE
}

/// Fetches one page of an org's audit log, newest first
///
/// Pages past the cap come back empty rather than erroring; `total_pages`
/// is always computed against the capped count so clients never see a page
/// number they cannot fetch.
pub async fn list(pool: &PgPool, org_id: Uuid, page: i64) -> Result<AuditPage, sqlx::Error> {
    let page = page.max(1);

    let count = ActionLogEntry::count(pool, org_id).await?;
    let total_pages = capped_total_pages(count);

    let entries = match capped_window(page) {
        Some((limit, offset)) => ActionLogEntry::fetch_window(pool, org_id, limit, offset).await?,
        None => Vec::new(),
    };

    Ok(AuditPage {
        entries,
        page,
        total_pages,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_first_page() {
        assert_eq!(capped_window(1), Some((30, 0)));
        assert_eq!(capped_window(2), Some((30, 30)));
    }

    #[test]
    fn test_window_final_in_cap_page_is_truncated() {
        // Page 17 starts at offset 480; only 20 entries remain under the cap
        assert_eq!(capped_window(17), Some((20, 480)));
    }

    #[test]
    fn test_window_past_cap_is_empty() {
        assert_eq!(capped_window(18), None);
        assert_eq!(capped_window(100), None);
    }

    #[test]
    fn test_window_extreme_page_is_empty() {
        // Offsets that would overflow i64 are treated as past the cap
        assert_eq!(capped_window(i64::MAX), None);
        assert_eq!(capped_window(i64::MAX / PAGE_SIZE), None);
        assert_eq!(capped_window(0), Some((30, 0)));
        assert_eq!(capped_window(-1), Some((30, 0)));
    }

    #[test]
    fn test_total_pages_under_cap() {
        assert_eq!(capped_total_pages(0), 0);
        assert_eq!(capped_total_pages(1), 1);
        assert_eq!(capped_total_pages(30), 1);
        assert_eq!(capped_total_pages(31), 2);
        assert_eq!(capped_total_pages(50), 2);
    }

    #[test]
    fn test_total_pages_clamped_by_cap() {
        assert_eq!(capped_total_pages(500), 17);
        assert_eq!(capped_total_pages(10_000), 17);
    }

    #[test]
    fn test_page_beyond_data_but_under_cap() {
        // 50 entries exist; page 20 is within the cap window arithmetic but
        // past the data, so the query would simply return no rows. The page
        // count still reports 2.
        assert_eq!(capped_total_pages(50), 2);
        assert!(capped_window(16).is_some());
    }
}
