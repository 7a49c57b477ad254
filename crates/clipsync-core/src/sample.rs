//! Fixed illustrative data shown in sample mode.

use chrono::{Duration, Utc};

use crate::model::{FileMeta, RecentSessionEntry, SenderSide, TransferItem};

/// Sample items, newest first, timestamped relative to now.
#[must_use]
pub fn sample_items() -> Vec<TransferItem> {
    let now = Utc::now();
    vec![
        TransferItem::text(
            "Meeting notes: Discussed Q4 roadmap priorities. Key decisions \u{2014} focus on mobile \
             experience, defer analytics dashboard to Q1. Action items: Sarah to draft PRD by \
             Friday, Mike to schedule design review.",
            SenderSide::Local,
        )
        .with_id("s1")
        .with_timestamp(now - Duration::minutes(2)),
        TransferItem::code(
            "async function fetchData(url: string) {\n  const response = await fetch(url);\n  \
             if (!response.ok) throw new Error(\"Network error\");\n  return response.json();\n}",
            "TypeScript",
            SenderSide::Remote,
        )
        .with_id("s2")
        .with_timestamp(now - Duration::minutes(5)),
        TransferItem::file(
            FileMeta::new("presentation-final.pdf", 2_457_600),
            SenderSide::Local,
        )
        .with_id("s3")
        .with_timestamp(now - Duration::minutes(10)),
        TransferItem::text(
            "https://figma.com/file/abc123/design-system \u{2014} latest component library link for the team.",
            SenderSide::Remote,
        )
        .with_id("s4")
        .with_timestamp(now - Duration::minutes(15)),
    ]
}

/// Sample ledger entries.
#[must_use]
pub fn sample_recent_sessions() -> Vec<RecentSessionEntry> {
    vec![
        RecentSessionEntry::new("XK7M4P", "Today, 2:30 PM", 7),
        RecentSessionEntry::new("BN3Q9R", "Yesterday", 12),
        RecentSessionEntry::new("TG5W2H", "Feb 25", 3),
    ]
}
