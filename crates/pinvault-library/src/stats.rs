//! Library analytics

use chrono::{DateTime, Datelike, TimeZone, Utc};
use serde::Serialize;

use crate::record::UploadRecord;

const TOP_N: usize = 5;
const ACTIVITY_WINDOW_DAYS: i64 = 7;

pub const WEEKDAYS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// Upload counts per broad content category
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TypeBreakdown {
    pub images: usize,
    pub videos: usize,
    pub audio: usize,
    pub documents: usize,
    pub other: usize,
}

impl TypeBreakdown {
    fn count(&mut self, mime: &str) {
        if mime.starts_with("image/") {
            self.images += 1;
        } else if mime.starts_with("video/") {
            self.videos += 1;
        } else if mime.starts_with("audio/") {
            self.audio += 1;
        } else if mime.contains("pdf") || mime.contains("document") || mime.contains("text") {
            self.documents += 1;
        } else {
            self.other += 1;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LibraryStats {
    pub total_files: usize,
    pub total_size: u64,
    pub encrypted_files: usize,
    pub public_files: usize,
    pub folder_count: usize,
    pub types: TypeBreakdown,
    /// Newest first
    pub recent: Vec<UploadRecord>,
    /// Largest first
    pub largest: Vec<UploadRecord>,
    /// Uploads in the last week, indexed Sun..Sat in the timezone of `now`
    pub weekday_activity: [usize; 7],
    pub quota_bytes: u64,
    pub storage_percent: f64,
}

impl LibraryStats {
    /// Weekday buckets follow the timezone of `now`, so pass `Local::now()`
    /// for a calendar that matches the user's.
    pub fn compute<Tz: TimeZone>(
        records: &[UploadRecord],
        folder_count: usize,
        now: DateTime<Tz>,
        quota_bytes: u64,
    ) -> Self {
        let total_files = records.len();
        let total_size: u64 = records.iter().map(|r| r.size).sum();
        let encrypted_files = records.iter().filter(|r| r.encrypted).count();

        let mut types = TypeBreakdown::default();
        for record in records {
            // stored type first; encrypted envelopes count as "other"
            let mime = if record.mime_type.is_empty() {
                record.original_type.as_deref().unwrap_or_default()
            } else {
                record.mime_type.as_str()
            };
            types.count(mime);
        }

        let mut recent = records.to_vec();
        recent.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at));
        recent.truncate(TOP_N);

        let mut largest = records.to_vec();
        largest.sort_by(|a, b| b.size.cmp(&a.size));
        largest.truncate(TOP_N);

        let tz = now.timezone();
        let now = now.with_timezone(&Utc);
        let mut weekday_activity = [0usize; 7];
        for record in records {
            if (now - record.uploaded_at).num_days() < ACTIVITY_WINDOW_DAYS {
                let local = record.uploaded_at.with_timezone(&tz);
                let idx = local.weekday().num_days_from_sunday() as usize;
                weekday_activity[idx] += 1;
            }
        }

        let storage_percent = if quota_bytes == 0 {
            0.0
        } else {
            total_size as f64 / quota_bytes as f64 * 100.0
        };

        Self {
            total_files,
            total_size,
            encrypted_files,
            public_files: total_files - encrypted_files,
            folder_count,
            types,
            recent,
            largest,
            weekday_activity,
            quota_bytes,
            storage_percent,
        }
    }

    /// Weekday labels paired with their counts
    pub fn activity(&self) -> impl Iterator<Item = (&'static str, usize)> + '_ {
        WEEKDAYS.iter().copied().zip(self.weekday_activity.iter().copied())
    }
}
