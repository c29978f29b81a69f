use std::sync::atomic::{AtomicU64, Ordering};

/// Statistics collected while walking the faction sections
#[derive(Default)]
pub struct ExtractionStats {
    pub quotes_extracted: AtomicU64,
    pub tables_processed: AtomicU64,
    pub tables_skipped: AtomicU64,
    pub factions_failed: AtomicU64,
}

impl ExtractionStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_quotes(&self, count: u64) {
        self.quotes_extracted.fetch_add(count, Ordering::Relaxed);
    }

    pub fn inc_tables(&self) {
        self.tables_processed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_skipped_tables(&self) {
        self.tables_skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_failed_factions(&self) {
        self.factions_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn quotes(&self) -> u64 {
        self.quotes_extracted.load(Ordering::Relaxed)
    }

    pub fn tables(&self) -> u64 {
        self.tables_processed.load(Ordering::Relaxed)
    }

    pub fn skipped_tables(&self) -> u64 {
        self.tables_skipped.load(Ordering::Relaxed)
    }

    pub fn failed_factions(&self) -> u64 {
        self.factions_failed.load(Ordering::Relaxed)
    }
}

/// Statistics collected while normalizing raw quote files
#[derive(Default)]
pub struct TransformStats {
    pub files_processed: AtomicU64,
    pub quotes_read: AtomicU64,
    pub quotes_dropped: AtomicU64,
    pub quotes_written: AtomicU64,
    pub duplicate_ids: AtomicU64,
}

impl TransformStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inc_files(&self) {
        self.files_processed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_read(&self, count: u64) {
        self.quotes_read.fetch_add(count, Ordering::Relaxed);
    }

    pub fn inc_dropped(&self) {
        self.quotes_dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_written(&self, count: u64) {
        self.quotes_written.fetch_add(count, Ordering::Relaxed);
    }

    pub fn add_duplicates(&self, count: u64) {
        self.duplicate_ids.fetch_add(count, Ordering::Relaxed);
    }

    pub fn files(&self) -> u64 {
        self.files_processed.load(Ordering::Relaxed)
    }

    pub fn read(&self) -> u64 {
        self.quotes_read.load(Ordering::Relaxed)
    }

    pub fn dropped(&self) -> u64 {
        self.quotes_dropped.load(Ordering::Relaxed)
    }

    pub fn written(&self) -> u64 {
        self.quotes_written.load(Ordering::Relaxed)
    }

    pub fn duplicates(&self) -> u64 {
        self.duplicate_ids.load(Ordering::Relaxed)
    }
}
