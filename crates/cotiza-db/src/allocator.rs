//! # Code Allocator
//!
//! Issues unique project codes under concurrent use.
//!
//! ## Why Reading "latest + 1" Is Not Enough
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Naive path: next_sequence() then reserve()                             │
//! │                                                                         │
//! │  Task A: latest = RE-505-003 → N = 4                                    │
//! │  Task B: latest = RE-505-003 → N = 4     (A has not written yet)        │
//! │  Task A: reserve RE-505-004  ✓                                          │
//! │  Task B: reserve RE-505-004  ✗ UniqueViolation                          │
//! │                                                                         │
//! │  CodeAllocator::allocate                                                │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │ lock(bucket "RE-505-")           one writer per bucket in-process│   │
//! │  │   loop up to max_attempts:                                      │   │
//! │  │     N = next_sequence()                                         │   │
//! │  │     reserve(code N) ── ok ─────────────► return project         │   │
//! │  │           └── UniqueViolation ──► warn, read again              │   │
//! │  │   → AllocationConflict                                          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                                                         │
//! │  The UNIQUE (type_prefix, year_digit, month, sequence) constraint       │
//! │  still guards writers in other processes; the retry handles them.       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use cotiza_core::{
    next_sequence_after, CodeBucket, CoreError, ProjectType, TypePrefix, ValidationError,
};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::{DbError, DbResult};
use crate::repository::project::{Project, ProjectRepository};

/// Attempts per allocation before giving up.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

// =============================================================================
// Code Store
// =============================================================================

/// Where issued codes live.
#[async_trait]
pub trait CodeStore: Send + Sync {
    /// Codes starting with `prefix`, highest sequence first.
    async fn codes_by_prefix(&self, prefix: &str, limit: u32) -> DbResult<Vec<String>>;

    /// Persists a project. A taken code or bucket sequence must fail with
    /// [`DbError::UniqueViolation`].
    async fn reserve(&self, project: &Project) -> DbResult<()>;
}

#[async_trait]
impl CodeStore for ProjectRepository {
    async fn codes_by_prefix(&self, prefix: &str, limit: u32) -> DbResult<Vec<String>> {
        ProjectRepository::codes_by_prefix(self, prefix, limit).await
    }

    async fn reserve(&self, project: &Project) -> DbResult<()> {
        self.insert(project).await
    }
}

#[async_trait]
impl<T: CodeStore + ?Sized> CodeStore for Arc<T> {
    async fn codes_by_prefix(&self, prefix: &str, limit: u32) -> DbResult<Vec<String>> {
        (**self).codes_by_prefix(prefix, limit).await
    }

    async fn reserve(&self, project: &Project) -> DbResult<()> {
        (**self).reserve(project).await
    }
}

/// Reads the latest code of a bucket and returns the next sequence.
///
/// This is a plain read: two callers racing on one bucket can both get the
/// same value. Use [`CodeAllocator::allocate`] to issue codes.
pub async fn next_sequence<S>(store: &S, bucket: &CodeBucket) -> DbResult<u16>
where
    S: CodeStore + ?Sized,
{
    let latest = store.codes_by_prefix(&bucket.prefix(), 1).await?;
    let sequence = next_sequence_after(bucket, latest.first().map(String::as_str))?;
    debug!(bucket = %bucket, sequence = sequence, "Next sequence read");
    Ok(sequence)
}

// =============================================================================
// Allocation Request
// =============================================================================

/// What a new project code is derived from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProject {
    pub project_type: ProjectType,
    pub name: Option<String>,
    /// Configured 2-letter code for vertical projects.
    pub vertical_prefix: Option<String>,
    /// Vertical projects only.
    pub prototype: Option<String>,
    /// Picks the `(year, month)` bucket.
    pub date: NaiveDate,
}

impl NewProject {
    pub fn new(project_type: ProjectType, date: NaiveDate) -> Self {
        NewProject {
            project_type,
            name: None,
            vertical_prefix: None,
            prototype: None,
            date,
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn vertical_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.vertical_prefix = Some(prefix.into());
        self
    }

    pub fn prototype(mut self, prototype: impl Into<String>) -> Self {
        self.prototype = Some(prototype.into());
        self
    }

    /// Type prefix and bucket for this request.
    ///
    /// ## Errors
    /// - residential project with a prototype
    /// - vertical project with neither a configured prefix nor a name
    pub fn bucket(&self) -> DbResult<CodeBucket> {
        if !self.project_type.is_vertical() && self.prototype.is_some() {
            return Err(CoreError::from(ValidationError::InvalidFormat {
                field: "prototype".to_string(),
                reason: "residential project codes carry no prototype".to_string(),
            })
            .into());
        }
        let prefix = TypePrefix::for_project(
            self.project_type,
            self.vertical_prefix.as_deref(),
            self.name.as_deref(),
        )?;
        Ok(CodeBucket::for_date(prefix, self.date))
    }
}

// =============================================================================
// Allocator
// =============================================================================

/// Serializes read-then-reserve per bucket and retries lost races.
#[derive(Debug)]
pub struct CodeAllocator<S> {
    store: S,
    locks: Mutex<HashMap<CodeBucket, Arc<Mutex<()>>>>,
    max_attempts: u32,
}

impl<S: CodeStore> CodeAllocator<S> {
    pub fn new(store: S) -> Self {
        CodeAllocator {
            store,
            locks: Mutex::new(HashMap::new()),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Sets the retry bound (at least one attempt is always made).
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    async fn bucket_lock(&self, bucket: &CodeBucket) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        locks.entry(bucket.clone()).or_default().clone()
    }

    /// Allocates and persists the next code for `request`.
    ///
    /// ## Errors
    /// - `Core(SequenceExhausted)` - bucket already at 999
    /// - `AllocationConflict` - every attempt lost to another writer
    /// - any store error other than a unique violation
    pub async fn allocate(&self, request: &NewProject) -> DbResult<Project> {
        let bucket = request.bucket()?;
        let lock = self.bucket_lock(&bucket).await;
        let _guard = lock.lock().await;

        for attempt in 1..=self.max_attempts {
            let sequence = next_sequence(&self.store, &bucket).await?;
            let project = Project {
                code: bucket.code(sequence, request.prototype.clone())?,
                project_type: request.project_type,
                name: request.name.clone(),
                created_at: Utc::now(),
            };

            match self.store.reserve(&project).await {
                Ok(()) => {
                    info!(code = %project.code, attempt = attempt, "Project code allocated");
                    return Ok(project);
                }
                Err(err) if err.is_unique_violation() => {
                    warn!(
                        bucket = %bucket,
                        sequence = sequence,
                        attempt = attempt,
                        "Sequence taken by another writer, retrying"
                    );
                }
                Err(err) => return Err(err),
            }
        }

        Err(DbError::AllocationConflict {
            bucket: bucket.prefix(),
            attempts: self.max_attempts,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
