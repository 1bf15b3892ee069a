//! Failure-context reconstruction for Surefire test reports.
//!
//! Given a failing test's class, method and stack trace, this library finds the
//! test's source file, infers the production types it depends on, collects the
//! related source files and flags suspicious lines. Everything is textual and
//! best-effort: missing files and non-matching patterns shrink the result, they
//! never abort processing.
//!
//! # Pipeline
//!
//! ```text
//! TEST-*.xml ──► report ──► FailureRecord
//!                               │
//!                               ▼
//!          locator::locate_test_source ──► window::extract_method_context
//!                               │
//!                               ▼
//!          deps::extract_dependencies ──► locator::find_related_sources
//!                               │
//!                               ▼
//!          annotator::find_candidate_bugs ──► FailureContextBundle
//! ```

#![allow(clippy::uninlined_format_args)]

pub mod annotator;
pub mod bundle;
pub mod config;
pub mod deps;
pub mod error;
pub mod locator;
pub mod report;
pub mod reporter;
pub mod summary;
pub mod window;

pub use annotator::{find_candidate_bugs, BugAnnotation, BugKind, Confidence};
pub use bundle::{ContextEngine, FailureContextBundle, RelatedSource};
pub use config::{LocatorConfig, WindowConfig};
pub use deps::{extract_dependencies, DependencySet};
pub use error::{TriageError, TriageResult};
pub use locator::{SourceContext, SourceLocator};
pub use report::{FailureKind, FailureRecord, ReportSet, TestSuiteResult};
pub use reporter::{MemoryReporter, Reporter, TracingReporter};
pub use window::extract_method_context;
