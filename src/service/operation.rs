//! Supported case-management operations.
//!
//! # Responsibilities
//! - Enumerate every operation the bridge exposes
//! - Map each operation to its topic suffix, HTTP verb and REST path
//! - Resolve configured operation names
//!
//! # Design Decisions
//! - One enum variant per operation; the table below is the single source
//!   of truth for topics and paths
//! - Topic suffixes are spelled out, not derived from the names at runtime

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::upstream::UpstreamPath;

/// HTTP verb used upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    Get,
    Post,
}

/// Static description of one operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationDescriptor {
    /// Configuration name, e.g. `create_case_task`.
    pub name: &'static str,
    /// Topic segment after the service type, e.g. `case/task/create`.
    pub topic_suffix: &'static str,
    pub verb: Verb,
    /// REST path; a `{field}` segment is replaced by the extracted value.
    pub path: &'static str,
    /// Request field consumed to fill the path, if any.
    pub path_param: Option<&'static str>,
}

impl OperationDescriptor {
    const fn new(
        name: &'static str,
        topic_suffix: &'static str,
        verb: Verb,
        path: &'static str,
        path_param: Option<&'static str>,
    ) -> Self {
        Self {
            name,
            topic_suffix,
            verb,
            path,
            path_param,
        }
    }

    /// Build the REST path, substituting `value` for the placeholder segment.
    pub fn render_path(&self, value: Option<&str>) -> UpstreamPath {
        self.path
            .split('/')
            .filter(|segment| !segment.is_empty())
            .fold(UpstreamPath::new(""), |path, segment| {
                match (segment.starts_with('{') && segment.ends_with('}'), value) {
                    (true, Some(value)) => path.push(value),
                    _ => path.push(segment),
                }
            })
    }
}

/// An operation exposed on the fabric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Operation {
    CreateCase,
    CreateCaseTask,
    CreateCaseObservable,
    GetCase,
    GetCaseTask,
    GetCaseObservable,
    SearchCase,
    SearchCaseTask,
    SearchCaseObservable,
    CreateAlert,
    GetAlert,
    SearchAlert,
}

impl Operation {
    pub const ALL: [Operation; 12] = [
        Operation::CreateCase,
        Operation::CreateCaseTask,
        Operation::CreateCaseObservable,
        Operation::GetCase,
        Operation::GetCaseTask,
        Operation::GetCaseObservable,
        Operation::SearchCase,
        Operation::SearchCaseTask,
        Operation::SearchCaseObservable,
        Operation::CreateAlert,
        Operation::GetAlert,
        Operation::SearchAlert,
    ];

    pub const fn descriptor(self) -> OperationDescriptor {
        use Verb::{Get, Post};
        match self {
            Operation::CreateCase => {
                OperationDescriptor::new("create_case", "case/create", Post, "/api/case", None)
            }
            Operation::CreateCaseTask => OperationDescriptor::new(
                "create_case_task",
                "case/task/create",
                Post,
                "/api/case/{caseId}/task",
                Some("caseId"),
            ),
            Operation::CreateCaseObservable => OperationDescriptor::new(
                "create_case_observable",
                "case/observable/create",
                Post,
                "/api/case/{caseId}/artifact",
                Some("caseId"),
            ),
            Operation::GetCase => {
                OperationDescriptor::new("get_case", "case/get", Get, "/api/case/{id}", Some("id"))
            }
            Operation::GetCaseTask => OperationDescriptor::new(
                "get_case_task",
                "case/task/get",
                Get,
                "/api/case/task/{id}",
                Some("id"),
            ),
            Operation::GetCaseObservable => OperationDescriptor::new(
                "get_case_observable",
                "case/observable/get",
                Get,
                "/api/case/artifact/{id}",
                Some("id"),
            ),
            Operation::SearchCase => {
                OperationDescriptor::new("search_case", "case/search", Post, "/api/case/_search", None)
            }
            Operation::SearchCaseTask => OperationDescriptor::new(
                "search_case_task",
                "case/task/search",
                Post,
                "/api/case/task/_search",
                None,
            ),
            Operation::SearchCaseObservable => OperationDescriptor::new(
                "search_case_observable",
                "case/observable/search",
                Post,
                "/api/case/artifact/_search",
                None,
            ),
            Operation::CreateAlert => {
                OperationDescriptor::new("create_alert", "alert/create", Post, "/api/alert", None)
            }
            Operation::GetAlert => {
                OperationDescriptor::new("get_alert", "alert/get", Get, "/api/alert/{id}", Some("id"))
            }
            Operation::SearchAlert => {
                OperationDescriptor::new("search_alert", "alert/search", Post, "/api/alert/_search", None)
            }
        }
    }

    pub const fn name(self) -> &'static str {
        self.descriptor().name
    }

    pub const fn topic_suffix(self) -> &'static str {
        self.descriptor().topic_suffix
    }

    /// Look up an operation by its configuration name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.name() == name)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Configured operation name with no matching [`Operation`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown operation '{0}'")]
pub struct UnknownOperation(pub String);

impl FromStr for Operation {
    type Err = UnknownOperation;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s.trim()).ok_or_else(|| UnknownOperation(s.to_string()))
    }
}
