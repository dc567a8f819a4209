//! Doctor service - store health checks

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use serde::Serialize;
use serde_json::json;

use crate::domain::result::Result;
use crate::domain::CURRENT_SCHEMA_VERSION;
use crate::ports::WorkspaceRepository;

pub struct DoctorService {
    repository: Arc<dyn WorkspaceRepository>,
}

fn check(
    problems: Vec<serde_json::Value>,
    severity: &str,
    ok_message: &str,
    problem_message: impl FnOnce(usize) -> String,
) -> CheckResult {
    if problems.is_empty() {
        CheckResult {
            status: "pass".to_string(),
            message: ok_message.to_string(),
            details: None,
        }
    } else {
        CheckResult {
            status: severity.to_string(),
            message: problem_message(problems.len()),
            details: Some(problems),
        }
    }
}

impl DoctorService {
    pub fn new(repository: Arc<dyn WorkspaceRepository>) -> Self {
        Self { repository }
    }

    /// Run all health checks
    pub fn run_checks(&self) -> Result<DoctorResult> {
        let user_ids: HashSet<String> = self
            .repository
            .list_users()?
            .into_iter()
            .map(|u| u.id)
            .collect();
        let owners = self.repository.list_workspace_owners()?;
        let owner_set: HashSet<&str> = owners.iter().map(String::as_str).collect();

        let mut checks = BTreeMap::new();

        let orphaned: Vec<_> = owners
            .iter()
            .filter(|id| !user_ids.contains(*id))
            .map(|id| json!({ "user_id": id }))
            .collect();
        checks.insert(
            "orphaned_workspaces".to_string(),
            check(orphaned, "error", "Every workspace has an account", |n| {
                format!("{} workspace(s) belong to no account", n)
            }),
        );

        let mut homeless: Vec<_> = user_ids
            .iter()
            .filter(|id| !owner_set.contains(id.as_str()))
            .cloned()
            .collect();
        homeless.sort();
        checks.insert(
            "users_without_workspace".to_string(),
            check(
                homeless.into_iter().map(|id| json!({ "user_id": id })).collect(),
                "warning",
                "Every account has a workspace",
                |n| format!("{} account(s) have no workspace yet", n),
            ),
        );

        let mut unknown_schema = Vec::new();
        let mut bad_streak = Vec::new();
        for owner in &owners {
            let Some(ws) = self.repository.load_workspace(owner)? else {
                continue;
            };
            if ws.schema_version == 0 || ws.schema_version > CURRENT_SCHEMA_VERSION {
                unknown_schema.push(json!({ "user_id": owner, "schema_version": ws.schema_version }));
            }
            if ws.streak < 1 {
                bad_streak.push(json!({ "user_id": owner, "streak": ws.streak }));
            }
        }
        checks.insert(
            "schema_version".to_string(),
            check(unknown_schema, "error", "All workspaces use a known schema", |n| {
                format!("{} workspace(s) have an unknown schema version", n)
            }),
        );
        checks.insert(
            "streak_sanity".to_string(),
            check(bad_streak, "warning", "All streaks are at least 1", |n| {
                format!("{} workspace(s) have a streak below 1", n)
            }),
        );

        let passed = checks.values().filter(|c| c.status == "pass").count() as i64;
        let warnings = checks.values().filter(|c| c.status == "warning").count() as i64;
        let errors = checks.values().filter(|c| c.status == "error").count() as i64;

        Ok(DoctorResult {
            checks,
            summary: DoctorSummary {
                passed,
                warnings,
                errors,
            },
        })
    }
}

#[derive(Debug, Serialize)]
pub struct DoctorResult {
    pub checks: BTreeMap<String, CheckResult>,
    pub summary: DoctorSummary,
}

#[derive(Debug, Serialize)]
pub struct CheckResult {
    pub status: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<serde_json::Value>>,
}

#[derive(Debug, Serialize)]
pub struct DoctorSummary {
    pub passed: i64,
    pub warnings: i64,
    pub errors: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::MemoryRepository;
    use crate::domain::{User, Workspace};

    #[test]
    fn test_healthy_store_passes() {
        let repo = Arc::new(MemoryRepository::new());
        repo.upsert_user(&User::new("a", "Ada", "a@x.io")).unwrap();
        repo.create_workspace_if_absent("a", &Workspace::new()).unwrap();

        let result = DoctorService::new(repo).run_checks().unwrap();
        assert_eq!(result.summary.errors, 0);
        assert_eq!(result.summary.warnings, 0);
        assert_eq!(result.summary.passed, 4);
    }

    #[test]
    fn test_detects_problems() {
        let repo = Arc::new(MemoryRepository::new());
        repo.upsert_user(&User::new("a", "Ada", "a@x.io")).unwrap();
        let mut ws = Workspace::new();
        ws.streak = 0;
        ws.schema_version = CURRENT_SCHEMA_VERSION + 1;
        repo.create_workspace_if_absent("ghost", &ws).unwrap();

        let result = DoctorService::new(repo).run_checks().unwrap();
        assert_eq!(result.checks["orphaned_workspaces"].status, "error");
        assert_eq!(result.checks["users_without_workspace"].status, "warning");
        assert_eq!(result.checks["schema_version"].status, "error");
        assert_eq!(result.checks["streak_sanity"].status, "warning");
        assert_eq!(result.summary.errors, 2);
    }
}
