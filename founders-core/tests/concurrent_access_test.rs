//! Concurrent workspace access tests
//!
//! Operations on one user's workspace must never lose each other's writes,
//! and different users must not interfere.
//!
//! Run with: cargo test --test concurrent_access_test -- --nocapture

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

use tempfile::TempDir;

use founders_core::adapters::duckdb::DuckDbRepository;
use founders_core::adapters::local_identity::LocalIdentityProvider;
use founders_core::adapters::memory::MemoryRepository;
use founders_core::ports::WorkspaceRepository;
use founders_core::services::WorkspaceService;
use founders_core::{FoundersContext, Priority, User};

/// Number of concurrent threads for stress tests
const THREAD_COUNT: usize = 6;

/// Number of iterations per thread
const ITERATIONS_PER_THREAD: usize = 5;

/// Every account the tests below write to
fn register_users(repo: &dyn WorkspaceRepository) {
    let mut ids = vec!["u1".to_string(), "shared".to_string(), "newcomer".to_string()];
    ids.extend((0..THREAD_COUNT).map(|i| format!("user_{}", i)));
    for id in ids {
        repo.upsert_user(&User::new(id.as_str(), "Founder", &format!("{}@example.com", id)))
            .unwrap();
    }
}

fn duckdb_repo(dir: &TempDir) -> Arc<dyn WorkspaceRepository> {
    let repo = DuckDbRepository::new(&dir.path().join("concurrent.duckdb")).unwrap();
    repo.ensure_schema().unwrap();
    register_users(&repo);
    Arc::new(repo)
}

fn memory_repo() -> Arc<dyn WorkspaceRepository> {
    let repo = MemoryRepository::new();
    register_users(&repo);
    Arc::new(repo)
}

/// Two simultaneous adds for the same user: both tasks survive
#[test]
fn test_two_concurrent_adds_both_survive() {
    let dir = TempDir::new().unwrap();
    let service = Arc::new(WorkspaceService::new(duckdb_repo(&dir)));
    service.get_or_create("u1").unwrap();

    let barrier = Arc::new(Barrier::new(2));
    let handles: Vec<_> = ["X", "Y"]
        .into_iter()
        .map(|text| {
            let service = Arc::clone(&service);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                service.add_task("u1", text).unwrap();
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let texts: HashSet<String> = service
        .tasks("u1")
        .unwrap()
        .into_iter()
        .map(|t| t.text)
        .collect();
    assert_eq!(texts, HashSet::from(["X".to_string(), "Y".to_string()]));
}

/// Many threads hammering one user's workspace: no lost updates
#[test]
fn test_same_user_no_lost_updates() {
    let dir = TempDir::new().unwrap();
    for repo in [
        memory_repo(),
        duckdb_repo(&dir),
    ] {
        let service = Arc::new(WorkspaceService::new(repo));
        let barrier = Arc::new(Barrier::new(THREAD_COUNT));

        let handles: Vec<_> = (0..THREAD_COUNT)
            .map(|thread_id| {
                let service = Arc::clone(&service);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    for i in 0..ITERATIONS_PER_THREAD {
                        service
                            .add_task("shared", &format!("t{}_i{}", thread_id, i))
                            .unwrap();
                        service
                            .add_goal("shared", &format!("g{}_i{}", thread_id, i), Priority::Low, None)
                            .unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let ws = service.get_or_create("shared").unwrap();
        assert_eq!(ws.tasks.len(), THREAD_COUNT * ITERATIONS_PER_THREAD);
        assert_eq!(ws.goals.len(), THREAD_COUNT * ITERATIONS_PER_THREAD);
        assert_eq!(ws.revision, (THREAD_COUNT * ITERATIONS_PER_THREAD * 2) as u64);
    }
}

/// Each thread owns a user; every workspace ends up with exactly its own tasks
#[test]
fn test_users_are_isolated() {
    let dir = TempDir::new().unwrap();
    let service = Arc::new(WorkspaceService::new(duckdb_repo(&dir)));
    let barrier = Arc::new(Barrier::new(THREAD_COUNT));

    let handles: Vec<_> = (0..THREAD_COUNT)
        .map(|thread_id| {
            let service = Arc::clone(&service);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let user = format!("user_{}", thread_id);
                barrier.wait();
                for i in 0..ITERATIONS_PER_THREAD {
                    service.add_task(&user, &format!("{}-{}", user, i)).unwrap();
                }
                service.toggle_task(&user, 0).unwrap();
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    for thread_id in 0..THREAD_COUNT {
        let user = format!("user_{}", thread_id);
        let tasks = service.tasks(&user).unwrap();
        assert_eq!(tasks.len(), ITERATIONS_PER_THREAD);
        assert!(tasks.iter().all(|t| t.text.starts_with(&format!("{}-", user))));
        assert_eq!(service.remaining_task_count(&user).unwrap(), ITERATIONS_PER_THREAD - 1);
    }
}

/// Two store instances over one repository do not share a lock table; the
/// revision check turns their races into conflicts instead of lost writes
#[test]
fn test_separate_stores_conflict_instead_of_losing_writes() {
    let repo = memory_repo();
    let stores = [
        Arc::new(WorkspaceService::new(Arc::clone(&repo))),
        Arc::new(WorkspaceService::new(Arc::clone(&repo))),
    ];
    stores[0].get_or_create("u1").unwrap();

    let barrier = Arc::new(Barrier::new(THREAD_COUNT));
    let success_count = Arc::new(AtomicUsize::new(0));
    let conflict_count = Arc::new(AtomicUsize::new(0));

    let handles: Vec<_> = (0..THREAD_COUNT)
        .map(|thread_id| {
            let store = Arc::clone(&stores[thread_id % 2]);
            let barrier = Arc::clone(&barrier);
            let success_count = Arc::clone(&success_count);
            let conflict_count = Arc::clone(&conflict_count);
            thread::spawn(move || {
                barrier.wait();
                for i in 0..ITERATIONS_PER_THREAD {
                    match store.add_task("u1", &format!("t{}_{}", thread_id, i)) {
                        Ok(_) => success_count.fetch_add(1, Ordering::SeqCst),
                        Err(e) if e.is_conflict() => conflict_count.fetch_add(1, Ordering::SeqCst),
                        Err(e) => panic!("unexpected error: {}", e),
                    };
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let successes = success_count.load(Ordering::SeqCst);
    println!(
        "successes: {}, conflicts: {}",
        successes,
        conflict_count.load(Ordering::SeqCst)
    );
    assert_eq!(
        successes + conflict_count.load(Ordering::SeqCst),
        THREAD_COUNT * ITERATIONS_PER_THREAD
    );
    assert_eq!(stores[1].tasks("u1").unwrap().len(), successes);
}

/// Concurrent first access creates exactly one workspace
#[test]
fn test_concurrent_get_or_create() {
    let dir = TempDir::new().unwrap();
    let repo = duckdb_repo(&dir);
    let service = Arc::new(WorkspaceService::new(Arc::clone(&repo)));
    let barrier = Arc::new(Barrier::new(THREAD_COUNT));

    let handles: Vec<_> = (0..THREAD_COUNT)
        .map(|_| {
            let service = Arc::clone(&service);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                service.get_or_create("newcomer").unwrap()
            })
        })
        .collect();
    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert!(results.windows(2).all(|w| w[0] == w[1]));
    assert_eq!(repo.list_workspace_owners().unwrap(), vec!["newcomer".to_string()]);
}

/// Deleting an account while its workspace is being written leaves nothing
/// behind: every write either lands before the delete or fails with NotFound
#[test]
fn test_delete_account_during_writes() {
    let dir = TempDir::new().unwrap();
    let ctx = Arc::new(FoundersContext::new(dir.path()).unwrap());
    let ada = ctx
        .session_service
        .sign_in(&LocalIdentityProvider::new("Ada", "ada@example.com"))
        .unwrap();

    let barrier = Arc::new(Barrier::new(THREAD_COUNT + 1));
    let rejected = Arc::new(AtomicUsize::new(0));

    let writers: Vec<_> = (0..THREAD_COUNT)
        .map(|thread_id| {
            let ctx = Arc::clone(&ctx);
            let barrier = Arc::clone(&barrier);
            let rejected = Arc::clone(&rejected);
            let user_id = ada.id.clone();
            thread::spawn(move || {
                barrier.wait();
                for i in 0..ITERATIONS_PER_THREAD {
                    match ctx
                        .workspace_service
                        .add_task(&user_id, &format!("t{}_{}", thread_id, i))
                    {
                        Ok(_) => {}
                        Err(e) if e.is_not_found() => {
                            rejected.fetch_add(1, Ordering::SeqCst);
                        }
                        Err(e) => panic!("unexpected error: {}", e),
                    }
                }
            })
        })
        .collect();

    barrier.wait();
    ctx.session_service.delete_account(&ada.id).unwrap();
    for handle in writers {
        handle.join().unwrap();
    }

    println!("writes rejected after delete: {}", rejected.load(Ordering::SeqCst));
    assert!(ctx.repository.load_workspace(&ada.id).unwrap().is_none());
    assert!(ctx.repository.list_workspace_owners().unwrap().is_empty());
    assert!(ctx
        .workspace_service
        .add_task(&ada.id, "late")
        .unwrap_err()
        .is_not_found());
}
