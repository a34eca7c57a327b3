//! Tests for the file-backed namespace locks.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tempfile::TempDir;

use furl_core::lock::{FileLockProvider, LockProvider};

#[test]
fn holder_is_recorded() {
    let home = TempDir::new().unwrap();
    let locks = FileLockProvider::new(home.path().join("locks"));

    let guard = locks.acquire("web-prod").unwrap();

    assert_eq!(guard.namespace(), "web-prod");
    let holder = locks.holder("web-prod").unwrap();
    assert_eq!(holder.namespace, "web-prod");
    assert_eq!(holder.pid, std::process::id());
    assert!(locks.lock_path("web-prod").starts_with(locks.locks_dir()));
}

#[test]
fn lock_files_differ_per_namespace() {
    let locks = FileLockProvider::new("/var/lib/furl/locks");
    assert_ne!(locks.lock_path("a"), locks.lock_path("b"));
    assert_eq!(locks.lock_path("a"), locks.lock_path("a"));
}

#[test]
fn different_namespaces_do_not_block() {
    let home = TempDir::new().unwrap();
    let locks = FileLockProvider::new(home.path());

    let _first = locks.acquire("team-a").unwrap();
    let _second = locks.acquire("team-b").unwrap();
}

#[test]
fn same_namespace_waits_for_release() {
    let home = TempDir::new().unwrap();
    let locks = FileLockProvider::new(home.path());
    let released = AtomicBool::new(false);

    let guard = locks.acquire("web-prod").unwrap();
    std::thread::scope(|scope| {
        let waiter = scope.spawn(|| {
            let _guard = locks.acquire("web-prod").unwrap();
            released.load(Ordering::SeqCst)
        });

        std::thread::sleep(Duration::from_millis(100));
        released.store(true, Ordering::SeqCst);
        drop(guard);

        assert!(waiter.join().unwrap(), "second holder got the lock early");
    });
}

#[test]
fn lock_is_reusable_after_release() {
    let home = TempDir::new().unwrap();
    let locks = FileLockProvider::new(home.path());

    drop(locks.acquire("web-prod").unwrap());
    drop(locks.acquire("web-prod").unwrap());
}
