//! Logout racing validation across threads.
//!
//! A validation either sees the token as fully revoked or not revoked at
//! all; once any revoke call returns, every later validation sees it.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::time::Duration;
use task_auth_service::errors::AuthError;
use task_auth_service::revocation::{InMemoryRevocationStore, RevocationStore};
use task_auth_service::token::TokenValidator;
use task_auth_test_utils::{test_signing_key, TestTokenBuilder};

const NOW: i64 = 1_700_000_000;
const THREADS: usize = 8;

fn setup() -> (Arc<InMemoryRevocationStore>, TokenValidator) {
    let store = Arc::new(InMemoryRevocationStore::new(Duration::from_secs(3600)));
    let validator = TokenValidator::new(Arc::new(test_signing_key()), store.clone());
    (store, validator)
}

fn token_for(user: &str) -> String {
    TestTokenBuilder::new()
        .for_user(user)
        .issued_at(NOW)
        .expires_at(NOW + 600)
        .sign(&test_signing_key())
}

/// Many threads revoke the same token at once: all succeed, one entry.
#[test]
fn test_concurrent_revoke_same_token_is_idempotent() {
    let (store, _) = setup();
    let token = token_for("alice");
    let barrier = Barrier::new(THREADS);

    std::thread::scope(|s| {
        for _ in 0..THREADS {
            s.spawn(|| {
                barrier.wait();
                store.revoke(&token, NOW + 600, NOW).unwrap();
            });
        }
    });

    assert!(store.is_revoked(&token, NOW + 1));
    assert_eq!(store.outstanding(), 1);
}

#[test]
fn test_concurrent_revoke_distinct_tokens() {
    let (store, _) = setup();
    let tokens: Vec<String> = (0..THREADS).map(|i| token_for(&format!("user-{i}"))).collect();
    let barrier = Barrier::new(THREADS);

    std::thread::scope(|s| {
        for token in &tokens {
            let barrier = &barrier;
            let store = &store;
            s.spawn(move || {
                barrier.wait();
                store.revoke(token, NOW + 600, NOW).unwrap();
            });
        }
    });

    for token in &tokens {
        assert!(store.is_revoked(token, NOW + 1));
    }
    assert_eq!(store.outstanding(), THREADS as u64);
}

/// Readers spin on validation while one writer revokes. Once the writer
/// has returned, no reader may observe the token as valid.
#[test]
fn test_validation_never_sees_token_valid_after_revoke() {
    let (store, validator) = setup();
    let token = token_for("alice");
    let barrier = Barrier::new(THREADS + 1);
    let revoked = AtomicBool::new(false);
    let stale_reads = AtomicUsize::new(0);

    std::thread::scope(|s| {
        for _ in 0..THREADS {
            s.spawn(|| {
                barrier.wait();
                for _ in 0..200 {
                    let after_revoke = revoked.load(Ordering::SeqCst);
                    match validator.validate(&token, "alice", NOW + 1) {
                        Ok(_) if after_revoke => {
                            stale_reads.fetch_add(1, Ordering::SeqCst);
                        }
                        Ok(_) | Err(AuthError::Revoked) => {}
                        Err(other) => panic!("unexpected validation error: {other:?}"),
                    }
                }
            });
        }

        s.spawn(|| {
            barrier.wait();
            store.revoke(&token, NOW + 600, NOW).unwrap();
            revoked.store(true, Ordering::SeqCst);
        });
    });

    assert_eq!(stale_reads.load(Ordering::SeqCst), 0);
    assert_eq!(
        validator.validate(&token, "alice", NOW + 1),
        Err(AuthError::Revoked)
    );
}
