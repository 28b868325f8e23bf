//! Concurrency tests for the dispatch pipeline.
//!
//! These run on a multi-threaded runtime so that effect tasks genuinely race
//! each other and external callers for the cycle lock.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;

use crate::{Action, ActionFilter, Effect, EffectRegistry, Reducer, ReducerError, Store};

#[derive(Debug, Clone, PartialEq, Default)]
struct Ledger {
    started: BTreeSet<u32>,
    finished: BTreeSet<u32>,
    hops: u32,
}

#[derive(Debug, Clone, PartialEq)]
enum LedgerAction {
    Start(u32),
    Finish(u32),
    Hop(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Kind {
    Start,
    Finish,
    Hop,
}

impl Action for LedgerAction {
    type Kind = Kind;
    type Family = ();

    fn kind(&self) -> Kind {
        match self {
            LedgerAction::Start(_) => Kind::Start,
            LedgerAction::Finish(_) => Kind::Finish,
            LedgerAction::Hop(_) => Kind::Hop,
        }
    }

    fn family(&self) {}
}

struct LedgerReducer;

impl Reducer for LedgerReducer {
    type State = Ledger;
    type Action = LedgerAction;

    fn reduce(&self, state: &Ledger, action: &LedgerAction) -> Result<Ledger, ReducerError> {
        let mut next = state.clone();
        match action {
            LedgerAction::Start(id) => {
                next.started.insert(*id);
            }
            LedgerAction::Finish(id) => {
                next.finished.insert(*id);
            }
            LedgerAction::Hop(_) => next.hops += 1,
        }
        Ok(next)
    }
}

/// Completes after a random short delay.
struct Jittered;

#[async_trait]
impl Effect<(), LedgerAction> for Jittered {
    async fn run(&self, _: (), action: LedgerAction) -> Result<Option<LedgerAction>> {
        tokio::time::sleep(Duration::from_millis(fastrand::u64(0..5))).await;
        match action {
            LedgerAction::Start(id) => Ok(Some(LedgerAction::Finish(id))),
            _ => Ok(None),
        }
    }
}

/// Re-dispatches `Hop(n - 1)` until it reaches zero.
struct Chain;

#[async_trait]
impl Effect<(), LedgerAction> for Chain {
    async fn run(&self, _: (), action: LedgerAction) -> Result<Option<LedgerAction>> {
        match action {
            LedgerAction::Hop(n) if n > 0 => Ok(Some(LedgerAction::Hop(n - 1))),
            _ => Ok(None),
        }
    }
}

fn store() -> Store<LedgerReducer> {
    let registry = EffectRegistry::builder()
        .with_effect("jitter", ActionFilter::Kind(Kind::Start), |_: &Ledger| Some(()), Jittered)
        .with_effect("chain", ActionFilter::Kind(Kind::Hop), |_: &Ledger| Some(()), Chain)
        .build();

    Store::builder(LedgerReducer, Ledger::default())
        .with_effects(registry)
        .build()
        .unwrap()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_callers_never_lose_updates() {
    let store = store();
    let callers = 8u32;
    let per_caller = 50u32;

    let mut handles = Vec::new();
    for caller in 0..callers {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            for i in 0..per_caller {
                store.dispatch(LedgerAction::Start(caller * per_caller + i)).unwrap();
                if fastrand::bool() {
                    tokio::task::yield_now().await;
                }
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    tokio::time::timeout(Duration::from_secs(10), store.settled())
        .await
        .expect("effects settle");

    let state = store.state();
    let total = (callers * per_caller) as usize;
    assert_eq!(state.started.len(), total);
    assert_eq!(state.finished.len(), total);
    assert_eq!(state.started, state.finished);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn long_follow_up_chains_settle() {
    let store = store();

    store.dispatch(LedgerAction::Hop(200)).unwrap();
    tokio::time::timeout(Duration::from_secs(10), store.settled())
        .await
        .expect("chain settles");

    assert_eq!(store.state().hops, 201);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn subscribers_never_observe_stale_states() {
    let store = store();
    let finished_seen = Arc::new(Mutex::new(Vec::new()));
    let regressions = Arc::new(AtomicUsize::new(0));

    let seen = Arc::clone(&finished_seen);
    let bad = Arc::clone(&regressions);
    let _sub = store.subscribe(move |state| {
        let mut seen = seen.lock().unwrap();
        let count = state.finished.len() + state.started.len();
        if let Some(previous) = seen.last() {
            if count < *previous {
                bad.fetch_add(1, Ordering::SeqCst);
            }
        }
        seen.push(count);
    });

    let mut handles = Vec::new();
    for caller in 0..4u32 {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            for i in 0..25 {
                store.dispatch(LedgerAction::Start(caller * 100 + i)).unwrap();
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }
    store.settled().await;

    assert_eq!(regressions.load(Ordering::SeqCst), 0);
    // one notification per Start and per Finish
    assert_eq!(finished_seen.lock().unwrap().len(), 200);
}
