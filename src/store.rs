use crate::matchers::IncomingBody;
use crate::{Expectation, MalformedBodyError, Request};
use log::debug;
use std::sync::{Arc, PoisonError, RwLock};

/// The result of looking up an incoming [`Request`] in a [`Store`].
#[derive(Debug)]
pub enum MatchOutcome {
    /// The earliest-registered expectation satisfied by the request.
    Matched(Arc<Expectation>),
    /// Nothing registered for this call. Not a fault.
    NoMatch,
    /// A body comparison was required but the request body is not valid JSON.
    MalformedBody(MalformedBodyError),
}

/// The ordered collection of registered [`Expectation`]s.
///
/// Expectations are scanned in registration order and the first one that matches wins.
/// The collection grows only through [`Store::register`]: nothing is ever removed,
/// deduplicated or mutated in place.
///
/// `Store` is cheap to clone: all clones share the same collection.
///
/// ## Concurrency
///
/// The sequence is guarded by a reader/writer lock, the only synchronisation point
/// of the expectation engine:
/// - [`Store::find_match`] holds the read lock for the duration of its scan, hence any number
///   of lookups can run in parallel;
/// - [`Store::register`] holds the write lock for the duration of the append.
///
/// Neither ever holds the lock across I/O. A registration is visible to every lookup that
/// starts after `register` has returned.
#[derive(Clone, Default)]
pub struct Store {
    expectations: Arc<RwLock<Vec<Arc<Expectation>>>>,
}

impl Store {
    /// Create a new, empty, instance of `Store`.
    pub fn new() -> Store {
        Store::default()
    }

    /// Append `expectation` to the end of the collection.
    pub fn register(&self, expectation: Expectation) {
        debug!("Registering expectation: {}", expectation);
        self.expectations
            .write()
            // A panic can't leave an append-only vector half-written.
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::new(expectation));
    }

    /// Return the first expectation, in registration order, satisfied by `request`.
    ///
    /// The scan stops at the first match. It also stops, with [`MatchOutcome::MalformedBody`],
    /// the first time a candidate with a matching method constrains the body and the
    /// request body cannot be parsed as JSON.
    pub fn find_match(&self, request: &Request) -> MatchOutcome {
        let body = IncomingBody::new(&request.body);
        let expectations = self
            .expectations
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        for expectation in expectations.iter() {
            match expectation.matches_with_body(request, &body) {
                Ok(true) => return MatchOutcome::Matched(Arc::clone(expectation)),
                Ok(false) => {}
                Err(e) => return MatchOutcome::MalformedBody(e),
            }
        }
        MatchOutcome::NoMatch
    }

    /// The number of registered expectations.
    pub fn len(&self) -> usize {
        self.expectations
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("expectations", &self.len())
            .finish()
    }
}
