//! Debounced list-query session.
//!
//! A [`SearchSession`] owns the query text, pagination, loading and error
//! state of one searchable list. Keystrokes schedule a search after a quiet
//! period; every issued request carries a sequence number and only the
//! latest one may update the state, so a slow response can never overwrite
//! a newer one.
//!
//! Scheduling uses `tokio::spawn`, so the session must live inside a Tokio
//! runtime.

use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::oneshot;

use crate::backend::{BackendError, BackendResult, ListRequest, ResourceGateway, list_resources};
use crate::domain::resource::Resource;
use crate::domain::types::SearchTerm;
use crate::notify::Notifier;
use crate::pagination::{DEFAULT_ITEMS_PER_PAGE, ListPage, PaginationDescriptor, sanitize_limit};
use crate::session::AuthErrorFlow;

pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(500);

/// Anything that can answer `(query, page, limit) → page of results`.
#[async_trait]
pub trait SearchSource: Send + Sync + 'static {
    type Item: Clone + Send + Sync + 'static;

    async fn search(
        &self,
        token: &str,
        query: &SearchTerm,
        page: u32,
        limit: u32,
    ) -> BackendResult<ListPage<Self::Item>>;
}

/// Searches one resource endpoint through a gateway.
pub struct ResourceSearch<E, G> {
    gateway: Arc<G>,
    _resource: PhantomData<fn() -> E>,
}

impl<E, G> ResourceSearch<E, G> {
    pub fn new(gateway: Arc<G>) -> Self {
        Self {
            gateway,
            _resource: PhantomData,
        }
    }
}

#[async_trait]
impl<E, G> SearchSource for ResourceSearch<E, G>
where
    E: Resource,
    G: ResourceGateway + 'static,
{
    type Item = E;

    async fn search(
        &self,
        token: &str,
        query: &SearchTerm,
        page: u32,
        limit: u32,
    ) -> BackendResult<ListPage<E>> {
        let request = ListRequest::new(page, limit).search(query.clone());
        list_resources::<E, G>(&self.gateway, token, &request).await
    }
}

pub type TransformResponse<T> = Arc<dyn Fn(ListPage<T>) -> ListPage<T> + Send + Sync>;

pub struct SearchOptions<T> {
    pub initial_query: String,
    pub items_per_page: u32,
    pub debounce: Duration,
    pub transform_response: Option<TransformResponse<T>>,
}

impl<T> Default for SearchOptions<T> {
    fn default() -> Self {
        Self {
            initial_query: String::new(),
            items_per_page: DEFAULT_ITEMS_PER_PAGE,
            debounce: SEARCH_DEBOUNCE,
            transform_response: None,
        }
    }
}

/// Snapshot of a session.
#[derive(Clone, Debug, PartialEq)]
pub struct SearchState<T> {
    pub search_query: String,
    pub search_results: Vec<T>,
    pub pagination: PaginationDescriptor,
    pub loading: bool,
    pub error: Option<String>,
}

impl<T> SearchState<T> {
    fn new(query: String, items_per_page: u32) -> Self {
        Self {
            search_query: query,
            search_results: Vec::new(),
            pagination: PaginationDescriptor::first_page(items_per_page),
            loading: false,
            error: None,
        }
    }

    fn reset_results(&mut self) {
        self.search_results.clear();
        self.pagination = PaginationDescriptor::first_page(self.pagination.items_per_page);
        self.loading = false;
        self.error = None;
    }
}

struct Inner<S: SearchSource> {
    source: S,
    auth: AuthErrorFlow,
    notifier: Arc<dyn Notifier>,
    transform_response: Option<TransformResponse<S::Item>>,
    state: Mutex<SearchState<S::Item>>,
    latest_request: AtomicU64,
}

impl<S: SearchSource> Inner<S> {
    fn state(&self) -> MutexGuard<'_, SearchState<S::Item>> {
        // A poisoned lock only means a panic elsewhere; the state is still usable.
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Invalidates every request issued so far.
    fn next_request(&self) -> u64 {
        self.latest_request.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_latest(&self, request: u64) -> bool {
        self.latest_request.load(Ordering::SeqCst) == request
    }

    async fn perform(&self, page: u32, limit: u32) {
        let query = self.state().search_query.clone();
        let Some(term) = SearchTerm::parse(&query) else {
            self.next_request();
            self.state().reset_results();
            return;
        };

        let request = self.next_request();
        {
            let mut state = self.state();
            state.loading = true;
            state.error = None;
        }

        let result = match self.auth.token() {
            Some(token) => self.source.search(&token, &term, page, limit).await,
            None => Err(BackendError::MissingToken),
        };

        if !self.is_latest(request) {
            log::debug!("Discarding stale search response for `{term}` (request {request})");
            return;
        }

        match result {
            Ok(page) => {
                let page = match &self.transform_response {
                    Some(transform) => transform(page),
                    None => page,
                };
                let mut state = self.state();
                state.search_results = page.data;
                state.pagination = page.pagination;
                state.loading = false;
            }
            Err(err) if err.is_auth() => {
                self.state().loading = false;
                self.auth.trigger();
            }
            Err(err) => {
                log::error!("Search for `{term}` failed: {err}");
                let message = err.user_message();
                {
                    let mut state = self.state();
                    state.loading = false;
                    state.error = Some(message.clone());
                }
                self.notifier.error(&message);
            }
        }
    }
}

pub struct SearchSession<S: SearchSource> {
    inner: Arc<Inner<S>>,
    debounce: Duration,
    /// Dropping the sender cancels the debounce timer. A request that already
    /// left runs to completion and is discarded by its sequence number.
    pending: Mutex<Option<oneshot::Sender<()>>>,
}

impl<S: SearchSource> SearchSession<S> {
    pub fn new(
        source: S,
        auth: AuthErrorFlow,
        notifier: Arc<dyn Notifier>,
        options: SearchOptions<S::Item>,
    ) -> Self {
        let items_per_page = sanitize_limit(Some(options.items_per_page));
        Self {
            inner: Arc::new(Inner {
                source,
                auth,
                notifier,
                transform_response: options.transform_response,
                state: Mutex::new(SearchState::new(options.initial_query, items_per_page)),
                latest_request: AtomicU64::new(0),
            }),
            debounce: options.debounce,
            pending: Mutex::new(None),
        }
    }

    pub fn state(&self) -> SearchState<S::Item> {
        self.inner.state().clone()
    }

    fn cancel_pending(&self) {
        let mut pending = self
            .pending
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        drop(pending.take());
    }

    fn has_active_query(&self) -> bool {
        SearchTerm::parse(&self.inner.state().search_query).is_some()
    }

    /// Updates the query right away and schedules a search for page 1 once
    /// input has been quiet for the debounce window.
    pub fn handle_search_change(&self, text: &str) {
        self.cancel_pending();
        // Responses to earlier text no longer match what the user sees.
        self.inner.next_request();
        self.inner.state().search_query = text.to_string();

        if SearchTerm::parse(text).is_none() {
            self.inner.state().reset_results();
            return;
        }

        let (cancel, cancelled) = oneshot::channel::<()>();
        let inner = Arc::clone(&self.inner);
        let debounce = self.debounce;
        tokio::spawn(async move {
            tokio::select! {
                _ = tokio::time::sleep(debounce) => {}
                _ = cancelled => return,
            }
            let limit = inner.state().pagination.items_per_page;
            inner.perform(1, limit).await;
        });

        *self
            .pending
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(cancel);
    }

    /// Runs the current query immediately.
    pub async fn perform_search(&self, page: u32, limit: u32) {
        self.inner.perform(page.max(1), sanitize_limit(Some(limit))).await;
    }

    pub async fn handle_page_change(&self, page: u32) {
        if !self.has_active_query() || page < 1 {
            return;
        }
        let limit = self.inner.state().pagination.items_per_page;
        self.inner.perform(page, limit).await;
    }

    /// Changing the page size always goes back to page 1.
    pub async fn handle_limit_change(&self, limit: u32) {
        let limit = sanitize_limit(Some(limit));
        {
            let mut state = self.inner.state();
            state.pagination.items_per_page = limit;
            state.pagination.current_page = 1;
        }
        if self.has_active_query() {
            self.inner.perform(1, limit).await;
        }
    }

    pub fn clear_search(&self) {
        self.cancel_pending();
        self.inner.next_request();
        let mut state = self.inner.state();
        state.search_query.clear();
        state.reset_results();
    }
}

impl<S: SearchSource> Drop for SearchSession<S> {
    fn drop(&mut self) {
        self.cancel_pending();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::MockNotifier;
    use crate::session::{MemorySessionStore, Navigator, SessionStore};

    #[derive(Clone, Copy)]
    enum Mode {
        Ok,
        Forbidden,
        Fail,
    }

    type Calls = Arc<Mutex<Vec<(String, u32, u32)>>>;

    struct FakeSource {
        calls: Calls,
        completed: Calls,
        mode: Mode,
    }

    #[async_trait]
    impl SearchSource for FakeSource {
        type Item = String;

        async fn search(
            &self,
            _token: &str,
            query: &SearchTerm,
            page: u32,
            limit: u32,
        ) -> BackendResult<ListPage<String>> {
            self.calls
                .lock()
                .unwrap()
                .push((query.as_str().to_string(), page, limit));

            // Page 1 of "slow" takes long enough to be overtaken.
            let delay = if query.as_str() == "slow" && page == 1 { 1000 } else { 10 };
            tokio::time::sleep(Duration::from_millis(delay)).await;
            self.completed
                .lock()
                .unwrap()
                .push((query.as_str().to_string(), page, limit));

            match self.mode {
                Mode::Ok => Ok(ListPage {
                    data: vec![format!("{query}-{page}-A"), format!("{query}-{page}-B")],
                    pagination: PaginationDescriptor {
                        current_page: page,
                        total_pages: 3,
                        total_items: 25,
                        items_per_page: limit,
                    },
                }),
                Mode::Forbidden => Err(BackendError::Unauthorized { status: 403 }),
                Mode::Fail => Err(BackendError::Status {
                    status: 500,
                    message: "database offline".into(),
                }),
            }
        }
    }

    #[derive(Default)]
    struct RecordingNavigator(Mutex<Vec<String>>);

    impl Navigator for RecordingNavigator {
        fn navigate(&self, route: &str) {
            self.0.lock().unwrap().push(route.to_string());
        }
    }

    struct Harness {
        session: SearchSession<FakeSource>,
        calls: Calls,
        completed: Calls,
        store: Arc<MemorySessionStore>,
        navigator: Arc<RecordingNavigator>,
    }

    fn harness_with(
        mode: Mode,
        flow_notifier: MockNotifier,
        notifier: MockNotifier,
        options: SearchOptions<String>,
    ) -> Harness {
        let calls: Calls = Arc::default();
        let completed: Calls = Arc::default();
        let store = Arc::new(MemorySessionStore::with_token("token"));
        let navigator = Arc::new(RecordingNavigator::default());
        let flow = AuthErrorFlow::new(store.clone(), navigator.clone(), Arc::new(flow_notifier));
        let session = SearchSession::new(
            FakeSource {
                calls: calls.clone(),
                completed: completed.clone(),
                mode,
            },
            flow,
            Arc::new(notifier),
            options,
        );
        Harness {
            session,
            calls,
            completed,
            store,
            navigator,
        }
    }

    fn harness(mode: Mode, flow_notifier: MockNotifier, notifier: MockNotifier) -> Harness {
        harness_with(mode, flow_notifier, notifier, SearchOptions::default())
    }

    fn quiet() -> Harness {
        harness(Mode::Ok, MockNotifier::new(), MockNotifier::new())
    }

    #[tokio::test(start_paused = true)]
    async fn rapid_typing_issues_a_single_request() {
        let h = quiet();
        for text in ["a", "ac", "acm", "acme"] {
            h.session.handle_search_change(text);
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        assert_eq!(h.session.state().search_query, "acme");
        assert!(h.calls.lock().unwrap().is_empty());

        tokio::time::sleep(Duration::from_millis(600)).await;

        assert_eq!(
            *h.calls.lock().unwrap(),
            vec![("acme".to_string(), 1, DEFAULT_ITEMS_PER_PAGE)]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn debounced_search_populates_results() {
        let h = quiet();
        h.session.handle_search_change("acme");
        tokio::time::sleep(Duration::from_millis(600)).await;

        let state = h.session.state();
        assert_eq!(state.search_results, vec!["acme-1-A", "acme-1-B"]);
        assert_eq!(
            state.pagination,
            PaginationDescriptor {
                current_page: 1,
                total_pages: 3,
                total_items: 25,
                items_per_page: 10,
            }
        );
        assert!(!state.loading);
        assert_eq!(state.error, None);
    }

    #[tokio::test(start_paused = true)]
    async fn blank_input_clears_without_a_request() {
        let h = quiet();
        h.session.handle_search_change("acme");
        tokio::time::sleep(Duration::from_millis(600)).await;
        h.session.handle_page_change(2).await;
        assert_eq!(h.session.state().pagination.current_page, 2);

        h.session.handle_search_change("   ");
        tokio::time::sleep(Duration::from_millis(600)).await;

        let state = h.session.state();
        assert!(state.search_results.is_empty());
        assert_eq!(state.pagination.current_page, 1);
        assert_eq!(h.calls.lock().unwrap().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn page_change_without_query_is_ignored() {
        let h = quiet();
        h.session.handle_page_change(3).await;
        assert!(h.calls.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn limit_change_resets_to_first_page() {
        let h = quiet();
        h.session.handle_search_change("acme");
        tokio::time::sleep(Duration::from_millis(600)).await;
        h.session.handle_page_change(3).await;

        h.session.handle_limit_change(25).await;

        let state = h.session.state();
        assert_eq!(state.pagination.current_page, 1);
        assert_eq!(state.pagination.items_per_page, 25);
        assert_eq!(
            h.calls.lock().unwrap().last(),
            Some(&("acme".to_string(), 1, 25))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn forbidden_runs_the_session_expired_flow() {
        let mut flow_notifier = MockNotifier::new();
        flow_notifier
            .expect_error()
            .withf(|message| message == crate::session::SESSION_EXPIRED_MESSAGE)
            .times(1)
            .return_const(());
        let h = harness(Mode::Forbidden, flow_notifier, MockNotifier::new());

        h.session.handle_search_change("acme");
        h.session.perform_search(1, 10).await;

        let state = h.session.state();
        assert_eq!(state.error, None);
        assert!(!state.loading);
        assert_eq!(h.store.token(), None);
        assert_eq!(*h.navigator.0.lock().unwrap(), vec!["/login".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn missing_token_never_reaches_the_backend() {
        let mut flow_notifier = MockNotifier::new();
        flow_notifier.expect_error().times(1).return_const(());
        let h = harness(Mode::Ok, flow_notifier, MockNotifier::new());
        h.store.clear();

        h.session.handle_search_change("acme");
        h.session.perform_search(1, 10).await;

        assert!(h.calls.lock().unwrap().is_empty());
        assert_eq!(*h.navigator.0.lock().unwrap(), vec!["/login".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn other_failures_set_error_and_toast() {
        let mut notifier = MockNotifier::new();
        notifier
            .expect_error()
            .withf(|message| message == "database offline")
            .times(1)
            .return_const(());
        let h = harness(Mode::Fail, MockNotifier::new(), notifier);

        h.session.handle_search_change("acme");
        h.session.perform_search(1, 10).await;

        let state = h.session.state();
        assert_eq!(state.error.as_deref(), Some("database offline"));
        assert!(!state.loading);
        assert!(h.navigator.0.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn stale_responses_are_discarded() {
        let h = quiet();
        h.session.handle_search_change("slow");
        // Debounced page-1 request is now in flight for a full second.
        tokio::time::sleep(Duration::from_millis(600)).await;
        assert!(h.session.state().loading);

        h.session.handle_page_change(2).await;
        tokio::time::sleep(Duration::from_millis(2000)).await;

        let state = h.session.state();
        assert_eq!(state.search_results, vec!["slow-2-A", "slow-2-B"]);
        assert_eq!(state.pagination.current_page, 2);
        assert_eq!(h.calls.lock().unwrap().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn clear_search_cancels_pending_work() {
        let h = quiet();
        h.session.handle_search_change("acme");
        h.session.clear_search();
        tokio::time::sleep(Duration::from_millis(600)).await;

        assert!(h.calls.lock().unwrap().is_empty());
        assert_eq!(h.session.state().search_query, "");
    }

    #[tokio::test(start_paused = true)]
    async fn superseding_input_lets_the_request_in_flight_finish() {
        let h = quiet();
        h.session.handle_search_change("slow");
        // The "slow" request left at 500 ms and answers at 1500 ms.
        tokio::time::sleep(Duration::from_millis(600)).await;
        assert!(h.session.state().loading);

        h.session.handle_search_change("slower");
        tokio::time::sleep(Duration::from_millis(3000)).await;

        let completed: Vec<_> = h
            .completed
            .lock()
            .unwrap()
            .iter()
            .map(|(query, _, _)| query.clone())
            .collect();
        assert_eq!(completed, vec!["slower".to_string(), "slow".to_string()]);

        let state = h.session.state();
        assert_eq!(state.search_query, "slower");
        assert_eq!(state.search_results, vec!["slower-1-A", "slower-1-B"]);
        assert!(!state.loading);
    }

    #[tokio::test(start_paused = true)]
    async fn late_response_for_previous_text_is_ignored() {
        let h = quiet();
        h.session.handle_search_change("slow");
        tokio::time::sleep(Duration::from_millis(1400)).await;

        // New text while "slow" is still in flight; its timer fires at 1900 ms.
        h.session.handle_search_change("slowest");
        tokio::time::sleep(Duration::from_millis(200)).await;

        let state = h.session.state();
        assert_eq!(state.search_query, "slowest");
        assert!(state.search_results.is_empty());
        assert_eq!(h.completed.lock().unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn transform_response_shapes_the_stored_page() {
        let options = SearchOptions {
            initial_query: "acme".to_string(),
            transform_response: Some(Arc::new(|mut page: ListPage<String>| {
                page.data.retain(|item| item.ends_with("-A"));
                page.data.iter_mut().for_each(|item| *item = item.to_uppercase());
                page.pagination.total_items = 1;
                page
            })),
            ..SearchOptions::default()
        };
        let h = harness_with(Mode::Ok, MockNotifier::new(), MockNotifier::new(), options);

        h.session.perform_search(1, 10).await;

        let state = h.session.state();
        assert_eq!(state.search_results, vec!["ACME-1-A"]);
        assert_eq!(state.pagination.total_items, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn initial_query_seeds_the_session_without_searching() {
        let options = SearchOptions {
            initial_query: "acme".to_string(),
            items_per_page: 25,
            ..SearchOptions::default()
        };
        let h = harness_with(Mode::Ok, MockNotifier::new(), MockNotifier::new(), options);
        tokio::time::sleep(Duration::from_millis(600)).await;

        let state = h.session.state();
        assert_eq!(state.search_query, "acme");
        assert_eq!(state.pagination.items_per_page, 25);
        assert!(h.calls.lock().unwrap().is_empty());

        h.session.handle_page_change(2).await;
        assert_eq!(
            *h.calls.lock().unwrap(),
            vec![("acme".to_string(), 2, 25)]
        );
    }
}
