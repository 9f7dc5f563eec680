use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc, Mutex, MutexGuard, PoisonError,
};

use crate::{
    models::{
        blogs::{self, BlogId, BlogSummary},
        notice::Notice,
        query::{PageRequest, PageResult},
        response::Ack,
    },
    repositories::BlogRepository,
    session::Session,
    Config, Error, Result,
};

/// Which list endpoint a view pages through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingScope {
    /// Anonymous listing (public blog page, admin moderation).
    Public,
    /// Posts owned by the session's token (shop owner, "my posts").
    Author,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Applied,
    /// A newer load was issued while this one was in flight; its result was dropped.
    Superseded,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListingSnapshot {
    pub current_page: u32,
    pub page_size: u32,
    pub total_pages: u32,
    pub total_count: u64,
    pub items: Vec<BlogSummary>,
    pub is_loading: bool,
    pub search: Option<String>,
    pub filter: Option<String>,
}

#[derive(Debug)]
struct ListingState {
    view: ListingSnapshot,
    notice: Option<Notice>,
}

impl ListingState {
    fn request(&self, page: u32) -> PageRequest {
        PageRequest {
            page_number: page,
            page_size: self.view.page_size,
            search: self.view.search.clone(),
            filter: self.view.filter.clone(),
        }
    }

    fn apply(&mut self, page: u32, result: PageResult) {
        let result = result.normalized();
        self.view.items = result.items;
        self.view.total_pages = result.total_pages;
        self.view.total_count = result.total_count;
        self.view.current_page = page;
        self.notice = None;
    }

    fn reset(&mut self, err: &Error) {
        let empty = PageResult::empty();
        self.view.items = empty.items;
        self.view.total_pages = empty.total_pages;
        self.view.total_count = empty.total_count;
        self.view.current_page = 1;
        self.notice = Some(Notice::from_error(err));
    }
}

/// Page bookkeeping for one listing view. Every page transition goes through
/// [`BlogListing::load`]; only the most recently issued load is applied.
pub struct BlogListing {
    repo: Arc<dyn BlogRepository>,
    scope: ListingScope,
    session: Session,
    state: Mutex<ListingState>,
    issued: AtomicU64,
}

impl BlogListing {
    pub fn new(repo: Arc<dyn BlogRepository>, scope: ListingScope, page_size: u32) -> Self {
        Self {
            repo,
            scope,
            session: Session::anonymous(),
            state: Mutex::new(ListingState {
                view: ListingSnapshot {
                    current_page: 1,
                    page_size: page_size.max(1),
                    total_pages: 1,
                    total_count: 0,
                    items: Vec::new(),
                    is_loading: false,
                    search: None,
                    filter: None,
                },
                notice: None,
            }),
            issued: AtomicU64::new(0),
        }
    }

    /// Listing sized by the configured `page_size`.
    pub fn from_config(repo: Arc<dyn BlogRepository>, scope: ListingScope, config: &Config) -> Self {
        Self::new(repo, scope, config.page_size)
    }

    /// Credential used for author-scoped listing and for deletes.
    pub fn with_session(mut self, session: Session) -> Self {
        self.session = session;
        self
    }

    pub fn scope(&self) -> ListingScope {
        self.scope
    }

    fn state(&self) -> MutexGuard<'_, ListingState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub async fn load(&self, page: u32) -> Result<LoadOutcome> {
        if page < 1 {
            return Err(Error::InvalidPage(page));
        }

        let seq = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        let request = {
            let mut state = self.state();
            state.view.is_loading = true;
            state.request(page)
        };

        let result = match self.scope {
            ListingScope::Public => self.repo.list(&request).await,
            ListingScope::Author => {
                self.repo
                    .list_by_author(&request, self.session.token())
                    .await
            }
        };

        let mut state = self.state();
        if seq != self.issued.load(Ordering::SeqCst) {
            tracing::debug!(page, seq, "dropping superseded page load");
            return Ok(LoadOutcome::Superseded);
        }

        state.view.is_loading = false;
        match result {
            Ok(result) => {
                tracing::debug!(page, items = result.items.len(), "page loaded");
                state.apply(page, result);
                Ok(LoadOutcome::Applied)
            }
            Err(err) => {
                tracing::warn!(page, "page load failed: {}", err);
                state.reset(&err);
                Err(err)
            }
        }
    }

    /// Returns `Ok(None)` without touching the network when `page` is the
    /// current page or outside `1..=total_pages`.
    ///
    /// A failed load resets the listing to page 1, so `go_to_page(1)` is a
    /// no-op afterwards. Retry with [`BlogListing::refresh`].
    pub async fn go_to_page(&self, page: u32) -> Result<Option<LoadOutcome>> {
        let (current, total) = {
            let state = self.state();
            (state.view.current_page, state.view.total_pages)
        };

        if page == current || page < 1 || page > total {
            return Ok(None);
        }

        self.load(page).await.map(Some)
    }

    pub async fn refresh(&self) -> Result<LoadOutcome> {
        let page = self.state().view.current_page;
        self.load(page).await
    }

    pub async fn set_search(&self, term: &str) -> Result<LoadOutcome> {
        {
            let mut state = self.state();
            state.view.search = non_blank(term);
            state.view.current_page = 1;
        }
        self.load(1).await
    }

    pub async fn set_filter(&self, filter: &str) -> Result<LoadOutcome> {
        {
            let mut state = self.state();
            state.view.filter = non_blank(filter);
            state.view.current_page = 1;
        }
        self.load(1).await
    }

    /// Deletes a post with the listing's session token, then reloads the
    /// current page. The server recalculates `totalPages`.
    pub async fn delete(&self, id: &BlogId) -> Result<Ack> {
        let ack = match self.repo.delete(id, self.session.token()).await {
            Ok(ack) => ack,
            Err(err) => {
                tracing::warn!(%id, "delete failed: {}", err);
                self.state().notice = Some(Notice::from_error(&err));
                return Err(err);
            }
        };

        // A failed reload already left its own notice behind.
        let _ = self.refresh().await;
        Ok(ack)
    }

    pub fn snapshot(&self) -> ListingSnapshot {
        self.state().view.clone()
    }

    /// Most-liked post of the unfiltered first page.
    pub fn featured(&self) -> Option<BlogSummary> {
        let state = self.state();
        let view = &state.view;
        if view.current_page != 1 || view.search.is_some() || view.filter.is_some() {
            return None;
        }
        blogs::featured(&view.items).cloned()
    }

    pub fn notice(&self) -> Option<Notice> {
        self.state().notice.clone()
    }

    pub fn dismiss_notice(&self) {
        self.state().notice = None;
    }
}

fn non_blank(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}
