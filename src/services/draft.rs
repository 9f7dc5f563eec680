use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use crate::{
    models::{
        blogs::{BlogDetail, BlogId},
        draft::{Draft, FieldErrors},
        notice::Notice,
        upload::UploadFile,
    },
    repositories::BlogRepository,
    services::listing::BlogListing,
    session::Session,
    Config, Error, Result,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftFlow {
    /// "Create blog" page for shop owners: image required, new posts land on page 1.
    PublicCreate,
    /// Shop and admin management modals: image optional, current page is reloaded.
    Managed,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DraftState {
    Empty,
    Editing,
    Invalid(FieldErrors),
    Submitting,
    Submitted(BlogDetail),
}

/// Raised for the lifetime of one request and lowered on drop, so a future
/// dropped mid-flight cannot leave the form marked busy.
struct InFlight(Arc<AtomicBool>);

impl InFlight {
    fn raise(flag: &Arc<AtomicBool>) -> Self {
        flag.store(true, Ordering::SeqCst);
        Self(flag.clone())
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

pub struct DraftForm {
    repo: Arc<dyn BlogRepository>,
    config: Arc<Config>,
    flow: DraftFlow,
    session: Session,
    draft: Draft,
    state: DraftState,
    uploading: Arc<AtomicBool>,
    submitting: Arc<AtomicBool>,
    notice: Option<Notice>,
}

impl DraftForm {
    pub fn new(
        repo: Arc<dyn BlogRepository>,
        config: Arc<Config>,
        flow: DraftFlow,
        session: Session,
    ) -> Self {
        Self {
            repo,
            config,
            flow,
            session,
            draft: Draft::default(),
            state: DraftState::Empty,
            uploading: Arc::default(),
            submitting: Arc::default(),
            notice: None,
        }
    }

    pub fn flow(&self) -> DraftFlow {
        self.flow
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    pub fn state(&self) -> DraftState {
        if self.submitting.load(Ordering::SeqCst) {
            return DraftState::Submitting;
        }
        self.state.clone()
    }

    pub fn is_uploading(&self) -> bool {
        self.uploading.load(Ordering::SeqCst)
    }

    /// Current banner, dropped once it outlives the configured TTL.
    pub fn notice(&mut self) -> Option<&Notice> {
        if self
            .notice
            .as_ref()
            .is_some_and(|notice| notice.is_expired(self.config.notice_ttl))
        {
            self.notice = None;
        }
        self.notice.as_ref()
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    /// Starts the edit flow from the post's detail.
    pub async fn open_existing(&mut self, id: &BlogId) -> Result<()> {
        match self.repo.get_detail(id).await {
            Ok(detail) => {
                self.hydrate(detail);
                Ok(())
            }
            Err(err) => {
                tracing::warn!(%id, "could not load blog for editing: {}", err);
                self.notice = Some(Notice::from_error(&err));
                Err(err)
            }
        }
    }

    pub fn hydrate(&mut self, detail: BlogDetail) {
        self.draft = Draft::from(detail);
        self.state = DraftState::Editing;
        self.notice = None;
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.draft.title = title.into();
        self.touch();
    }

    pub fn set_content(&mut self, content: impl Into<String>) {
        self.draft.content = content.into();
        self.touch();
    }

    pub fn set_image(&mut self, image: impl Into<String>) {
        self.draft.image = image.into();
        self.touch();
    }

    fn touch(&mut self) {
        self.state = DraftState::Editing;
    }

    pub fn validate(&self) -> std::result::Result<(), FieldErrors> {
        self.draft.check(self.flow == DraftFlow::PublicCreate)
    }

    /// Uploads an image and points the draft at it. On any failure the
    /// previous image URL is left as it was.
    pub async fn upload_image(&mut self, file: &UploadFile) -> Result<String> {
        let in_flight = InFlight::raise(&self.uploading);
        let result = self
            .repo
            .upload(file, self.session.token())
            .await
            .and_then(|uploaded| uploaded.first_path().map(|path| self.config.media_url(path)));
        drop(in_flight);

        match result {
            Ok(url) => {
                tracing::debug!(%url, "image attached to draft");
                self.draft.image = url.clone();
                self.touch();
                Ok(url)
            }
            Err(err) => {
                tracing::warn!(file = %file.file_name, "image upload failed: {}", err);
                self.notice = Some(Notice::from_error(&err));
                Err(err)
            }
        }
    }

    /// Validates, then creates or edits depending on whether the draft has an
    /// id. On success the owning listing is reloaded; on failure the draft is
    /// kept intact.
    pub async fn submit(&mut self, listing: Option<&BlogListing>) -> Result<BlogDetail> {
        if let Err(errors) = self.validate() {
            self.state = DraftState::Invalid(errors.clone());
            return Err(Error::Validation(errors));
        }

        let in_flight = InFlight::raise(&self.submitting);
        let payload = self.draft.payload();
        let token = self.session.token();
        let result = match &self.draft.id {
            Some(id) => self.repo.edit(id, &payload, token).await,
            None => self.repo.create(&payload, token).await,
        };
        drop(in_flight);

        let saved = match result {
            Ok(saved) => saved,
            Err(err) => {
                tracing::warn!("blog submit failed: {}", err);
                self.state = DraftState::Editing;
                self.notice = Some(Notice::from_error(&err));
                return Err(err);
            }
        };

        self.draft = Draft::default();
        self.state = DraftState::Submitted(saved.clone());
        self.notice = None;

        if let Some(listing) = listing {
            let reload = match self.flow {
                DraftFlow::PublicCreate => listing.load(1).await,
                DraftFlow::Managed => listing.refresh().await,
            };
            if let Err(err) = reload {
                tracing::warn!("listing reload after submit failed: {}", err);
            }
        }

        Ok(saved)
    }

    /// Discards the draft, e.g. when the modal is closed. Any request still
    /// pending is abandoned along with it.
    pub fn close(&mut self) {
        self.draft = Draft::default();
        self.state = DraftState::Empty;
        self.uploading.store(false, Ordering::SeqCst);
        self.submitting.store(false, Ordering::SeqCst);
        self.notice = None;
    }
}
