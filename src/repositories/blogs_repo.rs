use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde_json::Value;
use tracing::instrument;
use validator::Validate;

use crate::{
    models::{
        blogs::{BlogDetail, BlogId},
        draft::DraftPayload,
        query::{encode_pairs, PageRequest, PageResult},
        response::{Ack, Envelope},
        upload::{UploadFile, UploadResult, BLOG_UPLOAD_FOLDER},
    },
    session::BearerToken,
    Error, Result,
};

use super::HttpBlogRepo;

pub const CREATE_PATH: &str = "/api/v1/blogs/create";
pub const EDIT_PATH: &str = "/api/v1/blogs/edit";
pub const DELETE_PATH: &str = "/api/v1/blogs/delete";
pub const LIST_PATH: &str = "/api/v1/blogs";
pub const LIST_BY_AUTHOR_PATH: &str = "/api/v1/blogs/get-by-author";
pub const DETAIL_PATH: &str = "/api/v1/blogs/get-detail";

/// Every call is a fresh round trip: no caching, retry or de-duplication.
#[async_trait]
pub trait BlogRepository: Send + Sync {
    async fn create(
        &self,
        draft: &DraftPayload<'_>,
        token: Option<&BearerToken>,
    ) -> Result<BlogDetail>;
    async fn edit(
        &self,
        id: &BlogId,
        draft: &DraftPayload<'_>,
        token: Option<&BearerToken>,
    ) -> Result<BlogDetail>;
    async fn delete(&self, id: &BlogId, token: Option<&BearerToken>) -> Result<Ack>;
    async fn list(&self, request: &PageRequest) -> Result<PageResult>;
    /// Listing scoped server-side to the token's owner. Fails with
    /// [`Error::Unauthorized`] before any request when no token is given.
    async fn list_by_author(
        &self,
        request: &PageRequest,
        token: Option<&BearerToken>,
    ) -> Result<PageResult>;
    async fn get_detail(&self, id: &BlogId) -> Result<BlogDetail>;
    async fn upload(&self, file: &UploadFile, token: Option<&BearerToken>) -> Result<UploadResult>;
}

#[async_trait]
impl BlogRepository for HttpBlogRepo {
    #[instrument(skip_all)]
    async fn create(
        &self,
        draft: &DraftPayload<'_>,
        token: Option<&BearerToken>,
    ) -> Result<BlogDetail> {
        let builder = self.client.post(self.config.endpoint(CREATE_PATH)).json(draft);
        let envelope: Envelope<BlogDetail> = self.send(Self::authorized(builder, token)).await?;
        let created = envelope.into_data()?;

        tracing::info!(id = %created.id, "blog created");
        Ok(created)
    }

    #[instrument(skip(self, id, draft, token), fields(id = %id))]
    async fn edit(
        &self,
        id: &BlogId,
        draft: &DraftPayload<'_>,
        token: Option<&BearerToken>,
    ) -> Result<BlogDetail> {
        let url = format!(
            "{}/{}",
            self.config.endpoint(EDIT_PATH),
            urlencoding::encode(id.as_str())
        );
        let builder = self.client.patch(url).json(draft);
        let envelope: Envelope<BlogDetail> = self.send(Self::authorized(builder, token)).await?;
        envelope.into_data()
    }

    #[instrument(skip(self, id, token), fields(id = %id))]
    async fn delete(&self, id: &BlogId, token: Option<&BearerToken>) -> Result<Ack> {
        let url = format!(
            "{}/{}",
            self.config.endpoint(DELETE_PATH),
            urlencoding::encode(id.as_str())
        );
        let builder = self.client.delete(url);
        let envelope: Envelope<Value> = self.send(Self::authorized(builder, token)).await?;
        let ack = envelope.into_ack()?;

        tracing::info!("blog deleted");
        Ok(ack)
    }

    #[instrument(skip(self))]
    async fn list(&self, request: &PageRequest) -> Result<PageResult> {
        request.validate()?;

        let url = format!("{}?{}", self.config.endpoint(LIST_PATH), request.to_query_string());
        tracing::debug!("GET {}", url);
        let envelope: Envelope<PageResult> = self.send(self.client.get(url)).await?;
        Ok(envelope.into_data()?.normalized())
    }

    #[instrument(skip(self, token))]
    async fn list_by_author(
        &self,
        request: &PageRequest,
        token: Option<&BearerToken>,
    ) -> Result<PageResult> {
        let token = token.ok_or(Error::Unauthorized)?;
        request.validate()?;

        let url = format!(
            "{}?{}",
            self.config.endpoint(LIST_BY_AUTHOR_PATH),
            request.to_query_string()
        );
        tracing::debug!("GET {}", url);
        let builder = Self::authorized(self.client.get(url), Some(token));
        let envelope: Envelope<PageResult> = self.send(builder).await?;
        Ok(envelope.into_data()?.normalized())
    }

    #[instrument(skip(self, id), fields(id = %id))]
    async fn get_detail(&self, id: &BlogId) -> Result<BlogDetail> {
        let url = format!(
            "{}?{}",
            self.config.endpoint(DETAIL_PATH),
            encode_pairs(&[("blogID", id.to_string())])
        );
        let envelope: Envelope<BlogDetail> = self.send(self.client.get(url)).await?;
        envelope.into_data()
    }

    #[instrument(skip(self, file, token), fields(file = %file.file_name))]
    async fn upload(&self, file: &UploadFile, token: Option<&BearerToken>) -> Result<UploadResult> {
        let content_type = file.content_type()?;
        let part = Part::bytes(file.bytes.clone())
            .file_name(file.file_name.clone())
            .mime_str(content_type)?;
        let form = Form::new()
            .part("files", part)
            .text("folder", BLOG_UPLOAD_FOLDER);

        let builder = self.client.post(self.config.upload_url()).multipart(form);
        let envelope: Envelope<UploadResult> = self.send(Self::authorized(builder, token)).await?;
        envelope.into_data()
    }
}
