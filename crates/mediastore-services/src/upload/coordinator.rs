use std::sync::Arc;
use std::time::Duration;

use mediastore_core::ids::{new_file_id, validate_identifier};
use mediastore_core::{
    AppError, Config, FileRecord, FinalizeOverrides, InitUpload, StagingRecord, UploadState,
};
use mediastore_db::{StagingKey, StagingStore};
use mediastore_storage::{object_key, ByteStream, Storage, StorageError};

use super::pipeline::{PipelineRun, UploadStep, APPLY_STEPS, SINGLE_UPLOAD_STEPS};
use crate::context::RequestContext;
use crate::file_index::{FileIndex, FinalizeOutcome};
use crate::namespace::NamespaceRegistry;

/// Lifetimes applied by the coordinator.
#[derive(Debug, Clone, Copy)]
pub struct UploadSettings {
    pub staging_ttl: Duration,
    pub signed_url_ttl: Duration,
}

impl UploadSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            staging_ttl: config.staging_ttl(),
            signed_url_ttl: config.signed_url_ttl(),
        }
    }
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            staging_ttl: Duration::from_secs(mediastore_core::constants::STAGING_TTL_SECS),
            signed_url_ttl: Duration::from_secs(mediastore_core::constants::SIGNED_URL_TTL_SECS),
        }
    }
}

/// Time-limited read URL for a stored object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedUrl {
    pub url: String,
    pub expires_in: Duration,
}

/// Drives the reserve → transfer → finalize protocol across the namespace registry,
/// the staging store, the object store and the file index.
#[derive(Clone)]
pub struct UploadCoordinator {
    namespaces: NamespaceRegistry,
    staging: Arc<dyn StagingStore>,
    files: FileIndex,
    storage: Arc<dyn Storage>,
    settings: UploadSettings,
}

impl UploadCoordinator {
    pub fn new(
        namespaces: NamespaceRegistry,
        staging: Arc<dyn StagingStore>,
        files: FileIndex,
        storage: Arc<dyn Storage>,
        settings: UploadSettings,
    ) -> Self {
        Self {
            namespaces,
            staging,
            files,
            storage,
            settings,
        }
    }

    pub fn namespaces(&self) -> &NamespaceRegistry {
        &self.namespaces
    }

    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }

    pub fn settings(&self) -> UploadSettings {
        self.settings
    }

    /// Reserve a fid for an upload into the requested collection.
    ///
    /// The returned staging record lives for the configured staging TTL. A fid that is
    /// already reserved or already finalized yields `FileExists`.
    #[tracing::instrument(skip(self, ctx, init), fields(operation = "apply"))]
    pub async fn apply(
        &self,
        ctx: &RequestContext,
        init: InitUpload,
    ) -> Result<StagingRecord, AppError> {
        let mut run = PipelineRun::new(
            ctx,
            APPLY_STEPS,
            UploadState::Requested,
            init.fid.clone().unwrap_or_default(),
        );

        let validated = run
            .step(UploadStep::ValidateRequest, async { init.validate() })
            .await?;
        let fid = validated.fid.clone().unwrap_or_else(new_file_id);
        run.set_fid(&fid);

        let collection = run
            .step(
                UploadStep::ResolveCollection,
                self.namespaces.find_collection(&validated.collection_id),
            )
            .await?;

        let record = validated.into_staging_record(fid, collection);
        run.step(UploadStep::ReserveStaging, self.reserve(&record))
            .await?;

        tracing::info!(
            fid = %record.fid,
            collection_id = %record.collection_id(),
            repository_id = %record.repository_id(),
            content_length = record.content_length,
            state = %run.state(),
            "Upload reserved"
        );
        Ok(record)
    }

    async fn reserve(&self, record: &StagingRecord) -> Result<(), AppError> {
        match self.files.get_file(&record.fid).await {
            Ok(existing) => return Err(AppError::FileExists(existing.fid)),
            Err(AppError::FileNotFound(_)) => {}
            Err(e) => return Err(e),
        }

        match self.staging.create(record, self.settings.staging_ttl).await {
            Err(AppError::FileAlreadyReserved(_)) => Err(AppError::FileExists(record.fid.clone())),
            other => other,
        }
    }

    /// Store the body of a reserved upload and promote the reservation to a file record.
    ///
    /// Nothing is written to the object store unless a live reservation exists. If the
    /// transfer fails the reservation is left in place so the client may retry.
    #[tracing::instrument(skip(self, ctx, body), fields(operation = "single_upload"))]
    pub async fn single_upload(
        &self,
        ctx: &RequestContext,
        collection_id: &str,
        fid: &str,
        body: ByteStream<'_>,
    ) -> Result<FileRecord, AppError> {
        validate_identifier("fid", fid)?;
        let mut run = PipelineRun::new(ctx, SINGLE_UPLOAD_STEPS, UploadState::Reserved, fid);

        let collection = run
            .step(
                UploadStep::ResolveCollection,
                self.namespaces.find_collection(collection_id),
            )
            .await?;

        let key = StagingKey::new(&collection.repository_id, &collection.collection_id, fid);
        let staging = run
            .step(UploadStep::LoadStaging, self.staging.get(&key))
            .await?;

        let storage_key = object_key(&collection.repository_id, &collection.collection_id, fid);
        let written = run
            .step(UploadStep::TransferBytes, async {
                self.storage
                    .put_stream(&storage_key, &staging.content_type, body)
                    .await
                    .map_err(AppError::from)
            })
            .await?;

        if written != staging.content_length as u64 {
            tracing::warn!(
                fid = %fid,
                object_key = %storage_key,
                declared = staging.content_length,
                written,
                "Uploaded size differs from declared content length"
            );
        }

        let overrides = FinalizeOverrides {
            collection: Some(collection),
            meta_data: None,
        };
        let outcome = run
            .step(
                UploadStep::Finalize,
                self.files.finalize(staging, overrides),
            )
            .await?;

        if let Err(e) = run
            .step(UploadStep::ReleaseStaging, self.staging.delete(&key))
            .await
        {
            tracing::warn!(fid = %fid, error = %e, "Failed to release staging record");
        }

        if let FinalizeOutcome::AlreadyFinalized(_) = outcome {
            tracing::info!(fid = %fid, "Upload was already finalized");
        }

        let record = outcome.into_record();
        tracing::info!(
            fid = %record.fid,
            object_key = %storage_key,
            bytes = written,
            state = %run.state(),
            "Upload finalized"
        );
        Ok(record)
    }

    /// Signed GET URL for the object behind `record`.
    pub async fn sign_read_url(
        &self,
        ctx: &RequestContext,
        record: &FileRecord,
    ) -> Result<SignedUrl, AppError> {
        let key = object_key(record.repository_id(), record.collection_id(), &record.fid);
        let expires_in = self.settings.signed_url_ttl;

        let url = ctx
            .run("sign_url", async {
                self.storage
                    .signed_get_url(&key, expires_in)
                    .await
                    .map_err(|e| match e {
                        StorageError::SigningFailed(msg) => AppError::SigningError(msg),
                        other => AppError::SigningError(other.to_string()),
                    })
            })
            .await?;

        tracing::debug!(fid = %record.fid, object_key = %key, "Signed read URL issued");
        Ok(SignedUrl { url, expires_in })
    }

    pub async fn query_file(&self, ctx: &RequestContext, fid: &str) -> Result<FileRecord, AppError> {
        ctx.run("query_file", self.files.get_file(fid)).await
    }
}
