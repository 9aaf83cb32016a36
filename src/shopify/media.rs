//! Product image gallery: upload pipeline and ordered captions

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::admin::{AdminClient, MediaUpdate, ProductMedia};
use super::errors::ShopifyError;
use crate::metrics::metrics;
use crate::structured_logging::{OperationContext, StructuredLogger};
use crate::types::{ALLOWED_IMAGE_TYPES, MAX_UPLOAD_BYTES};

/// An image waiting to be uploaded
#[derive(Debug, Clone, PartialEq)]
pub struct UploadFile {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    /// Read a file from disk, guessing the MIME type from its extension
    pub async fn from_path(path: &Path) -> std::io::Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let mime_type = mime_for_file_name(&file_name)
            .unwrap_or("application/octet-stream")
            .to_string();
        Ok(Self {
            file_name,
            mime_type,
            bytes,
        })
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

pub fn mime_for_file_name(name: &str) -> Option<&'static str> {
    let ext = name.rsplit_once('.')?.1.to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}

/// Reject files of the wrong type or over 10 MB, one message per file
pub fn validate_uploads(files: &[UploadFile]) -> Result<(), Vec<String>> {
    let messages: Vec<String> = files
        .iter()
        .filter_map(|file| {
            if !ALLOWED_IMAGE_TYPES.contains(&file.mime_type.as_str()) {
                Some(format!("{}: tipo de arquivo inválido", file.file_name))
            } else if file.size() > MAX_UPLOAD_BYTES {
                Some(format!("{}: arquivo muito grande (máximo 10MB)", file.file_name))
            } else {
                None
            }
        })
        .collect();
    if messages.is_empty() {
        Ok(())
    } else {
        Err(messages)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum UploadState {
    Pending,
    Staging,
    Uploading,
    Creating,
    Done,
    Error { message: String },
}

impl UploadState {
    pub fn as_str(&self) -> &'static str {
        match self {
            UploadState::Pending => "pending",
            UploadState::Staging => "staging",
            UploadState::Uploading => "uploading",
            UploadState::Creating => "creating",
            UploadState::Done => "done",
            UploadState::Error { .. } => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadStatus {
    pub file_name: String,
    #[serde(flatten)]
    pub state: UploadState,
    pub progress: u8,
    pub media_id: Option<String>,
}

impl UploadStatus {
    fn new(file_name: &str) -> Self {
        Self {
            file_name: file_name.to_string(),
            state: UploadState::Pending,
            progress: 0,
            media_id: None,
        }
    }

    fn advance(&mut self, state: UploadState, progress: u8, logger: &StructuredLogger) {
        self.state = state;
        self.progress = progress;
        logger.log_upload(&self.file_name, self.state.as_str(), None);
    }

    pub fn is_done(&self) -> bool {
        self.state == UploadState::Done
    }
}

async fn upload_one(
    admin: &AdminClient,
    product_id: &str,
    file: UploadFile,
    logger: &StructuredLogger,
) -> UploadStatus {
    let UploadFile {
        file_name,
        mime_type,
        bytes,
    } = file;
    let size = bytes.len() as u64;
    let mut status = UploadStatus::new(&file_name);

    let result: Result<Option<String>, ShopifyError> = async {
        status.advance(UploadState::Staging, 10, logger);
        let target = admin.staged_upload(&file_name, &mime_type, size).await?;

        status.advance(UploadState::Uploading, 40, logger);
        admin
            .upload_to_staged_target(&target, &file_name, &mime_type, bytes)
            .await?;

        status.advance(UploadState::Creating, 70, logger);
        let ids = admin
            .create_product_media(product_id, &[(target.resource_url.clone(), file_name.clone())])
            .await?;
        Ok::<_, ShopifyError>(ids.into_iter().next())
    }
    .await;

    match result {
        Ok(media_id) => {
            metrics().uploads_ok.inc();
            status.media_id = media_id;
            status.advance(UploadState::Done, 100, logger);
        }
        Err(e) => {
            metrics().uploads_failed.inc();
            let message = e.to_string();
            logger.log_upload(&status.file_name, "error", Some(&message));
            status.state = UploadState::Error { message };
        }
    }
    status
}

/// Upload and attach every file; each file succeeds or fails on its own
///
/// Nothing is sent when any file fails validation.
pub async fn upload_all(
    admin: &AdminClient,
    product_id: &str,
    files: Vec<UploadFile>,
) -> Result<Vec<UploadStatus>, Vec<String>> {
    validate_uploads(&files)?;
    let ctx = OperationContext::new("media_upload");
    let uploads = files
        .into_iter()
        .map(|file| upload_one(admin, product_id, file, &ctx.logger));
    Ok(join_all(uploads).await)
}

/// Entry of the `custom.media_gallery` metafield
#[derive(Debug, Clone, Deserialize)]
struct GalleryEntry {
    id: String,
    #[serde(default)]
    alt: Option<String>,
    #[serde(default)]
    position: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GalleryItem {
    pub id: String,
    pub alt: Option<String>,
    pub preview_url: Option<String>,
    pub position: u32,
}

/// Ordered, captioned images of one product
#[derive(Debug, Clone, PartialEq)]
pub struct MediaGallery {
    pub product_id: String,
    pub title: String,
    pub handle: String,
    items: Vec<GalleryItem>,
    pending_deletes: Vec<String>,
}

impl MediaGallery {
    /// Build the gallery from product media and the stored order
    ///
    /// Only images are kept. Order and captions in the metafield win over
    /// the platform's; an unreadable metafield is ignored.
    pub fn from_product_media(product: ProductMedia) -> Self {
        let entries: Vec<GalleryEntry> = product
            .gallery_metafield
            .as_deref()
            .and_then(|raw| match serde_json::from_str(raw) {
                Ok(entries) => Some(entries),
                Err(e) => {
                    tracing::warn!(product_id = %product.product_id, error = %e, "Ignoring unreadable media gallery metafield");
                    None
                }
            })
            .unwrap_or_default();

        let mut items: Vec<GalleryItem> = product
            .media
            .into_iter()
            .filter(|m| m.media_content_type == "IMAGE")
            .enumerate()
            .map(|(index, node)| {
                let entry = entries.iter().find(|e| e.id == node.id);
                GalleryItem {
                    alt: entry.and_then(|e| e.alt.clone()).or(node.alt),
                    position: entry.and_then(|e| e.position).unwrap_or(index as u32 + 1),
                    preview_url: node.preview_url,
                    id: node.id,
                }
            })
            .collect();
        items.sort_by_key(|item| item.position);

        Self {
            product_id: product.product_id,
            title: product.title,
            handle: product.handle,
            items,
            pending_deletes: Vec::new(),
        }
    }

    pub fn items(&self) -> &[GalleryItem] {
        &self.items
    }

    pub fn pending_deletes(&self) -> &[String] {
        &self.pending_deletes
    }

    fn renumber(&mut self) {
        for (index, item) in self.items.iter_mut().enumerate() {
            item.position = index as u32 + 1;
        }
    }

    /// Swap the item at `index` with the one before it
    pub fn move_up(&mut self, index: usize) -> bool {
        if index == 0 || index >= self.items.len() {
            return false;
        }
        self.items.swap(index - 1, index);
        self.renumber();
        true
    }

    /// Swap the item at `index` with the one after it
    pub fn move_down(&mut self, index: usize) -> bool {
        if index + 1 >= self.items.len() {
            return false;
        }
        self.items.swap(index, index + 1);
        self.renumber();
        true
    }

    pub fn set_caption(&mut self, id: &str, alt: &str) -> bool {
        match self.items.iter_mut().find(|item| item.id == id) {
            Some(item) => {
                item.alt = Some(alt.to_string());
                true
            }
            None => false,
        }
    }

    /// Drop an image; it is deleted on the platform at the next sync
    pub fn delete(&mut self, id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id != id);
        if self.items.len() == before {
            return false;
        }
        self.pending_deletes.push(id.to_string());
        self.renumber();
        true
    }

    /// Captions and 1-based positions in display order
    pub fn updates(&self) -> Vec<MediaUpdate> {
        self.items
            .iter()
            .enumerate()
            .map(|(index, item)| MediaUpdate {
                id: item.id.clone(),
                alt: item.alt.clone(),
                position: index as u32 + 1,
            })
            .collect()
    }

    /// Push order, captions and deletions, then store the gallery metafield
    pub async fn sync(&mut self, admin: &AdminClient) -> Result<(), ShopifyError> {
        let updates = self.updates();
        admin
            .update_product_media(&self.product_id, &updates, &self.pending_deletes)
            .await?;
        admin.set_media_metafield(&self.product_id, &updates).await?;
        tracing::info!(
            product_id = %self.product_id,
            images = updates.len(),
            deleted = self.pending_deletes.len(),
            "Gallery synchronized"
        );
        self.pending_deletes.clear();
        Ok(())
    }
}
