//! Reads attached photos and encodes them for upload

use crate::portal::EncodedPhoto;
use crate::state::PhotoAttachment;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use futures::future::try_join_all;
use thiserror::Error;

#[derive(Error, Debug)]
#[error("Could not read photo {name}: {source}")]
pub struct PhotoError {
    pub name: String,
    #[source]
    pub source: std::io::Error,
}

pub async fn encode_photo(photo: &PhotoAttachment) -> Result<EncodedPhoto, PhotoError> {
    let bytes = tokio::fs::read(&photo.path)
        .await
        .map_err(|source| PhotoError {
            name: photo.name.clone(),
            source,
        })?;
    tracing::debug!(name = %photo.name, bytes = bytes.len(), "Encoded photo");
    Ok(EncodedPhoto {
        name: photo.name.clone(),
        data: STANDARD.encode(&bytes),
    })
}

/// Encode every photo concurrently; the first unreadable file fails the batch
pub async fn encode_photos(photos: &[PhotoAttachment]) -> Result<Vec<EncodedPhoto>, PhotoError> {
    try_join_all(photos.iter().map(encode_photo)).await
}
