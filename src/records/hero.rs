//! The doctor's portrait on the landing page.

use chrono::Utc;

use super::{Rejection, ViewContext};
use crate::backend::{Backend, UploadOptions};
use crate::errors::AppError;
use crate::models::UploadFile;

pub const HERO_BUCKET: &str = "hero-images";
pub const HERO_IMAGE_PATH: &str = "doctor_image.jpg";
const HERO_CACHE_SECONDS: &str = "3600";

/// Overwrite the portrait and return its public URL.
pub async fn replace_hero_image(backend: &Backend, file: &UploadFile) -> Result<String, AppError> {
    if !file.is_image() {
        return Err(Rejection::NotAnImage.into());
    }

    let options = UploadOptions {
        upsert: true,
        cache_control: Some(HERO_CACHE_SECONDS.to_string()),
        ..UploadOptions::new(file.content_type.clone())
    };
    backend
        .files
        .upload(HERO_BUCKET, HERO_IMAGE_PATH, file.bytes.clone(), &options)
        .await?;

    Ok(backend.files.public_url(HERO_BUCKET, HERO_IMAGE_PATH))
}

pub struct HeroImage {
    ctx: ViewContext,
    url: String,
}

impl HeroImage {
    pub fn new(ctx: ViewContext) -> Self {
        let url = ctx.backend.files.public_url(HERO_BUCKET, HERO_IMAGE_PATH);
        Self { ctx, url }
    }

    /// URL to render. Carries a version query after a replacement so the
    /// new image bypasses cached copies.
    pub fn url(&self) -> &str {
        &self.url
    }

    pub async fn replace(&mut self, file: &UploadFile) -> Result<(), AppError> {
        self.ctx.require_admin()?;
        if !file.is_image() {
            return Err(self.ctx.rejected(Rejection::NotAnImage));
        }

        match replace_hero_image(&self.ctx.backend, file).await {
            Ok(url) => {
                self.url = format!("{}?v={}", url, Utc::now().timestamp_millis());
                self.ctx.success("upload_success");
                Ok(())
            }
            Err(e) => {
                self.ctx.failure("upload_error", &e);
                Err(e)
            }
        }
    }
}
