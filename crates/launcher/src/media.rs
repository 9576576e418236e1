//! Media resolution: picks the assets a launch will turn into creatives.

use std::path::Path;
use std::sync::Arc;

use campaign_core::{Campaign, CampaignError, CampaignResult, Clock, MediaAsset, MediaType};
use tracing::{debug, info};
use uuid::Uuid;

use crate::ports::{MediaRepository, VideoConverter};

/// Per-platform limits on what counts as a usable asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MediaPolicy {
    pub max_image_bytes: u64,
    pub max_video_bytes: u64,
}

impl MediaPolicy {
    pub fn is_usable(&self, asset: &MediaAsset) -> bool {
        let limit = match asset.media_type {
            MediaType::Image => self.max_image_bytes,
            MediaType::Video => self.max_video_bytes,
        };
        !asset.url.trim().is_empty()
            && asset.mime_type.starts_with(asset.media_type.mime_prefix())
            && asset.size_bytes <= limit
    }
}

/// Usable images and videos of one campaign, oldest first.
#[derive(Debug, Clone, Default)]
pub struct MediaInventory {
    pub images: Vec<MediaAsset>,
    pub videos: Vec<MediaAsset>,
}

impl MediaInventory {
    pub fn is_empty(&self) -> bool {
        self.images.is_empty() && self.videos.is_empty()
    }

    pub fn most_recent_image(&self) -> Option<&MediaAsset> {
        self.images.iter().max_by_key(|asset| asset.created_at)
    }

    fn image(&self, id: Uuid) -> Option<&MediaAsset> {
        self.images.iter().find(|asset| asset.id == id)
    }
}

/// One creative's worth of media.
#[derive(Debug, Clone, PartialEq)]
pub struct CreativeSource {
    pub asset: MediaAsset,
    /// Cover image for video creatives.
    pub thumbnail: Option<MediaAsset>,
}

#[derive(Debug, Clone)]
pub struct ResolvedMedia {
    pub media_type: MediaType,
    pub items: Vec<CreativeSource>,
    /// Set when the image-to-video fallback produced the only video.
    pub converted: Option<MediaAsset>,
}

impl ResolvedMedia {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

pub struct MediaResolver {
    repository: Arc<dyn MediaRepository>,
    converter: Option<Arc<dyn VideoConverter>>,
    clock: Arc<dyn Clock>,
}

impl MediaResolver {
    pub fn new(repository: Arc<dyn MediaRepository>, clock: Arc<dyn Clock>) -> Self {
        Self {
            repository,
            converter: None,
            clock,
        }
    }

    pub fn with_converter(mut self, converter: Arc<dyn VideoConverter>) -> Self {
        self.converter = Some(converter);
        self
    }

    /// Load the campaign's usable media. Read-only.
    pub async fn inventory(&self, campaign_id: Uuid, policy: &MediaPolicy) -> CampaignResult<MediaInventory> {
        let images = self
            .repository
            .list_by_campaign_and_type(campaign_id, MediaType::Image)
            .await?;
        let videos = self
            .repository
            .list_by_campaign_and_type(campaign_id, MediaType::Video)
            .await?;

        let inventory = MediaInventory {
            images: images.into_iter().filter(|a| policy.is_usable(a)).collect(),
            videos: videos.into_iter().filter(|a| policy.is_usable(a)).collect(),
        };
        debug!(
            campaign_id = %campaign_id,
            images = inventory.images.len(),
            videos = inventory.videos.len(),
            "Media inventory loaded"
        );
        Ok(inventory)
    }

    /// Images or videos, videos preferred. Every video needs a thumbnail:
    /// its linked one, else the image at the same position, else the first
    /// image.
    pub async fn resolve_image_or_video(
        &self,
        campaign: &Campaign,
        policy: &MediaPolicy,
    ) -> CampaignResult<ResolvedMedia> {
        let inventory = self.inventory(campaign.id, policy).await?;

        if inventory.videos.is_empty() {
            if inventory.images.is_empty() {
                return Err(CampaignError::MissingContent(
                    "campaign has no usable images or videos".to_string(),
                ));
            }
            return Ok(ResolvedMedia {
                media_type: MediaType::Image,
                items: inventory
                    .images
                    .iter()
                    .map(|asset| CreativeSource {
                        asset: asset.clone(),
                        thumbnail: None,
                    })
                    .collect(),
                converted: None,
            });
        }

        let mut items = Vec::with_capacity(inventory.videos.len());
        for (idx, video) in inventory.videos.iter().enumerate() {
            let thumbnail = match self.linked_thumbnail(video, &inventory).await? {
                Some(linked) => Some(linked),
                None => inventory
                    .images
                    .get(idx)
                    .or_else(|| inventory.images.first())
                    .cloned(),
            };
            let Some(thumbnail) = thumbnail else {
                return Err(CampaignError::MissingContent(format!(
                    "no thumbnail available for video {}; upload a thumbnail image",
                    video.file_name
                )));
            };
            items.push(CreativeSource {
                asset: video.clone(),
                thumbnail: Some(thumbnail),
            });
        }

        Ok(ResolvedMedia {
            media_type: MediaType::Video,
            items,
            converted: None,
        })
    }

    /// Videos only. With no usable video, the most recent image goes
    /// through the converter and the result becomes the sole creative.
    pub async fn resolve_video_only(
        &self,
        campaign: &Campaign,
        policy: &MediaPolicy,
    ) -> CampaignResult<ResolvedMedia> {
        let inventory = self.inventory(campaign.id, policy).await?;

        if !inventory.videos.is_empty() {
            let mut items = Vec::with_capacity(inventory.videos.len());
            for video in &inventory.videos {
                let thumbnail = self.linked_thumbnail(video, &inventory).await?;
                items.push(CreativeSource {
                    asset: video.clone(),
                    thumbnail,
                });
            }
            return Ok(ResolvedMedia {
                media_type: MediaType::Video,
                items,
                converted: None,
            });
        }

        let source = inventory.most_recent_image().cloned().ok_or_else(|| {
            CampaignError::MissingContent("campaign has no usable videos or images".to_string())
        })?;
        let converted = self.convert_image(&source).await?;

        Ok(ResolvedMedia {
            media_type: MediaType::Video,
            items: vec![CreativeSource {
                asset: converted.clone(),
                thumbnail: Some(source),
            }],
            converted: Some(converted),
        })
    }

    async fn linked_thumbnail(
        &self,
        video: &MediaAsset,
        inventory: &MediaInventory,
    ) -> CampaignResult<Option<MediaAsset>> {
        let Some(thumbnail_id) = video.thumbnail_id else {
            return Ok(None);
        };
        if let Some(image) = inventory.image(thumbnail_id) {
            return Ok(Some(image.clone()));
        }
        Ok(self
            .repository
            .get(thumbnail_id)
            .await?
            .filter(|asset| asset.media_type == MediaType::Image))
    }

    async fn convert_image(&self, image: &MediaAsset) -> CampaignResult<MediaAsset> {
        let converter = self.converter.as_ref().ok_or_else(|| {
            CampaignError::Conversion("no image-to-video converter configured".to_string())
        })?;

        let stem = Path::new(&image.file_name)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("image");
        let file_name = format!("{stem}_video.mp4");

        info!(image = %image.file_name, output = %file_name, "Converting image to video");
        let output = converter
            .convert(&image.url, &file_name)
            .await
            .map_err(|e| CampaignError::Conversion(format!("{e:#}")))?;

        let size_bytes = tokio::fs::metadata(&output.local_path)
            .await
            .map(|m| m.len())
            .unwrap_or(0);

        let asset = MediaAsset {
            id: Uuid::new_v4(),
            campaign_id: image.campaign_id,
            media_type: MediaType::Video,
            file_name,
            url: output.remote_url,
            mime_type: "video/mp4".to_string(),
            size_bytes,
            thumbnail_id: Some(image.id),
            created_at: self.clock.now(),
        };
        self.repository.save(asset).await
    }
}
