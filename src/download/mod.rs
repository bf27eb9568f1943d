//! # Download Orchestration
//!
//! Drives album and artist downloads on top of the catalog queries. The actual
//! transfer of a track is delegated to a [`TrackDownloader`]; this module only
//! decides which tracks to hand over, in which order, and with which extra
//! template values.
//!
//! ## Track Downloads
//!
//! [`Orchestrator::download_track`] passes one track straight to the
//! downloader with no extra template values.
//!
//! ## Album Downloads
//!
//! [`Orchestrator::download_album`] looks the album up once in the configured
//! locale and throws the answer away, then lists the album's tracks and passes
//! each one to the downloader with:
//!
//! - `album_num` - the 1-based position, zero-padded to two digits
//! - `album_id` - the album the track was listed under
//!
//! Artist and album names are deliberately *not* passed along. The downloader
//! resolves them from the track's own localized metadata, so album downloads
//! and single-track downloads name things the same way even for artists whose
//! localized name differs from the album listing's.
//!
//! ## Artist Downloads
//!
//! [`Orchestrator::download_artist_albums`] lists the artist's albums and
//! singles and downloads each album in turn.
//!
//! ## Failure Semantics
//!
//! Everything runs one item at a time. The first error, from the catalog or
//! from the downloader, stops the whole operation and is returned as-is;
//! nothing is skipped or retried at this level.

mod plan;
mod progress;

pub use plan::PlanCollector;
pub use progress::progress;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::{
    Res,
    error::DownloadError,
    spotify::Catalog,
    types::ExtraKeys,
    utils,
};

/// What kind of listing a track download was started from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Track,
    Album,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Track => "track",
            SourceKind::Album => "album",
        }
    }
}

/// Performs the transfer of a single track.
///
/// Implementations resolve the track's localized metadata themselves and
/// fill any template placeholders `extra_keys` leaves open.
#[async_trait]
pub trait TrackDownloader: Send + Sync {
    async fn download_track(
        &self,
        kind: SourceKind,
        track_id: &str,
        extra_keys: &ExtraKeys,
        disable_progress: bool,
    ) -> Result<(), DownloadError>;
}

pub struct Orchestrator<'a, D: TrackDownloader + ?Sized> {
    catalog: &'a Catalog<'a>,
    downloader: &'a D,
    show_progress: bool,
}

impl<'a, D: TrackDownloader + ?Sized> Orchestrator<'a, D> {
    pub fn new(catalog: &'a Catalog<'a>, downloader: &'a D) -> Self {
        Self {
            catalog,
            downloader,
            show_progress: true,
        }
    }

    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Hands a single track over with no extra template values.
    ///
    /// The downloader shows its own progress unless progress is disabled.
    pub async fn download_track(&self, track_id: &str) -> Res<()> {
        debug!(track_id, "downloading single track");
        self.downloader
            .download_track(
                SourceKind::Track,
                track_id,
                &ExtraKeys::new(),
                !self.show_progress,
            )
            .await?;
        Ok(())
    }

    pub async fn download_album(&self, album_id: &str) -> Res<()> {
        // Surfaces a bad id early; names come from per-track metadata.
        let _ = self.catalog.album_name(album_id).await?;

        let tracks = self.catalog.album_tracks(album_id).await?;
        info!(album_id, tracks = tracks.len(), "downloading album");

        let total = tracks.len() as u64;
        for (n, track) in progress(tracks.iter().enumerate(), total, "Song", self.show_progress) {
            let mut extra_keys = ExtraKeys::new();
            extra_keys.insert("album_num".to_string(), utils::album_num(n + 1));
            extra_keys.insert("album_id".to_string(), album_id.to_string());

            self.downloader
                .download_track(SourceKind::Album, &track.id, &extra_keys, true)
                .await?;
        }

        Ok(())
    }

    pub async fn download_artist_albums(&self, artist_id: &str) -> Res<()> {
        let albums = self.catalog.artist_albums(artist_id).await?;
        debug!(artist_id, albums = albums.len(), "artist albums listed");

        for album_id in &albums {
            self.download_album(album_id).await?;
        }

        Ok(())
    }
}
