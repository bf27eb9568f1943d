use std::sync::Mutex;

use async_trait::async_trait;
use tracing::debug;

use crate::{
    download::{SourceKind, TrackDownloader},
    error::DownloadError,
    spotify::{Catalog, catalog::track_error},
    types::{ExtraKeys, TrackTableRow},
    utils,
};

/// Track collaborator that resolves each track's localized metadata and
/// records what would be transferred, without moving any audio.
pub struct PlanCollector<'a> {
    catalog: &'a Catalog<'a>,
    rows: Mutex<Vec<TrackTableRow>>,
}

impl<'a> PlanCollector<'a> {
    pub fn new(catalog: &'a Catalog<'a>) -> Self {
        Self {
            catalog,
            rows: Mutex::new(Vec::new()),
        }
    }

    pub fn into_rows(self) -> Vec<TrackTableRow> {
        match self.rows.into_inner() {
            Ok(rows) => rows,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[async_trait]
impl TrackDownloader for PlanCollector<'_> {
    async fn download_track(
        &self,
        kind: SourceKind,
        track_id: &str,
        extra_keys: &ExtraKeys,
        _disable_progress: bool,
    ) -> Result<(), DownloadError> {
        let track = self
            .catalog
            .track(track_id)
            .await
            .map_err(|e| track_error(track_id, e))?;
        debug!(kind = kind.as_str(), track_id, name = %track.name, "resolved track metadata");

        let row = TrackTableRow {
            album_num: extra_keys
                .get("album_num")
                .cloned()
                .unwrap_or_else(|| "-".to_string()),
            name: track.name,
            artists: utils::join_artist_names(&track.artists),
            album: track.album.map(|a| a.name).unwrap_or_default(),
            id: track.id,
        };

        match self.rows.lock() {
            Ok(mut rows) => rows.push(row),
            Err(poisoned) => poisoned.into_inner().push(row),
        }
        Ok(())
    }
}
