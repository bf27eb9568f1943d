use reqwest::Url;

use crate::{
    Res,
    config::Config,
    error::{DownloadError, Error},
    spotify::{
        client::ApiClient,
        pagination::{PAGE_SIZE, Paginator},
    },
    types::{Album, IdOnly, Track},
};

/// Catalog queries used by the download orchestrator.
///
/// Album and track lookups ask for names in the configured locale.
pub struct Catalog<'a> {
    client: &'a ApiClient,
    locale: String,
}

impl<'a> Catalog<'a> {
    pub fn new(client: &'a ApiClient, config: &Config) -> Self {
        Self {
            client,
            locale: config.locale().to_string(),
        }
    }

    /// Returns the album's primary artist name and its title, localized.
    pub async fn album_name(&self, album_id: &str) -> Res<(String, String)> {
        let album: Album = self.localized(&format!("albums/{album_id}")).await?;
        let artist = album
            .artists
            .first()
            .map(|a| a.name.clone())
            .ok_or_else(|| Error::Unexpected(format!("album {album_id} lists no artists")))?;
        Ok((artist, album.name))
    }

    /// Returns every track of an album, in album order.
    pub async fn album_tracks(&self, album_id: &str) -> Res<Vec<Track>> {
        let url = self.endpoint(&format!("albums/{album_id}/tracks"));
        Paginator::new(self.client)
            .by_offset(&url, PAGE_SIZE, &[])
            .await
    }

    /// Returns the ids of an artist's albums and singles, following `next`
    /// links until the listing ends.
    pub async fn artist_albums(&self, artist_id: &str) -> Res<Vec<String>> {
        let url = format!(
            "{}?include_groups=album%2Csingle",
            self.endpoint(&format!("artists/{artist_id}/albums"))
        );
        let albums: Vec<IdOnly> = Paginator::new(self.client).by_cursor(&url).await?;
        Ok(albums.into_iter().map(|a| a.id).collect())
    }

    /// Returns a single track with localized names.
    pub async fn track(&self, track_id: &str) -> Res<Track> {
        self.localized(&format!("tracks/{track_id}")).await
    }

    async fn localized<T: serde::de::DeserializeOwned>(&self, path: &str) -> Res<T> {
        let url = Url::parse_with_params(
            &self.endpoint(path),
            &[("market", "from_token"), ("locale", self.locale.as_str())],
        )
        .map_err(|e| Error::Unexpected(format!("invalid catalog URL: {e}")))?;

        let response = self.client.invoke(url.as_str()).await?;
        if let Some(err) = response.error() {
            return Err(Error::Api(err));
        }
        Ok(serde_json::from_value(response.json)?)
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.client.api_url(), path)
    }
}

/// Maps a catalog failure for one track onto the collaborator's error type.
pub fn track_error(track_id: &str, err: Error) -> DownloadError {
    match err {
        Error::Api(source) => DownloadError::Api {
            track_id: track_id.to_string(),
            source,
        },
        other => DownloadError::Unavailable {
            track_id: track_id.to_string(),
            reason: other.to_string(),
        },
    }
}
