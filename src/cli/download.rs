use std::sync::Arc;

use tabled::Table;

use crate::{
    Res,
    cli::auth::establish,
    config::AppContext,
    download::{Orchestrator, PlanCollector},
    management::LoginHint,
    spotify::{ApiClient, Catalog, TokenProvider},
    success, utils, warning,
};

/// What to download.
#[derive(Debug, Clone)]
pub enum Target {
    Track(String),
    Album(String),
    Artist(String),
}

impl Target {
    /// Accepts bare ids, share links and `spotify:` URIs.
    pub fn track(input: &str) -> Self {
        Target::Track(utils::extract_id(input, "track"))
    }

    pub fn album(input: &str) -> Self {
        Target::Album(utils::extract_id(input, "album"))
    }

    pub fn artist(input: &str) -> Self {
        Target::Artist(utils::extract_id(input, "artist"))
    }
}

pub async fn download(
    ctx: &AppContext,
    hint: &LoginHint,
    target: Target,
    show_progress: bool,
) -> Res<()> {
    let session = establish(ctx, hint, true).await?;
    let tokens = Arc::new(TokenProvider::new(Arc::new(session)));
    let client = ApiClient::new(ctx, tokens);
    let catalog = Catalog::new(&client, &ctx.config);
    let collector = PlanCollector::new(&catalog);

    {
        let orchestrator = Orchestrator::new(&catalog, &collector).with_progress(show_progress);
        match &target {
            Target::Track(id) => orchestrator.download_track(id).await?,
            Target::Album(id) => orchestrator.download_album(id).await?,
            Target::Artist(id) => orchestrator.download_artist_albums(id).await?,
        }
    }

    let rows = collector.into_rows();
    if rows.is_empty() {
        warning!("Nothing to download for {:?}", target);
        return Ok(());
    }

    let count = rows.len();
    println!("{}", Table::new(rows));
    success!("Resolved {} tracks", count);
    Ok(())
}
