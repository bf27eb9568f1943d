use crate::{
    Res,
    config::AppContext,
    info,
    management::{CredentialStore, LoginHint, SessionManager},
    spotify::{Session, SpotifyAuthenticator},
    success,
};

pub async fn login(ctx: &AppContext, hint: &LoginHint, open_browser: bool) -> Res<()> {
    let session = establish(ctx, hint, open_browser).await?;
    success!("Logged in as {}", session.username());
    Ok(())
}

pub async fn logout(ctx: &AppContext) -> Res<()> {
    let store = CredentialStore::new(ctx.config.credentials_location().clone());
    if store.clear().await? {
        success!("Removed stored credentials at {}", store.path().display());
    } else {
        info!("No stored credentials at {}", store.path().display());
    }
    Ok(())
}

pub(crate) async fn establish(
    ctx: &AppContext,
    hint: &LoginHint,
    open_browser: bool,
) -> Res<Session> {
    let mut authenticator = SpotifyAuthenticator::new(ctx);
    if !open_browser {
        authenticator = authenticator.without_browser();
    }

    let session = SessionManager::new(&ctx.config, &authenticator)
        .establish(hint)
        .await?;
    Ok(session)
}
