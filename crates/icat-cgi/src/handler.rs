use color_eyre::eyre::Result;
use icat_session::{
    logout, resume_or_login, CatalogueSettings, Credentials, Established, Operation,
    RestCatalogueClient, Session, SessionCookie, SessionError, SessionInfo,
};
use tracing::debug;

use crate::{command::Commands, render::CgiResponse};

/// Everything one invocation needs besides the command itself.
pub struct Context {
    pub settings: CatalogueSettings,
    pub cookie_header: Option<String>,
    pub credentials: Option<Credentials>,
}

/// Runs `command` and produces the CGI response.
///
/// Session failures become error responses. Only broken configuration is returned as an error.
pub async fn run(command: Commands, ctx: Context) -> Result<CgiResponse> {
    let cookie = ctx.settings.cookie.to_session_cookie()?;
    let client = RestCatalogueClient::new(&ctx.settings)?;

    let result = match command {
        Commands::Login => login(client, &cookie, &ctx).await,
        Commands::Whoami => whoami(client, &cookie, &ctx).await,
        Commands::Search { query } => search(client, &cookie, &ctx, query).await,
        Commands::Logout => Ok(logout_command(client, &cookie, &ctx).await),
    };

    Ok(result.unwrap_or_else(|e| error_response(&e)))
}

fn error_response(e: &SessionError) -> CgiResponse {
    debug!(error = %e, "Request failed");
    CgiResponse::from_error(e)
}

/// Sends a freshly issued session id along with `result`, even when the request itself failed,
/// as long as the session is still usable.
fn respond(
    established: Established<RestCatalogueClient>,
    result: Result<CgiResponse, SessionError>,
) -> CgiResponse {
    let set_cookie = established
        .set_cookie
        .filter(|_| established.session.is_active());
    result
        .unwrap_or_else(|e| error_response(&e))
        .with_set_cookie(set_cookie)
}

async fn session_info(
    session: &mut Session<RestCatalogueClient>,
) -> Result<SessionInfo, SessionError> {
    match session.cached_info() {
        Some(info) => Ok(info.clone()),
        None => session.info().await,
    }
}

async fn login(
    client: RestCatalogueClient,
    cookie: &SessionCookie,
    ctx: &Context,
) -> Result<CgiResponse, SessionError> {
    let mut established = resume_or_login(
        client,
        cookie,
        ctx.cookie_header.as_deref(),
        ctx.credentials.as_ref(),
    )
    .await?;

    let verb = if established.resumed {
        "Resumed session"
    } else {
        "Logged in"
    };
    let result = session_info(&mut established.session)
        .await
        .map(|info| CgiResponse::text(format!("{verb} as {}\n", info.user_name)));
    Ok(respond(established, result))
}

async fn whoami(
    client: RestCatalogueClient,
    cookie: &SessionCookie,
    ctx: &Context,
) -> Result<CgiResponse, SessionError> {
    let mut session = Session::new(client);
    session
        .resume(cookie.decode(ctx.cookie_header.as_deref()))
        .await?;
    let info = session_info(&mut session).await?;

    Ok(CgiResponse::json(&serde_json::json!({
        "userName": info.user_name,
        "remainingMinutes": info.remaining_minutes,
    })))
}

async fn search(
    client: RestCatalogueClient,
    cookie: &SessionCookie,
    ctx: &Context,
    query: String,
) -> Result<CgiResponse, SessionError> {
    let mut established = resume_or_login(
        client,
        cookie,
        ctx.cookie_header.as_deref(),
        ctx.credentials.as_ref(),
    )
    .await?;

    let result = established
        .session
        .invoke(Operation::Search { query })
        .await
        .map(|found| CgiResponse::json(&found));
    Ok(respond(established, result))
}

async fn logout_command(
    client: RestCatalogueClient,
    cookie: &SessionCookie,
    ctx: &Context,
) -> CgiResponse {
    let mut session = Session::new(client);
    if let Err(e) = session
        .resume(cookie.decode(ctx.cookie_header.as_deref()))
        .await
    {
        debug!(error = %e, "Nothing to log out of remotely");
    }
    let cleared = logout(&mut session, cookie).await;
    CgiResponse::text("Logged out\n").with_set_cookie(Some(cleared))
}
