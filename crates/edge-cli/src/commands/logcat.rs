//! Live driver log streaming command.

use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use edge_core::address::{Authority, DEFAULT_LIVE_LOG_PORT};
use edge_core::hub::{HubVerifier, LiveLogClient};
use edge_core::selector::{select_driver, DriverScope, ALL_DRIVERS};
use edge_core::storage::TrustStore;
use edge_core::stream::{SessionEvent, StreamSession};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::cli::LogcatArgs;
use crate::config::Settings;
use crate::error::CliError;
use crate::output::get_formatter;
use crate::prompt::{Activity, TerminalPrompter};

/// Run the logcat command
pub async fn run_logcat(args: LogcatArgs, settings: &Settings) -> Result<(), CliError> {
    let activity = Activity::new(settings.interactive);
    let prompter = Arc::new(TerminalPrompter::new(settings.interactive, activity.clone()));

    let authority = match args.hub_address.as_deref() {
        Some(address) => Authority::resolve(address, DEFAULT_LIVE_LOG_PORT)?,
        None => prompter.ask_hub_address()?,
    };

    let store = TrustStore::open_in(&settings.cache_dir)?;
    debug!(path = %store.path().display(), hubs = store.len(), "loaded known hubs");

    let verifier = Arc::new(HubVerifier::new(
        &authority,
        Arc::new(Mutex::new(store)),
        prompter.clone(),
    ));
    let client = LiveLogClient::new(
        authority,
        settings.authenticator(),
        verifier,
        settings.timeout,
    )?;

    let reference = if args.all {
        Some(ALL_DRIVERS)
    } else {
        args.driver_id.as_deref()
    };
    let scope = select_driver(&client, prompter.as_ref(), reference).await?;
    debug!(?scope, "selected drivers");

    activity.start("connecting");
    let result = stream_logs(&client, &scope, &activity, args.ndjson).await;
    activity.stop();
    result
}

async fn stream_logs(
    client: &LiveLogClient,
    scope: &DriverScope,
    activity: &Activity,
    ndjson: bool,
) -> Result<(), CliError> {
    let url = client.get_log_source(scope.driver_id()).await?;

    let mut session = StreamSession::new(client.authority().to_string(), client.transport());
    session.init_source(url)?;

    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            interrupt.cancel();
        }
    });

    let formatter = get_formatter(ndjson);
    let mut stdout = io::stdout();

    while let Some(event) = session.next_event(&cancel).await? {
        match event {
            SessionEvent::Opened => activity.start("listening for logs"),
            SessionEvent::Message(message) => {
                let line = formatter.format_log(&message);
                activity.suspend(|| writeln!(stdout, "{}", line))?;
                stdout.flush().ok();
            }
        }
    }

    debug!("log stream closed by operator");
    Ok(())
}
