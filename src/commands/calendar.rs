use super::{CommandResult, EventArgs};
use pagecal::components::ics::generate_uid;
use pagecal::components::pipeline::{prepare_draft, publish as publish_draft};
use pagecal::components::{EventDraft, PageHandle};
use pagecal::config::Config;
use pagecal::settings::{Settings, SettingsProvider};
use chrono_tz::Tz;
use tracing::{error, info};

/// Probe the configured calendar server
pub async fn check(config: &Config) -> CommandResult {
    let settings = config.resolve_settings(&config.settings_store())?;
    let client = config.caldav_client()?;

    if client.check_connection(&settings).await {
        println!("Calendar server reachable: {}", settings.server_url);
    } else {
        println!("Calendar server NOT reachable: {}", settings.server_url);
    }
    Ok(())
}

/// Save connection settings to the settings file
pub fn configure(
    config: &Config,
    server_url: String,
    username: String,
    password: String,
) -> CommandResult {
    // Reject unusable URLs before they are saved
    pagecal::components::caldav::collection_url(&server_url)?;

    let store = config.settings_store();
    store.set(Settings {
        server_url,
        username,
        password,
    })?;
    println!("Settings saved to {}", store.path().display());
    Ok(())
}

/// Build an event from a page and either publish it or print its ICS text
pub async fn publish(config: &Config, args: EventArgs, dry_run: bool) -> CommandResult {
    let tz = config.tz()?;
    let page = PageHandle::from_file(&args.page.file, tz).await?;
    let mut draft = prepare_draft(&page, args.page.url.clone(), args.page.selection()).await;
    page.shutdown().await?;

    apply_args(&mut draft, &args, &tz)?;

    if dry_run {
        let event = draft.finalize(&tz)?;
        let ics = config.encoder()?.encode(&event, &generate_uid())?;
        print!("{}", ics);
        return Ok(());
    }

    let settings = config.resolve_settings(&config.settings_store())?;
    let client = config.caldav_client()?;

    match publish_draft(&draft, &tz, &client, &settings).await {
        Ok(created) => {
            info!("Published event {}", created.uid);
            println!("Created {}", created.href);
            Ok(())
        }
        Err(e) => {
            error!("Failed to publish event: {}", e);
            Err(e)
        }
    }
}

/// Command-line values override suggestions; anything left empty takes the first suggestion
fn apply_args(draft: &mut EventDraft, args: &EventArgs, tz: &Tz) -> CommandResult {
    draft.all_day = args.all_day;

    if let Some(index) = args.date_index() {
        draft.use_date_suggestion(index, tz)?;
    }
    if let Some(title) = &args.title {
        draft.title = title.clone();
    }
    if let Some(start) = &args.start {
        draft.start = start.clone();
        if args.end.is_none() && args.all_day {
            draft.end = start.clone();
        }
    }
    if let Some(end) = &args.end {
        draft.end = end.clone();
    }
    if let Some(description) = &args.description {
        draft.set_description(description);
    }

    draft.fill_defaults(tz);
    Ok(())
}
