mod settings;

use std::process::ExitCode;

use anyhow::Context;
use notice_engine::{
    load_sources, BrowserSettings, CrawlSettings, EmailChannel, FetchSettings, JsonFileStore,
    NoticeWatcher, Renderers, RunOutcome, SourceCrawler, WebhookChannel,
};
use notice_logging::{notice_error, notice_info};

use crate::settings::AppSettings;

const EXIT_FAILED: u8 = 1;
const EXIT_STARTUP: u8 = 2;

fn main() -> ExitCode {
    let dotenv = dotenvy::dotenv();

    let settings = match AppSettings::from_env() {
        Ok(settings) => settings,
        Err(err) => {
            eprintln!("ERROR: {err:#}");
            return ExitCode::from(EXIT_STARTUP);
        }
    };
    notice_logging::initialize_default(settings.log_destination, settings.log_level);
    if let Ok(path) = dotenv {
        notice_info!("Loaded environment from {:?}", path);
    }

    let sources = match load_sources(&settings.config_file)
        .with_context(|| format!("loading sites from {:?}", settings.config_file))
    {
        Ok(sources) => sources,
        Err(err) => {
            notice_error!("{:#}", err);
            return ExitCode::from(EXIT_STARTUP);
        }
    };
    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(err) => {
            notice_error!("starting tokio runtime: {}", err);
            return ExitCode::from(EXIT_STARTUP);
        }
    };

    notice_info!(
        "Watching {} source(s) for keywords {:?}",
        sources.len(),
        settings.keywords.keywords()
    );
    let watcher = match build_watcher(&settings) {
        Ok(watcher) => watcher,
        Err(err) => {
            notice_error!("{:#}", err);
            return ExitCode::from(EXIT_STARTUP);
        }
    };
    match runtime.block_on(watcher.run(&sources, &settings.keywords)) {
        Ok(RunOutcome::NothingNew) | Ok(RunOutcome::Notified { .. }) => ExitCode::SUCCESS,
        Ok(RunOutcome::DispatchFailed { failures }) => {
            for failure in &failures {
                notice_error!("{} failed: {}", failure.channel, failure.message);
            }
            ExitCode::from(EXIT_FAILED)
        }
        Err(err) => {
            notice_error!("{:#}", err);
            ExitCode::from(EXIT_FAILED)
        }
    }
}

fn build_watcher(settings: &AppSettings) -> anyhow::Result<NoticeWatcher> {
    let browser = BrowserSettings {
        chrome_executable: settings.chrome_path.clone(),
        ..BrowserSettings::default()
    };
    let renderers = Renderers::with_settings(FetchSettings::default(), browser)
        .context("building the page fetcher")?;
    let crawler = SourceCrawler::new(renderers, CrawlSettings::default());
    let store = JsonFileStore::new(settings.persist_file.clone());

    let mut watcher = NoticeWatcher::new(crawler, Box::new(store));
    if let Some(email) = &settings.email {
        watcher = watcher.with_channel(Box::new(EmailChannel::new(email.clone())));
    }
    if let Some(url) = &settings.webhook_url {
        let webhook = WebhookChannel::new(url.clone()).with_timeout(settings.webhook_timeout);
        watcher = watcher.with_channel(Box::new(webhook));
    }
    Ok(watcher)
}
