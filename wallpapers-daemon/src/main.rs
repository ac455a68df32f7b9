use anyhow::Result;
use std::sync::{Arc, Mutex, MutexGuard};
use wallpapers_common::{
    Collaborators, DesktopSetter, ErrorReporting, GuiModel, HttpUpstream, ImageCache, IpcCommand, IpcResponse,
    IpcServer, Levenshtein, Outbox, Provider, Selector, SkillSettings, Titles, Transcript, Vocabulary,
    WallpaperSkill, WebTranslator,
};
use wallpapers_config::Config;

struct Daemon {
    skill: WallpaperSkill,
    provider: Provider,
    speech: Transcript,
    outbox: Outbox,
}

impl Daemon {
    /// Everything said and announced since the last drain.
    fn handled(&mut self) -> IpcResponse {
        IpcResponse::Handled {
            speech: self.speech.drain(),
            events: self.outbox.drain(),
            current: self.skill.current(),
        }
    }

    fn reload(&mut self) -> IpcResponse {
        let settings = match Config::load() {
            Ok(config) => config.into_settings(),
            Err(e) => {
                log::error!("Failed to reload configuration: {}", e.user_friendly_message());
                return IpcResponse::Error {
                    message: format!("Failed to reload configuration: {}", e.user_friendly_message()),
                };
            }
        };

        let vocabulary = match load_vocabulary(&settings) {
            Ok(vocabulary) => vocabulary,
            Err(e) => {
                log::error!("Failed to reload vocabulary: {}", e.user_friendly_message());
                return IpcResponse::Error {
                    message: e.user_friendly_message(),
                };
            }
        };

        if settings.selector.endpoints != self.skill.settings().selector.endpoints {
            log::warn!("Endpoint changes take effect after a daemon restart");
        }

        self.skill.reload(settings, vocabulary);
        log::info!("Configuration reloaded");
        IpcResponse::Success {
            message: "Configuration reloaded successfully".to_string(),
        }
    }
}

fn lock(daemon: &Mutex<Daemon>) -> MutexGuard<'_, Daemon> {
    match daemon.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            log::warn!("Recovering from a panicked intent handler");
            poisoned.into_inner()
        }
    }
}

fn load_vocabulary(settings: &SkillSettings) -> wallpapers_common::Result<Vocabulary> {
    match &settings.vocab_dir {
        Some(root) => Vocabulary::load(
            &Vocabulary::lang_dir(root, &settings.lang),
            &settings.selector.channels,
        ),
        None => Ok(Vocabulary::derived(&settings.selector.channels)),
    }
}

/// Wire the skill to the network, the desktop and the in-process seams.
fn build_daemon(settings: SkillSettings) -> Result<Daemon> {
    let upstream = HttpUpstream::new(settings.selector.endpoints.clone())
        .map_err(|e| anyhow::anyhow!("Failed to create HTTP client: {}", e))?;
    let client = upstream.client().clone();

    let vocabulary = load_vocabulary(&settings).map_err(|e| {
        log::error!("Vocabulary error: {}", e.user_friendly_message());
        anyhow::anyhow!("Vocabulary error: {}", e.user_friendly_message())
    })?;

    let cache_dir = match &settings.cache_dir {
        Some(dir) => dir.clone(),
        None => ImageCache::default_dir().map_err(|e| anyhow::anyhow!("{}", e.user_friendly_message()))?,
    };
    log::info!("Caching wallpapers in {:?}", cache_dir);
    let cache = ImageCache::new(cache_dir, client.clone(), settings.cache_max_files);

    let selector = Selector::new(
        Arc::new(settings.selector.clone()),
        Box::new(upstream),
        vocabulary,
        Box::new(Levenshtein),
    );
    let titles = Titles::new(settings.lang.clone(), Some(Box::new(WebTranslator::new(client))));

    let speech = Transcript::new();
    let outbox = Outbox::new();
    let skill = WallpaperSkill::new(
        settings,
        selector,
        titles,
        Collaborators {
            surface: Box::new(GuiModel::new()),
            speaker: Box::new(speech.clone()),
            setter: Box::new(DesktopSetter::new(cache)),
            announcer: Box::new(outbox.clone()),
        },
    );

    Ok(Daemon {
        skill,
        provider: Provider::default(),
        speech,
        outbox,
    })
}

fn handle_ipc_command(command: IpcCommand, daemon: &Mutex<Daemon>) -> IpcResponse {
    let mut guard = lock(daemon);
    let daemon = &mut *guard;

    // Drop anything left over from the rotation timer.
    daemon.speech.drain();
    daemon.outbox.drain();

    let result = match command {
        IpcCommand::RandomPicture => daemon.skill.random_picture(),
        IpcCommand::RandomWallpaper => daemon.skill.random_wallpaper().map(|_| ()),
        IpcCommand::PictureAbout { query } => daemon.skill.picture_about(&query),
        IpcCommand::WallpaperAbout { query } => daemon.skill.wallpaper_about(&query).map(|_| ()),
        IpcCommand::Next => daemon.skill.next().map(|_| ()),
        IpcCommand::Previous => daemon.skill.previous().map(|_| ()),
        IpcCommand::SetCurrent => daemon.skill.set_current().map(|_| ()),
        IpcCommand::Idle => daemon.skill.idle(),
        IpcCommand::Homepage => daemon.skill.homepage(),
        IpcCommand::Intro => {
            daemon.skill.intro();
            Ok(())
        }
        IpcCommand::Bus { message } => daemon.provider.handle(&message, &mut daemon.skill).map(|_| ()),
        IpcCommand::Reload => return daemon.reload(),
        IpcCommand::Status => {
            let settings = daemon.skill.settings();
            let rotate_every = settings
                .rotate_wallpaper
                .then(|| humantime::format_duration(settings.rotate_every).to_string());
            return IpcResponse::Status {
                skill: daemon.skill.status(),
                rotate_every,
            };
        }
    };

    match result {
        Ok(()) => daemon.handled(),
        Err(e) => {
            e.log_error("Intent failed");
            IpcResponse::Error {
                message: e.user_friendly_message(),
            }
        }
    }
}

fn rotate(daemon: &Mutex<Daemon>) {
    let mut daemon = lock(daemon);
    match daemon.skill.random_wallpaper() {
        Ok(true) => log::info!("Rotated wallpaper"),
        Ok(false) => log::warn!("Rotation picked a wallpaper but could not apply it"),
        Err(e) => log::error!("Rotation failed: {}", e.user_friendly_message()),
    }
    daemon.speech.drain();
    daemon.outbox.drain();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    log::info!("Starting wallpapers daemon...");

    let config = Config::load().map_err(|e| {
        log::error!("Configuration error: {}", e.user_friendly_message());
        anyhow::anyhow!("Configuration error: {}", e.user_friendly_message())
    })?;
    let settings = config.into_settings();
    log::info!(
        "Configuration loaded: {} channels enabled, language {}",
        settings.selector.channels.enabled().count(),
        settings.lang
    );

    // The blocking HTTP client must be built outside the async context.
    let daemon = tokio::task::spawn_blocking(move || build_daemon(settings)).await??;
    daemon.provider.register(&daemon.skill);
    let daemon = Arc::new(Mutex::new(daemon));

    let server = IpcServer::new();
    let socket_path = server.socket_path().to_path_buf();
    let listener = server.bind()?;
    let ipc_daemon = Arc::clone(&daemon);
    std::thread::spawn(move || {
        if let Err(e) = IpcServer::serve(listener, move |cmd| Ok(handle_ipc_command(cmd, &ipc_daemon))) {
            log::error!("IPC server error: {}", e);
        }
    });

    log::info!("Daemon started");

    tokio::select! {
        _ = rotation_loop(Arc::clone(&daemon)) => {}
        result = tokio::signal::ctrl_c() => {
            if let Err(e) = result {
                log::error!("Failed to listen for shutdown signal: {}", e);
            }
            log::info!("Shutting down");
        }
    }

    if let Err(e) = std::fs::remove_file(&socket_path) {
        log::debug!("Could not remove socket {:?}: {}", socket_path, e);
    }
    Ok(())
}

/// Change the wallpaper every `rotate_every` while rotation is enabled.
/// Settings are re-read each round so a reload takes effect.
async fn rotation_loop(daemon: Arc<Mutex<Daemon>>) {
    loop {
        let (enabled, every) = {
            let guard = lock(&daemon);
            let settings = guard.skill.settings();
            (settings.rotate_wallpaper, settings.rotate_every)
        };

        tokio::time::sleep(every).await;
        if !enabled {
            continue;
        }

        let daemon = Arc::clone(&daemon);
        if let Err(e) = tokio::task::spawn_blocking(move || rotate(&daemon)).await {
            log::error!("Rotation task failed: {}", e);
        }
    }
}
