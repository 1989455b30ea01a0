#![warn(clippy::pedantic)]

pub mod actions;
pub mod app;
pub mod global;
pub mod layout;
pub mod notify;
pub mod order;
pub mod panels;
pub mod surfaces;

use garment_core::{
    engine::{
        canvas::HeadlessCanvas,
        scene::{HeadlessScene, ModelSource},
        EditingEngine,
    },
    storage::{DirectoryStore, KeyValueStore, MemoryStore},
    surface::Side,
};

#[cfg(all(feature = "jemallocator", not(target_env = "msvc")))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

use anyhow::Result as AnyResult;

/// Client storage in the configured directory. Falls back to memory, so the session works
/// even if nothing it saves will outlive it.
fn open_store(settings: &global::config::Settings) -> Box<dyn KeyValueStore> {
    let dir = settings
        .storage_dir
        .clone()
        .or_else(|| DirectoryStore::default_location(env!("CARGO_PKG_NAME")));
    match dir.map(DirectoryStore::open) {
        Some(Ok(store)) => {
            log::debug!("storage at {:?}", store.root());
            Box::new(store)
        }
        Some(Err(e)) => {
            log::warn!("storage unavailable, keeping everything in memory: {e}");
            Box::new(MemoryStore::new())
        }
        None => {
            log::warn!("no data directory, keeping everything in memory");
            Box::new(MemoryStore::new())
        }
    }
}

fn main() -> AnyResult<()> {
    let has_term = std::io::IsTerminal::is_terminal(&std::io::stdin());
    // Log to a terminal, if available. Else, log to "log.out" in the working directory.
    if has_term {
        env_logger::builder()
            .filter_level(log::LevelFilter::Debug)
            .init();
    } else {
        let _ = simple_logging::log_to_file("log.out", log::LevelFilter::Debug);
    }

    let config = global::config::Config::load();
    if config.did_fail_to_load() {
        // Leave a documented file behind for the user to edit.
        if let Err(e) = config.save() {
            log::warn!("couldn't write default settings: {e:#}");
        }
    }
    let settings = &config.settings;

    let mut app = app::App::<HeadlessCanvas, HeadlessScene>::new(
        settings,
        HeadlessScene::new(),
        open_store(settings),
    );
    app.boot();
    if let Some(banner) = app.shell().banner() {
        log::warn!("{banner}");
    }

    // Args are a simple list of design files to open at startup.
    // Without any, the last saved design comes back.
    let paths: Vec<std::path::PathBuf> = std::env::args_os().skip(1).map(Into::into).collect();
    if paths.is_empty() {
        app.restore_saved_design();
    }
    for path in &paths {
        if let Err(e) = app.import_design(path) {
            log::error!("failed to open design {path:?}: {e:#}");
        }
    }
    if let Some(model) = &settings.model {
        let status = app.load_model(&ModelSource::Path(model.clone()));
        log::info!("mockup: {status}");
    }
    app.frame();

    // Without a terminal, stdin is a script of hotkeys, one per line.
    if !has_term {
        for line in std::io::BufRead::lines(std::io::stdin().lock()) {
            let line = line?;
            let key = line.trim();
            if key.is_empty() {
                continue;
            }
            match config.action_for_key(key) {
                Some(action) => app.perform(action),
                None => log::warn!("`{key}` isn't bound to anything"),
            }
            app.frame();
            app.tick(std::time::Instant::now());
        }
    }

    app.save_design();
    let placed = |side| {
        app.surfaces().get(side).map_or(0, |surface| {
            surface
                .elements()
                .iter()
                .filter(|element| element.selectable)
                .count()
        })
    };
    log::info!(
        "{} on the front, {} on the back, estimate {}",
        placed(Side::Front),
        placed(Side::Back),
        app.quote(),
    );
    for notice in app.notices().iter() {
        log::info!("[{}] {}", notice.level, notice.message);
    }
    Ok(())
}
