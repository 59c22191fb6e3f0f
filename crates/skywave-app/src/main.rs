//! Skywave — internet radio directory and player

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use clap::Parser;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use skywave::audio::StreamEngine;
use skywave_app::config::providers::DEFAULT_FETCH_LIMIT;
use skywave_app::data::{
    spawn_cache_primer, spawn_session_writer, Favorites, SessionStore, Station, StationCache,
};
use skywave_app::notify;
use skywave_app::player::{spawn_player, PlayerHandle};
use skywave_app::providers::{Catalog, RadioBrowserDirectory};

/// Skywave — internet radio player
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// Search the directory and play the first match
    #[arg(long)]
    play: Option<String>,

    /// Play a direct stream URL
    #[arg(long)]
    url: Option<String>,

    /// Initial volume (0.0..=1.0)
    #[arg(long)]
    volume: Option<f32>,

    /// Do not restore the previous session
    #[arg(long)]
    no_restore: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let engine = StreamEngine::new()?;
    let (notifier, notifications) = notify::channel();
    let (player, player_thread) = spawn_player(engine, notifier);

    // Print notifications as they arrive
    std::thread::Builder::new()
        .name("notifications".to_string())
        .spawn(move || {
            for note in notifications {
                eprintln!("! {}", note.message);
            }
        })?;

    // Persistence: restore the previous session (without autoplay) and
    // mirror station changes back to disk.
    match SessionStore::new() {
        Ok(session) => {
            if !args.no_restore {
                if let Some(station) = session.restore() {
                    println!("Restored: {} (press p to play)", station.name);
                    player.restore(station);
                }
            }
            spawn_session_writer(session, player.subscribe());
        }
        Err(e) => warn!(error = %e, "session persistence unavailable"),
    }

    let directory = Arc::new(RadioBrowserDirectory::new()?);
    let catalog = Catalog::new(directory.clone());

    // Prime the lookup cache in the background
    match StationCache::new() {
        Ok(cache) => {
            spawn_cache_primer(directory, cache);
        }
        Err(e) => warn!(error = %e, "station cache unavailable"),
    }

    let mut favorites = match Favorites::load() {
        Ok(favorites) => Some(favorites),
        Err(e) => {
            warn!(error = %e, "favorites unavailable");
            None
        }
    };

    if let Some(volume) = args.volume {
        player.set_volume(volume);
    }

    if let Some(url) = &args.url {
        player.load_station(Station::new(url.clone(), url.clone(), url.clone()));
    } else if let Some(query) = &args.play {
        match catalog.search(query, DEFAULT_FETCH_LIMIT).into_iter().next() {
            Some(station) => {
                println!("Playing: {}", station.name);
                player.load_station(station);
            }
            None => println!("No station matched '{query}'"),
        }
    }

    println!("Commands: s <query> = search & play, p = play/pause, +/- = volume,");
    println!("          f = favorite, l = list favorites, i = status, q = quit");

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        let input = line.trim();

        match input {
            "" => {}
            "q" => break,
            "p" => player.toggle_play_pause(),
            "+" => adjust_volume(&player, 0.1),
            "-" => adjust_volume(&player, -0.1),
            "i" => print_status(&player),
            "f" => toggle_favorite(&player, favorites.as_mut()),
            "l" => list_favorites(favorites.as_ref()),
            _ => {
                if let Some(query) = input.strip_prefix("s ") {
                    match catalog.search(query.trim(), DEFAULT_FETCH_LIMIT).into_iter().next() {
                        Some(station) => {
                            println!("Playing: {}", station.name);
                            player.load_station(station);
                        }
                        None => println!("No station matched '{query}'"),
                    }
                } else {
                    println!("Unknown command: {input}");
                }
            }
        }
        io::stdout().flush()?;
    }

    player.shutdown();
    let _ = player_thread.join();
    Ok(())
}

fn adjust_volume(player: &PlayerHandle, delta: f32) {
    let volume = (player.snapshot().volume + delta).clamp(0.0, 1.0);
    player.set_volume(volume);
    println!("Volume: {:.0}%", volume * 100.0);
}

fn print_status(player: &PlayerHandle) {
    let state = player.snapshot();
    match &state.current_station {
        Some(station) => {
            let status = if state.is_loading {
                "loading"
            } else if state.is_playing {
                "playing"
            } else {
                "paused"
            };
            println!(
                "{} [{}] vol {:.0}%",
                station.name,
                status,
                state.volume * 100.0
            );
        }
        None => println!("Nothing loaded"),
    }
}

fn toggle_favorite(player: &PlayerHandle, favorites: Option<&mut Favorites>) {
    let Some(favorites) = favorites else {
        println!("Favorites unavailable");
        return;
    };
    let Some(station) = player.snapshot().current_station else {
        println!("Nothing loaded");
        return;
    };
    match favorites.toggle(&station) {
        Ok(true) => println!("Added favorite: {}", station.name),
        Ok(false) => println!("Removed favorite: {}", station.name),
        Err(e) => warn!(error = %e, "failed to update favorites"),
    }
}

fn list_favorites(favorites: Option<&Favorites>) {
    let Some(favorites) = favorites else {
        println!("Favorites unavailable");
        return;
    };
    if favorites.all().is_empty() {
        println!("No favorites yet");
        return;
    }
    for station in favorites.all() {
        println!("  {} — {}", station.name, station.stream_url);
    }
}
