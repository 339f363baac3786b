//! concierge - terminal client for the Trip Concierge travel assistant

mod commands;
mod config;
mod ui;
mod utils;

use std::io::{self, IsTerminal, Write};
use std::path::Path;
use std::sync::Arc;

use clap::Parser;
use concierge_api::{Backend, HttpBackend};
use concierge_core::{Concierge, ConciergeConfig, ConciergeEvent, Submission};
use concierge_tui::Theme;
use tokio::sync::broadcast;
use tracing_subscriber::EnvFilter;

use commands::{CommandResult, execute_command};
use utils::{event_notice, format_trips, open_in_browser, strip_line_ending};

/// concierge - chat with the Trip Concierge about your itinerary
#[derive(Parser, Debug)]
#[command(name = "concierge")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Backend base URL (default: http://localhost:8000)
    #[arg(long)]
    backend_url: Option<String>,

    /// Path of the chat endpoint (default: /api/chat)
    #[arg(long)]
    chat_path: Option<String>,

    /// Ask a single question, print the answer and exit
    #[arg(short = 'c', long)]
    command: Option<String>,

    /// Preload the itinerary from a file
    #[arg(long)]
    itinerary: Option<std::path::PathBuf>,

    /// Preload a saved trip by id or name
    #[arg(long)]
    trip: Option<String>,

    /// List saved trips and exit
    #[arg(long)]
    trips: bool,

    /// Disable TUI mode (use simple stdin/stdout)
    #[arg(long)]
    no_tui: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Initialize config file
    #[arg(long)]
    init_config: bool,
}

/// Install the tracing subscriber. TUI mode logs to a file so the screen stays intact.
fn init_tracing(verbose: bool, to_file: bool) {
    let filter = if verbose {
        EnvFilter::new("concierge=debug")
    } else {
        match EnvFilter::try_from_default_env() {
            Ok(filter) => filter,
            // Nothing requested; keep the terminal quiet
            Err(_) => return,
        }
    };

    if to_file {
        let Some(dir) = dirs::data_local_dir().map(|d| d.join("trip-concierge")) else {
            return;
        };
        if std::fs::create_dir_all(&dir).is_err() {
            return;
        }
        let Ok(file) = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(dir.join("concierge.log"))
        else {
            return;
        };
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(Arc::new(file))
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize config and exit
    if args.init_config {
        match config::Config::init() {
            Ok(path) => {
                println!("Config file created at: {}", path.display());
                println!("\nExample config:\n{}", config::example_config());
            }
            Err(e) => {
                eprintln!("Error creating config: {}", e);
                std::process::exit(1);
            }
        }
        return Ok(());
    }

    let cfg = config::Config::load();

    let interactive = args.command.is_none() && !args.trips;
    let use_tui = interactive
        && !args.no_tui
        && cfg.tui.unwrap_or(true)
        && io::stdout().is_terminal();
    init_tracing(args.verbose, use_tui);

    // Merge config with CLI args (CLI takes precedence)
    let backend_config = cfg.backend_config(args.backend_url.as_deref(), args.chat_path.as_deref());
    let http = HttpBackend::with_config(backend_config)?;
    let backend_label = http.base_url().to_string();
    let backend: Arc<dyn Backend> = Arc::new(http);
    let mut concierge = Concierge::with_config(ConciergeConfig::default(), backend);

    if args.trips {
        concierge.refresh_trips().await;
        println!("{}", format_trips(concierge.trips()));
        return Ok(());
    }

    // Preload the itinerary buffer
    if let Some(path) = args.itinerary.as_ref().or(cfg.itinerary_file.as_ref()) {
        match read_itinerary(path) {
            Ok(text) => concierge.set_itinerary(text),
            Err(e) => {
                eprintln!("Error reading itinerary {}: {}", path.display(), e);
                std::process::exit(1);
            }
        }
    }

    let mut events = concierge.subscribe();

    if let Some(query) = args.trip.as_deref() {
        concierge.refresh_trips().await;
        let id = resolve_trip_id(&concierge, query);
        concierge.load_trip(&id).await;
        if !print_notices(&mut events) {
            std::process::exit(1);
        }
    }

    // Non-interactive mode
    if let Some(command) = args.command {
        return run_command(&mut concierge, &mut events, &command).await;
    }

    if use_tui {
        let theme = cfg
            .theme
            .as_deref()
            .and_then(Theme::from_name)
            .unwrap_or_default();
        return ui::run_tui(concierge, theme, &backend_label).await;
    }

    run_interactive(&mut concierge, &mut events).await
}

fn read_itinerary(path: &Path) -> io::Result<String> {
    std::fs::read_to_string(path)
}

/// Map a `--trip`/`/load` argument to a trip id; unknown names are tried as ids
fn resolve_trip_id(concierge: &Concierge, query: &str) -> String {
    concierge
        .find_trip(query)
        .map(|t| t.id.clone())
        .unwrap_or_else(|| query.trim().to_string())
}

/// Print queued notices; returns false if any of them was an error
fn print_notices(events: &mut broadcast::Receiver<ConciergeEvent>) -> bool {
    let mut ok = true;
    loop {
        match events.try_recv() {
            Ok(event) => {
                if let Some(notice) = event_notice(&event) {
                    if notice.is_error {
                        ok = false;
                        eprintln!("{}", notice.text);
                    } else {
                        println!("{}", notice.text);
                    }
                }
            }
            Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
            Err(_) => break,
        }
    }
    ok
}

/// Print assistant answers and notices produced since the last call
fn print_events(events: &mut broadcast::Receiver<ConciergeEvent>) {
    loop {
        match events.try_recv() {
            Ok(ConciergeEvent::MessageAppended { message }) if message.is_assistant() => {
                println!("{}", message.content);
                for (i, url) in message.images.iter().enumerate() {
                    println!("  [{}] {}", i + 1, url);
                }
            }
            Ok(ConciergeEvent::PlacesDetected { places }) => {
                println!("[Places: {}]", places.join(", "));
            }
            Ok(event) => {
                if let Some(notice) = event_notice(&event) {
                    if notice.is_error {
                        eprintln!("{}", notice.text);
                    } else {
                        println!("{}", notice.text);
                    }
                }
            }
            Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "dropped concierge events");
            }
            Err(_) => break,
        }
    }
}

async fn run_command(
    concierge: &mut Concierge,
    events: &mut broadcast::Receiver<ConciergeEvent>,
    command: &str,
) -> anyhow::Result<()> {
    if let Submission::Rejected = concierge.submit(command).await {
        anyhow::bail!("nothing to send");
    }
    print_events(events);
    Ok(())
}

/// Read itinerary lines from stdin until a line containing only "."
fn read_pasted_itinerary() -> io::Result<String> {
    let mut lines = vec![];
    loop {
        let mut line = String::new();
        if io::stdin().read_line(&mut line)? == 0 {
            break;
        }
        let line = strip_line_ending(&line);
        if line == "." {
            break;
        }
        lines.push(line.to_string());
    }
    Ok(lines.join("\n"))
}

async fn handle_line_command(
    concierge: &mut Concierge,
    result: CommandResult,
) -> io::Result<bool> {
    match result {
        CommandResult::Message(msg) => println!("{}", msg),
        CommandResult::ListTrips => {
            concierge.refresh_trips().await;
            println!("{}", format_trips(concierge.trips()));
        }
        CommandResult::LoadTrip(query) => {
            if concierge.trips().is_empty() {
                concierge.refresh_trips().await;
            }
            let id = resolve_trip_id(concierge, &query);
            concierge.load_trip(&id).await;
        }
        CommandResult::SaveTrip(Some(name)) => concierge.save_trip(&name).await,
        CommandResult::SaveTrip(None) => {
            print!("Trip name: ");
            io::stdout().flush()?;
            let mut name = String::new();
            io::stdin().read_line(&mut name)?;
            if name.trim().is_empty() {
                println!("Not saved.");
            } else {
                concierge.save_trip(&name).await;
            }
        }
        CommandResult::ShowItinerary => {
            let itinerary = concierge.conversation().itinerary();
            if itinerary.trim().is_empty() {
                println!("Itinerary is empty. Use /paste to enter one.");
            } else {
                println!("{}", itinerary);
            }
        }
        CommandResult::EditItinerary | CommandResult::PasteItinerary => {
            println!("Paste the itinerary, then a line with a single \".\":");
            let text = read_pasted_itinerary()?;
            concierge.set_itinerary(text);
            println!("Itinerary updated.");
        }
        CommandResult::ClearItinerary => {
            concierge.set_itinerary("");
            println!("Itinerary cleared.");
        }
        CommandResult::Summary => match concierge.begin_summary() {
            Some(request) => concierge.run(request).await,
            None => println!("Itinerary is empty, nothing to summarize."),
        },
        CommandResult::Weather { lat, lon } => match concierge.begin_forecast(lat, lon) {
            Some(request) => concierge.run(request).await,
            None => println!("Invalid coordinates: {}, {}", lat, lon),
        },
        CommandResult::ListImages => {
            let snapshot = concierge.snapshot();
            let images = snapshot.latest_images();
            if images.is_empty() {
                println!("No images yet.");
            }
            for (i, url) in images.iter().enumerate() {
                println!("  [{}] {}", i + 1, url);
            }
        }
        CommandResult::OpenImage(n) => {
            let snapshot = concierge.snapshot();
            match snapshot.latest_images().get(n - 1) {
                Some(url) => {
                    if let Err(e) = open_in_browser(url) {
                        println!("Could not open image, visit: {} ({})", url, e);
                    }
                }
                None => println!("No image {}.", n),
            }
        }
        CommandResult::Quick(prompt) => {
            println!("> {}", prompt.text());
            concierge.quick_submit(prompt).await;
        }
        CommandResult::Exit => return Ok(false),
        CommandResult::Usage(usage) => println!("Usage: {}", usage),
        CommandResult::Unknown(cmd) => {
            println!("Unknown command: /{}", cmd);
            println!("Type /help for available commands.");
        }
    }
    Ok(true)
}

async fn run_interactive(
    concierge: &mut Concierge,
    events: &mut broadcast::Receiver<ConciergeEvent>,
) -> anyhow::Result<()> {
    // Show minimal startup info (only if TTY)
    if io::stderr().is_terminal() {
        eprintln!("Trip Concierge. Type /help for commands.");
        eprintln!();
    }

    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            // EOF
            break;
        }

        // Commands are matched trimmed; chat text is sent as typed
        let line = strip_line_ending(&input);
        if line.trim().is_empty() {
            continue;
        }

        if let Some(result) = execute_command(line) {
            let keep_going = handle_line_command(concierge, result).await?;
            print_events(events);
            if !keep_going {
                break;
            }
            println!();
            continue;
        }

        concierge.submit(line).await;
        print_events(events);
        println!();
    }

    Ok(())
}
