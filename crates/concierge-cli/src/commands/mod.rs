//! Slash commands for interactive mode

use concierge_core::QuickPrompt;

/// Result of parsing a slash command
#[derive(Debug, Clone, PartialEq)]
pub enum CommandResult {
    /// Show a message to the user (not sent to the concierge)
    Message(String),
    /// List saved trips
    ListTrips,
    /// Load a saved trip by id or name
    LoadTrip(String),
    /// Save the itinerary; prompt for a name when missing
    SaveTrip(Option<String>),
    /// Print the itinerary buffer
    ShowItinerary,
    /// Open the itinerary editor (TUI only)
    EditItinerary,
    /// Read the itinerary from stdin until a line with "."
    PasteItinerary,
    /// Empty the itinerary buffer
    ClearItinerary,
    /// Summarize the itinerary
    Summary,
    /// Fetch a forecast
    Weather { lat: f64, lon: f64 },
    /// List image links of the latest answer
    ListImages,
    /// Open the n-th (1-based) image of the latest answer
    OpenImage(usize),
    /// Send a canned prompt
    Quick(QuickPrompt),
    /// Exit the application
    Exit,
    /// Known command with bad arguments; carries the usage line
    Usage(&'static str),
    /// Unknown command
    Unknown(String),
}

/// Parse a slash command. Returns `None` for regular chat input.
pub fn execute_command(input: &str) -> Option<CommandResult> {
    let input = input.trim();
    let rest = input.strip_prefix('/')?;

    let (command, args) = match rest.split_once(char::is_whitespace) {
        Some((command, args)) => (command.to_lowercase(), args.trim()),
        None => (rest.to_lowercase(), ""),
    };
    let arg = (!args.is_empty()).then(|| args.to_string());

    Some(match command.as_str() {
        "help" | "h" | "?" => CommandResult::Message(help_message()),

        "trips" | "t" => CommandResult::ListTrips,

        "load" | "l" => match arg {
            Some(query) => CommandResult::LoadTrip(query),
            None => CommandResult::Usage("/load <id|name>"),
        },

        "save" | "s" => CommandResult::SaveTrip(arg),

        "itinerary" | "i" => CommandResult::ShowItinerary,

        "edit" | "e" => CommandResult::EditItinerary,

        "paste" | "p" => CommandResult::PasteItinerary,

        "clear-itinerary" => CommandResult::ClearItinerary,

        "summary" => CommandResult::Summary,

        "weather" | "w" => parse_weather(args),

        "images" => CommandResult::ListImages,

        "open" | "o" => match args.parse::<usize>() {
            Ok(n) if n > 0 => CommandResult::OpenImage(n),
            _ => CommandResult::Usage("/open <n>"),
        },

        "quit" | "exit" | "q" => CommandResult::Exit,

        other => match QuickPrompt::from_name(other) {
            Some(prompt) => CommandResult::Quick(prompt),
            None => CommandResult::Unknown(command),
        },
    })
}

fn parse_weather(args: &str) -> CommandResult {
    const USAGE: &str = "/weather <lat> <lon>";
    let mut parts = args
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|s| !s.is_empty());
    let (Some(lat), Some(lon), None) = (parts.next(), parts.next(), parts.next()) else {
        return CommandResult::Usage(USAGE);
    };
    match (lat.parse::<f64>(), lon.parse::<f64>()) {
        (Ok(lat), Ok(lon)) => CommandResult::Weather { lat, lon },
        _ => CommandResult::Usage(USAGE),
    }
}

fn help_message() -> String {
    r#"Available commands:
  /help, /h, /?            Show this help message
  /trips, /t               List saved trips
  /load, /l <id|name>      Load a saved trip into the itinerary
  /save, /s [name]         Save the itinerary as a trip
  /itinerary, /i           Show the itinerary
  /edit, /e                Edit the itinerary (TUI)
  /paste, /p               Paste a new itinerary, end with a line containing "."
  /clear-itinerary         Empty the itinerary
  /summary                 Summarize the itinerary
  /weather, /w <lat> <lon> Hourly forecast for a location
  /images                  List images from the latest answer
  /open, /o <n>            Open an image in the browser
  /morning /budget /family Send a quick prompt
  /quit, /exit, /q         Exit

Examples:
  /load dubai              Load the trip named "Dubai"
  /save Lisbon weekend     Save the itinerary as "Lisbon weekend"
  /weather 25.2 55.27      Forecast for Dubai"#
        .to_string()
}
