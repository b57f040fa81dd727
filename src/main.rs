use capture_desk::controllers::bridge::{
    bridge_channel, BridgeRequest, BridgeResponse, DesktopServices,
};
use capture_desk::controllers::oauth_callback::callback_routes;
use capture_desk::domain::capture::{
    CaptureApi, CaptureKind, CapturePayload, CaptureStatus, CaptureSubmitter, WindowContext,
};
use capture_desk::domain::oauth::OAuthBroker;
use capture_desk::domain::session::AuthSessionManager;
use capture_desk::infrastructure::browser::SystemBrowser;
use capture_desk::infrastructure::config::{Config, LogFormat};
use capture_desk::infrastructure::http::BackendGateway;
use capture_desk::infrastructure::store::FileTokenStore;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const USAGE: &str = "usage: capture-desk <command>

commands:
  login                      sign in through the browser
  logout                     forget the local session
  whoami                     show the signed-in user
  status                     show whether a live session exists
  captures [--kind K] [--status S] [--search Q] [--oldest]
  capture  [--text T] [--screenshot PATH] [--audio PATH]
           [--app NAME] [--title TITLE] [--url URL]
  show <id>                  print one capture as JSON
  delete <id>                delete one capture";

#[derive(Debug, PartialEq)]
enum Command {
    Login,
    Logout,
    WhoAmI,
    Status,
    Captures {
        kind: Option<CaptureKind>,
        status: Option<CaptureStatus>,
        search: Option<String>,
        oldest_first: bool,
    },
    Capture {
        text: Option<String>,
        screenshot: Option<String>,
        audio: Option<String>,
        app: String,
        title: String,
        url: Option<String>,
    },
    Show(String),
    Delete(String),
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let command = match parse_command(std::env::args().skip(1).collect()) {
        Ok(command) => command,
        Err(message) => {
            eprintln!("{}\n\n{}", message, USAGE);
            std::process::exit(2);
        }
    };

    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    init_logging(&config);

    tracing::debug!(
        backend_url = %config.backend_url,
        data_dir = %config.data_dir.display(),
        "Starting capture-desk"
    );

    // === DEPENDENCY INJECTION SETUP ===
    let store = Arc::new(FileTokenStore::new(&config.data_dir));
    let sessions = Arc::new(AuthSessionManager::new(store));
    let gateway = Arc::new(
        BackendGateway::new(
            config.backend_url.clone(),
            sessions.clone(),
            config.http_timeout(),
        )?
        .with_upload_timeout(config.upload_timeout()),
    );
    let submitter = Arc::new(CaptureSubmitter::new(gateway.clone()));
    let captures = Arc::new(CaptureApi::new(gateway.clone()));
    let broker = Arc::new(OAuthBroker::new(
        config.oauth(),
        Arc::new(SystemBrowser),
        callback_routes,
    ));
    let services = Arc::new(DesktopServices::new(
        sessions, broker, gateway, submitter, captures,
    ));

    let (client, server) = bridge_channel(16);
    let bridge = tokio::spawn(server.run(services));

    let response = client.request(into_request(command, &config)).await?;
    drop(client);
    bridge.await?;

    match response {
        BridgeResponse::Failed { error } => {
            eprintln!("{}", error.message);
            if error.reauth_required {
                eprintln!("Run `capture-desk login` to sign in.");
            }
            std::process::exit(1);
        }
        response => print_response(response)?,
    }

    Ok(())
}

fn init_logging(config: &Config) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| config.default_log_filter().into());

    // stdout is reserved for command output
    if config.log_format == LogFormat::Json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().pretty().with_writer(std::io::stderr))
            .init();
    }
}

fn parse_command(args: Vec<String>) -> Result<Command, String> {
    let mut args = args.into_iter();
    let name = args.next().ok_or_else(|| "missing command".to_string())?;
    let rest: Vec<String> = args.collect();

    match name.as_str() {
        "login" => no_arguments(&rest).map(|_| Command::Login),
        "logout" => no_arguments(&rest).map(|_| Command::Logout),
        "whoami" => no_arguments(&rest).map(|_| Command::WhoAmI),
        "status" => no_arguments(&rest).map(|_| Command::Status),
        "captures" => {
            let mut options = Options::parse(&rest, &["--oldest"])?;
            let command = Command::Captures {
                kind: options.take("--kind").map(|k| k.parse()).transpose()?,
                status: options.take("--status").map(|s| s.parse()).transpose()?,
                search: options.take("--search"),
                oldest_first: options.flag("--oldest"),
            };
            options.finish()?;
            Ok(command)
        }
        "capture" => {
            let mut options = Options::parse(&rest, &[])?;
            let command = Command::Capture {
                text: options.take("--text"),
                screenshot: options.take("--screenshot"),
                audio: options.take("--audio"),
                app: options.take("--app").unwrap_or_else(|| "Terminal".to_string()),
                title: options.take("--title").unwrap_or_default(),
                url: options.take("--url"),
            };
            options.finish()?;
            Ok(command)
        }
        "show" => single_id(&rest).map(Command::Show),
        "delete" => single_id(&rest).map(Command::Delete),
        other => Err(format!("unknown command: {}", other)),
    }
}

fn no_arguments(rest: &[String]) -> Result<(), String> {
    match rest.first() {
        Some(arg) => Err(format!("unexpected argument: {}", arg)),
        None => Ok(()),
    }
}

fn single_id(rest: &[String]) -> Result<String, String> {
    match rest {
        [id] => Ok(id.clone()),
        [] => Err("missing capture id".to_string()),
        _ => Err("expected exactly one capture id".to_string()),
    }
}

/// `--name value` pairs plus bare flags
struct Options {
    values: Vec<(String, String)>,
    flags: Vec<String>,
}

impl Options {
    fn parse(args: &[String], known_flags: &[&str]) -> Result<Self, String> {
        let mut values = Vec::new();
        let mut flags = Vec::new();
        let mut args = args.iter();

        while let Some(arg) = args.next() {
            if !arg.starts_with("--") {
                return Err(format!("unexpected argument: {}", arg));
            }
            if known_flags.contains(&arg.as_str()) {
                flags.push(arg.clone());
                continue;
            }
            let value = args
                .next()
                .ok_or_else(|| format!("missing value for {}", arg))?;
            values.push((arg.clone(), value.clone()));
        }

        Ok(Self { values, flags })
    }

    fn take(&mut self, name: &str) -> Option<String> {
        let index = self.values.iter().position(|(key, _)| key == name)?;
        Some(self.values.remove(index).1)
    }

    fn flag(&mut self, name: &str) -> bool {
        let before = self.flags.len();
        self.flags.retain(|flag| flag != name);
        before != self.flags.len()
    }

    fn finish(self) -> Result<(), String> {
        match self.values.first().map(|(key, _)| key).or(self.flags.first()) {
            Some(unknown) => Err(format!("unknown option: {}", unknown)),
            None => Ok(()),
        }
    }
}

fn into_request(command: Command, config: &Config) -> BridgeRequest {
    match command {
        Command::Login => BridgeRequest::Login,
        Command::Logout => BridgeRequest::Logout,
        Command::WhoAmI => BridgeRequest::CurrentUser,
        Command::Status => BridgeRequest::AuthStatus,
        Command::Captures {
            kind,
            status,
            search,
            oldest_first,
        } => BridgeRequest::ListCaptures {
            kind,
            status,
            search,
            oldest_first,
        },
        Command::Capture {
            text,
            screenshot,
            audio,
            app,
            title,
            url,
        } => {
            let context = WindowContext::now(app, title, url, config.timezone.clone());
            let mut payload = CapturePayload::new(context);
            if let Some(path) = screenshot {
                payload = payload.with_screenshot(path);
            }
            if let Some(path) = audio {
                payload = payload.with_audio(path);
            }
            if let Some(text) = text {
                payload = payload.with_text_note(text);
            }
            BridgeRequest::SubmitCapture { payload }
        }
        Command::Show(id) => BridgeRequest::CaptureDetail { id },
        Command::Delete(id) => BridgeRequest::DeleteCapture { id },
    }
}

fn print_response(response: BridgeResponse) -> Result<(), serde_json::Error> {
    match response {
        BridgeResponse::LoggedIn { user } => println!("Signed in as {}", user.email),
        BridgeResponse::LoggedOut => println!("Signed out"),
        BridgeResponse::CurrentUser { user: Some(user) } => match user.display_name {
            Some(name) => println!("{} <{}>", name, user.email),
            None => println!("{}", user.email),
        },
        BridgeResponse::CurrentUser { user: None } => println!("Not signed in"),
        BridgeResponse::AuthStatus { authenticated } => {
            println!("{}", if authenticated { "authenticated" } else { "signed out" })
        }
        BridgeResponse::CaptureSubmitted { capture_id } => println!("Captured {}", capture_id),
        BridgeResponse::Captures { captures } => {
            if captures.is_empty() {
                println!("No captures");
            }
            for capture in captures {
                println!(
                    "{}  {:<10}  {:<10}  {}  {}",
                    capture.id,
                    capture.kind,
                    capture.status,
                    capture.created_at.format("%Y-%m-%d %H:%M"),
                    capture.title.unwrap_or_default()
                );
            }
        }
        BridgeResponse::CaptureDetail { capture } => {
            println!("{}", serde_json::to_string_pretty(&capture)?)
        }
        BridgeResponse::CaptureDeleted { id } => println!("Deleted {}", id),
        BridgeResponse::Failed { error } => eprintln!("{}", error.message),
    }
    Ok(())
}
