use clap::{Args, Parser, Subcommand};
use lavaboom::config::DEFAULT_API_URL;
use lavaboom::{
    Body, Client, ClientConfig, ConfigError, ConnectError, Headers, NO_QUERY, RequestError, RequestOptions, Response,
    Subscriber, TransportKind, TransportMode, parse_response_headers,
};
use serde_json::Value;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("connect failed: {0}")]
    Connect(#[from] ConnectError),
    #[error("invalid header `{0}`; expected `Name: value`")]
    InvalidHeader(String),
    #[error("invalid query pair `{0}`; expected `key=value`")]
    InvalidQuery(String),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("server returned {status}: {body}")]
    Rejected { status: u16, body: String },
    #[error("request failed: {0}")]
    Request(RequestError),
    #[error("subscriptions need the socket transport; pass --transport socket")]
    SocketRequired,
    #[error("subscribe to `{0}` refused; is --auth-token set?")]
    SubscribeRefused(String),
    #[error("failed waiting for ctrl-c: {0}")]
    Signal(#[from] std::io::Error),
}

impl From<RequestError> for CliError {
    fn from(error: RequestError) -> Self {
        match error {
            RequestError::Rejected(response) => Self::Rejected { status: response.status, body: render_body(&response.body) },
            other => Self::Request(other),
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "lavaboom", about = "Lavaboom API command line client")]
struct Cli {
    #[arg(long, env = "LAVABOOM_API_URL", default_value = DEFAULT_API_URL)]
    base_url: String,

    #[arg(long, env = "LAVABOOM_API_TOKEN")]
    api_token: Option<String>,

    #[arg(long, env = "LAVABOOM_AUTH_TOKEN")]
    auth_token: Option<String>,

    #[arg(long, env = "LAVABOOM_TRANSPORT", default_value = "auto")]
    transport: TransportMode,

    /// Extra request header, repeatable.
    #[arg(long = "header", value_name = "NAME: VALUE")]
    headers: Vec<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// API index.
    Info,
    Get(QueryArgs),
    Delete(QueryArgs),
    Post(BodyArgs),
    Put(BodyArgs),
    Labels(LabelsCommand),
    Emails(EmailsCommand),
    Tokens(TokensCommand),
    /// Print push events as JSON lines until ctrl-c.
    Subscribe {
        #[arg(required = true)]
        events: Vec<String>,
    },
}

#[derive(Args, Debug)]
struct QueryArgs {
    path: String,
    #[arg(long = "query", value_name = "KEY=VALUE", value_parser = parse_pair)]
    query: Vec<(String, String)>,
}

#[derive(Args, Debug)]
struct BodyArgs {
    path: String,
    #[arg(long, default_value = "null")]
    data: String,
}

#[derive(Args, Debug)]
struct LabelsCommand {
    #[command(subcommand)]
    command: LabelsSubcommand,
}

#[derive(Subcommand, Debug)]
enum LabelsSubcommand {
    List,
    Create { name: String },
    Delete { id: String },
}

#[derive(Args, Debug)]
struct EmailsCommand {
    #[command(subcommand)]
    command: EmailsSubcommand,
}

#[derive(Subcommand, Debug)]
enum EmailsSubcommand {
    List {
        #[arg(long = "query", value_name = "KEY=VALUE", value_parser = parse_pair)]
        query: Vec<(String, String)>,
    },
}

#[derive(Args, Debug)]
struct TokensCommand {
    #[command(subcommand)]
    command: TokensSubcommand,
}

#[derive(Subcommand, Debug)]
enum TokensSubcommand {
    Current,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    let options = RequestOptions { headers: parse_header_flags(&cli.headers)? };

    let mut config = ClientConfig::from_env()?;
    config.base_url = cli.base_url;
    config.api_token = cli.api_token;
    config.auth_token = cli.auth_token;
    config.transport = cli.transport;
    let client = Client::connect(config).await?;

    let result = run(&client, cli.command, options).await;
    client.close();
    result
}

async fn run(client: &Client, command: Command, options: RequestOptions) -> Result<(), CliError> {
    let response = match command {
        Command::Info => client.info().await?,
        Command::Get(args) => client.get(&args.path, &args.query, options).await?,
        Command::Delete(args) => client.delete(&args.path, &args.query, options).await?,
        Command::Post(args) => {
            let body = serde_json::from_str::<Value>(&args.data)?;
            client.post(&args.path, &body, options).await?
        }
        Command::Put(args) => {
            let body = serde_json::from_str::<Value>(&args.data)?;
            client.put(&args.path, &body, options).await?
        }
        Command::Labels(labels) => match labels.command {
            LabelsSubcommand::List => client.labels().list().await?,
            LabelsSubcommand::Create { name } => client.labels().create(&name).await?,
            LabelsSubcommand::Delete { id } => client.labels().delete(&id).await?,
        },
        Command::Emails(emails) => match emails.command {
            EmailsSubcommand::List { query } => client.emails().list(&query).await?,
        },
        Command::Tokens(tokens) => match tokens.command {
            TokensSubcommand::Current => client.tokens().get_current().await?,
        },
        Command::Subscribe { events } => return run_subscribe(client, &events).await,
    };

    print_response(&response);
    Ok(())
}

async fn run_subscribe(client: &Client, events: &[String]) -> Result<(), CliError> {
    if client.transport_kind() != TransportKind::Socket {
        return Err(CliError::SocketRequired);
    }

    let printer = Subscriber::new(|frame| println!("{frame}"));
    for event in events {
        if !client.subscribe(event, printer.clone()) {
            return Err(CliError::SubscribeRefused(event.clone()));
        }
    }

    tokio::signal::ctrl_c().await?;
    Ok(())
}

// =============================================================================
// HELPERS
// =============================================================================

fn parse_pair(raw: &str) -> Result<(String, String), CliError> {
    raw.split_once('=')
        .map(|(k, v)| (k.to_owned(), v.to_owned()))
        .ok_or_else(|| CliError::InvalidQuery(raw.to_owned()))
}

fn parse_header_flags(flags: &[String]) -> Result<Headers, CliError> {
    let mut headers = Headers::new();
    for flag in flags {
        let parsed = parse_response_headers(flag);
        if parsed.is_empty() {
            return Err(CliError::InvalidHeader(flag.clone()));
        }
        headers.extend(parsed);
    }
    Ok(headers)
}

fn render_body(body: &Body) -> String {
    match body {
        Body::Json(value) => serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string()),
        Body::Malformed { raw, .. } => raw.clone(),
    }
}

fn print_response(response: &Response) {
    println!("{}", render_body(&response.body));
}

#[cfg(test)]
#[path = "main_test.rs"]
mod tests;
