use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use forward_gateway::auth::{derive_key, KeyValidator};

#[derive(Parser)]
#[command(name = "gateway-cli")]
#[command(about = "Client tool for the forwarding gateway", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the caller key for a seed (today, UTC, unless --date is given)
    Key {
        #[arg(long)]
        seed: String,
        /// Day as YYYY-MM-DD
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Check the gateway is up
    Ping,
    /// Send a request through the gateway
    Forward {
        /// Outbound method (GET, POST or PUT)
        #[arg(short = 'X', long, default_value = "GET")]
        method: String,
        /// Upstream URL
        target: String,
        /// Seed used to derive today's caller key
        #[arg(long)]
        seed: Option<String>,
        /// Indirection header as NAME=KEY_ID, repeatable
        #[arg(short = 'H', long = "secret-header", value_parser = parse_secret_header)]
        secret_headers: Vec<(String, String)>,
        /// Request body
        #[arg(short, long)]
        data: Option<String>,
    },
}

fn parse_secret_header(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(name, key_id)| (name.to_string(), key_id.to_string()))
        .ok_or_else(|| format!("expected NAME=KEY_ID, got {raw:?}"))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    match cli.command {
        Commands::Key { seed, date } => {
            let key = match date {
                Some(date) => derive_key(date, &seed),
                None => KeyValidator::new(seed).current_key(),
            };
            println!("{key}");
        }
        Commands::Ping => {
            let res = client.get(format!("{}/v1/ping", cli.url)).send().await?;
            print_response(res).await?;
        }
        Commands::Forward {
            method,
            target,
            seed,
            secret_headers,
            data,
        } => {
            let mut headers = HeaderMap::new();
            headers.insert("x-request-method", HeaderValue::from_str(&method)?);
            headers.insert("x-request-url", HeaderValue::from_str(&target)?);
            if let Some(seed) = seed {
                let key = KeyValidator::new(seed).current_key();
                headers.insert("x-request-key", HeaderValue::from_str(&key)?);
            }
            for (name, key_id) in secret_headers {
                headers.append(
                    HeaderName::from_bytes(format!("x-request-key-{name}").as_bytes())?,
                    HeaderValue::from_str(&key_id)?,
                );
            }

            let res = client
                .post(format!("{}/v1/forward", cli.url))
                .headers(headers)
                .body(data.unwrap_or_default())
                .send()
                .await?;
            print_response(res).await?;
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;
    if status.is_success() {
        println!("{text}");
    } else {
        eprintln!("Error: gateway returned status {status}");
        eprintln!("{text}");
    }
    Ok(())
}
