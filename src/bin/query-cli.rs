use clap::{Parser, Subcommand};
use serde_json::Value;

use edge_gateway::client::{CallerIdentity, ClientError, QueryClient, DEFAULT_RAW_CHUNKS};

#[derive(Parser)]
#[command(name = "query-cli")]
#[command(about = "Send queries through the edge gateway", long_about = None)]
struct Cli {
    /// Gateway (or backend) base URL
    #[arg(short, long, env = "QUERY_API_BASE_URL", default_value = "http://localhost:8080")]
    url: String,

    /// Identity assertion forwarded as CF-Access-Jwt-Assertion
    #[arg(short, long, env = "CF_ACCESS_JWT")]
    assertion: Option<String>,

    #[arg(long, env = "QUERY_API_KEY", default_value = "")]
    api_key: String,

    #[arg(long, default_value = "dev@example.com")]
    email: String,

    #[arg(long, default_value = "engineering")]
    domain: String,

    #[arg(long, default_value_t = 2)]
    clearance: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ask a question and print the answer with its citations
    Query {
        text: String,
    },
    /// Dump the raw retrieval chunks for a question
    RawChunks {
        q: String,
        #[arg(short, default_value_t = DEFAULT_RAW_CHUNKS)]
        k: u32,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let identity = CallerIdentity {
        api_key: cli.api_key,
        user_email: cli.email,
        user_domain: cli.domain,
        user_clearance: cli.clearance,
    };
    let mut client = QueryClient::new(&cli.url, identity)?;
    if let Some(assertion) = cli.assertion {
        client = client.with_assertion(assertion);
    }

    let result = match cli.command {
        Commands::Query { text } => client
            .run_query(&text)
            .await
            .and_then(|answer| Ok(serde_json::to_value(answer)?)),
        Commands::RawChunks { q, k } => client.fetch_raw_chunks(&q, k).await,
    };

    match result {
        Ok(json) => print_json(&json)?,
        Err(ClientError::Status { status, body }) => {
            eprintln!("Error: API returned status {}", status);
            eprintln!("Response: {}", body);
            std::process::exit(1);
        }
        Err(e) => return Err(e.into()),
    }

    Ok(())
}

fn print_json(json: &Value) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(json)?);
    Ok(())
}
