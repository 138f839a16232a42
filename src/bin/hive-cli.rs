use clap::{Parser, Subcommand};
use serde_json::{Map, Value};

use hive_bridge::http::ErrorBody;
use hive_bridge::service::{topic_for, Operation};

#[derive(Parser)]
#[command(name = "hive-cli")]
#[command(about = "Send TheHive operations through the hive-bridge ingress", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    /// Topic discriminator of the target instance
    #[arg(short, long)]
    discriminator: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Invoke an operation, e.g. `call get_case --id 42`
    Call {
        operation: Operation,
        /// JSON object sent as the request payload
        #[arg(short, long)]
        payload: Option<String>,
        /// Sets `id` in the payload
        #[arg(long)]
        id: Option<String>,
        /// Sets `caseId` in the payload
        #[arg(long)]
        case_id: Option<String>,
    },
    /// List registered services and topics
    Services,
    /// Check the bridge is up
    Health,
    /// Print the topic of every operation
    Topics,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    match cli.command {
        Commands::Call {
            operation,
            payload,
            id,
            case_id,
        } => {
            let body = build_payload(payload.as_deref(), id, case_id)?;
            let topic = topic_for(operation, cli.discriminator.as_deref());
            let res = client
                .post(format!("{}{}", base, topic))
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .body(serde_json::to_vec(&body)?)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Services => {
            let res = client.get(format!("{}/services", base)).send().await?;
            print_response(res).await?;
        }
        Commands::Health => {
            let res = client.get(format!("{}/health", base)).send().await?;
            print_response(res).await?;
        }
        Commands::Topics => {
            for operation in Operation::ALL {
                println!("{:<24} {}", operation.name(), topic_for(operation, cli.discriminator.as_deref()));
            }
        }
    }

    Ok(())
}

fn build_payload(
    payload: Option<&str>,
    id: Option<String>,
    case_id: Option<String>,
) -> Result<Value, Box<dyn std::error::Error>> {
    let mut object = match payload {
        Some(text) => match serde_json::from_str(text)? {
            Value::Object(map) => map,
            _ => return Err("--payload must be a JSON object".into()),
        },
        None => Map::new(),
    };
    if let Some(id) = id {
        object.insert("id".to_string(), Value::String(id));
    }
    if let Some(case_id) = case_id {
        object.insert("caseId".to_string(), Value::String(case_id));
    }
    Ok(Value::Object(object))
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;

    if !status.is_success() {
        match serde_json::from_str::<ErrorBody>(&text) {
            Ok(error) => {
                let code = error.error_code.map_or_else(|| "none".to_string(), |c| c.to_string());
                eprintln!("Error (code {}): {}", code, error.error_message);
                if let Some(detail) = error.detail {
                    eprintln!("{}", serde_json::to_string_pretty(&detail)?);
                }
            }
            Err(_) => eprintln!("Error: bridge returned status {}\n{}", status, text),
        }
        std::process::exit(1);
    }

    let json: Value = serde_json::from_str(&text)?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
