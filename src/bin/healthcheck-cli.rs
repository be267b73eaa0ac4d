use std::collections::BTreeMap;

use clap::{Parser, Subcommand};

use healthcheck_sync::config::RemoteConfig;
use healthcheck_sync::remote::{HttpGateway, RemoteGateway};
use healthcheck_sync::sync::annotations::DEFAULT_ANNOTATION_PREFIX;
use healthcheck_sync::sync::{
    AnnotationExtractor, DesiredSpecBuilder, ResourceIdentity, ResourceState, RoutingResource,
    SyncEngine,
};

#[derive(Parser)]
#[command(name = "healthcheck-cli")]
#[command(about = "Inspect and reconcile monitoring health checks by hand", long_about = None)]
struct Cli {
    #[arg(short, long, env = "APP_URL", default_value = "http://localhost:8080")]
    url: String,

    #[arg(short, long, env = "APP_TOKEN", hide_env_values = true)]
    token: String,

    /// Path prefix in front of `/healthchecks`.
    #[arg(long, default_value = "/api/v1")]
    api_prefix: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List all remote health checks
    List,
    /// Show the health check of one ingress
    Find { namespace: String, name: String },
    /// Create or update the health check of one ingress
    Apply {
        namespace: String,
        name: String,
        /// Host of the ingress' first rule
        #[arg(long)]
        host: String,
        /// Annotation as key=value, e.g. health-check-path=/healthz
        #[arg(short, long = "annotation", value_parser = parse_annotation)]
        annotations: Vec<(String, String)>,
        #[arg(long, default_value = DEFAULT_ANNOTATION_PREFIX)]
        prefix: String,
    },
    /// Delete the health check of one ingress, if any
    Delete { namespace: String, name: String },
}

fn parse_annotation(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.trim().to_string(), v.to_string()))
        .ok_or_else(|| format!("expected key=value, got '{}'", raw))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let remote = RemoteConfig {
        base_url: cli.url,
        token: cli.token,
        api_prefix: cli.api_prefix,
        ..RemoteConfig::default()
    };
    let gateway = HttpGateway::new(&remote)?;

    match cli.command {
        Commands::List => {
            let checks = gateway.list().await?;
            println!("{}", serde_json::to_string_pretty(&checks)?);
        }
        Commands::Find { namespace, name } => {
            let key = ResourceIdentity::new(namespace, name).sync_key();
            match gateway.find(key.as_str()).await? {
                Some(check) => println!("{}", serde_json::to_string_pretty(&check)?),
                None => eprintln!("No health check named {}", key),
            }
        }
        Commands::Apply {
            namespace,
            name,
            host,
            annotations,
            prefix,
        } => {
            let extractor = AnnotationExtractor::new(prefix);
            let annotations: BTreeMap<String, String> = annotations
                .into_iter()
                .map(|(k, v)| {
                    let key = if k.contains('/') {
                        k
                    } else {
                        format!("{}/{}", extractor.prefix(), k)
                    };
                    (key, v)
                })
                .collect();
            let engine = SyncEngine::new(gateway, DesiredSpecBuilder::new(extractor));
            let state = ResourceState::Present(RoutingResource {
                identity: ResourceIdentity::new(namespace, name),
                annotations,
                first_rule_host: Some(host),
            });
            println!("{}", engine.reconcile(&state).await?);
        }
        Commands::Delete { namespace, name } => {
            let engine = SyncEngine::new(gateway, DesiredSpecBuilder::default());
            let state = ResourceState::Absent(ResourceIdentity::new(namespace, name));
            println!("{}", engine.reconcile(&state).await?);
        }
    }

    Ok(())
}
