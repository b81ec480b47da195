// login_cli.rs
// Signs in against a running API with a Google ID token and prints the resolved CTag

use reqwest::Client;
use std::env;

use ctag_api::client::directory::{default_directory, search};
use ctag_api::client::{HttpCTagApi, SessionFlow};
use ctag_api::services::monitoring;

const USAGE: &str = "usage: ctag_login <google-id-token> [--api <url>] [--search <query>]";

struct Args {
    credential: String,
    api_url: String,
    search: String,
}

fn parse_args() -> Option<Args> {
    let mut credential = None;
    let mut api_url = env::var("CTAG_API_URL").unwrap_or_else(|_| "http://localhost:5001".to_string());
    let mut query = String::new();

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--api" => api_url = args.next()?,
            "--search" => query = args.next()?,
            "-h" | "--help" => return None,
            _ if credential.is_none() => credential = Some(arg),
            _ => return None,
        }
    }

    Some(Args {
        credential: credential?,
        api_url,
        search: query,
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    monitoring::init_tracing();

    let Some(args) = parse_args() else {
        eprintln!("{}", USAGE);
        std::process::exit(2);
    };

    let api = HttpCTagApi::new(Client::builder().no_proxy().build()?, &args.api_url);
    let mut flow = SessionFlow::new(api);

    flow.login(&args.credential).await?;
    flow.resolve_tags().await?;

    if let Some(session) = flow.session() {
        println!("Signed in as {}", session.user.email);
        println!("Session expires at {}", session.expires_at);
    }
    if let Some(tag) = flow.new_tag_notice() {
        println!("✅ A new CTag was created for you: {}", tag);
    }
    println!("Your CTags: {}", flow.tags().join(", "));
    if let Some(selected) = flow.selected() {
        println!("Selected CTag: {}", selected);
    }

    println!("\nNetwork School directory:");
    for entry in search(default_directory(), &args.search) {
        println!("  {} ({})", entry.name, entry.username);
    }

    flow.logout().await;
    Ok(())
}
