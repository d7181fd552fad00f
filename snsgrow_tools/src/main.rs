use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use snsgrow_engine::db_types::OrderId;

mod client;
mod formatting;
mod provider;
mod tracker;

use crate::{
    client::SnsGrowClient,
    formatting::format_tracking_view,
    provider::{handle_provider_command, ProviderCommand},
    tracker::OrderTracker,
};

#[derive(Parser, Debug)]
#[command(version = "0.1.0", about = "Operator tools for the SNS Growth order server")]
pub struct Arguments {
    /// The order server to talk to. Defaults to SG_SERVER_URL, or http://127.0.0.1:8360
    #[arg(short, long)]
    server: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Check that the order server is up
    Health,
    /// Show an order's progress. Keeps polling every 30 seconds until the order is final, unless --once is given.
    Track {
        /// An order id, or the customer's e-mail address
        #[arg(required = true, index = 1)]
        search: String,
        /// Fetch the order once and exit
        #[arg(long)]
        once: bool,
    },
    /// Cancel a pending or processing order
    Cancel {
        #[arg(required = true, index = 1)]
        order_id: String,
    },
    /// Talk to the SMM Turk panel directly, using SG_SMMTURK_API_URL and SG_SMMTURK_API_KEY
    #[command(subcommand)]
    Provider(ProviderCommand),
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    env_logger::init();
    let cli = Arguments::parse();
    match cli.command {
        Command::Provider(command) => handle_provider_command(command).await,
        command => {
            let client = match cli.server {
                Some(server) => SnsGrowClient::new(&server),
                None => SnsGrowClient::new_from_env_or_default(),
            };
            match client {
                Ok(client) => handle_server_command(client, command).await,
                Err(e) => eprintln!("{e}"),
            }
        },
    }
}

async fn handle_server_command(client: SnsGrowClient, command: Command) {
    match command {
        Command::Health => match client.health().await {
            Ok(s) => print!("{client}: {s}"),
            Err(e) => eprintln!("{client} is not healthy. {e}"),
        },
        Command::Track { search, once: true } => match client.track(&search).await {
            Ok(view) => print_view(&view),
            Err(e) => eprintln!("{e}"),
        },
        Command::Track { search, once: false } => track_until_final(client, &search).await,
        Command::Cancel { order_id } => match client.cancel(&OrderId::from(order_id.trim())).await {
            Ok(msg) => println!("{}: {msg}", order_id.trim()),
            Err(e) => eprintln!("{e}"),
        },
        Command::Provider(_) => {},
    }
}

async fn track_until_final(client: SnsGrowClient, search: &str) {
    let bar = ProgressBar::new(100);
    bar.set_style(
        ProgressStyle::with_template("{prefix:>12} [{bar:40}] {pos:>3}% {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> "),
    );
    let tracker = OrderTracker::new(client);
    let last = tracker
        .track(search, |view| {
            bar.set_prefix(view.order.order_id.to_string());
            bar.set_position(view.progress.clamp(0, 100) as u64);
            bar.set_message(view.order.status.to_string());
        })
        .await;
    bar.finish();
    print_view(&last);
}

fn print_view(view: &snsgrow_engine::order_objects::TrackingView) {
    match format_tracking_view(view) {
        Ok(s) => println!("{s}"),
        Err(e) => eprintln!("Could not format order. {e}"),
    }
}
