use log::info;
use smmturk_tools::{NewProviderOrder, SmmTurkApi, SmmTurkConfig};

use crate::{
    formatting::{format_balance, format_order_created, format_provider_services, format_provider_status},
    provider::ProviderCommand,
};

pub async fn handle_provider_command(command: ProviderCommand) {
    use ProviderCommand::*;
    match command {
        Services { filter } => fetch_services(filter).await,
        Balance => fetch_balance().await,
        Status { provider_order_id } => fetch_status(provider_order_id).await,
        Add { service, link, quantity } => add_order(service, link, quantity).await,
    }
}

fn new_smmturk_api() -> SmmTurkApi {
    let config = SmmTurkConfig::new_from_env_or_default();
    match SmmTurkApi::new(config) {
        Ok(api) => api,
        Err(e) => {
            eprintln!("Error creating SMM Turk API client: {e}");
            std::process::exit(1);
        },
    }
}

pub async fn fetch_services(filter: Option<String>) {
    let api = new_smmturk_api();
    match api.fetch_services().await {
        Ok(services) => {
            let services = match filter.map(|f| f.to_lowercase()) {
                Some(f) => services
                    .into_iter()
                    .filter(|s| s.name.to_lowercase().contains(&f) || s.category.to_lowercase().contains(&f))
                    .collect(),
                None => services,
            };
            println!("{}", format_provider_services(&services));
        },
        Err(e) => eprintln!("Error fetching services: {e}"),
    }
}

pub async fn fetch_balance() {
    let api = new_smmturk_api();
    match api.get_balance().await {
        Ok(balance) => println!("{}", format_balance(&balance)),
        Err(e) => eprintln!("Error fetching balance: {e}"),
    }
}

pub async fn fetch_status(provider_order_id: String) {
    let api = new_smmturk_api();
    match api.get_order_status(&provider_order_id).await {
        Ok(status) => println!("{}", format_provider_status(&provider_order_id, &status)),
        Err(e) => eprintln!("Error fetching status for provider order {provider_order_id}: {e}"),
    }
}

pub async fn add_order(service: String, link: String, quantity: i64) {
    if quantity <= 0 {
        eprintln!("Quantity must be positive");
        return;
    }
    let api = new_smmturk_api();
    let order = NewProviderOrder::new(service, link, quantity);
    info!("Placing {quantity} x service {} for {}", order.service, order.link);
    match api.create_order(&order).await {
        Ok(created) => println!("{}", format_order_created(&created)),
        Err(e) => eprintln!("Error placing order: {e}"),
    }
}
