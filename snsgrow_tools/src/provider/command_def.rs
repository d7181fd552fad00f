use clap::Subcommand;

#[derive(Debug, Subcommand)]
pub enum ProviderCommand {
    /// List the services offered by the SMM Turk panel, at the panel's own rates
    Services {
        /// Only show services whose name or category contains this text (case-insensitive)
        #[arg(short = 'f', long = "filter")]
        filter: Option<String>,
    },
    /// Show the account balance on the SMM Turk panel
    Balance,
    /// Fetch the status of an order directly from the panel
    Status {
        /// The provider's order id
        #[arg(required = true, index = 1)]
        provider_order_id: String,
    },
    /// Place an order directly on the panel. This bypasses the order server entirely and is charged immediately.
    Add {
        /// The panel's service id
        #[arg(required = true, index = 1)]
        service: String,
        /// The link to deliver to
        #[arg(required = true, index = 2)]
        link: String,
        #[arg(required = true, index = 3)]
        quantity: i64,
    },
}
