mod command_def;
mod command_handler;

pub use command_def::ProviderCommand;
pub use command_handler::handle_provider_command;
