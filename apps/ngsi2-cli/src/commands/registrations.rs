use super::print_json;
use clap::{Args, Subcommand};
use ngsi2_client::Ngsi2Api;
use std::io::Write;

#[derive(Args, Debug)]
pub struct RegistrationsArgs {
    #[command(subcommand)]
    command: RegistrationsCommand,
}

#[derive(Subcommand, Debug)]
enum RegistrationsCommand {
    List,
    Get { id: String },
    Delete { id: String },
}

impl RegistrationsArgs {
    pub async fn run(self, api: &dyn Ngsi2Api, out: &mut dyn Write) -> anyhow::Result<()> {
        match self.command {
            RegistrationsCommand::List => print_json(out, &api.get_registrations().await?),
            RegistrationsCommand::Get { id } => print_json(out, &api.get_registration(&id).await?),
            RegistrationsCommand::Delete { id } => {
                api.delete_registration(&id).await?;
                tracing::info!(registration_id = %id, "registration deleted");
                Ok(())
            }
        }
    }
}
