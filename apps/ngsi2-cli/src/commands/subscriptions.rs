use super::{PageArgs, print_json};
use clap::{Args, Subcommand};
use ngsi2_client::{Ngsi2Api, Pagination};
use std::io::Write;

#[derive(Args, Debug)]
pub struct SubscriptionsArgs {
    #[command(subcommand)]
    command: SubscriptionsCommand,
}

#[derive(Subcommand, Debug)]
enum SubscriptionsCommand {
    List(PageArgs),
    Get { id: String },
    Delete { id: String },
}

impl SubscriptionsArgs {
    pub async fn run(self, api: &dyn Ngsi2Api, out: &mut dyn Write) -> anyhow::Result<()> {
        match self.command {
            SubscriptionsCommand::List(page) => {
                print_json(out, &api.get_subscriptions(Pagination::from(&page)).await?)
            }
            SubscriptionsCommand::Get { id } => print_json(out, &api.get_subscription(&id).await?),
            SubscriptionsCommand::Delete { id } => {
                api.delete_subscription(&id).await?;
                tracing::info!(subscription_id = %id, "subscription deleted");
                Ok(())
            }
        }
    }
}
