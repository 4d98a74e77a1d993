use super::{PageArgs, print_json};
use clap::{Args, Subcommand};
use ngsi2_client::{Ngsi2Api, Pagination};
use std::io::Write;

#[derive(Args, Debug)]
pub struct TypesArgs {
    #[command(subcommand)]
    command: TypesCommand,
}

#[derive(Subcommand, Debug)]
enum TypesCommand {
    /// List entity types with their attributes and entity counts
    List(PageArgs),
    /// Show one entity type
    Get { entity_type: String },
}

impl TypesArgs {
    pub async fn run(self, api: &dyn Ngsi2Api, out: &mut dyn Write) -> anyhow::Result<()> {
        match self.command {
            TypesCommand::List(page) => {
                let types = api.get_entity_types(Pagination::from(&page)).await?;
                print_json(out, &types)
            }
            TypesCommand::Get { entity_type } => {
                print_json(out, &api.get_entity_type(&entity_type).await?)
            }
        }
    }
}
