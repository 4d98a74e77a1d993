use super::{PageArgs, print_json};
use anyhow::Context;
use clap::{Args, Subcommand};
use ngsi2_client::model::{Coordinate, GeoQuery, GeoRelation, Geometry};
use ngsi2_client::{EntityQuery, Ngsi2Api, Pagination};
use std::io::Write;

#[derive(Args, Debug)]
pub struct EntitiesArgs {
    #[command(subcommand)]
    command: EntitiesCommand,
}

#[derive(Subcommand, Debug)]
enum EntitiesCommand {
    /// List entities matching the filters
    List(ListArgs),
    /// Show one entity
    Get {
        id: String,
        #[arg(long = "type")]
        entity_type: Option<String>,
        /// Attributes to include (comma separated)
        #[arg(long, value_delimiter = ',')]
        attrs: Vec<String>,
    },
    /// Show one attribute value
    Value {
        id: String,
        attribute: String,
        #[arg(long = "type")]
        entity_type: Option<String>,
        /// Fetch the `text/plain` rendering instead of JSON
        #[arg(long)]
        text: bool,
    },
    /// Delete an entity
    Delete {
        id: String,
        #[arg(long = "type")]
        entity_type: Option<String>,
    },
}

#[derive(Args, Debug)]
struct ListArgs {
    #[arg(long, value_delimiter = ',')]
    id: Vec<String>,

    #[arg(long)]
    id_pattern: Option<String>,

    #[arg(long = "type", value_delimiter = ',')]
    types: Vec<String>,

    #[arg(long, value_delimiter = ',')]
    attrs: Vec<String>,

    /// Simple query expression, e.g. `temperature>30`
    #[arg(short, long)]
    q: Option<String>,

    /// Geo relation, e.g. `near;maxDistance:1000` or `coveredBy`
    #[arg(long, requires_all = ["geometry", "coords"])]
    georel: Option<GeoRelation>,

    #[arg(long, requires = "georel")]
    geometry: Option<Geometry>,

    /// `lat,lon` pairs separated by `;`
    #[arg(long, requires = "georel")]
    coords: Option<String>,

    #[arg(long, value_delimiter = ',')]
    order_by: Vec<String>,

    #[command(flatten)]
    page: PageArgs,
}

impl ListArgs {
    fn into_query(self) -> anyhow::Result<EntityQuery> {
        let geo = match (self.georel, self.geometry, self.coords) {
            (Some(relation), Some(geometry), Some(coords)) => {
                let coordinates: Vec<Coordinate> =
                    GeoQuery::parse_coords(&coords).context("invalid --coords")?;
                Some(GeoQuery::new(relation, geometry, coordinates))
            }
            _ => None,
        };

        Ok(EntityQuery {
            ids: self.id,
            id_pattern: self.id_pattern,
            types: self.types,
            attrs: self.attrs,
            q: self.q,
            geo,
            order_by: self.order_by,
            pagination: Pagination::from(&self.page),
        })
    }
}

impl EntitiesArgs {
    pub async fn run(self, api: &dyn Ngsi2Api, out: &mut dyn Write) -> anyhow::Result<()> {
        match self.command {
            EntitiesCommand::List(args) => {
                let page = api.get_entities(&args.into_query()?).await?;
                tracing::info!(returned = page.len(), total = page.total, "entities listed");
                print_json(out, &page)
            }
            EntitiesCommand::Get {
                id,
                entity_type,
                attrs,
            } => {
                let entity = api.get_entity(&id, entity_type.as_deref(), &attrs).await?;
                print_json(out, &entity)
            }
            EntitiesCommand::Value {
                id,
                attribute,
                entity_type,
                text,
            } => {
                if text {
                    let value = api
                        .get_attribute_value_as_string(&id, entity_type.as_deref(), &attribute)
                        .await?;
                    writeln!(out, "{value}")?;
                    Ok(())
                } else {
                    let value = api
                        .get_attribute_value(&id, entity_type.as_deref(), &attribute)
                        .await?;
                    print_json(out, &value)
                }
            }
            EntitiesCommand::Delete { id, entity_type } => {
                api.delete_entity(&id, entity_type.as_deref()).await?;
                tracing::info!(entity_id = %id, "entity deleted");
                Ok(())
            }
        }
    }
}
