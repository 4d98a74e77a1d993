pub mod entities;
pub mod registrations;
pub mod subscriptions;
pub mod types;

use clap::Args;
use ngsi2_client::Pagination;
use serde::Serialize;
use std::io::Write;

/// Paging flags shared by list commands.
#[derive(Args, Debug, Default)]
pub struct PageArgs {
    /// Number of items to skip
    #[arg(long, default_value_t = 0)]
    pub offset: u32,

    /// Maximum number of items to return (broker default when 0)
    #[arg(long, default_value_t = 0)]
    pub limit: u32,

    /// Ask the broker for the total count
    #[arg(long)]
    pub count: bool,
}

impl From<&PageArgs> for Pagination {
    fn from(args: &PageArgs) -> Self {
        Pagination::new(args.offset, args.limit, args.count)
    }
}

/// Pretty-print `value` as JSON followed by a newline.
pub fn print_json<T: Serialize + ?Sized>(out: &mut dyn Write, value: &T) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}
