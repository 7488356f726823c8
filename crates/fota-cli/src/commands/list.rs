//! Read-only commands: available updates, jobs, device history

use anyhow::Result;
use fota_client::{FotaClient, ListQuery, SortDir};

use crate::output::{DeviceRow, HistoryRow, JobRow, OutputContext};

/// Paging and filtering flags shared by the list commands
#[derive(Debug, Clone, clap::Args)]
pub struct ListArgs {
    /// Page number (1-based)
    #[arg(long, default_value = "1")]
    pub page: u32,

    /// Records per page (the service allows at most 200)
    #[arg(long, default_value = "20")]
    pub per_page: u32,

    /// Field to sort by
    #[arg(long)]
    pub sort: Option<String>,

    /// Sort descending
    #[arg(long)]
    pub desc: bool,

    /// Free-text filter
    #[arg(long)]
    pub search: Option<String>,
}

impl ListArgs {
    pub fn query(&self) -> ListQuery {
        let mut query = ListQuery::paged(self.page, self.per_page);
        if let Some(sort) = &self.sort {
            let dir = if self.desc { SortDir::Desc } else { SortDir::Asc };
            query = query.sort(sort).sort_dir(dir);
        }
        if let Some(search) = &self.search {
            query = query.search(search);
        }
        query
    }
}

/// List devices with their available updates
pub async fn updates(client: &FotaClient, args: &ListArgs, ctx: &OutputContext) -> Result<()> {
    let devices = client.list_available_updates(&args.query()).await?;
    let rows: Vec<DeviceRow> = devices.iter().map(DeviceRow::from).collect();
    ctx.print(&rows);
    Ok(())
}

/// List firmware jobs
pub async fn jobs(client: &FotaClient, args: &ListArgs, ctx: &OutputContext) -> Result<()> {
    let jobs = client.list_jobs(&args.query()).await?;
    let rows: Vec<JobRow> = jobs.iter().map(JobRow::from).collect();
    ctx.print(&rows);
    Ok(())
}

/// Show the firmware history of one device
pub async fn history(client: &FotaClient, uid: &str, ctx: &OutputContext) -> Result<()> {
    let entries = client.device_history(uid).await?;
    if entries.is_empty() {
        ctx.info("No history recorded");
        return Ok(());
    }
    let rows: Vec<HistoryRow> = entries.iter().map(HistoryRow::from).collect();
    ctx.print(&rows);
    Ok(())
}
