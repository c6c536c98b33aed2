use crate::config::Config;
use crate::workload::Workload;
use anyhow::Result;
use colored::Colorize;
use comfy_table::{Cell, Color, Table as ComfyTable};
use shard_coordinator::{Cluster, ClusterClient};
use shard_core::status;
use shard_core::Dataset;
use shard_network::Network;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

const CLIENT_END: &str = "cli";

/// Start a cluster on a fresh network and connect a client to it
fn boot(config: &Config) -> Result<(Network, Arc<Cluster>, ClusterClient)> {
    let network = Network::new(config.network.clone());
    let cluster = Cluster::new(config.cluster.clone(), &network)?;
    let client = ClusterClient::connect(&network, CLIENT_END, cluster.name());
    Ok((network, cluster, client))
}

pub async fn say_hello(config: &Config, visitor: &str) -> Result<()> {
    let (_network, cluster, client) = boot(config)?;
    println!(
        "{} Greeting cluster '{}' ({} nodes)...",
        "→".bright_blue(),
        cluster.name().bright_cyan(),
        cluster.node_ids().len()
    );

    let greeting = client.say_hello(visitor).await?;
    println!("{} {}", "✓".bright_green(), greeting);
    Ok(())
}

pub async fn run_workload(config: &Config, path: &Path, unreliable: bool) -> Result<()> {
    if !path.exists() {
        anyhow::bail!("Workload file not found: {:?}", path);
    }
    let workload = Workload::from_file(path)?;
    let (network, cluster, client) = boot(config)?;
    if unreliable {
        network.set_reliable(false);
        println!("{}", "Network is unreliable: calls may be dropped".bright_yellow());
    }

    let start = Instant::now();

    let mut builds = ComfyTable::new();
    builds.set_header(vec![
        Cell::new("Table").fg(Color::Cyan),
        Cell::new("Fragments").fg(Color::Yellow),
        Cell::new("Status").fg(Color::Green),
    ]);
    let mut writes = ComfyTable::new();
    writes.set_header(vec![
        Cell::new("Table").fg(Color::Cyan),
        Cell::new("Rows").fg(Color::Yellow),
        Cell::new("Accepted").fg(Color::Green),
        Cell::new("Not Inserted").fg(Color::Red),
        Cell::new("Lost").fg(Color::Magenta),
    ]);

    for table in &workload.tables {
        let name = table.schema.table_name.clone();
        let reply = client
            .build_table(table.schema.clone(), &table.sharding)
            .await
            .unwrap_or_else(|e| format!("lost: {}", e));
        builds.add_row(vec![
            Cell::new(&name),
            Cell::new(table.sharding.len()),
            status_cell(&reply),
        ]);

        let (mut accepted, mut rejected, mut lost) = (0usize, 0usize, 0usize);
        for row in &table.rows {
            match client.fragment_write(&name, row.clone()).await {
                Ok(reply) if status::is_success(&reply) => accepted += 1,
                Ok(_) => rejected += 1,
                Err(e) => {
                    tracing::debug!("Write to {} lost: {}", name, e);
                    lost += 1;
                }
            }
        }
        writes.add_row(vec![
            Cell::new(&name),
            Cell::new(table.rows.len()),
            Cell::new(accepted),
            Cell::new(rejected),
            Cell::new(lost),
        ]);
    }

    println!("{}", "Tables:".bright_yellow().bold());
    println!("{}", builds);
    println!("{}", "Writes:".bright_yellow().bold());
    println!("{}", writes);

    for tables in &workload.joins {
        println!(
            "{} {}",
            "Join:".bright_yellow().bold(),
            tables.join(" ⋈ ").bright_cyan()
        );
        match client.join(tables.as_slice()).await {
            Ok(dataset) => print_dataset(&dataset, config.max_rows),
            Err(e) => println!("{} {}", "✗".bright_red(), e),
        }
    }

    println!(
        "{} {}",
        "Catalog:".bright_yellow().bold(),
        cluster.catalog().table_names().join(", ").bright_cyan()
    );

    if config.show_timing {
        println!(
            "{} {:.2}ms, {} RPCs",
            "Elapsed:".bright_yellow(),
            start.elapsed().as_secs_f64() * 1000.0,
            network.total_rpc_count()
        );
    }
    Ok(())
}

fn status_cell(reply: &str) -> Cell {
    if status::is_success(reply) {
        Cell::new(reply).fg(Color::Green)
    } else {
        Cell::new(reply).fg(Color::Red)
    }
}

fn print_dataset(dataset: &Dataset, max_rows: usize) {
    if dataset.schema.columns.is_empty() {
        println!("{}", "  (no result)".bright_black());
        return;
    }

    let mut table = ComfyTable::new();
    table.set_header(
        dataset
            .schema
            .columns
            .iter()
            .map(|c| Cell::new(format!("{}: {}", c.name, c.data_type)).fg(Color::Cyan)),
    );
    for row in dataset.rows.iter().take(max_rows) {
        table.add_row(row.iter().map(|v| v.to_string()));
    }
    println!("{}", table);

    if dataset.num_rows() > max_rows {
        println!(
            "{}",
            format!("  ... {} more rows", dataset.num_rows() - max_rows).bright_black()
        );
    }
    println!("{} {} rows", "✓".bright_green(), dataset.num_rows());
}
