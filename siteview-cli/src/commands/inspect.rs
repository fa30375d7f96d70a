//! Print the loaded model hierarchy

use super::{load_or_bail, SourceArgs};
use anyhow::Result;
use colored::*;
use siteview_viewer::{HierarchyNode, ProgressStatus, Viewport};

/// Load the model and print its tree with part statuses
pub async fn inspect(source: &SourceArgs, json: bool) -> Result<()> {
    let (viewer, _) = source.build_viewer(Viewport::new(1280, 720))?;
    load_or_bail(&viewer).await?;

    let Some(tree) = viewer.hierarchy() else {
        anyhow::bail!("viewer reported idle without a model");
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&tree)?);
        return Ok(());
    }

    print_node(&tree, 0);
    println!();
    for status in ProgressStatus::ALL {
        let count = viewer.nodes_with_status(status.code()).len();
        println!(
            "  {} {}",
            paint(&format!("{:>5}", count), Some(status.code())),
            format!("{:?}", status).dimmed()
        );
    }
    println!("{} {} nodes", "✓".green(), tree.node_count());
    Ok(())
}

fn print_node(node: &HierarchyNode, depth: usize) {
    let indent = "  ".repeat(depth);
    match node.status {
        Some(code) => println!("{}{} {}", indent, paint("●", Some(code)), node.label),
        None => println!("{}{} {}", indent, "▸".dimmed(), node.label.bold()),
    }
    for child in &node.children {
        print_node(child, depth + 1);
    }
}

/// Color text with a status color
pub fn paint(text: &str, status: Option<i64>) -> ColoredString {
    let rgb = siteview_viewer::status::status_color(status.unwrap_or(0)).to_rgb_u32();
    text.truecolor((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8)
}
