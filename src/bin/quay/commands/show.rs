//! `quay show` command

use anyhow::Result;

use crate::cli::ShowArgs;
use crate::commands::open_project;
use quay::core::TargetTags;
use quay::util::GlobalContext;

pub fn execute(args: ShowArgs) -> Result<()> {
    let ctx = GlobalContext::new()?;
    let mut project = open_project(&ctx, &args.req)?;

    let name = project.name()?;
    let version = project.version()?;
    println!("name: {}", name);
    println!("version: {}", version);

    let dependencies = project.dependencies()?;
    if dependencies.is_empty() {
        println!("requires: (none)");
    } else {
        println!("requires:");
        for dep in &dependencies {
            println!("  {}", dep);
        }
    }

    if !args.tags.is_empty() {
        let tags = TargetTags::parse(&args.tags)?;
        println!("compatible: {}", project.is_compatible(&tags)?);
    }

    println!("states: {}", project.history_string());
    Ok(())
}
