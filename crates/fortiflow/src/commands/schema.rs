use colored::Colorize;
use fortiflow_core::{Block, Field, FieldKind, Validator, ValueFormat};
use fortiflow_provider::Catalog;

pub fn handle(resource_type: Option<&str>, json: bool) -> anyhow::Result<()> {
    let catalog = Catalog::builtin();

    let Some(resource_type) = resource_type else {
        if json {
            let types = serde_json::json!({
                "resources": catalog.resource_types().collect::<Vec<_>>(),
                "data_sources": catalog.data_source_types().collect::<Vec<_>>(),
            });
            println!("{}", serde_json::to_string_pretty(&types)?);
            return Ok(());
        }

        println!("{}", "Resources:".bold());
        for name in catalog.resource_types() {
            println!("  {}", name.cyan());
        }
        println!("{}", "Data sources:".bold());
        for name in catalog.data_source_types() {
            println!("  {}", name.cyan());
        }
        return Ok(());
    };

    let schema = catalog
        .resource(resource_type)
        .map(|r| r.schema())
        .or_else(|| catalog.data_source(resource_type).map(|d| d.schema()))
        .ok_or_else(|| anyhow::anyhow!("Unknown resource type: {}", resource_type))?;

    if json {
        println!("{}", serde_json::to_string_pretty(schema)?);
        return Ok(());
    }

    println!("{}", resource_type.bold());
    print_block(schema, 1);
    Ok(())
}

fn print_block(block: &Block, depth: usize) {
    let indent = "  ".repeat(depth);
    for field in block.iter() {
        println!(
            "{}{} ({}) {}",
            indent,
            field.name.cyan(),
            field.kind.type_name(),
            flags(field).dimmed()
        );
        if let Some(description) = field.description {
            println!("{}    {}", indent, description);
        }
        if let FieldKind::Table(inner) = &field.kind {
            print_block(inner, depth + 1);
        }
    }
}

fn flags(field: &Field) -> String {
    let mut flags = Vec::new();
    if field.required {
        flags.push("required".to_string());
    }
    if field.optional {
        flags.push("optional".to_string());
    }
    if field.computed {
        flags.push("computed".to_string());
    }
    if field.force_new {
        flags.push("forces replacement".to_string());
    }
    if field.sensitive {
        flags.push("sensitive".to_string());
    }
    if let Some(max) = field.max_items {
        flags.push(format!("max {} items", max));
    }
    match &field.validator {
        Some(Validator::StringLenBetween { min, max }) => {
            flags.push(format!("length {}-{}", min, max))
        }
        Some(Validator::IntBetween { min, max }) => flags.push(format!("{}-{}", min, max)),
        Some(Validator::StringInSlice { values }) => flags.push(values.join("|")),
        None => {}
    }
    if field.format == ValueFormat::Ipv4ClassNet {
        flags.push("ipv4 classnet".to_string());
    }
    flags.join(", ")
}
