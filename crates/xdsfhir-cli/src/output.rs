use anyhow::Result;
use colored::Colorize;
use tabled::builder::Builder;
use tabled::settings::Style;
use xdsfhir_core::{QueryResponse, Status};

use crate::cli::OutputFormat;

pub fn print_response(response: &QueryResponse, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(response)?),
        OutputFormat::Table => print_as_tables(response),
    }
    Ok(())
}

pub fn print_error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

fn print_as_tables(response: &QueryResponse) {
    let status = response.status.to_string();
    let status = match response.status {
        Status::Success => status.green(),
        Status::PartialSuccess => status.yellow(),
        Status::Failure => status.red(),
    };
    println!("{} {}", "Status:".cyan(), status);
    for error in &response.errors {
        println!("{} {}: {}", "!".yellow(), error.code, error.context);
    }

    if response.object_count() > 0 {
        let mut builder = Builder::default();
        builder.push_record(["Kind", "EntryUUID", "Status", "Title"]);
        for doc in &response.document_entries {
            builder.push_record([
                "DocumentEntry".to_string(),
                doc.entry_uuid.clone(),
                doc.availability_status.to_string(),
                doc.title.clone().unwrap_or_else(|| "-".into()),
            ]);
        }
        for folder in &response.folders {
            builder.push_record([
                "Folder".to_string(),
                folder.entry_uuid.clone(),
                folder.availability_status.to_string(),
                folder.title.clone().unwrap_or_else(|| "-".into()),
            ]);
        }
        for set in &response.submission_sets {
            builder.push_record([
                "SubmissionSet".to_string(),
                set.entry_uuid.clone(),
                set.availability_status.to_string(),
                set.title.clone().unwrap_or_else(|| "-".into()),
            ]);
        }
        println!("{}", builder.build().with(Style::rounded()));
    }

    if !response.associations.is_empty() {
        let mut builder = Builder::default();
        builder.push_record(["Association", "Type", "Source", "Target"]);
        for association in &response.associations {
            builder.push_record([
                association.entry_uuid.clone(),
                association.association_type.to_string(),
                association.source_uuid.clone(),
                association.target_uuid.clone(),
            ]);
        }
        println!("{}", builder.build().with(Style::rounded()));
    }

    if !response.references.is_empty() {
        let mut builder = Builder::default();
        builder.push_record(["ObjectRef"]);
        for reference in &response.references {
            builder.push_record([reference.id.clone()]);
        }
        println!("{}", builder.build().with(Style::rounded()));
    }

    if response.object_count() == 0 && response.associations.is_empty() && response.references.is_empty() {
        println!("No results.");
    }
}
