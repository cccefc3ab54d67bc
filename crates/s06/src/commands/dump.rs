use clap::Args;
use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;

use super::convert::load_table;

#[derive(Args)]
pub struct DumpArgs {
    /// An input MST or XML file
    input: PathBuf,

    /// Emit JSON instead of plain text
    #[arg(long, default_value_t = false)]
    json: bool,
}

impl DumpArgs {
    pub fn handle(&self) -> Result<()> {
        let (table, _) = load_table(&self.input)?;

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&table).into_diagnostic()?
            );
            return Ok(());
        }

        println!("String table: {}", table.name());
        for (index, entry) in table.entries().iter().enumerate() {
            println!(
                "* Message {index}: {} -> {}",
                entry.name,
                table.text_utf8(index).unwrap_or_default()
            );
        }

        Ok(())
    }
}
