pub mod convert;
pub mod dump;

#[derive(clap::Subcommand)]
pub enum Commands {
    /// Convert an MST file to XML, or an XML file back to MST
    Convert(convert::ConvertArgs),
    /// Print the contents of a string table
    Dump(dump::DumpArgs),
}

impl Commands {
    pub fn handle(&self) -> miette::Result<()> {
        match self {
            Commands::Convert(convert) => convert.handle(),
            Commands::Dump(dump) => dump.handle(),
        }
    }
}
