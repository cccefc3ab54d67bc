use clap::Args;
use miette::{miette, Context, IntoDiagnostic, Result};
use s06_mst::{Indent, StringTable, XmlOptions};
use std::{
    fs::File,
    io::{BufWriter, Cursor, Read},
    path::{Path, PathBuf},
};
use tracing::{info, warn};

#[derive(Args)]
pub struct ConvertArgs {
    /// An input MST or XML file; the format is sniffed from the content
    input: PathBuf,

    /// The output file; defaults to the input with its extension swapped
    output: Option<PathBuf>,

    /// Indent converted XML with this many spaces instead of tabs
    #[arg(long, value_name = "COUNT")]
    spaces: Option<usize>,

    /// Allow overwriting the target
    #[arg(long, default_value_t = false)]
    overwrite: bool,
}

/// What a sniffed input file turned out to be.
#[derive(Clone, Copy)]
pub(crate) enum InputKind {
    Mst,
    Xml,
}

/// Decide the input format: the BINA tag at 0x18 marks a binary table,
/// anything opening with an XML prolog or tag is a document.
pub(crate) fn sniff(data: &[u8]) -> Option<InputKind> {
    if data.len() >= 0x1C && &data[0x18..0x1C] == b"BINA" {
        return Some(InputKind::Mst);
    }

    let data = data.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(data);
    match data.iter().find(|b| !b.is_ascii_whitespace()) {
        Some(b'<') => Some(InputKind::Xml),
        _ => None,
    }
}

/// Load a string table from either format, surfacing XML warnings as logs.
pub(crate) fn load_table(path: &Path) -> Result<(StringTable, InputKind)> {
    let mut data = Vec::new();
    File::open(path)
        .into_diagnostic()
        .context(format!("path: {}", path.display()))?
        .read_to_end(&mut data)
        .into_diagnostic()?;

    let kind = sniff(&data).ok_or_else(|| {
        miette!(
            "{} is neither an MST string table nor an XML document",
            path.display()
        )
    })?;

    let table = match kind {
        InputKind::Mst => StringTable::read_mst(Cursor::new(data))?,
        InputKind::Xml => {
            let text = String::from_utf8(data)
                .into_diagnostic()
                .context("XML input must be UTF-8")?;

            let mut warnings = Vec::new();
            let table = StringTable::read_xml(&text, &mut warnings)?;
            for warning in &warnings {
                warn!("{warning}");
            }
            table
        }
    };

    Ok((table, kind))
}

impl ConvertArgs {
    pub fn handle(&self) -> Result<()> {
        let (table, kind) = load_table(&self.input)?;

        let extension = match kind {
            InputKind::Mst => "xml",
            InputKind::Xml => "mst",
        };
        let output = self
            .output
            .clone()
            .unwrap_or_else(|| self.input.with_extension(extension));
        info!("writing {}", output.display());

        let out = if !self.overwrite {
            File::create_new(&output)
                .into_diagnostic()
                .context(format!("creating {}", output.display()))?
        } else {
            File::create(&output)
                .into_diagnostic()
                .context(format!("creating {}", output.display()))?
        };
        let out = BufWriter::new(out);

        match kind {
            InputKind::Mst => {
                let indent = match self.spaces {
                    Some(count) => Indent::Spaces(count),
                    None => Indent::Tabs,
                };
                table.write_xml(out, XmlOptions::builder().indent(indent).build())?;
            }
            InputKind::Xml => table.write_mst(out)?,
        }

        Ok(())
    }
}
