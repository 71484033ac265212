//! Functionality related to the `runcmd list` command itself.

use anyhow::bail;
use clap::{builder::PossibleValuesParser, Args};

use prettytable::{row, Table};

use crate::config::Config;

//========================//
// Command-line arguments //
//========================//

/// Command line arguments for `runcmd list`.
#[derive(Args)]
pub struct ListArgs {
    /// The subject which you want to list values for.
    #[arg(value_parser = PossibleValuesParser::new(["panels", "applets"]))]
    subject: String,
}

impl ListArgs {
    /// Creates a new [`ListArgs`] for `subject`.
    pub fn new(subject: impl Into<String>) -> Self {
        ListArgs {
            subject: subject.into(),
        }
    }
}

/// The panel table, one row per configured panel in file order.
pub fn panel_table(config: &Config) -> Table {
    let mut table = Table::new();

    table.add_row(row!["Pan Number", "CNV Calling", "CNV BED File"]);
    for (pan, entry) in config.panels.iter() {
        match &entry.cnv_bedfile {
            Some(stem) => table.add_row(row![
                pan,
                "yes",
                format!("{}:/Data/BED/{}_CNV.bed", config.common_data_project, stem)
            ]),
            None => table.add_row(row![pan, "no", "-"]),
        };
    }

    table
}

/// The executables run by each stage.
pub fn applet_table(config: &Config) -> Table {
    let applets = &config.applets;
    let mut table = Table::new();

    table.add_row(row!["Stage", "Executable"]);
    table.add_row(row!["workflow", applets.workflow]);
    table.add_row(row!["coverage", applets.coverage]);
    table.add_row(row!["picard", applets.picard]);
    table.add_row(row!["fastqc", applets.fastqc]);
    table.add_row(row!["cnv", applets.cnv]);
    table.add_row(row!["readcount", applets.readcount]);

    table
}

//==============//
// Main command //
//==============//

/// Main method for the `runcmd list` subcommand.
pub fn list(args: ListArgs, config: &Config) -> anyhow::Result<()> {
    match args.subject.as_str() {
        "panels" => {
            panel_table(config).printstd();
            Ok(())
        }
        "applets" => {
            applet_table(config).printstd();
            Ok(())
        }
        s => bail!("Unsupported subject: {}", s),
    }
}
