#![cfg(not(tarpaulin_include))]

use clap::{Parser, Subcommand};
use sheetjump::downloader::{EXPORT_FILENAME, to_xlsx};
use sheetjump::loader::open_workbook;
use sheetjump::render::GridView;
use sheetjump::{CellAddress, JumpConfigStore, JumpTarget};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "sheetjump-cli")]
#[command(author, version, about = "Inspect workbooks and embed jump annotations offline")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List all sheets in a workbook
    Sheets {
        /// Input spreadsheet file
        input: PathBuf,
    },

    /// Print a sheet as a grid
    Show {
        /// Input spreadsheet file
        input: PathBuf,

        /// Sheet name (default: first sheet)
        #[arg(short, long)]
        sheet: Option<String>,

        /// Jump configuration file; configured cells print as [jump]
        #[arg(short, long)]
        jumps: Option<PathBuf>,
    },

    /// Write a copy of the workbook with jump configurations as cell notes
    Annotate {
        /// Input spreadsheet file
        input: PathBuf,

        /// JSON object mapping source cells to {targetFile, targetSheet, targetCell}
        #[arg(short, long)]
        jumps: PathBuf,

        /// Output file
        #[arg(short, long, default_value = EXPORT_FILENAME)]
        output: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Sheets { input } => {
            let book = open_workbook(&input)?;
            for sheet in &book.sheets {
                println!("{}\t{}x{}", sheet.name, sheet.height(), sheet.width());
            }
        }
        Commands::Show {
            input,
            sheet,
            jumps,
        } => {
            let book = open_workbook(&input)?;
            let store = match jumps {
                Some(path) => read_jumps(&path)?,
                None => JumpConfigStore::new(),
            };
            let sheet = match sheet {
                Some(name) => book
                    .sheet(&name)
                    .ok_or_else(|| format!("Sheet '{}' not found", name))?,
                None => book.sheets.first().ok_or("Workbook has no sheets")?,
            };
            print_grid(&GridView::build(sheet, &store, None));
        }
        Commands::Annotate {
            input,
            jumps,
            output,
        } => {
            let book = open_workbook(&input)?;
            let store = read_jumps(&jumps)?;
            let bytes = to_xlsx(&book, &store)?;
            fs::write(&output, bytes)?;
            eprintln!(
                "Wrote {} jump configs to '{}'",
                store.len(),
                output.display()
            );
        }
    }

    Ok(())
}

fn read_jumps(path: &Path) -> Result<JumpConfigStore, Box<dyn std::error::Error>> {
    let text = fs::read_to_string(path)?;
    let entries: BTreeMap<CellAddress, JumpTarget> = serde_json::from_str(&text)
        .map_err(|e| format!("Invalid jump file '{}': {}", path.display(), e))?;

    let mut store = JumpConfigStore::new();
    for (source, target) in entries {
        store.set(source, target);
    }
    Ok(store)
}

fn print_grid(view: &GridView) {
    print!("{:>6}", "");
    for col in &view.columns {
        print!("{:>12}", col);
    }
    println!();

    for row in &view.rows {
        print!("{:>6}", row.number);
        for cell in &row.cells {
            if cell.is_jump_trigger() {
                print!("{:>12}", "[jump]");
            } else {
                print!("{:>12}", cell.text);
            }
        }
        println!();
    }
}
