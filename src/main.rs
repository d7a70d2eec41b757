use clap::{Parser, Subcommand};
use env_logger::{Builder, Env};
use log::info;
use sitecollect::config::{self, SiteConfig};
use sitecollect::registry::{self, Registry};
use sitecollect::{content, output};
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "sitecollect")]
#[command(about = "Content collections and template filters for a static site")]
#[command(long_about = "\
Content collections and template filters for a static site

Content files are discovered under the input directory, their front matter is
read, and three collections are derived for the templates:

  posts      blog/**/*.md, newest first
  projects   posts plus items tagged with the project tag, newest first
  <tag>      items tagged with the project tag, by their `order` field

Project structure:

  .
  ├── sitecollect.toml             # Optional, overrides stock defaults
  └── src/
      ├── index.njk                # Front matter: title, date, tags, order, permalink
      ├── blog/
      │   └── 2024-01-first-post.md
      ├── clqms/
      │   └── intro.md             # tags: clqms, order: 1
      └── _includes/               # Layout partials, never collected

Dates missing from front matter fall back to the file's modification time.
Dates that do not parse are kept and sort after every real date.

Run 'sitecollect gen-config' to generate a documented sitecollect.toml.")]
#[command(version)]
struct Cli {
    /// Project root containing sitecollect.toml
    #[arg(long, default_value = ".", global = true)]
    root: PathBuf,

    /// Input directory, relative to the root (overrides dir.input)
    #[arg(long, global = true)]
    input: Option<String>,

    /// Output directory, relative to the root (overrides dir.output)
    #[arg(long, global = true)]
    output: Option<String>,

    /// Suppress log output
    #[arg(long, short, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List discovered content items
    Scan,
    /// Show every collection and its members
    Collections,
    /// Write the collections as JSON for the renderer
    Build,
    /// Validate config and content without writing anything
    Check,
    /// Print a stock sitecollect.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.quiet);

    match cli.command {
        Command::Scan => {
            let site_config = load_site_config(&cli)?;
            let store = content::scan(&cli.root, &site_config)?;
            output::print_scan_output(&store);
        }
        Command::Collections => {
            let site_config = load_site_config(&cli)?;
            let store = content::scan(&cli.root, &site_config)?;
            let registry = configured_registry(&site_config);
            let collections = registry.build_collections(&store, &site_config.collections);
            output::print_collections_output(&collections);
        }
        Command::Build => {
            let site_config = load_site_config(&cli)?;
            let input = cli.root.join(&site_config.dir.input);
            let output_dir = cli.root.join(&site_config.dir.output);

            println!("==> Scanning {}", input.display());
            let store = content::scan(&cli.root, &site_config)?;
            output::print_scan_output(&store);

            println!("==> Building collections");
            let registry = configured_registry(&site_config);
            let collections = registry.build_collections(&store, &site_config.collections);
            output::print_collections_output(&collections);

            std::fs::create_dir_all(&output_dir)?;
            let path = output_dir.join("collections.json");
            let json = serde_json::to_string_pretty(&collections)?;
            std::fs::write(&path, json)?;
            info!("wrote {}", path.display());

            println!("==> Build complete: {}", path.display());
        }
        Command::Check => {
            println!("==> Checking {}", cli.root.display());
            let site_config = load_site_config(&cli)?;
            let store = content::scan(&cli.root, &site_config)?;
            let undated = store.items().iter().filter(|i| !i.date.is_valid()).count();
            output::print_scan_output(&store);
            if undated > 0 {
                println!("==> {} item(s) with unparseable dates will sort last", undated);
            }
            println!("==> Content is valid");
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

fn init_logging(quiet: bool) {
    let env = Env::default().filter_or("RUST_LOG", if quiet { "off" } else { "info" });
    Builder::from_env(env)
        .format(|buf, record| {
            writeln!(
                buf,
                "{} {:<5} {}",
                chrono::Local::now().format("%H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .init();
}

/// Load `sitecollect.toml` from the root and apply directory overrides.
fn load_site_config(cli: &Cli) -> Result<SiteConfig, config::ConfigError> {
    let mut site_config = config::load_config(&cli.root)?;
    if let Some(input) = &cli.input {
        site_config.dir.input = input.clone();
    }
    if let Some(output) = &cli.output {
        site_config.dir.output = output.clone();
    }
    site_config.validate()?;
    log_config(&cli.root, &site_config);
    Ok(site_config)
}

fn log_config(root: &Path, site_config: &SiteConfig) {
    info!(
        "root {}: input {}, output {}, formats [{}]",
        root.display(),
        site_config.dir.input,
        site_config.dir.output,
        site_config.template_formats.join(", ")
    );
}

fn configured_registry(site_config: &SiteConfig) -> Registry {
    let mut registry = Registry::new();
    registry::configure(&mut registry, &site_config.collections);
    registry
}
