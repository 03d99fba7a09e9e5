use anyhow::Result;
use clap::Parser;
use shelf::commands::{self, config::Config};
use std::path::PathBuf;

/// shelf - publish built packages into a local versioned repository
///
/// Packages are addressed by publisher, project and version. A published
/// version is never overwritten. Packages with an entry point get a launcher
/// in the repository root that runs them with their resolved classpath.
///
/// Examples:
///   shelf publish                # Publish the project in the current directory
///   shelf classpath ../my-app    # Show what my-app would run with
///   shelf dependents me/lib@2    # Find packages still pinned to an older me/lib
#[derive(Parser, Debug)]
#[command(author, version = env!("SHELF_VERSION"), about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Repository root directory (defaults to ~/.shelf; also via SHELF_HOME)
    #[arg(
        long = "root",
        short = 'r',
        env = "SHELF_HOME",
        value_name = "PATH",
        global = true
    )]
    pub root: Option<PathBuf>,

    /// Show debug logging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Package a project folder and publish it into the repository
    Publish(PublishArgs),

    /// List every published package version
    List,

    /// Print the resolved classpath of a project folder
    Classpath(ClasspathArgs),

    /// List published packages that depend on another version of a package
    Dependents(DependentsArgs),
}

#[derive(clap::Args, Debug)]
pub struct PublishArgs {
    /// Project folder containing shelf.json (defaults to the current directory)
    #[arg(value_name = "FOLDER")]
    pub folder: Option<PathBuf>,

    /// Shell command that builds outputs/<project>.jar before publishing
    #[arg(long, env = "SHELF_PACKAGER", value_name = "CMD")]
    pub packager: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct ClasspathArgs {
    /// Project folder containing shelf.json (defaults to the current directory)
    #[arg(value_name = "FOLDER")]
    pub folder: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
pub struct DependentsArgs {
    /// The package in the format "publisher/project@version"
    #[arg(value_name = "PUBLISHER/PROJECT@VERSION")]
    pub signature: String,
}

fn run(cli: Cli) -> Result<()> {
    let runtime = shelf::runtime::RealRuntime;
    let mut stdout = std::io::stdout().lock();

    match cli.command {
        Commands::Publish(args) => {
            let config = Config::new(&runtime, cli.root, args.packager)?;
            commands::publish(&runtime, &config, args.folder, &mut stdout)?;
        }
        Commands::List => {
            let config = Config::new(&runtime, cli.root, None)?;
            commands::list(&runtime, &config, &mut stdout)?;
        }
        Commands::Classpath(args) => {
            let config = Config::new(&runtime, cli.root, None)?;
            commands::classpath(&runtime, &config, args.folder, &mut stdout)?;
        }
        Commands::Dependents(args) => {
            let config = Config::new(&runtime, cli.root, None)?;
            commands::dependents(&runtime, &config, &args.signature, &mut stdout)?;
        }
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    if let Err(e) = run(cli) {
        eprintln!("ERROR: {:#}", e);
        std::process::exit(1);
    }
}
