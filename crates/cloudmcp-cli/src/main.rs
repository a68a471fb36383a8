use clap::{Parser, Subcommand};
use cloudmcp_core::Transport;
use std::path::PathBuf;

mod commands;
mod logging;

#[derive(Parser, Debug)]
#[command(name = "cloudmcp", version, about = "MCP server for the Linode API")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the MCP server.
    Serve {
        /// Path to the configuration file.
        #[arg(long, short = 'c', env = "CLOUDMCP_CONFIG", default_value = "cloudmcp.yaml")]
        config: PathBuf,

        /// Override the configured transport (stdio or http).
        #[arg(long)]
        transport: Option<Transport>,

        /// Override the HTTP port.
        #[arg(long)]
        port: Option<u16>,
    },

    /// Inspect the tool catalog without contacting Linode.
    Tools {
        #[command(subcommand)]
        cmd: ToolsCommand,
    },

    /// Validate a configuration file.
    Check {
        /// Path to the configuration file.
        #[arg(long, short = 'c', env = "CLOUDMCP_CONFIG", default_value = "cloudmcp.yaml")]
        config: PathBuf,

        /// Also verify every account token against the Linode API.
        #[arg(long, default_value_t = false)]
        verify: bool,
    },
}

#[derive(Subcommand, Debug)]
enum ToolsCommand {
    /// List every tool.
    List {
        /// Print each tool's input schema.
        #[arg(long, short = 'v', default_value_t = false)]
        verbose: bool,
    },

    /// Show the input schema of one tool.
    Describe {
        /// Tool name, e.g. linode_instance_get.
        name: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.cmd {
        Command::Serve {
            config,
            transport,
            port,
        } => commands::serve::run(&config, transport, port).await?,

        Command::Tools { cmd } => {
            logging::init(logging::QUIET_LEVEL);
            match cmd {
                ToolsCommand::List { verbose } => commands::tools::list(verbose)?,
                ToolsCommand::Describe { name } => commands::tools::describe(&name)?,
            }
        }

        Command::Check { config, verify } => {
            logging::init(logging::QUIET_LEVEL);
            commands::check::run(&config, verify).await?
        }
    }

    Ok(())
}
