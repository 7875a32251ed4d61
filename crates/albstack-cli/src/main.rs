use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "albstack",
    about = "albstack — load-balanced container service stacks as code",
    version,
    propagate_version = true,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate an albstack.toml scaffold
    Init {
        /// Directory to write albstack.toml into
        #[arg(short, long, default_value = ".")]
        path: String,
        /// Stack name (prefix of every derived resource name)
        #[arg(short, long, default_value = "App")]
        name: String,
    },
    /// Build the stack and render its template.
    ///
    /// The template goes to stdout unless --out is given. Names the
    /// provider would reject fail here, before anything is deployed.
    Synth {
        /// Deployment file
        #[arg(short, long, default_value = "albstack.toml")]
        config: String,
        /// Write the template to this file instead of stdout
        #[arg(short, long)]
        out: Option<String>,
    },
    /// Show the resources a deployment file describes
    Describe {
        #[arg(short, long, default_value = "albstack.toml")]
        config: String,
        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: String,
    },
}

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so `synth` output on stdout stays pipeable.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("albstack=info".parse()?)
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init { path, name } => commands::init::init(&path, &name),
        Commands::Synth { config, out } => commands::synth::synth(&config, out.as_deref()),
        Commands::Describe { config, format } => commands::describe::describe(&config, &format),
    }
}
