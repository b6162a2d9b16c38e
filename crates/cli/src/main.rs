use anyhow::Context;
use bookshelf_app::Application;
use bookshelf_kernel::settings::{DatabaseBackend, Settings};
use clap::{Parser, Subcommand, ValueEnum};

/// Operate the bookshelf service.
#[derive(Debug, Parser)]
#[command(name = "bookshelf", version, about)]
struct Cli {
    /// Override the configured storage backend.
    #[arg(long, global = true, value_enum)]
    backend: Option<Backend>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP API (default).
    Serve {
        /// Override the configured listen port.
        #[arg(long)]
        port: Option<u16>,
    },
    /// Apply pending database migrations and exit.
    Migrate,
    /// Check that the configured database is reachable.
    Check,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Backend {
    Mongodb,
    Memory,
}

impl From<Backend> for DatabaseBackend {
    fn from(backend: Backend) -> Self {
        match backend {
            Backend::Mongodb => DatabaseBackend::Mongodb,
            Backend::Memory => DatabaseBackend::Memory,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut settings = Settings::load().with_context(|| "failed to load bookshelf settings")?;
    if let Some(backend) = cli.backend {
        settings.database.backend = backend.into();
    }
    bookshelf_telemetry::init(&settings.telemetry)?;

    match cli.command.unwrap_or(Command::Serve { port: None }) {
        Command::Serve { port } => {
            if let Some(port) = port {
                settings.server.port = port;
            }
            tracing::info!(env = ?settings.environment, "starting bookshelf server");
            Application::build(settings)
                .await?
                .serve(bookshelf_http::shutdown_signal())
                .await
        }
        Command::Migrate => {
            let app = Application::build(settings).await?;
            app.init().await?;
            let applied = app.migrate().await?;
            println!("applied {} migration(s)", applied);
            Ok(())
        }
        Command::Check => {
            let app = Application::build(settings).await?;
            app.check().await?;
            println!("database reachable");
            Ok(())
        }
    }
}
