use anyhow::Context;
use clap::{Parser, Subcommand};
use wallpapers_common::{BusMessage, IpcClient, IpcCommand, IpcResponse};

#[derive(Parser)]
#[command(name = "wallpapers-cli")]
#[command(about = "wallpapers-cli (wallpapers skill daemon control)")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Pick random pictures and show the first one
    Random {
        /// Also set it as the desktop wallpaper
        #[arg(long)]
        wallpaper: bool,
    },

    /// Pick pictures about a topic
    About {
        /// Channel, category or free text
        query: Vec<String>,
        /// Also set the first one as the desktop wallpaper
        #[arg(long)]
        wallpaper: bool,
    },

    /// Show the next picture
    Next,

    /// Show the previous picture
    Previous,

    /// Set the picture on screen as the desktop wallpaper
    Set,

    /// Refresh the idle screen picture
    Idle,

    /// Open the home page slideshow
    Home,

    /// Speak the introduction
    Intro,

    /// Reload configuration
    Reload,

    /// Show current status
    Status,

    /// Send a raw bus message, e.g. `bus get.new.wallpaper`
    Bus {
        #[arg(value_name = "TYPE")]
        msg_type: String,
        /// JSON payload
        data: Option<String>,
    },
}

impl Commands {
    fn into_ipc(self) -> anyhow::Result<IpcCommand> {
        let command = match self {
            Commands::Random { wallpaper: true } => IpcCommand::RandomWallpaper,
            Commands::Random { wallpaper: false } => IpcCommand::RandomPicture,
            Commands::About { query, wallpaper } => {
                let query = query.join(" ");
                if query.trim().is_empty() {
                    anyhow::bail!("a topic is required");
                }
                if wallpaper {
                    IpcCommand::WallpaperAbout { query }
                } else {
                    IpcCommand::PictureAbout { query }
                }
            }
            Commands::Next => IpcCommand::Next,
            Commands::Previous => IpcCommand::Previous,
            Commands::Set => IpcCommand::SetCurrent,
            Commands::Idle => IpcCommand::Idle,
            Commands::Home => IpcCommand::Homepage,
            Commands::Intro => IpcCommand::Intro,
            Commands::Reload => IpcCommand::Reload,
            Commands::Status => IpcCommand::Status,
            Commands::Bus { msg_type, data } => {
                let data = match data {
                    Some(raw) => serde_json::from_str(&raw).context("Bus payload is not valid JSON")?,
                    None => serde_json::Value::Null,
                };
                IpcCommand::Bus {
                    message: BusMessage::new(msg_type, data),
                }
            }
        };
        Ok(command)
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let command = cli.command.into_ipc()?;

    match IpcClient::new().send_command(&command) {
        Ok(response) => print_response(response),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }

    Ok(())
}

fn print_response(response: IpcResponse) {
    match response {
        IpcResponse::Success { message } => {
            println!("✓ {}", message);
        }

        IpcResponse::Error { message } => {
            eprintln!("✗ Error: {}", message);
            std::process::exit(1);
        }

        IpcResponse::Handled { speech, events, current } => {
            for line in speech {
                println!("» {}", line);
            }
            for event in events {
                println!("→ {} {}", event.msg_type, event.data);
            }
            if let Some(record) = current {
                println!("{}", record.title.as_deref().unwrap_or("(untitled)"));
                println!("  {}", record.image_url);
                if let Some(url) = record.url {
                    println!("  from {}", url);
                }
            }
        }

        IpcResponse::Status { skill, rotate_every } => {
            println!("wallpapers Status:");
            println!("==================");
            println!("Mode: {}", skill.mode);
            println!("Language: {}", skill.lang);
            match rotate_every {
                Some(every) => println!("Rotation: every {}", every),
                None => println!("Rotation: off"),
            }
            if let Some(at) = skill.last_selection {
                println!("Last selection: {}", at.with_timezone(&chrono::Local).format("%Y-%m-%d %H:%M:%S"));
            }
            println!();

            if skill.total == 0 {
                println!("No pictures loaded");
                return;
            }

            let title = skill
                .current
                .as_ref()
                .and_then(|r| r.title.as_deref())
                .unwrap_or("(untitled)");
            println!(
                "{} | {}/{} | {}",
                skill.source.as_deref().unwrap_or("unknown source"),
                skill.position + 1,
                skill.total,
                title
            );
        }
    }
}
