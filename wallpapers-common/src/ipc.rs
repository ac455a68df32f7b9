use crate::bus::BusMessage;
use crate::record::ImageRecord;
use crate::skill::SkillStatus;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::{Path, PathBuf};

const SOCKET_NAME: &str = "wallpapers.sock";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum IpcCommand {
    RandomPicture,
    RandomWallpaper,
    PictureAbout { query: String },
    WallpaperAbout { query: String },
    Next,
    Previous,
    SetCurrent,
    Idle,
    Homepage,
    Intro,
    Reload,
    Status,
    Bus { message: BusMessage },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum IpcResponse {
    /// An intent ran: what was said, what went out on the bus, and the
    /// record now on screen.
    Handled {
        speech: Vec<String>,
        events: Vec<BusMessage>,
        current: Option<ImageRecord>,
    },
    Status {
        skill: SkillStatus,
        rotate_every: Option<String>,
    },
    Success { message: String },
    Error { message: String },
}

pub fn default_socket_path() -> PathBuf {
    dirs::runtime_dir()
        .unwrap_or_else(|| PathBuf::from("/tmp"))
        .join(SOCKET_NAME)
}

pub struct IpcClient {
    socket_path: PathBuf,
}

impl Default for IpcClient {
    fn default() -> Self {
        Self::new()
    }
}

impl IpcClient {
    pub fn new() -> Self {
        Self::with_path(default_socket_path())
    }

    pub fn with_path(socket_path: impl Into<PathBuf>) -> Self {
        Self {
            socket_path: socket_path.into(),
        }
    }

    pub fn send_command(&self, command: &IpcCommand) -> Result<IpcResponse> {
        let mut stream = UnixStream::connect(&self.socket_path)
            .with_context(|| format!("Failed to connect to wallpapers daemon at {:?}", self.socket_path))?;

        let command_json = serde_json::to_string(command).context("Failed to serialize command")?;

        stream
            .write_all(command_json.as_bytes())
            .context("Failed to send command to daemon")?;
        stream
            .shutdown(std::net::Shutdown::Write)
            .context("Failed to shutdown write stream")?;

        let mut response = String::new();
        stream
            .read_to_string(&mut response)
            .context("Failed to read response from daemon")?;

        serde_json::from_str(&response).context("Failed to deserialize response")
    }
}

pub struct IpcServer {
    socket_path: PathBuf,
}

impl Default for IpcServer {
    fn default() -> Self {
        Self::new()
    }
}

impl IpcServer {
    pub fn new() -> Self {
        Self::with_path(default_socket_path())
    }

    pub fn with_path(socket_path: impl Into<PathBuf>) -> Self {
        Self {
            socket_path: socket_path.into(),
        }
    }

    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    /// Bind the socket, replacing a stale one.
    pub fn bind(&self) -> Result<UnixListener> {
        if self.socket_path.exists() {
            std::fs::remove_file(&self.socket_path).context("Failed to remove existing socket")?;
        }

        if let Some(parent) = self.socket_path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create socket directory")?;
        }

        let listener = UnixListener::bind(&self.socket_path)
            .with_context(|| format!("Failed to bind to socket {:?}", self.socket_path))?;
        log::info!("IPC server listening on {:?}", self.socket_path);
        Ok(listener)
    }

    /// Serve forever, one thread per connection.
    pub fn serve<F>(listener: UnixListener, handler: F) -> Result<()>
    where
        F: Fn(IpcCommand) -> Result<IpcResponse> + Send + Clone + 'static,
    {
        for stream in listener.incoming() {
            match stream {
                Ok(stream) => {
                    let handler = handler.clone();
                    std::thread::spawn(move || {
                        if let Err(e) = Self::handle_connection(stream, &handler) {
                            log::error!("Error handling IPC connection: {}", e);
                        }
                    });
                }
                Err(e) => {
                    log::error!("Error accepting IPC connection: {}", e);
                }
            }
        }

        Ok(())
    }

    pub fn start<F>(&self, handler: F) -> Result<()>
    where
        F: Fn(IpcCommand) -> Result<IpcResponse> + Send + Clone + 'static,
    {
        let listener = self.bind()?;
        Self::serve(listener, handler)
    }

    fn handle_connection<F>(mut stream: UnixStream, handler: &F) -> Result<()>
    where
        F: Fn(IpcCommand) -> Result<IpcResponse>,
    {
        let mut command_json = String::new();
        stream
            .read_to_string(&mut command_json)
            .context("Failed to read command from client")?;

        let response = match serde_json::from_str::<IpcCommand>(&command_json) {
            Ok(command) => {
                log::debug!("IPC command: {:?}", command);
                handler(command).unwrap_or_else(|e| IpcResponse::Error { message: e.to_string() })
            }
            Err(e) => IpcResponse::Error {
                message: format!("Invalid command: {}", e),
            },
        };

        let response_json = serde_json::to_string(&response).context("Failed to serialize response")?;

        stream
            .write_all(response_json.as_bytes())
            .context("Failed to send response to client")?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn test_command_wire_format() {
        let encoded = serde_json::to_value(IpcCommand::PictureAbout { query: "foxes".into() }).unwrap();
        assert_eq!(encoded, json!({"PictureAbout": {"query": "foxes"}}));
        assert_eq!(serde_json::to_value(IpcCommand::Next).unwrap(), json!("Next"));

        let bus: IpcCommand =
            serde_json::from_str(r#"{"Bus": {"message": {"type": "get.new.wallpaper"}}}"#).unwrap();
        assert!(matches!(bus, IpcCommand::Bus { message } if message.msg_type == "get.new.wallpaper"));
    }

    #[test]
    fn test_request_response_over_socket() {
        let dir = tempdir().unwrap();
        let server = IpcServer::with_path(dir.path().join("test.sock"));
        let listener = server.bind().unwrap();

        std::thread::spawn(move || {
            IpcServer::serve(listener, |command| match command {
                IpcCommand::Next => Ok(IpcResponse::Success {
                    message: "moved".to_string(),
                }),
                other => Err(anyhow::anyhow!("unsupported: {:?}", other)),
            })
        });

        let client = IpcClient::with_path(server.socket_path());
        assert_eq!(
            client.send_command(&IpcCommand::Next).unwrap(),
            IpcResponse::Success {
                message: "moved".to_string()
            }
        );
        match client.send_command(&IpcCommand::Idle).unwrap() {
            IpcResponse::Error { message } => assert!(message.contains("unsupported")),
            other => panic!("expected error, got {:?}", other),
        }
    }
}
