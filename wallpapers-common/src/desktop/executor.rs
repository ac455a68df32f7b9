use super::command_builder::WallpaperCommand;
use crate::error::{DesktopError, WallpapersError};
use crate::Result;
use std::path::PathBuf;

/// Session variables the wallpaper tools need to find the display.
const SESSION_VARS: &[&str] = &[
    "WAYLAND_DISPLAY",
    "DISPLAY",
    "XDG_RUNTIME_DIR",
    "XDG_CURRENT_DESKTOP",
    "XDG_SESSION_TYPE",
    "DBUS_SESSION_BUS_ADDRESS",
    "SWAYSOCK",
];

pub trait CommandRunner {
    fn run(&self, command: &WallpaperCommand) -> Result<()>;
}

#[derive(Debug, Clone, Default)]
pub struct ProcessExecutor;

impl ProcessExecutor {
    pub fn new() -> Self {
        Self
    }

    fn locate(program: &str) -> Result<PathBuf> {
        which::which(program).map_err(|_| {
            WallpapersError::Desktop(DesktopError::BinaryNotFound {
                binary: program.to_string(),
            })
        })
    }
}

impl CommandRunner for ProcessExecutor {
    fn run(&self, command: &WallpaperCommand) -> Result<()> {
        let binary = Self::locate(&command.program)?;
        let mut cmd = command.to_command(&binary);

        for var in SESSION_VARS {
            if let Ok(value) = std::env::var(var) {
                cmd.env(var, value);
            }
        }

        log::info!("Executing wallpaper command: {}", command);

        let output = cmd.output().map_err(|e| {
            WallpapersError::Desktop(DesktopError::Execution {
                command: command.to_string(),
                source: e,
            })
        })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        if !stdout.is_empty() {
            log::debug!("{} stdout: {}", command.program, stdout);
        }

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            log::error!(
                "{} failed with exit code {}: {}",
                command.program,
                output.status.code().unwrap_or(-1),
                stderr
            );
            return Err(WallpapersError::Desktop(DesktopError::NonZeroExit {
                code: output.status.code().unwrap_or(-1),
                stderr: stderr.to_string(),
            }));
        }

        Ok(())
    }
}
