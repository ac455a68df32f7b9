pub mod command_builder;
pub mod executor;

use crate::cache::ImageCache;
use crate::error::DesktopError;
use crate::Result;
use std::str::FromStr;

pub use command_builder::{CommandBuilder, WallpaperCommand};
pub use executor::{CommandRunner, ProcessExecutor};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DesktopEnv {
    Gnome,
    Cinnamon,
    Mate,
    Kde,
    Xfce,
    Sway,
    Swww,
    Feh,
}

impl std::fmt::Display for DesktopEnv {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            DesktopEnv::Gnome => "gnome",
            DesktopEnv::Cinnamon => "cinnamon",
            DesktopEnv::Mate => "mate",
            DesktopEnv::Kde => "kde",
            DesktopEnv::Xfce => "xfce",
            DesktopEnv::Sway => "sway",
            DesktopEnv::Swww => "swww",
            DesktopEnv::Feh => "feh",
        };
        f.write_str(name)
    }
}

impl FromStr for DesktopEnv {
    type Err = DesktopError;

    /// Accepts plain names and session strings such as `ubuntu:GNOME`.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        s.split(':')
            .find_map(|token| match token.trim().to_lowercase().as_str() {
                "gnome" | "gnome-xorg" | "gnome-classic" | "unity" | "ubuntu" | "pantheon" | "budgie" => {
                    Some(DesktopEnv::Gnome)
                }
                "cinnamon" | "x-cinnamon" => Some(DesktopEnv::Cinnamon),
                "mate" => Some(DesktopEnv::Mate),
                "kde" | "plasma" | "plasmawayland" => Some(DesktopEnv::Kde),
                "xfce" | "xfce4" | "xubuntu" => Some(DesktopEnv::Xfce),
                "sway" => Some(DesktopEnv::Sway),
                "swww" | "hyprland" | "river" | "wayland" => Some(DesktopEnv::Swww),
                "feh" | "i3" | "openbox" | "x11" => Some(DesktopEnv::Feh),
                _ => None,
            })
            .ok_or_else(|| DesktopError::UnknownEnvironment { name: s.to_string() })
    }
}

impl DesktopEnv {
    /// Detect from the current process environment.
    pub fn detect() -> Result<Self> {
        Self::detect_with(|var| std::env::var(var).ok())
    }

    /// Named desktops first, then the bare display server.
    pub fn detect_with<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        for var in ["XDG_CURRENT_DESKTOP", "DESKTOP_SESSION"] {
            if let Some(value) = lookup(var).filter(|v| !v.is_empty()) {
                match value.parse() {
                    Ok(env) => {
                        log::debug!("Detected desktop {} from {}={}", env, var, value);
                        return Ok(env);
                    }
                    Err(e) => log::debug!("{}: {}", var, e),
                }
            }
        }

        if lookup("WAYLAND_DISPLAY").is_some() {
            if lookup("SWAYSOCK").is_some() {
                return Ok(DesktopEnv::Sway);
            }
            return Ok(DesktopEnv::Swww);
        }
        if lookup("DISPLAY").is_some() {
            return Ok(DesktopEnv::Feh);
        }

        Err(DesktopError::DetectionFailed.into())
    }
}

/// Applies an image URL as the desktop background. `desktop` overrides
/// detection.
pub trait WallpaperSetter {
    fn set_wallpaper(&mut self, image_url: &str, desktop: Option<&str>) -> Result<()>;
}

pub struct DesktopSetter {
    cache: ImageCache,
    builder: CommandBuilder,
    runner: Box<dyn CommandRunner + Send>,
}

impl DesktopSetter {
    pub fn new(cache: ImageCache) -> Self {
        Self::with_runner(cache, CommandBuilder::new(), Box::new(ProcessExecutor::new()))
    }

    pub fn with_runner(
        cache: ImageCache,
        builder: CommandBuilder,
        runner: Box<dyn CommandRunner + Send>,
    ) -> Self {
        Self {
            cache,
            builder,
            runner,
        }
    }

    pub fn cache(&self) -> &ImageCache {
        &self.cache
    }
}

impl WallpaperSetter for DesktopSetter {
    fn set_wallpaper(&mut self, image_url: &str, desktop: Option<&str>) -> Result<()> {
        let env = match desktop {
            Some(name) => name.parse::<DesktopEnv>()?,
            None => DesktopEnv::detect()?,
        };
        let path = self.cache.fetch(image_url)?;

        for command in self.builder.build(env, &path) {
            match self.runner.run(&command) {
                Ok(()) => {}
                Err(e) if !command.required => {
                    log::debug!("Ignoring failed optional command {}: {}", command, e);
                }
                Err(e) => return Err(e),
            }
        }
        log::info!("Wallpaper set on {}: {:?}", env, path);

        if let Err(e) = self.cache.prune() {
            log::warn!("Failed to prune image cache: {}", e);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WallpapersError;
    use reqwest::blocking::Client;
    use std::collections::HashMap;
    use std::fs;
    use std::sync::{Arc, Mutex};
    use tempfile::tempdir;

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_parse_session_strings() {
        assert_eq!("GNOME".parse::<DesktopEnv>().unwrap(), DesktopEnv::Gnome);
        assert_eq!("ubuntu:GNOME".parse::<DesktopEnv>().unwrap(), DesktopEnv::Gnome);
        assert_eq!("X-Cinnamon".parse::<DesktopEnv>().unwrap(), DesktopEnv::Cinnamon);
        assert_eq!("KDE".parse::<DesktopEnv>().unwrap(), DesktopEnv::Kde);
        assert!(matches!(
            "amiga".parse::<DesktopEnv>(),
            Err(DesktopError::UnknownEnvironment { .. })
        ));
    }

    #[test]
    fn test_detection_order() {
        let detected = DesktopEnv::detect_with(env(&[
            ("XDG_CURRENT_DESKTOP", "XFCE"),
            ("WAYLAND_DISPLAY", "wayland-0"),
        ]))
        .unwrap();
        assert_eq!(detected, DesktopEnv::Xfce);

        let detected = DesktopEnv::detect_with(env(&[
            ("XDG_CURRENT_DESKTOP", "weird"),
            ("DESKTOP_SESSION", "mate"),
        ]))
        .unwrap();
        assert_eq!(detected, DesktopEnv::Mate);

        let detected =
            DesktopEnv::detect_with(env(&[("WAYLAND_DISPLAY", "wayland-1"), ("SWAYSOCK", "/run/sway")])).unwrap();
        assert_eq!(detected, DesktopEnv::Sway);

        assert_eq!(DesktopEnv::detect_with(env(&[("DISPLAY", ":0")])).unwrap(), DesktopEnv::Feh);
        assert!(matches!(
            DesktopEnv::detect_with(env(&[])),
            Err(WallpapersError::Desktop(DesktopError::DetectionFailed))
        ));
    }

    #[derive(Clone, Default)]
    struct Recorder {
        ran: Arc<Mutex<Vec<String>>>,
        fail_optional: bool,
    }

    impl CommandRunner for Recorder {
        fn run(&self, command: &WallpaperCommand) -> Result<()> {
            self.ran.lock().unwrap().push(command.to_string());
            if self.fail_optional && !command.required {
                return Err(DesktopError::NonZeroExit { code: 1, stderr: "no key".into() }.into());
            }
            Ok(())
        }
    }

    #[test]
    fn test_setter_runs_commands_for_cached_image() {
        let dir = tempdir().unwrap();
        let cache = ImageCache::new(dir.path().to_path_buf(), Client::new(), 10);
        let cached = cache.path_for("https://img.example/fjord.jpg");
        fs::write(&cached, b"jpeg").unwrap();

        let recorder = Recorder {
            fail_optional: true,
            ..Recorder::default()
        };
        let mut setter =
            DesktopSetter::with_runner(cache, CommandBuilder::new(), Box::new(recorder.clone()));

        setter
            .set_wallpaper("https://img.example/fjord.jpg", Some("gnome"))
            .unwrap();

        let ran = recorder.ran.lock().unwrap();
        assert_eq!(ran.len(), 3);
        assert!(ran[0].contains(&format!("file://{}", cached.display())));
    }

    #[test]
    fn test_setter_rejects_unknown_override() {
        let dir = tempdir().unwrap();
        let cache = ImageCache::new(dir.path().to_path_buf(), Client::new(), 10);
        let mut setter =
            DesktopSetter::with_runner(cache, CommandBuilder::new(), Box::new(Recorder::default()));

        let result = setter.set_wallpaper("https://img.example/a.jpg", Some("amiga"));
        assert!(matches!(
            result,
            Err(WallpapersError::Desktop(DesktopError::UnknownEnvironment { .. }))
        ));
    }
}
