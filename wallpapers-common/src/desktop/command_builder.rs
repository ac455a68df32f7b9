use super::DesktopEnv;
use std::path::Path;
use std::process::Command;

/// One program invocation needed to apply a wallpaper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WallpaperCommand {
    pub program: String,
    pub args: Vec<String>,
    /// Best-effort commands may fail without failing the whole change.
    pub required: bool,
}

impl WallpaperCommand {
    fn new(program: &str, args: &[&str]) -> Self {
        Self {
            program: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
            required: true,
        }
    }

    fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn to_command(&self, binary: &Path) -> Command {
        let mut cmd = Command::new(binary);
        cmd.args(&self.args);
        cmd
    }
}

impl std::fmt::Display for WallpaperCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.program, self.args.join(" "))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CommandBuilder;

impl CommandBuilder {
    pub fn new() -> Self {
        Self
    }

    pub fn build(&self, env: DesktopEnv, image_path: &Path) -> Vec<WallpaperCommand> {
        let path = image_path.to_string_lossy();
        let uri = format!("file://{}", path);

        match env {
            DesktopEnv::Gnome => vec![
                WallpaperCommand::new(
                    "gsettings",
                    &["set", "org.gnome.desktop.background", "picture-uri", &uri],
                ),
                WallpaperCommand::new(
                    "gsettings",
                    &["set", "org.gnome.desktop.background", "picture-uri-dark", &uri],
                )
                .optional(),
                WallpaperCommand::new(
                    "gsettings",
                    &["set", "org.gnome.desktop.background", "picture-options", "zoom"],
                )
                .optional(),
            ],
            DesktopEnv::Cinnamon => vec![WallpaperCommand::new(
                "gsettings",
                &["set", "org.cinnamon.desktop.background", "picture-uri", &uri],
            )],
            DesktopEnv::Mate => vec![WallpaperCommand::new(
                "gsettings",
                &["set", "org.mate.background", "picture-filename", &path],
            )],
            DesktopEnv::Kde => vec![WallpaperCommand::new("plasma-apply-wallpaperimage", &[&path])],
            DesktopEnv::Xfce => vec![WallpaperCommand::new(
                "xfconf-query",
                &[
                    "-c",
                    "xfce4-desktop",
                    "-p",
                    "/backdrop/screen0/monitor0/workspace0/last-image",
                    "-s",
                    &path,
                ],
            )],
            DesktopEnv::Sway => {
                vec![WallpaperCommand::new("swaymsg", &["output", "*", "bg", &path, "fill"])]
            }
            DesktopEnv::Swww => vec![WallpaperCommand::new("swww", &["img", &path])],
            DesktopEnv::Feh => vec![WallpaperCommand::new("feh", &["--bg-fill", &path])],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gnome_sets_uri_and_dark_variant() {
        let commands = CommandBuilder::new().build(DesktopEnv::Gnome, Path::new("/tmp/fjord.jpg"));

        assert_eq!(commands.len(), 3);
        assert!(commands[0].required);
        assert_eq!(
            commands[0].args,
            ["set", "org.gnome.desktop.background", "picture-uri", "file:///tmp/fjord.jpg"]
        );
        assert_eq!(commands[1].args[2], "picture-uri-dark");
        assert!(!commands[1].required);
        assert!(!commands[2].required);
    }

    #[test]
    fn test_plain_path_environments() {
        let builder = CommandBuilder::new();
        let image = Path::new("/tmp/a b.png");

        assert_eq!(
            builder.build(DesktopEnv::Feh, image),
            vec![WallpaperCommand::new("feh", &["--bg-fill", "/tmp/a b.png"])]
        );
        assert_eq!(
            builder.build(DesktopEnv::Kde, image)[0].to_string(),
            "plasma-apply-wallpaperimage /tmp/a b.png"
        );
        assert_eq!(builder.build(DesktopEnv::Sway, image)[0].args[3], "/tmp/a b.png");
        assert_eq!(builder.build(DesktopEnv::Mate, image)[0].args[3], "/tmp/a b.png");
        assert_eq!(builder.build(DesktopEnv::Xfce, image)[0].args.last().unwrap(), "/tmp/a b.png");
    }

    #[test]
    fn test_swww_image_command() {
        let commands = CommandBuilder::new().build(DesktopEnv::Swww, Path::new("/tmp/x.jpg"));

        assert_eq!(commands.len(), 1);
        assert_eq!(commands[0].program, "swww");
        assert_eq!(commands[0].args, ["img", "/tmp/x.jpg"]);
    }
}
