//! Implements AutorunPort. Launch-at-login entry per platform:
//!
//! - Windows: `HKCU\Software\Microsoft\Windows\CurrentVersion\Run` value (via `reg.exe`)
//! - macOS: `~/Library/LaunchAgents/<label>.plist`
//! - Other Unix: XDG autostart `~/.config/autostart/<name>.desktop`

use crate::domain::DomainError;
use crate::ports::AutorunPort;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::process::Command;
use tracing::debug;

const RUN_KEY: &str = r"HKCU\Software\Microsoft\Windows\CurrentVersion\Run";

enum Backend {
    Registry { value_name: String },
    LaunchAgent { plist: PathBuf, label: String },
    XdgAutostart { entry: PathBuf, name: String },
}

/// OS-managed launch-at-login entry named after the app.
pub struct SystemAutorun {
    backend: Backend,
}

impl SystemAutorun {
    /// Pick the backend for the running OS.
    pub fn for_current_platform(app_name: &str) -> Result<Self, DomainError> {
        let backend = if cfg!(target_os = "windows") {
            Backend::Registry {
                value_name: app_name.to_string(),
            }
        } else if cfg!(target_os = "macos") {
            let label = format!("local.{}", app_name);
            let plist = home_dir()?
                .join("Library/LaunchAgents")
                .join(format!("{}.plist", label));
            Backend::LaunchAgent { plist, label }
        } else {
            let config_home = std::env::var_os("XDG_CONFIG_HOME")
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
                .map_or_else(|| home_dir().map(|h| h.join(".config")), Ok)?;
            return Ok(Self::xdg(config_home.join("autostart"), app_name));
        };
        Ok(Self { backend })
    }

    /// XDG autostart entry inside `autostart_dir`.
    pub fn xdg(autostart_dir: impl AsRef<Path>, app_name: &str) -> Self {
        Self {
            backend: Backend::XdgAutostart {
                entry: autostart_dir
                    .as_ref()
                    .join(format!("{}.desktop", app_name)),
                name: app_name.to_string(),
            },
        }
    }

    /// LaunchAgent plist inside `agents_dir`.
    pub fn launch_agent(agents_dir: impl AsRef<Path>, app_name: &str) -> Self {
        let label = format!("local.{}", app_name);
        Self {
            backend: Backend::LaunchAgent {
                plist: agents_dir.as_ref().join(format!("{}.plist", label)),
                label,
            },
        }
    }
}

fn home_dir() -> Result<PathBuf, DomainError> {
    std::env::var_os("HOME")
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .ok_or_else(|| DomainError::Autorun("HOME is not set".into()))
}

#[async_trait::async_trait]
impl AutorunPort for SystemAutorun {
    async fn is_enabled(&self) -> bool {
        match &self.backend {
            Backend::Registry { value_name } => Command::new("reg")
                .args(["query", RUN_KEY, "/v", value_name.as_str()])
                .output()
                .await
                .map(|o| o.status.success())
                .unwrap_or(false),
            Backend::LaunchAgent { plist: path, .. } | Backend::XdgAutostart { entry: path, .. } => {
                fs::try_exists(path).await.unwrap_or(false)
            }
        }
    }

    async fn set_enabled(&self, enabled: bool, exe_path: &Path) -> Result<(), DomainError> {
        match &self.backend {
            Backend::Registry { value_name } => {
                let result = if enabled {
                    let data = format!("\"{}\"", exe_path.display());
                    Command::new("reg")
                        .args(["add", RUN_KEY, "/v", value_name.as_str(), "/t", "REG_SZ", "/d"])
                        .arg(data)
                        .arg("/f")
                        .output()
                        .await
                } else {
                    if !self.is_enabled().await {
                        return Ok(());
                    }
                    Command::new("reg")
                        .args(["delete", RUN_KEY, "/v", value_name.as_str(), "/f"])
                        .output()
                        .await
                };
                let output =
                    result.map_err(|e| DomainError::Autorun(format!("run reg.exe: {}", e)))?;
                if !output.status.success() {
                    return Err(DomainError::Autorun(format!(
                        "reg.exe exited with {}: {}",
                        output.status,
                        String::from_utf8_lossy(&output.stderr).trim()
                    )));
                }
            }
            Backend::LaunchAgent { plist, label } => {
                if enabled {
                    write_entry(plist, &launch_agent_plist(label, exe_path)).await?;
                } else {
                    remove_entry(plist).await?;
                }
            }
            Backend::XdgAutostart { entry, name } => {
                if enabled {
                    write_entry(entry, &desktop_entry(name, exe_path)).await?;
                } else {
                    remove_entry(entry).await?;
                }
            }
        }
        debug!(enabled, exe = %exe_path.display(), "autorun entry updated");
        Ok(())
    }
}

async fn write_entry(path: &Path, contents: &str) -> Result<(), DomainError> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)
            .await
            .map_err(|e| DomainError::Autorun(format!("create {}: {}", dir.display(), e)))?;
    }
    fs::write(path, contents)
        .await
        .map_err(|e| DomainError::Autorun(format!("write {}: {}", path.display(), e)))
}

async fn remove_entry(path: &Path) -> Result<(), DomainError> {
    match fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(DomainError::Autorun(format!(
            "remove {}: {}",
            path.display(),
            e
        ))),
    }
}

fn desktop_entry(name: &str, exe_path: &Path) -> String {
    let exec: String = exe_path
        .display()
        .to_string()
        .chars()
        .flat_map(|c| match c {
            '"' | '`' | '$' | '\\' => vec!['\\', c],
            _ => vec![c],
        })
        .collect();
    format!(
        "[Desktop Entry]\nType=Application\nName={name}\nExec=\"{exec}\"\nX-GNOME-Autostart-enabled=true\n"
    )
}

fn launch_agent_plist(label: &str, exe_path: &Path) -> String {
    let xml_escape = |s: &str| {
        s.replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;")
    };
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0">
<dict>
    <key>Label</key>
    <string>{}</string>
    <key>ProgramArguments</key>
    <array>
        <string>{}</string>
    </array>
    <key>RunAtLoad</key>
    <true/>
</dict>
</plist>
"#,
        xml_escape(label),
        xml_escape(&exe_path.display().to_string())
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_desktop_entry_quotes_exec() {
        let entry = desktop_entry("sms-relay", Path::new("/opt/my apps/$relay"));
        assert!(entry.starts_with("[Desktop Entry]\n"));
        assert!(entry.contains("Exec=\"/opt/my apps/\\$relay\"\n"));
        assert!(entry.contains("Name=sms-relay\n"));
    }

    #[test]
    fn test_plist_escapes_path() {
        let plist = launch_agent_plist("local.sms-relay", Path::new("/Apps/R&D/relay"));
        assert!(plist.contains("<string>/Apps/R&amp;D/relay</string>"));
        assert!(plist.contains("<string>local.sms-relay</string>"));
    }

    #[tokio::test]
    async fn test_xdg_toggle_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let autorun = SystemAutorun::xdg(dir.path().join("autostart"), "sms-relay");
        let exe = Path::new("/usr/local/bin/sms-relay");

        assert!(!autorun.is_enabled().await);
        autorun.set_enabled(true, exe).await.unwrap();
        assert!(autorun.is_enabled().await);
        let written =
            std::fs::read_to_string(dir.path().join("autostart/sms-relay.desktop")).unwrap();
        assert!(written.contains("/usr/local/bin/sms-relay"));

        autorun.set_enabled(false, exe).await.unwrap();
        assert!(!autorun.is_enabled().await);
        // Disabling twice is fine.
        autorun.set_enabled(false, exe).await.unwrap();
    }

    #[tokio::test]
    async fn test_launch_agent_toggle() {
        let dir = tempfile::tempdir().unwrap();
        let autorun = SystemAutorun::launch_agent(dir.path(), "sms-relay");
        autorun
            .set_enabled(true, Path::new("/Applications/relay"))
            .await
            .unwrap();
        assert!(dir.path().join("local.sms-relay.plist").exists());
        assert!(autorun.is_enabled().await);
    }
}
