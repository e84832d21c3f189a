//! Implements NotifierPort by running the platform's notification tool.
//!
//! - Linux/BSD: `notify-send`
//! - macOS: `osascript` (`display notification`)
//! - Windows: PowerShell driving the WinRT toast API
//!
//! Title and body are passed as arguments or environment, never spliced into
//! a script, so message text cannot break out of the command.

use crate::domain::DomainError;
use crate::ports::NotifierPort;
use std::path::PathBuf;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

/// Upper bound on waiting for the notifier process.
const NOTIFY_TIMEOUT: Duration = Duration::from_secs(5);

/// Desktop toast/banner notifier.
pub struct DesktopNotifier {
    app_name: String,
    icon: Option<PathBuf>,
}

impl DesktopNotifier {
    pub fn new(app_name: impl Into<String>, icon: Option<PathBuf>) -> Self {
        Self {
            app_name: app_name.into(),
            icon,
        }
    }

    fn command(&self, title: &str, body: &str) -> Command {
        if cfg!(target_os = "windows") {
            let mut cmd = Command::new("powershell.exe");
            cmd.args(["-NoProfile", "-NonInteractive", "-Command", WINDOWS_TOAST_SCRIPT])
                .env("SMS_RELAY_TOAST_APP", &self.app_name)
                .env("SMS_RELAY_TOAST_TITLE", title)
                .env("SMS_RELAY_TOAST_BODY", body);
            if let Some(icon) = &self.icon {
                cmd.env("SMS_RELAY_TOAST_ICON", icon);
            }
            cmd
        } else if cfg!(target_os = "macos") {
            let mut cmd = Command::new("osascript");
            cmd.args(macos_args(title, body));
            cmd
        } else {
            let mut cmd = Command::new("notify-send");
            cmd.args(notify_send_args(&self.app_name, self.icon.as_deref(), title, body));
            cmd
        }
    }
}

#[async_trait::async_trait]
impl NotifierPort for DesktopNotifier {
    async fn notify(&self, title: &str, body: &str) -> Result<(), DomainError> {
        let mut cmd = self.command(title, body);
        cmd.kill_on_drop(true);
        let output = tokio::time::timeout(NOTIFY_TIMEOUT, cmd.output())
            .await
            .map_err(|_| DomainError::Notification("notifier timed out".into()))?
            .map_err(|e| DomainError::Notification(format!("spawn notifier: {}", e)))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(DomainError::Notification(format!(
                "notifier exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }
        debug!(title, "notification shown");
        Ok(())
    }
}

fn notify_send_args(
    app_name: &str,
    icon: Option<&std::path::Path>,
    title: &str,
    body: &str,
) -> Vec<String> {
    let mut args = vec![format!("--app-name={}", app_name)];
    if let Some(icon) = icon {
        args.push(format!("--icon={}", icon.display()));
    }
    // `--` keeps a body starting with '-' from being read as an option.
    args.push("--".to_string());
    args.push(title.to_string());
    args.push(body.to_string());
    args
}

fn macos_args(title: &str, body: &str) -> Vec<String> {
    vec![
        "-e".to_string(),
        "on run argv".to_string(),
        "-e".to_string(),
        "display notification (item 2 of argv) with title (item 1 of argv)".to_string(),
        "-e".to_string(),
        "end run".to_string(),
        title.to_string(),
        body.to_string(),
    ]
}

const WINDOWS_TOAST_SCRIPT: &str = r#"
[Windows.UI.Notifications.ToastNotificationManager, Windows.UI.Notifications, ContentType = WindowsRuntime] | Out-Null
[Windows.Data.Xml.Dom.XmlDocument, Windows.Data.Xml.Dom.XmlDocument, ContentType = WindowsRuntime] | Out-Null
$title = [Security.SecurityElement]::Escape($env:SMS_RELAY_TOAST_TITLE)
$body = [Security.SecurityElement]::Escape($env:SMS_RELAY_TOAST_BODY)
$image = ''
if ($env:SMS_RELAY_TOAST_ICON) {
  $image = '<image placement="appLogoOverride" src="' + [Security.SecurityElement]::Escape($env:SMS_RELAY_TOAST_ICON) + '"/>'
}
$xml = New-Object Windows.Data.Xml.Dom.XmlDocument
$xml.LoadXml("<toast><visual><binding template=`"ToastGeneric`">$image<text>$title</text><text>$body</text></binding></visual></toast>")
$toast = New-Object Windows.UI.Notifications.ToastNotification $xml
[Windows.UI.Notifications.ToastNotificationManager]::CreateToastNotifier($env:SMS_RELAY_TOAST_APP).Show($toast)
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_notify_send_args_guard_options() {
        let args = notify_send_args("sms-relay", None, "手机短信", "-rf 验证码 1234");
        assert_eq!(
            args,
            vec!["--app-name=sms-relay", "--", "手机短信", "-rf 验证码 1234"]
        );
    }

    #[test]
    fn test_notify_send_args_with_icon() {
        let args = notify_send_args("sms-relay", Some(Path::new("/usr/share/icon.png")), "t", "b");
        assert_eq!(args[1], "--icon=/usr/share/icon.png");
        assert_eq!(args.len(), 5);
    }

    #[test]
    fn test_macos_args_pass_text_as_argv() {
        let args = macos_args("title \"quoted\"", "body");
        assert_eq!(args[args.len() - 2], "title \"quoted\"");
        assert_eq!(args[args.len() - 1], "body");
        assert!(!args[3].contains("quoted"));
    }
}
