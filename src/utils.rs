use std::env;
use std::path::PathBuf;
use std::process::Command;

const APP_DIR_NAME: &str = "QuakeMap";

fn home_dir() -> PathBuf {
    env::var_os("HOME").map(PathBuf::from).unwrap_or_else(|| PathBuf::from("."))
}

/// Per-user configuration directory:
/// `~/Library/Application Support` on macOS, `%APPDATA%` on Windows and
/// `$XDG_CONFIG_HOME` (or `~/.config`) elsewhere.
pub fn get_app_data_dir() -> PathBuf {
    let base = match env::consts::OS {
        "macos" => home_dir().join("Library").join("Application Support"),
        "windows" => env::var_os("APPDATA")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(".")),
        _ => env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|| home_dir().join(".config")),
    };
    base.join(APP_DIR_NAME)
}

/// Returns the path to the application configuration file
pub fn get_config_path() -> PathBuf {
    let mut config_dir = get_app_data_dir();
    config_dir.push("quakemap.ini");
    config_dir
}

pub fn open_browser(url: &str) -> Result<(), std::io::Error> {
    let os = env::consts::OS;
    match os {
        "macos" => {
            Command::new("open").arg(url).spawn()?;
        }
        "windows" => {
            Command::new("cmd").args(["/C", "start", url]).spawn()?;
        }
        "linux" => {
            Command::new("xdg-open").arg(url).spawn()?;
        }
        _ => {
            return Err(std::io::Error::new(
                std::io::ErrorKind::Unsupported,
                format!("Unsupported OS: {}", os),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_path_lives_in_app_dir() {
        let path = get_config_path();
        assert_eq!(path.file_name().and_then(|n| n.to_str()), Some("quakemap.ini"));
        assert!(path.starts_with(get_app_data_dir()));
        assert!(get_app_data_dir().ends_with(APP_DIR_NAME));
    }
}
