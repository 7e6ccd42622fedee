use std::path::PathBuf;

const APP_DIR: &str = "enguardia";

#[cfg(unix)]
pub fn mpv_socket_name() -> String {
    format!("{}/enguardia-mpv.sock", std::env::temp_dir().display())
}

#[cfg(windows)]
pub fn mpv_socket_name() -> String {
    "enguardia-mpv".to_string()
}

#[cfg(unix)]
pub fn mpv_socket_arg(socket_name: &str) -> String {
    format!("--input-ipc-server={}", socket_name)
}

#[cfg(windows)]
pub fn mpv_socket_arg(socket_name: &str) -> String {
    format!("--input-ipc-server=\\\\.\\pipe\\{}", socket_name)
}

pub fn data_dir() -> PathBuf {
    // XDG layout on every unix, including macOS
    #[cfg(unix)]
    {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("/tmp"))
            .join(".local")
            .join("share")
            .join(APP_DIR)
    }
    #[cfg(windows)]
    {
        // Portable install: data/ beside the executable wins
        if let Ok(exe_path) = std::env::current_exe() {
            if let Some(exe_dir) = exe_path.parent() {
                let portable_data = exe_dir.join("data");
                if portable_data.exists() {
                    return portable_data;
                }
            }
        }

        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
    }
}

pub fn config_dir() -> PathBuf {
    #[cfg(windows)]
    {
        if let Ok(exe_path) = std::env::current_exe() {
            if let Some(exe_dir) = exe_path.parent() {
                if exe_dir.join("config.toml").exists() {
                    return exe_dir.to_path_buf();
                }
            }
        }
    }

    #[cfg(unix)]
    {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join(APP_DIR)
    }

    #[cfg(windows)]
    {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
    }
}

#[cfg(unix)]
fn mpv_binary_names() -> &'static [&'static str] {
    &["mpv"]
}

#[cfg(windows)]
fn mpv_binary_names() -> &'static [&'static str] {
    &["mpv.exe", "mpv"]
}

fn find_beside_exe(names: &[&str]) -> Option<PathBuf> {
    let current_exe = std::env::current_exe().ok()?;
    let dir = current_exe.parent()?;
    for name in names {
        let p = dir.join(name);
        if p.exists() {
            return Some(p);
        }
        let p = dir.join("external").join(name);
        if p.exists() {
            return Some(p);
        }
    }
    None
}

fn find_on_path(names: &[&str]) -> Option<PathBuf> {
    let path = std::env::var_os("PATH")?;
    for dir in std::env::split_paths(&path) {
        for name in names {
            let p = dir.join(name);
            if p.exists() {
                return Some(p);
            }
        }
    }
    None
}

/// Find the mpv binary used for playback.
///
/// Order: `MPV_PATH`, beside the executable (or its `external/` dir), PATH.
pub fn find_mpv_binary() -> Option<PathBuf> {
    if let Ok(p) = std::env::var("MPV_PATH") {
        let path = PathBuf::from(p);
        if path.exists() {
            return Some(path);
        }
    }

    if let Some(p) = find_beside_exe(mpv_binary_names()) {
        return Some(p);
    }

    find_on_path(mpv_binary_names())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dirs_are_app_scoped() {
        assert!(data_dir().ends_with(APP_DIR));
        assert!(config_dir().ends_with(APP_DIR));
    }

    #[cfg(unix)]
    #[test]
    fn test_socket_arg_embeds_name() {
        let name = mpv_socket_name();
        assert!(mpv_socket_arg(&name).ends_with("enguardia-mpv.sock"));
    }
}
