//! Check that the external media tools are available.

use clickbox_common::config::{config_file_path, AppConfig};
use clickbox_render::export::command_exists;

pub fn run(config: &AppConfig) -> anyhow::Result<()> {
    println!("clickbox System Check");
    println!("{}", "=".repeat(50));

    let config_path = config_file_path();
    if config_path.exists() {
        println!("[OK]   Config: {}", config_path.display());
    } else {
        println!("[INFO] Config: defaults ({} not found)", config_path.display());
    }

    let ffmpeg_ok = command_exists(&config.ffmpeg.ffmpeg_path);
    if ffmpeg_ok {
        println!("[OK]   ffmpeg: {}", config.ffmpeg.ffmpeg_path);
    } else {
        println!(
            "[FAIL] ffmpeg: '{}' not runnable (required for rendering)",
            config.ffmpeg.ffmpeg_path
        );
    }

    if command_exists(&config.ffmpeg.ffprobe_path) {
        println!("[OK]   ffprobe: {}", config.ffmpeg.ffprobe_path);
    } else {
        println!(
            "[WARN] ffprobe: '{}' not runnable (video duration checks disabled)",
            config.ffmpeg.ffprobe_path
        );
    }

    match config.resolve_output_root() {
        Ok(root) if root.is_dir() => println!("[OK]   Output root: {}", root.display()),
        Ok(root) => println!("[WARN] Output root: {} does not exist", root.display()),
        Err(e) => println!("[WARN] Output root: cannot resolve ({e})"),
    }

    println!();
    if ffmpeg_ok {
        println!("All required tools are available. clickbox is ready.");
        Ok(())
    } else {
        anyhow::bail!("ffmpeg is missing")
    }
}
