//! Flash programmer commands

use indicatif::{ProgressBar, ProgressStyle};
use rmflash_core::chip::FlashCatalog;
use rmflash_core::config::Config;
use rmflash_core::programmer::select::parse_choice;
use rmflash_core::programmer::{Candidate, Chooser, Minipro, Orchestrator, ProgrammerTool, ToolOutput};
use rmflash_core::Result;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

/// Programmer tool that shows a spinner while the wrapped tool runs
struct SpinnerTool<T> {
    inner: T,
}

impl<T> SpinnerTool<T> {
    fn new(inner: T) -> Self {
        Self { inner }
    }

    fn spin<R>(&mut self, message: String, f: impl FnOnce(&mut T) -> R) -> R {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(message);
        pb.enable_steady_tick(Duration::from_millis(100));

        let result = f(&mut self.inner);
        pb.finish_and_clear();
        result
    }
}

impl<T: ProgrammerTool> ProgrammerTool for SpinnerTool<T> {
    fn query(&mut self) -> io::Result<ToolOutput> {
        self.spin("Detecting flash device...".to_string(), |t| t.query())
    }

    fn write(&mut self, part: &str, image: &Path) -> io::Result<ToolOutput> {
        self.spin(format!("Writing {} to {}...", image.display(), part), |t| {
            t.write(part, image)
        })
    }
}

/// Asks the operator on the terminal which image to write
struct TerminalChooser;

impl Chooser for TerminalChooser {
    fn choose(&mut self, candidates: &[Candidate]) -> Option<usize> {
        let now = SystemTime::now();

        println!();
        println!("Select the image file to flash:");
        println!();
        for (i, c) in candidates.iter().enumerate() {
            let age = now.duration_since(c.created).unwrap_or_default();
            println!(
                "  {:>2}) {:>10} ago  {}",
                i + 1,
                format_age(age),
                c.path.display()
            );
        }
        println!("   q) quit");
        println!();
        print!("choice: ");
        let _ = io::stdout().flush();

        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => parse_choice(&line, candidates.len()),
        }
    }
}

/// Format a duration coarsely, e.g. "3d 4h", "12m 5s"
fn format_age(age: Duration) -> String {
    let secs = age.as_secs();
    let (days, hours, mins) = (secs / 86400, (secs / 3600) % 24, (secs / 60) % 60);
    if days > 0 {
        format!("{}d {}h", days, hours)
    } else if hours > 0 {
        format!("{}h {}m", hours, mins)
    } else if mins > 0 {
        format!("{}m {}s", mins, secs % 60)
    } else {
        format!("{}s", secs)
    }
}

fn orchestrator(config: &Config) -> Orchestrator<SpinnerTool<Minipro>> {
    log::debug!("Using programmer tool {}", config.tool.display());
    let tool = Minipro::new(&config.tool, config.timeout);
    Orchestrator::new(SpinnerTool::new(tool), FlashCatalog::new(), config.image_size)
}

/// Detect and display the connected flash part
pub fn cmd_detect(config: &Config) -> Result<()> {
    let part = orchestrator(config).detect_flash()?;
    println!("Flash device id: 0x{:06x}", part.id);
    println!("Flash device name: {}", part.name);
    Ok(())
}

/// Write an image to flash
pub fn cmd_write(config: &Config, file: Option<&Path>, part: Option<&str>) -> Result<()> {
    let mut orch = orchestrator(config);
    let image: PathBuf =
        orch.write_selected(file, &config.image_dir, &mut TerminalChooser, part)?;
    println!("Wrote {} to flash", image.display());
    Ok(())
}

/// List all supported flash parts
pub fn cmd_list_parts() {
    println!("Supported flash parts:");
    println!();
    println!("{:<12} {:>10}", "Name", "Device ID");
    println!("{}", "-".repeat(23));
    for part in FlashCatalog::new().parts() {
        println!("{:<12} {:>10}", part.name, format!("0x{:06x}", part.id));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_age() {
        assert_eq!(format_age(Duration::from_secs(5)), "5s");
        assert_eq!(format_age(Duration::from_secs(125)), "2m 5s");
        assert_eq!(format_age(Duration::from_secs(3 * 3600 + 60)), "3h 1m");
        assert_eq!(format_age(Duration::from_secs(2 * 86400 + 7200)), "2d 2h");
    }

    /// Records whether the wrapped tool was reached
    struct Echo(Vec<String>);

    impl ProgrammerTool for Echo {
        fn query(&mut self) -> io::Result<ToolOutput> {
            self.0.push("query".into());
            Ok(ToolOutput {
                success: true,
                code: Some(0),
                stdout: "Device Id: 0xef4016\n".into(),
                stderr: String::new(),
            })
        }

        fn write(&mut self, part: &str, _image: &Path) -> io::Result<ToolOutput> {
            self.0.push(format!("write {}", part));
            Ok(ToolOutput::default())
        }
    }

    #[test]
    fn test_spinner_tool_delegates() {
        let mut tool = SpinnerTool::new(Echo(Vec::new()));
        assert!(tool.query().unwrap().success);
        assert!(!tool.write("W25Q32BV", Path::new("fw.bin")).unwrap().success);
        assert_eq!(tool.inner.0, ["query", "write W25Q32BV"]);
    }
}
