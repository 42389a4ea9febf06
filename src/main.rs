use std::path::PathBuf;

fn main() {
    let args: Vec<String> = std::env::args().collect();

    // Usage: --config=<path> (defaults to <config_dir>/site-entry-wizard/config.toml)
    let config_path = args
        .iter()
        .find_map(|a| a.strip_prefix("--config="))
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from);

    // Non-interactive TUI smoke test mode (for automated checks).
    // Renders a single frame for a specific step and exits.
    // Usage: --tui-smoke or --tui-smoke=1|2|3|4|5|lease|payments|usage|finish|notice|overlay
    if let Some(arg) = args
        .iter()
        .find(|a| a.as_str() == "--tui-smoke" || a.starts_with("--tui-smoke="))
    {
        let target = arg
            .split_once('=')
            .map(|(_, v)| v.to_string())
            .filter(|v| !v.trim().is_empty());
        std::process::exit(site_entry_wizard::run_tui_smoke(target));
    }

    // Validate config and form definition, log the result, and exit 0/1.
    if args.iter().any(|a| a == "--check-config") {
        std::process::exit(site_entry_wizard::run_check_config(config_path));
    }

    std::process::exit(site_entry_wizard::run_tui(config_path));
}
