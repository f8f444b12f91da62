// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::{bail, Result};
use std::env;
use std::path::{Path, PathBuf};

use escrow_insights::{
    classify_with_match, format_ada, group_failures, group_messages, init_logging, load_history,
    summarize, CategoryGroup, Config, DashboardStats, EscrowTransaction, Taxonomy,
};

const USAGE: &str = "\
Usage: escrow-insights [command]

Commands:
  ui [history]                     Terminal dashboard (default)
  groups [history]                 Transactions grouped by message topic
  failures [history]               Failed transactions grouped by reason
  stats [history]                  Dashboard counters
  classify [--failures] <text..>   Classify a single text
  taxonomy                         Print both category tables
  help                             Show this message

History defaults to ESCROW_HISTORY or the config file (transactions.json).";

fn main() -> Result<()> {
    init_logging("warn");

    let args: Vec<String> = env::args().skip(1).collect();
    let command = args.first().map(String::as_str);

    if !needs_config(command)? {
        println!("{}", USAGE);
        return Ok(());
    }

    let config = Config::load()?;

    match command {
        Some("groups") => run_groups(&config, &history_arg(&config, &args))?,
        Some("failures") => run_failures(&config, &history_arg(&config, &args))?,
        Some("stats") => run_stats(&history_arg(&config, &args))?,
        Some("classify") => run_classify(&config, &args[1..])?,
        Some("taxonomy") => run_taxonomy(&config)?,
        _ => run_ui_mode(&config, history_arg(&config, &args))?,
    }

    Ok(())
}

/// Whether `command` runs against the config; `false` means print usage
fn needs_config(command: Option<&str>) -> Result<bool> {
    match command {
        Some("help") | Some("--help") | Some("-h") => Ok(false),
        None | Some("ui" | "groups" | "failures" | "stats" | "classify" | "taxonomy") => Ok(true),
        Some(other) => bail!("Unknown command `{}`\n\n{}", other, USAGE),
    }
}

/// Second positional argument, or the configured history path
fn history_arg(config: &Config, args: &[String]) -> PathBuf {
    args.get(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| config.history_path.clone())
}

fn run_groups(config: &Config, path: &Path) -> Result<()> {
    let transactions = load_history(path)?;
    let taxonomy = config.message_topics()?;
    let groups = group_messages(&transactions, &taxonomy);

    println!("📂 Message Categories - {} transactions", transactions.len());
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    print_groups(&groups, |tx| tx.message_text().unwrap_or_default());

    Ok(())
}

fn run_failures(config: &Config, path: &Path) -> Result<()> {
    let transactions = load_history(path)?;
    let taxonomy = config.failure_reasons()?;
    let groups = group_failures(&transactions, &taxonomy);

    let failed = transactions.iter().filter(|tx| tx.is_failed()).count();
    println!("❌ Failed Transactions - {} of {}", failed, transactions.len());
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    print_groups(&groups, |tx| tx.error_text().unwrap_or_default());

    Ok(())
}

fn print_groups<F>(groups: &[CategoryGroup<'_, EscrowTransaction>], text: F)
where
    F: Fn(&EscrowTransaction) -> &str,
{
    if groups.is_empty() {
        println!("\n(nothing to group)");
        return;
    }

    for (group, summary) in groups.iter().zip(summarize(groups)) {
        println!(
            "\n{} {} | {} txs | {}",
            summary.icon.as_deref().unwrap_or("•"),
            summary.category,
            summary.count,
            format_ada(summary.total_lovelace)
        );

        for tx in &group.items {
            println!(
                "   {}  {:>18}  \"{}\"",
                tx.timestamp.format("%Y-%m-%d"),
                format_ada(tx.amount_lovelace),
                text(*tx)
            );
        }
    }
}

fn run_stats(path: &Path) -> Result<()> {
    let transactions = load_history(path)?;
    let stats = DashboardStats::from_transactions(&transactions);

    println!("📊 Dashboard");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("✓ Total:        {}", stats.total);
    println!("✓ Succeeded:    {}", stats.succeeded);
    println!("✓ Failed:       {}", stats.failed);
    println!("✓ Pending:      {}", stats.pending);
    println!("✓ Sent:         {}", format_ada(stats.total_sent_lovelace));
    println!("✓ Success rate: {:.1}%", stats.success_rate * 100.0);

    Ok(())
}

fn run_classify(config: &Config, args: &[String]) -> Result<()> {
    let (taxonomy, words) = match args.first().map(String::as_str) {
        Some("--failures") => (config.failure_reasons()?, &args[1..]),
        _ => (config.message_topics()?, args),
    };

    let text = words.join(" ");
    let result = classify_with_match(&taxonomy, &text);

    match result.keyword {
        Some(keyword) => println!("{} (matched \"{}\")", result.name(), keyword),
        None => println!("{} (no keyword matched)", result.name()),
    }

    Ok(())
}

fn run_taxonomy(config: &Config) -> Result<()> {
    for taxonomy in [config.message_topics()?, config.failure_reasons()?] {
        print_taxonomy(&taxonomy);
    }

    Ok(())
}

fn print_taxonomy(taxonomy: &Taxonomy) {
    println!("\n🏷️  {} ({} categories, first match wins)", taxonomy.name(), taxonomy.len());
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    for (position, category) in taxonomy.categories().iter().enumerate() {
        let keywords = if category.is_catch_all() {
            "(catch-all)".to_string()
        } else {
            category.keywords.join(", ")
        };

        println!(
            "{:>2}. {} {:<24} {}",
            position + 1,
            category.icon.as_deref().unwrap_or(" "),
            category.name,
            keywords
        );
    }
}

#[cfg(feature = "tui")]
fn run_ui_mode(config: &Config, path: PathBuf) -> Result<()> {
    if !path.exists() {
        eprintln!("❌ Transaction history not found: {:?}", path);
        eprintln!("   Pass a .json or .csv file: escrow-insights ui <history>");
        std::process::exit(1);
    }

    let transactions = load_history(&path)?;
    let messages = config.message_topics()?;
    let failures = config.failure_reasons()?;

    let mut app = ui::App::new(transactions, messages, failures);
    ui::run_ui(&mut app)?;

    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode(_config: &Config, _path: PathBuf) -> Result<()> {
    eprintln!("❌ TUI mode not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    eprintln!("   Or use the API: cargo run --bin escrow-server --features server");
    std::process::exit(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_help_skips_config() {
        for help in ["help", "--help", "-h"] {
            assert!(!needs_config(Some(help)).unwrap());
        }
    }

    #[test]
    fn test_commands_need_config() {
        assert!(needs_config(None).unwrap());
        for command in ["ui", "groups", "failures", "stats", "classify", "taxonomy"] {
            assert!(needs_config(Some(command)).unwrap(), "{command}");
        }
    }

    #[test]
    fn test_unknown_command() {
        let err = needs_config(Some("bogus")).unwrap_err();
        assert!(err.to_string().contains("Unknown command `bogus`"));
    }
}
