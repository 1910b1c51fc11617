//! CLI command implementations.

use std::path::{Path, PathBuf};

use crate::store::{self, PersistentStore};
use crate::types::config::{Config, StoreBackend};
use crate::MemoResult;

const DATA_DIR: &str = ".lazymemo";

/// Initializes configuration in the specified directory.
pub fn init(path: Option<PathBuf>) -> MemoResult<()> {
    let target_dir = path.unwrap_or_else(|| PathBuf::from("."));

    if !target_dir.exists() {
        std::fs::create_dir_all(&target_dir)?;
        tracing::info!(dir = %target_dir.display(), "Directory created");
    }

    let config_path = target_dir.join("lazymemo.toml");

    if config_path.exists() {
        println!("Configuration already exists at: {}", config_path.display());
        return Ok(());
    }

    let data_dir = target_dir.join(DATA_DIR);
    if !data_dir.exists() {
        std::fs::create_dir_all(&data_dir)?;
        tracing::info!("{}/ directory created", DATA_DIR);
    }

    update_gitignore(&target_dir)?;

    let config = Config::default_config();
    config.save(&config_path)?;

    println!("lazymemo initialized successfully!");
    println!("Configuration created at: {}", config_path.display());
    println!("Store: {}", config.store.path.display());

    Ok(())
}

/// Updates or creates .gitignore to include the data directory.
fn update_gitignore(target_dir: &Path) -> MemoResult<()> {
    let gitignore_path = target_dir.join(".gitignore");
    let entry = format!("{}/", DATA_DIR);
    let comment = "# lazymemo - persistent memoization store";

    if gitignore_path.exists() {
        let content = std::fs::read_to_string(&gitignore_path)?;

        if content
            .lines()
            .any(|line| line.trim() == entry || line.trim() == DATA_DIR)
        {
            tracing::debug!(".gitignore already contains {}", entry);
            return Ok(());
        }

        let mut new_content = content.trim_end().to_string();
        if !new_content.is_empty() {
            new_content.push_str("\n\n");
        }
        new_content.push_str(comment);
        new_content.push('\n');
        new_content.push_str(&entry);
        new_content.push('\n');

        std::fs::write(&gitignore_path, new_content)?;
        println!(".gitignore updated with {}", entry);
    } else {
        std::fs::write(&gitignore_path, format!("{}\n{}\n", comment, entry))?;
        println!(".gitignore created with {}", entry);
    }

    Ok(())
}

/// Opens the configured store for maintenance.
///
/// A missing sqlite file is reported instead of being created.
fn open_existing(config: &Config) -> MemoResult<Option<Box<dyn PersistentStore>>> {
    if config.store.backend == StoreBackend::Sqlite && !config.store.path.exists() {
        println!("No store at: {}", config.store.path.display());
        return Ok(None);
    }
    store::open_store(&config.store).map(Some)
}

/// Shows entry counts per computation.
pub fn stats(config: &Config) -> MemoResult<()> {
    let Some(store) = open_existing(config)? else {
        return Ok(());
    };

    let counts = store.computations()?;
    println!("Store: {} ({})", config.store.path.display(), store.name());
    println!("Total entries: {}", store.len()?);

    if !counts.is_empty() {
        println!("\nEntries per computation:");
        for count in counts {
            println!("  {:>6}  {}", count.entries, count.computation);
        }
    }

    Ok(())
}

/// Lists stored entries, newest first.
pub fn list(config: &Config, computation: Option<&str>, limit: usize) -> MemoResult<()> {
    let Some(store) = open_existing(config)? else {
        return Ok(());
    };

    let entries = store.entries(computation, limit)?;
    if entries.is_empty() {
        println!("No entries.");
        return Ok(());
    }

    for entry in entries {
        println!(
            "{}  {}  {}  {}",
            entry.created_at.format("%Y-%m-%d %H:%M:%S"),
            short_key(&entry.key),
            entry.computation,
            preview(&entry.value, 60)
        );
    }

    Ok(())
}

/// Removes every entry of one computation.
pub fn purge(config: &Config, computation: &str) -> MemoResult<()> {
    let Some(mut store) = open_existing(config)? else {
        return Ok(());
    };

    let removed = store.purge(computation)?;
    store.flush()?;
    tracing::info!(computation, removed, "Purged computation");
    println!("Removed {} entries of {}", removed, computation);

    Ok(())
}

/// Removes every entry.
pub fn clear(config: &Config) -> MemoResult<()> {
    let Some(mut store) = open_existing(config)? else {
        return Ok(());
    };

    let total = store.len()?;
    store.clear()?;
    store.flush()?;
    tracing::info!(removed = total, "Cleared store");
    println!("Removed {} entries", total);

    Ok(())
}

/// Shows version.
pub fn version() {
    println!("lazymemo {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Persistent memoization with lazily replayed mutations");
}

fn short_key(key: &str) -> &str {
    match key.char_indices().nth(12) {
        Some((end, _)) => &key[..end],
        None => key,
    }
}

fn preview(value: &str, max: usize) -> String {
    if value.chars().count() <= max {
        return value.to_string();
    }
    let cut: String = value.chars().take(max).collect();
    format!("{}...", cut)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::CacheEntry;
    use crate::types::config::StoreConfig;
    use tempfile::TempDir;

    #[test]
    fn test_version() {
        version();
    }

    #[test]
    fn test_init_creates_config_and_gitignore() {
        let dir = TempDir::new().unwrap();
        init(Some(dir.path().to_path_buf())).unwrap();

        assert!(dir.path().join("lazymemo.toml").exists());
        assert!(dir.path().join(DATA_DIR).is_dir());

        let gitignore = std::fs::read_to_string(dir.path().join(".gitignore")).unwrap();
        assert!(gitignore.contains(".lazymemo/"));
    }

    #[test]
    fn test_gitignore_not_duplicated() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(".gitignore"), "target/\n.lazymemo/\n").unwrap();

        update_gitignore(dir.path()).unwrap();

        let gitignore = std::fs::read_to_string(dir.path().join(".gitignore")).unwrap();
        assert_eq!(gitignore.matches(".lazymemo").count(), 1);
    }

    #[test]
    fn test_missing_store_is_reported() {
        let dir = TempDir::new().unwrap();
        let config = Config {
            store: StoreConfig::at(dir.path().join("absent.db")),
            ..Config::default()
        };

        stats(&config).unwrap();
        assert!(!dir.path().join("absent.db").exists());
    }

    #[cfg(feature = "sqlite")]
    #[test]
    fn test_purge_and_clear() {
        let dir = TempDir::new().unwrap();
        let config = Config {
            store: StoreConfig::at(dir.path().join("cache.db")),
            ..Config::default()
        };

        {
            let mut store = store::open_store(&config.store).unwrap();
            store.insert(CacheEntry::new("a", "app::f", "1")).unwrap();
            store.insert(CacheEntry::new("b", "app::g", "2")).unwrap();
            store.flush().unwrap();
        }

        purge(&config, "app::f").unwrap();
        let store = store::open_store(&config.store).unwrap();
        assert_eq!(store.len().unwrap(), 1);
        drop(store);

        clear(&config).unwrap();
        let store = store::open_store(&config.store).unwrap();
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn test_preview_truncates() {
        assert_eq!(preview("short", 10), "short");
        assert_eq!(preview("abcdefghij", 4), "abcd...");
        assert_eq!(short_key("0123456789abcdef"), "0123456789ab");
        assert_eq!(short_key("abc"), "abc");
    }
}
