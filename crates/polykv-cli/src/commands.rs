use std::io::Write;
use std::path::PathBuf;

use anyhow::{bail, Context};
use colored::Colorize;
use polykv_store::{BackendConfig, Codec, FileOptions, Store, StoreConfig, StoreHandle};
use tracing::debug;

use crate::cli::*;

/// Store directory used when neither `--config` nor `--dir` is given.
const DEFAULT_DIR: &str = ".polykv";

pub fn run_command(cli: Cli, out: &mut impl Write) -> anyhow::Result<()> {
    let config = resolve_config(&cli)?;
    if let Command::Config = cli.command {
        return cmd_config(&config, out);
    }

    let codec = config.backend.codec();
    let store = config.open().context("failed to open store")?;
    let result = match cli.command {
        Command::Set(args) => cmd_set(&store, codec, args, out),
        Command::Get(args) => cmd_get(&store, codec, args, out),
        Command::Delete(args) => cmd_delete(&store, args, out),
        Command::Config => Ok(()),
    };
    store.close().context("failed to close store")?;
    result
}

/// Build the effective configuration from the file and flags.
pub fn resolve_config(cli: &Cli) -> anyhow::Result<StoreConfig> {
    let mut config = match &cli.config {
        Some(path) => StoreConfig::load(path)?,
        None => StoreConfig {
            backend: BackendConfig::File(FileOptions {
                directory: PathBuf::from(DEFAULT_DIR),
                ..FileOptions::default()
            }),
        },
    };
    if let Some(dir) = &cli.dir {
        match &mut config.backend {
            BackendConfig::File(options) => options.directory = dir.clone(),
            other => bail!("--dir needs a file backend, configured backend is {}", other.kind()),
        }
    }
    if let Some(codec) = cli.codec {
        config.backend.set_codec(codec);
    }
    debug!(backend = config.backend.kind(), codec = %config.backend.codec(), "resolved config");
    Ok(config)
}

fn cmd_set(store: &StoreHandle, codec: Codec, args: SetArgs, out: &mut impl Write) -> anyhow::Result<()> {
    if args.json {
        if codec != Codec::Json {
            bail!("--json values need the json codec, store uses {codec}");
        }
        let value: serde_json::Value =
            serde_json::from_str(&args.value).context("value is not valid JSON")?;
        store.set(&args.key, &value)?;
    } else {
        store.set(&args.key, &args.value)?;
    }
    writeln!(out, "{} Stored {}", "✓".green().bold(), args.key.yellow())?;
    Ok(())
}

fn cmd_get(store: &StoreHandle, codec: Codec, args: KeyArgs, out: &mut impl Write) -> anyhow::Result<()> {
    let rendered = match codec {
        // JSON is self-describing, so any stored value can be shown.
        Codec::Json => store
            .fetch::<serde_json::Value>(&args.key)?
            .map(|value| match value {
                serde_json::Value::String(s) => Ok(s),
                other => serde_json::to_string_pretty(&other),
            })
            .transpose()?,
        Codec::Bincode => store.fetch::<String>(&args.key)?,
    };
    match rendered {
        Some(text) => writeln!(out, "{text}")?,
        None => writeln!(out, "{} {}", args.key.yellow(), "(not found)".dimmed())?,
    }
    Ok(())
}

fn cmd_delete(store: &StoreHandle, args: KeyArgs, out: &mut impl Write) -> anyhow::Result<()> {
    store.delete(&args.key)?;
    writeln!(out, "{} Deleted {}", "✓".green().bold(), args.key.yellow())?;
    Ok(())
}

fn cmd_config(config: &StoreConfig, out: &mut impl Write) -> anyhow::Result<()> {
    write!(out, "{}", config.to_toml_string()?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    fn run(args: &[&str]) -> anyhow::Result<String> {
        let cli = Cli::try_parse_from(std::iter::once("polykv").chain(args.iter().copied()))?;
        let mut out = Vec::new();
        colored::control::set_override(false);
        run_command(cli, &mut out)?;
        Ok(String::from_utf8(out)?)
    }

    #[test]
    fn default_config_is_a_json_file_store() {
        let cli = Cli::try_parse_from(["polykv", "config"]).unwrap();
        let config = resolve_config(&cli).unwrap();
        assert_eq!(config.backend.kind(), "file");
        assert_eq!(config.backend.codec(), Codec::Json);
        let BackendConfig::File(options) = config.backend else { panic!("wrong backend"); };
        assert_eq!(options.directory, PathBuf::from(DEFAULT_DIR));
    }

    #[test]
    fn flags_override_the_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kv.toml");
        std::fs::write(&path, "[backend]\nkind = \"file\"\ndirectory = \"/srv/kv\"\n").unwrap();

        let cli = Cli::try_parse_from([
            "polykv", "--config", path.to_str().unwrap(), "--dir", "/tmp/other", "--codec", "bincode", "config",
        ])
        .unwrap();
        let config = resolve_config(&cli).unwrap();
        assert_eq!(config.backend.codec(), Codec::Bincode);
        let BackendConfig::File(options) = config.backend else { panic!("wrong backend"); };
        assert_eq!(options.directory, PathBuf::from("/tmp/other"));
    }

    #[test]
    fn dir_requires_a_file_backend() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kv.toml");
        std::fs::write(&path, "[backend]\nkind = \"memory\"\n").unwrap();
        let cli = Cli::try_parse_from([
            "polykv", "--config", path.to_str().unwrap(), "--dir", "/tmp/kv", "config",
        ])
        .unwrap();
        assert!(resolve_config(&cli).is_err());
    }

    #[test]
    fn set_get_delete_through_a_file_store() {
        let dir = tempfile::tempdir().unwrap();
        let store_dir = dir.path().join("kv");
        let d = store_dir.to_str().unwrap();

        let out = run(&["--dir", d, "set", "greeting", "hello"]).unwrap();
        assert!(out.contains("Stored greeting"));
        assert_eq!(run(&["--dir", d, "get", "greeting"]).unwrap(), "hello\n");

        run(&["--dir", d, "set", "--json", "cfg", "{\"n\":1}"]).unwrap();
        let out = run(&["--dir", d, "get", "cfg"]).unwrap();
        assert!(out.contains("\"n\": 1"), "{out}");

        run(&["--dir", d, "delete", "greeting"]).unwrap();
        let out = run(&["--dir", d, "get", "greeting"]).unwrap();
        assert!(out.contains("(not found)"));
    }

    #[test]
    fn bincode_store_round_trips_strings() {
        let dir = tempfile::tempdir().unwrap();
        let d = dir.path().to_str().unwrap();
        run(&["--dir", d, "--codec", "bincode", "set", "k", "v"]).unwrap();
        assert_eq!(run(&["--dir", d, "--codec", "bincode", "get", "k"]).unwrap(), "v\n");
    }

    #[test]
    fn json_values_need_the_json_codec() {
        let dir = tempfile::tempdir().unwrap();
        let d = dir.path().to_str().unwrap();
        let err = run(&["--dir", d, "--codec", "bincode", "set", "--json", "k", "1"]).unwrap_err();
        assert!(err.to_string().contains("json codec"));
    }

    #[test]
    fn empty_keys_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let d = dir.path().to_str().unwrap();
        assert!(run(&["--dir", d, "set", "", "v"]).is_err());
    }

    #[test]
    fn config_prints_toml() {
        let out = run(&["--codec", "bincode", "config"]).unwrap();
        assert!(out.contains("kind = \"file\""), "{out}");
        assert!(out.contains("codec = \"bincode\""), "{out}");
    }
}
