use std::{fs, path::Path};

use anyhow::{Context, Result};
use art_gallery_core::{GenerationTuning, Settings};
use serde::Deserialize;

/// Contents of an optional TOML configuration file.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct FileConfig {
    /// Game settings; omitted keys keep their defaults.
    pub(crate) settings: Settings,
    /// Floor-plan generation constants.
    pub(crate) tuning: GenerationTuning,
    /// Seed for the first floor plan.
    pub(crate) seed: Option<u64>,
}

/// Values supplied on the command line, each overriding the file.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub(crate) struct Overrides {
    pub(crate) rooms: Option<u32>,
    pub(crate) guards: Option<u32>,
    pub(crate) overlap: Option<f64>,
    pub(crate) blind: bool,
    pub(crate) seed: Option<u64>,
}

/// Fully resolved startup configuration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct StartupConfig {
    pub(crate) settings: Settings,
    pub(crate) tuning: GenerationTuning,
    pub(crate) seed: Option<u64>,
}

/// Reads and parses a configuration file.
pub(crate) fn load(path: &Path) -> Result<FileConfig> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read configuration at {}", path.display()))?;
    parse(&contents).with_context(|| format!("invalid configuration in {}", path.display()))
}

fn parse(contents: &str) -> Result<FileConfig> {
    toml::from_str(contents).context("failed to parse configuration toml contents")
}

/// Layers command-line overrides on top of the file and validates the result.
pub(crate) fn resolve(file: FileConfig, overrides: Overrides) -> Result<StartupConfig> {
    let mut settings = file.settings;
    if let Some(rooms) = overrides.rooms {
        settings = settings.with_num_rooms(rooms);
    }
    if let Some(guards) = overrides.guards {
        settings = settings.with_max_guards(guards);
    }
    if let Some(overlap) = overrides.overlap {
        settings = settings.with_min_overlap(overlap);
    }
    if overrides.blind {
        settings = settings.with_blind(true);
    }
    settings.validate().context("invalid game settings")?;

    Ok(StartupConfig {
        settings,
        tuning: file.tuning,
        seed: overrides.seed.or(file.seed),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let file = parse("").expect("empty toml parses");
        assert_eq!(file, FileConfig::default());
    }

    #[test]
    fn partial_tables_keep_remaining_defaults() {
        let file = parse(
            r#"
            seed = 42

            [settings]
            num_rooms = 9
            blind = true

            [tuning]
            boundary_samples = 360
            "#,
        )
        .expect("configuration parses");

        assert_eq!(file.seed, Some(42));
        assert_eq!(file.settings.num_rooms(), 9);
        assert!(file.settings.blind());
        assert_eq!(file.settings.max_guards(), Settings::default().max_guards());
        assert_eq!(file.tuning.boundary_samples, 360);
        assert!((file.tuning.padding_fraction - 0.1).abs() < f64::EPSILON);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(parse("rooms = 3").is_err());
    }

    #[test]
    fn overrides_win_over_file() {
        let file = FileConfig {
            seed: Some(1),
            ..FileConfig::default()
        };
        let overrides = Overrides {
            rooms: Some(12),
            guards: Some(6),
            overlap: Some(0.5),
            blind: true,
            seed: Some(2),
        };
        let config = resolve(file, overrides).expect("valid settings");

        assert_eq!(config.settings, Settings::new(12, 6, 0.5, true).expect("valid"));
        assert_eq!(config.seed, Some(2));
    }

    #[test]
    fn out_of_range_override_is_rejected() {
        let overrides = Overrides {
            guards: Some(11),
            ..Overrides::default()
        };
        let error = resolve(FileConfig::default(), overrides).expect_err("guards out of range");
        assert!(format!("{error:#}").contains("between 1 and 10"));
    }
}
