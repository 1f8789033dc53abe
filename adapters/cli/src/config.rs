//! Loading of the optional TOML tuning file.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use night_shift_core::Tuning;

/// Reads the tuning file at `path`, or the shipped defaults when no path is given.
pub(crate) fn load_tuning(path: Option<&Path>) -> Result<Tuning> {
    let Some(path) = path else {
        return Ok(Tuning::default());
    };
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read tuning file at {}", path.display()))?;
    let tuning = parse_tuning(&contents)
        .with_context(|| format!("invalid tuning file at {}", path.display()))?;
    tracing::info!(path = %path.display(), "tuning loaded");
    Ok(tuning)
}

fn parse_tuning(contents: &str) -> Result<Tuning> {
    toml::from_str(contents).context("failed to parse tuning toml contents")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sections_override_only_what_they_name() {
        let tuning = parse_tuning(
            "[phase]\ncalm_seconds = 10.0\n\n[vision]\nroster_fog = true\n",
        )
        .expect("tuning parses");
        assert_eq!(tuning.phase.calm_seconds, 10.0);
        assert_eq!(tuning.phase.hostile_seconds, 60.0);
        assert!(tuning.vision.roster_fog);
        assert_eq!(tuning.combat, Tuning::default().combat);
    }

    #[test]
    fn empty_files_are_the_defaults() {
        assert_eq!(parse_tuning("").expect("empty parses"), Tuning::default());
    }

    #[test]
    fn mistyped_values_are_reported() {
        let error = parse_tuning("[phase]\ncalm_seconds = \"long\"\n").expect_err("rejected");
        assert!(format!("{error:#}").contains("tuning toml"));
    }

    #[test]
    fn missing_files_name_the_path() {
        let error = load_tuning(Some(Path::new("/definitely/not/here.toml")))
            .expect_err("missing file");
        assert!(error.to_string().contains("/definitely/not/here.toml"));
    }
}
