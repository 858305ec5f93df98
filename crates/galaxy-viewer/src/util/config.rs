use anyhow::Context;
use directories::ProjectDirs;
use galaxy_core::RelationKind;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// How derived edges get a relation type when the connection doesn't author one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum RelationPolicy {
    #[default]
    Random,
    Fixed { kind: RelationKind },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SelfLoopPolicy {
    #[default]
    Reject,
    Allow,
}

/// Optional clamp applied to the first-person camera after each move.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BoundsPolicy {
    #[default]
    None,
    Rect {
        min_x: f32,
        max_x: f32,
        min_z: f32,
        max_z: f32,
    },
}

impl BoundsPolicy {
    /// Walkway 4 wide and 100 long, keeping half a unit from the rails.
    pub fn catwalk() -> Self {
        let (width, length, margin) = (4.0, 100.0, 0.5);
        Self::Rect {
            min_x: -width / 2.0 + margin,
            max_x: width / 2.0 - margin,
            min_z: -length / 2.0 + margin,
            max_z: length / 2.0 - margin,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrbitConfig {
    pub damping: f32,
    pub rotate_speed: f32,
    pub pan_speed: f32,
    pub zoom_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub start_distance: f32,
}

impl Default for OrbitConfig {
    fn default() -> Self {
        Self {
            damping: 0.05,
            rotate_speed: 0.5,
            pan_speed: 0.5,
            zoom_speed: 0.5,
            min_distance: 5.0,
            max_distance: 100.0,
            start_distance: 30.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FirstPersonConfig {
    pub base_speed: f32,
    pub boost_multiplier: f32,
    pub look_sensitivity: f32,
    pub pitch_limit: f32,
    pub bounds: BoundsPolicy,
}

impl Default for FirstPersonConfig {
    fn default() -> Self {
        Self {
            base_speed: 10.0,
            boost_multiplier: 2.0,
            look_sensitivity: 0.005,
            pitch_limit: std::f32::consts::PI / 2.5,
            bounds: BoundsPolicy::None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub orbit: OrbitConfig,
    pub fov_degrees: f32,
    pub first_person: FirstPersonConfig,
    pub relation_policy: RelationPolicy,
    pub self_loops: SelfLoopPolicy,
    pub grid_idle_ms: u64,
    pub node_scale: f32,
    pub edge_opacity: f32,
    pub show_labels: bool,
    pub dataset_path: Option<PathBuf>,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            orbit: OrbitConfig::default(),
            fov_degrees: 60.0,
            first_person: FirstPersonConfig::default(),
            relation_policy: RelationPolicy::Random,
            self_loops: SelfLoopPolicy::Reject,
            grid_idle_ms: 2000,
            node_scale: 1.0,
            edge_opacity: 0.6,
            show_labels: true,
            dataset_path: None,
        }
    }
}

pub(crate) fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "galaxy")
}

fn config_file_path() -> Option<PathBuf> {
    Some(project_dirs()?.config_dir().join("viewer.toml"))
}

pub fn load_or_default() -> ViewerConfig {
    let Some(path) = config_file_path() else {
        return ViewerConfig::default();
    };
    load_or_default_from_path(&path)
}

fn load_or_default_from_path(path: &Path) -> ViewerConfig {
    let Ok(contents) = fs::read_to_string(path) else {
        return ViewerConfig::default();
    };
    match toml::from_str(&contents) {
        Ok(cfg) => {
            tracing::info!(path = %path.display(), "loaded viewer config");
            cfg
        }
        Err(err) => {
            tracing::warn!(path = %path.display(), %err, "invalid viewer config, using defaults");
            ViewerConfig::default()
        }
    }
}

pub fn save(cfg: &ViewerConfig) -> anyhow::Result<()> {
    let Some(path) = config_file_path() else {
        return Err(anyhow::anyhow!("no config directory available"));
    };
    save_to_path(cfg, &path)
}

fn save_to_path(cfg: &ViewerConfig, path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create config directory {}", parent.display()))?;
    }
    let data = toml::to_string_pretty(cfg).context("failed to serialize viewer config")?;
    fs::write(path, data)
        .with_context(|| format!("failed to write viewer config {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn viewer_config_roundtrip_save_load() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("viewer.toml");
        let cfg = ViewerConfig {
            relation_policy: RelationPolicy::Fixed {
                kind: RelationKind::Implies,
            },
            self_loops: SelfLoopPolicy::Allow,
            first_person: FirstPersonConfig {
                bounds: BoundsPolicy::catwalk(),
                ..FirstPersonConfig::default()
            },
            ..ViewerConfig::default()
        };

        save_to_path(&cfg, &path).expect("save config");
        let loaded = load_or_default_from_path(&path);

        assert_eq!(cfg, loaded);
    }

    #[test]
    fn partial_config_fills_defaults() {
        let cfg: ViewerConfig = toml::from_str(
            r#"
grid_idle_ms = 500

[orbit]
max_distance = 60.0
"#,
        )
        .expect("parse partial config");

        assert_eq!(cfg.grid_idle_ms, 500);
        assert_eq!(cfg.orbit.max_distance, 60.0);
        assert_eq!(cfg.orbit.min_distance, 5.0);
        assert_eq!(cfg.first_person.base_speed, 10.0);
        assert_eq!(cfg.relation_policy, RelationPolicy::Random);
    }

    #[test]
    fn broken_config_falls_back_to_defaults() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("viewer.toml");
        fs::write(&path, "orbit = 12").expect("write");

        assert_eq!(load_or_default_from_path(&path), ViewerConfig::default());
    }

    #[test]
    fn catwalk_bounds_match_walkway() {
        let BoundsPolicy::Rect {
            min_x,
            max_x,
            min_z,
            max_z,
        } = BoundsPolicy::catwalk()
        else {
            panic!("catwalk preset must be a rect");
        };
        assert_eq!((min_x, max_x), (-1.5, 1.5));
        assert_eq!((min_z, max_z), (-49.5, 49.5));
    }
}
