use std::path::{Path, PathBuf};

use engine::{ViewSettings, WindowConfig};
use serde::{Deserialize, Serialize};

use crate::error::DemoError;
use crate::shape::ShapeSpec;

/// Environment variable naming a configuration file.
pub const CONFIG_ENV: &str = "SHAPE_DEMO_CONFIG";
/// Read from the working directory when [`CONFIG_ENV`] is unset.
pub const DEFAULT_CONFIG_FILE: &str = "shape-demo.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    pub window: WindowConfig,
    pub view: ViewSettings,
    pub world: WorldConfig,
    pub contact: ContactConfig,
    /// Created in order on startup and on every reset.
    pub shapes: Vec<ShapeSpec>,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig {
                title: "Shape demo".to_string(),
                ..WindowConfig::default()
            },
            view: ViewSettings {
                xyz: [3.5, 0.0, 1.0],
                hpr: [-180.0, 0.0, 0.0],
                sphere_quality: 3,
            },
            world: WorldConfig::default(),
            contact: ContactConfig::default(),
            shapes: ShapeSpec::default_scene(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    pub gravity: [f32; 3],
    /// Global error reduction parameter, used for joints.
    pub erp: f32,
    /// Global constraint force mixing, used for joints.
    pub cfm: f32,
    /// Simulated seconds per step.
    pub timestep: f32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            gravity: [0.0, 0.0, -9.8],
            erp: 0.9,
            cfm: 1e-4,
            timestep: 0.01,
        }
    }
}

/// Surface applied to every contact with the ground.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactConfig {
    /// Contact points kept per colliding pair; extra points are dropped.
    pub max_contacts: usize,
    pub soft_erp: f32,
    pub soft_cfm: f32,
    /// Coulomb friction coefficient; `inf` means no sliding.
    pub friction: f32,
    /// Restitution.
    pub bounce: f32,
}

impl Default for ContactConfig {
    fn default() -> Self {
        Self {
            max_contacts: 7,
            soft_erp: 0.1,
            soft_cfm: 0.001,
            friction: f32::INFINITY,
            bounce: 0.0,
        }
    }
}

fn invalid(setting: &'static str, reason: String) -> DemoError {
    DemoError::InvalidSetting { setting, reason }
}

fn check_positive(setting: &'static str, value: f32) -> Result<(), DemoError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(setting, format!("must be positive and finite, got {value}")))
    }
}

/// ERP is a fraction of the error corrected per step.
fn check_erp(setting: &'static str, value: f32) -> Result<(), DemoError> {
    if value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(invalid(setting, format!("must be in (0, 1], got {value}")))
    }
}

impl WorldConfig {
    pub fn validate(&self) -> Result<(), DemoError> {
        if let Some(g) = self.gravity.iter().find(|g| !g.is_finite()) {
            return Err(invalid("world.gravity", format!("must be finite, got {g}")));
        }
        check_erp("world.erp", self.erp)?;
        check_positive("world.cfm", self.cfm)?;
        check_positive("world.timestep", self.timestep)
    }
}

impl ContactConfig {
    pub fn validate(&self) -> Result<(), DemoError> {
        if self.max_contacts == 0 {
            return Err(invalid("contact.max_contacts", "must be at least 1".to_string()));
        }
        check_erp("contact.soft_erp", self.soft_erp)?;
        check_positive("contact.soft_cfm", self.soft_cfm)?;
        // Infinite friction is allowed.
        if self.friction.is_nan() || self.friction < 0.0 {
            return Err(invalid(
                "contact.friction",
                format!("must not be negative, got {}", self.friction),
            ));
        }
        if !(0.0..=1.0).contains(&self.bounce) {
            return Err(invalid(
                "contact.bounce",
                format!("must be in [0, 1], got {}", self.bounce),
            ));
        }
        Ok(())
    }
}

impl DemoConfig {
    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    pub fn load(path: &Path) -> Result<Self, DemoError> {
        let text = std::fs::read_to_string(path).map_err(|source| DemoError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text).map_err(|source| DemoError::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load from [`CONFIG_ENV`], else [`DEFAULT_CONFIG_FILE`] if present, else defaults.
    pub fn discover() -> Result<Self, DemoError> {
        let explicit = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
        let path = explicit.or_else(|| {
            let local = PathBuf::from(DEFAULT_CONFIG_FILE);
            local.is_file().then_some(local)
        });
        match path {
            Some(path) => {
                log::info!("loading configuration from {}", path.display());
                Self::load(&path)
            }
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::ShapeKind;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_file_gives_defaults() {
        assert_eq!(DemoConfig::from_toml("").unwrap(), DemoConfig::default());
    }

    #[test]
    fn defaults_match_the_reference_scene() {
        let config = DemoConfig::default();
        assert_eq!(config.world.gravity, [0.0, 0.0, -9.8]);
        assert_eq!(config.world.timestep, 0.01);
        assert_eq!(config.contact.max_contacts, 7);
        assert!(config.contact.friction.is_infinite());
        assert_eq!((config.window.width, config.window.height), (640, 480));
        assert_eq!(config.view.sphere_quality, 3);
        assert_eq!(config.shapes.len(), 4);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = DemoConfig::from_toml(
            r#"
            [world]
            timestep = 0.005

            [contact]
            friction = 2.5
            "#,
        )
        .unwrap();
        assert_eq!(config.world.timestep, 0.005);
        assert_eq!(config.world.erp, 0.9);
        assert_eq!(config.contact.friction, 2.5);
        assert_eq!(config.contact.soft_erp, 0.1);
        assert_eq!(config.shapes, ShapeSpec::default_scene());
    }

    #[test]
    fn shapes_list_replaces_default_scene() {
        let config = DemoConfig::from_toml(
            r#"
            [[shapes]]
            kind = "box"
            sides = [1.0, 1.0, 0.2]
            mass = 3.0
            position = [0.0, 0.0, 2.0]
            color = { r = 0.0, g = 1.0, b = 0.0 }
            "#,
        )
        .unwrap();
        assert_eq!(config.shapes.len(), 1);
        assert_eq!(
            config.shapes[0].kind,
            ShapeKind::Box {
                sides: [1.0, 1.0, 0.2]
            }
        );
        assert_eq!(config.shapes[0].rotation_degrees, 0.0);
        assert_eq!(config.shapes[0].color.a, 1.0);
    }

    #[test]
    fn load_reports_path_of_bad_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "[world]\ntimestep = \"fast\"\n").unwrap();

        let err = DemoConfig::load(&path).unwrap_err();
        assert!(matches!(err, DemoError::Config { path: p, .. } if p == path));
    }

    #[test]
    fn zero_soft_cfm_is_rejected() {
        let config = DemoConfig::from_toml("[contact]\nsoft_cfm = 0.0").unwrap();
        let err = config.contact.validate().unwrap_err();
        assert!(matches!(err, DemoError::InvalidSetting { setting: "contact.soft_cfm", .. }));
    }

    #[test]
    fn bad_world_settings_are_rejected() {
        let cases = [
            ("timestep = -0.01", "world.timestep"),
            ("timestep = 0.0", "world.timestep"),
            ("cfm = 0.0", "world.cfm"),
            ("erp = 1.5", "world.erp"),
            ("gravity = [0.0, nan, -9.8]", "world.gravity"),
        ];
        for (line, expected) in cases {
            let config = DemoConfig::from_toml(&format!("[world]\n{line}")).unwrap();
            match config.world.validate() {
                Err(DemoError::InvalidSetting { setting, .. }) => assert_eq!(setting, expected),
                other => panic!("{line}: {other:?}"),
            }
        }
    }

    #[test]
    fn defaults_and_infinite_friction_are_valid() {
        let config = DemoConfig::default();
        config.world.validate().unwrap();
        config.contact.validate().unwrap();

        let slippery = ContactConfig {
            friction: f32::NAN,
            ..ContactConfig::default()
        };
        assert!(slippery.validate().is_err());
        let bouncy = ContactConfig {
            bounce: 2.0,
            ..ContactConfig::default()
        };
        assert!(bouncy.validate().is_err());
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = DemoConfig::load(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, DemoError::Io { .. }));
    }
}
