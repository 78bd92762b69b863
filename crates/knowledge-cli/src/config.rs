//! Configuration – reads/writes `~/.knowledge/config.toml`.

use std::fs;
use std::path::{Path, PathBuf};

use knowledge_perception::{Quaternion, TfEngine, Transform3D, Vec3};
use knowledge_types::KnowledgeError;
use serde::{Deserialize, Serialize};

/// One static edge of the frame graph: the pose of `child` in `parent`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameEdge {
    pub parent: String,
    pub child: String,
    /// Position of `child`'s origin in `parent`, metres.
    #[serde(default)]
    pub translation: [f64; 3],
    /// Orientation of `child` in `parent` as `[x, y, z, w]`.
    #[serde(default = "identity_rotation")]
    pub rotation: [f64; 4],
}

impl FrameEdge {
    pub fn transform(&self) -> Transform3D {
        let [tx, ty, tz] = self.translation;
        let [x, y, z, w] = self.rotation;
        Transform3D::new(Vec3::new(tx, ty, tz), Quaternion::new(w, x, y, z).normalize())
    }
}

/// Persisted settings stored in `~/.knowledge/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Frame the fixed-object poses are reported in.
    #[serde(default = "default_map_frame")]
    pub map_frame: String,

    /// Frame poke positions are computed in.
    #[serde(default = "default_target_frame")]
    pub target_frame: String,

    /// Checkpoint publication rate.
    #[serde(default = "default_publish_rate_hz")]
    pub publish_rate_hz: f64,

    /// WebSocket port for the checkpoint feed.
    #[serde(default = "default_feed_port")]
    pub feed_port: u16,

    /// JSON file of `getFixedKitchenObjects` solutions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kitchen_model_path: Option<PathBuf>,

    /// Static frame graph.
    #[serde(default = "default_frames")]
    pub frames: Vec<FrameEdge>,
}

fn default_map_frame() -> String {
    "/map".to_string()
}
fn default_target_frame() -> String {
    "/odom_combined".to_string()
}
fn default_publish_rate_hz() -> f64 {
    10.0
}
fn default_feed_port() -> u16 {
    9091
}
fn identity_rotation() -> [f64; 4] {
    [0.0, 0.0, 0.0, 1.0]
}
fn default_frames() -> Vec<FrameEdge> {
    vec![FrameEdge {
        parent: "/odom_combined".to_string(),
        child: "/head_mount_kinect_ir_optical_frame".to_string(),
        translation: [0.0; 3],
        rotation: identity_rotation(),
    }]
}

impl Default for Config {
    fn default() -> Self {
        Self {
            map_frame: default_map_frame(),
            target_frame: default_target_frame(),
            publish_rate_hz: default_publish_rate_hz(),
            feed_port: default_feed_port(),
            kitchen_model_path: None,
            frames: default_frames(),
        }
    }
}

impl Config {
    /// Frame graph described by [`Config::frames`].
    pub fn tf_engine(&self) -> TfEngine {
        let mut tf = TfEngine::new();
        for edge in &self.frames {
            tf.set_transform(&edge.parent, &edge.child, edge.transform());
        }
        tf
    }
}

/// Return the path to `~/.knowledge/config.toml`.
pub fn config_path() -> PathBuf {
    config_path_for_home(
        &std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string()),
    )
}

pub(crate) fn config_path_for_home(home: &str) -> PathBuf {
    PathBuf::from(home).join(".knowledge").join("config.toml")
}

/// Load the config from disk and apply environment overrides.  Returns
/// `None` if the file does not exist.
pub fn load() -> Result<Option<Config>, KnowledgeError> {
    let mut cfg = load_from(&config_path())?;
    if let Some(cfg) = cfg.as_mut() {
        apply_env_overrides(cfg);
    }
    Ok(cfg)
}

/// Parse the config at `path`, without environment overrides.
pub(crate) fn load_from(path: &Path) -> Result<Option<Config>, KnowledgeError> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path).map_err(|e| {
        KnowledgeError::Config(format!("Failed to read config at {}: {}", path.display(), e))
    })?;
    let cfg = toml::from_str(&raw)
        .map_err(|e| KnowledgeError::Config(format!("Failed to parse config: {e}")))?;
    Ok(Some(cfg))
}

/// Apply `KNOWLEDGE_*` environment variable overrides to `cfg`.
///
/// | Variable | Config field |
/// |---|---|
/// | `KNOWLEDGE_MAP_FRAME` | `map_frame` |
/// | `KNOWLEDGE_TARGET_FRAME` | `target_frame` |
/// | `KNOWLEDGE_PUBLISH_RATE_HZ` | `publish_rate_hz` |
/// | `KNOWLEDGE_FEED_PORT` | `feed_port` |
/// | `KNOWLEDGE_KITCHEN_MODEL` | `kitchen_model_path` |
///
/// Numeric values that do not parse are ignored.
pub fn apply_env_overrides(cfg: &mut Config) {
    if let Ok(v) = std::env::var("KNOWLEDGE_MAP_FRAME") {
        cfg.map_frame = v;
    }
    if let Ok(v) = std::env::var("KNOWLEDGE_TARGET_FRAME") {
        cfg.target_frame = v;
    }
    if let Ok(v) = std::env::var("KNOWLEDGE_PUBLISH_RATE_HZ")
        && let Ok(rate) = v.parse::<f64>()
    {
        cfg.publish_rate_hz = rate;
    }
    if let Ok(v) = std::env::var("KNOWLEDGE_FEED_PORT")
        && let Ok(port) = v.parse::<u16>()
    {
        cfg.feed_port = port;
    }
    if let Ok(v) = std::env::var("KNOWLEDGE_KITCHEN_MODEL") {
        cfg.kitchen_model_path = Some(PathBuf::from(v));
    }
}

/// Save the config to `~/.knowledge/config.toml`.
pub fn save(cfg: &Config) -> Result<(), KnowledgeError> {
    save_to(cfg, &config_path())
}

pub(crate) fn save_to(cfg: &Config, path: &Path) -> Result<(), KnowledgeError> {
    let config_err = |what: &str, e: &dyn std::fmt::Display| {
        KnowledgeError::Config(format!("{what} at {}: {e}", path.display()))
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| config_err("Failed to create config directory", &e))?;
        // Owner-only directory (rwx------) on Unix.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(parent, fs::Permissions::from_mode(0o700))
                .map_err(|e| config_err("Failed to set config directory permissions", &e))?;
        }
    }
    let raw = toml::to_string_pretty(cfg)
        .map_err(|e| KnowledgeError::Serialization(format!("Failed to serialize config: {e}")))?;

    // Owner-only file (rw-------) on Unix.
    #[cfg(unix)]
    {
        use std::io::Write;
        use std::os::unix::fs::OpenOptionsExt;
        fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o600)
            .open(path)
            .and_then(|mut f| f.write_all(raw.as_bytes()))
            .map_err(|e| config_err("Failed to write config", &e))?;
    }
    #[cfg(not(unix))]
    fs::write(path, raw).map_err(|e| config_err("Failed to write config", &e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use knowledge_perception::TransformLookup;
    use knowledge_types::{Point3, StampedPoint};

    #[test]
    fn defaults_match_the_robot_setup() {
        let cfg = Config::default();
        assert_eq!(cfg.map_frame, "/map");
        assert_eq!(cfg.target_frame, "/odom_combined");
        assert_eq!(cfg.publish_rate_hz, 10.0);
        assert_eq!(cfg.feed_port, 9091);
        assert!(cfg.kitchen_model_path.is_none());
        assert_eq!(cfg.frames.len(), 1);
    }

    #[test]
    fn roundtrip_default_config() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = config_path_for_home(&dir.path().to_string_lossy());

        save_to(&Config::default(), &path).expect("save");
        let loaded = load_from(&path).expect("load ok").expect("some");
        assert_eq!(loaded, Config::default());
    }

    #[test]
    fn roundtrip_keeps_model_path_and_frames() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = dir.path().join("config.toml");
        let mut cfg = Config::default();
        cfg.kitchen_model_path = Some(PathBuf::from("/srv/kitchen.json"));
        cfg.frames.push(FrameEdge {
            parent: "/map".to_string(),
            child: "/odom_combined".to_string(),
            translation: [1.0, -0.5, 0.0],
            rotation: [0.0, 0.0, 0.7071067811865476, 0.7071067811865476],
        });

        save_to(&cfg, &path).expect("save");
        assert_eq!(load_from(&path).expect("load").expect("some"), cfg);
    }

    #[test]
    fn missing_fields_take_defaults() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "feed_port = 7000\n\n[[frames]]\nparent = \"/base\"\nchild = \"/camera\"\n",
        )
        .expect("write");

        let cfg = load_from(&path).expect("load").expect("some");
        assert_eq!(cfg.feed_port, 7000);
        assert_eq!(cfg.target_frame, "/odom_combined");
        assert_eq!(cfg.frames[0].translation, [0.0; 3]);
        assert_eq!(cfg.frames[0].rotation, [0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn malformed_file_is_a_config_error() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "feed_port = \"not a port\"").expect("write");
        assert!(matches!(load_from(&path), Err(KnowledgeError::Config(_))));
    }

    #[cfg(unix)]
    #[test]
    fn config_file_has_restrictive_permissions() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = config_path_for_home(&dir.path().to_string_lossy());
        save_to(&Config::default(), &path).expect("save");

        let file_mode = std::fs::metadata(&path).expect("file").permissions().mode() & 0o777;
        assert_eq!(file_mode, 0o600);
        let dir_mode = std::fs::metadata(path.parent().expect("parent"))
            .expect("dir")
            .permissions()
            .mode()
            & 0o777;
        assert_eq!(dir_mode, 0o700);
    }

    #[test]
    fn config_path_points_to_knowledge_dir() {
        let p = config_path_for_home("/home/pr2");
        assert!(p.to_string_lossy().contains(".knowledge"));
        assert!(p.to_string_lossy().ends_with("config.toml"));
    }

    #[test]
    fn load_from_returns_none_when_missing() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = config_path_for_home(&dir.path().to_string_lossy());
        assert!(load_from(&path).expect("no error").is_none());
    }

    #[test]
    fn frame_edges_build_a_connected_graph() {
        let mut cfg = Config::default();
        cfg.frames = vec![FrameEdge {
            parent: "/odom_combined".to_string(),
            child: "/camera".to_string(),
            translation: [0.5, 0.0, 1.2],
            rotation: [0.0, 0.0, 0.0, 2.0],
        }];
        let tf = cfg.tf_engine();
        let out = tf
            .transform_point(
                "/odom_combined",
                &StampedPoint::new("/camera", Utc::now(), Point3::new(1.0, 0.0, 0.0)),
            )
            .expect("connected");
        assert!((out.point.x - 1.5).abs() < 1e-12);
        assert!((out.point.z - 1.2).abs() < 1e-12);
    }

    #[test]
    fn apply_env_overrides_changes_target_frame() {
        // SAFETY: only this test touches KNOWLEDGE_TARGET_FRAME.
        unsafe { std::env::set_var("KNOWLEDGE_TARGET_FRAME", "/base_link") };
        let mut cfg = Config::default();
        apply_env_overrides(&mut cfg);
        assert_eq!(cfg.target_frame, "/base_link");
        unsafe { std::env::remove_var("KNOWLEDGE_TARGET_FRAME") };
    }

    #[test]
    fn apply_env_overrides_changes_feed_port() {
        // SAFETY: only this test touches KNOWLEDGE_FEED_PORT.
        unsafe { std::env::set_var("KNOWLEDGE_FEED_PORT", "9999") };
        let mut cfg = Config::default();
        apply_env_overrides(&mut cfg);
        assert_eq!(cfg.feed_port, 9999);
        unsafe { std::env::remove_var("KNOWLEDGE_FEED_PORT") };
    }

    #[test]
    fn apply_env_overrides_ignores_invalid_rate() {
        // SAFETY: only this test touches KNOWLEDGE_PUBLISH_RATE_HZ.
        unsafe { std::env::set_var("KNOWLEDGE_PUBLISH_RATE_HZ", "fast") };
        let mut cfg = Config::default();
        apply_env_overrides(&mut cfg);
        assert_eq!(cfg.publish_rate_hz, 10.0);
        unsafe { std::env::remove_var("KNOWLEDGE_PUBLISH_RATE_HZ") };
    }

    #[test]
    fn apply_env_overrides_sets_kitchen_model() {
        // SAFETY: only this test touches KNOWLEDGE_KITCHEN_MODEL.
        unsafe { std::env::set_var("KNOWLEDGE_KITCHEN_MODEL", "/tmp/kitchen.json") };
        let mut cfg = Config::default();
        apply_env_overrides(&mut cfg);
        assert_eq!(cfg.kitchen_model_path, Some(PathBuf::from("/tmp/kitchen.json")));
        unsafe { std::env::remove_var("KNOWLEDGE_KITCHEN_MODEL") };
    }
}
