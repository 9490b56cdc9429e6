//! Level loading and saving
//!
//! Three on-disk encodings are accepted:
//! - `.json`: the legacy level format
//! - plain RON: hand-edited levels
//! - brotli-compressed RON: what `save_descriptor` writes by default
//!
//! Anything that is not JSON is auto-detected by its first byte: plain RON
//! starts with '(' or whitespace, brotli is binary. A descriptor that fails
//! to parse or validate is a `ConfigError`; a level is never half-built.

use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use super::descriptor::LevelDescriptor;

/// Validation limits
pub mod limits {
    /// Maximum coordinate magnitude
    pub const MAX_COORD: f32 = 100_000.0;
    /// Maximum entities of any one list (spiders, coins, platforms...)
    pub const MAX_LIST_LEN: usize = 1024;
    /// Maximum platform image tag length
    pub const MAX_STRING_LEN: usize = 64;
}

/// Error type for descriptor and config loading
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(ron::error::SpannedError),
    Serialize(ron::Error),
    Json(serde_json::Error),
    Decompress(String),
    Validation(String),
    /// A platform image tag with no known size
    UnknownPlatformImage(String),
    /// No level files found
    EmptyCatalog(PathBuf),
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<ron::error::SpannedError> for ConfigError {
    fn from(e: ron::error::SpannedError) -> Self {
        ConfigError::Parse(e)
    }
}

impl From<ron::Error> for ConfigError {
    fn from(e: ron::Error) -> Self {
        ConfigError::Serialize(e)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Json(e)
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Serialize(e) => write!(f, "Serialize error: {}", e),
            ConfigError::Json(e) => write!(f, "JSON error: {}", e),
            ConfigError::Decompress(e) => write!(f, "Decompression error: {}", e),
            ConfigError::Validation(e) => write!(f, "Validation error: {}", e),
            ConfigError::UnknownPlatformImage(name) => write!(f, "unknown platform image '{}'", name),
            ConfigError::EmptyCatalog(dir) => write!(f, "no levels found in {}", dir.display()),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Parse(e) => Some(e),
            ConfigError::Serialize(e) => Some(e),
            ConfigError::Json(e) => Some(e),
            _ => None,
        }
    }
}

fn is_valid_float(f: f32) -> bool {
    f.is_finite() && f.abs() <= limits::MAX_COORD
}

/// Validate a descriptor's shape. Platform image sizes are checked by the
/// game loader, which knows the configured sizes.
pub fn validate_descriptor(desc: &LevelDescriptor) -> Result<(), ConfigError> {
    if let Some(p) = desc.points().find(|p| !is_valid_float(p.x) || !is_valid_float(p.y)) {
        return Err(ConfigError::Validation(format!(
            "coordinate out of range: ({}, {})", p.x, p.y
        )));
    }

    let lists = [
        ("spiders", desc.spiders.len()),
        ("platforms", desc.platforms.len()),
        ("decoration", desc.decoration.len()),
        ("coins", desc.coins.len()),
    ];
    for (name, len) in lists {
        if len > limits::MAX_LIST_LEN {
            return Err(ConfigError::Validation(format!(
                "too many {} ({} > {})", name, len, limits::MAX_LIST_LEN
            )));
        }
    }

    if let Some(p) = desc.platforms.iter().find(|p| p.image.is_empty() || p.image.len() > limits::MAX_STRING_LEN) {
        return Err(ConfigError::Validation(format!(
            "platform at ({}, {}) has an invalid image tag", p.x, p.y
        )));
    }

    match (desc.door_boxes.is_some(), desc.door_switch.is_some()) {
        (true, false) => Err(ConfigError::Validation("doorBoxes without doorSwitch".to_string())),
        (false, true) => Err(ConfigError::Validation("doorSwitch without doorBoxes".to_string())),
        _ => Ok(()),
    }
}

/// Log where in the text a RON parse failed.
fn log_ron_error(source: &str, contents: &str, e: &ron::error::SpannedError) {
    log::error!("RON parse error in {}: {}", source, e);
    let pos = e.position;
    let lines: Vec<&str> = contents.lines().collect();
    let line_idx = pos.line.saturating_sub(1);
    if let Some(line) = lines.get(line_idx) {
        log::error!("  Line {}: {}", pos.line, line);
        if pos.col > 0 && pos.col <= line.len() {
            let start = pos.col.saturating_sub(20);
            let end = (pos.col + 30).min(line.len());
            if let Some(context) = line.get(start..end) {
                log::error!("  Context: ...{}...", context);
            }
        }
    }
}

fn is_plain_ron(bytes: &[u8]) -> bool {
    bytes
        .first()
        .map(|&b| b == b'(' || b == b' ' || b == b'\n' || b == b'\r' || b == b'\t')
        .unwrap_or(false)
}

fn decompress(bytes: &[u8]) -> Result<String, ConfigError> {
    let mut decompressed = Vec::new();
    brotli::BrotliDecompress(&mut Cursor::new(bytes), &mut decompressed)
        .map_err(|e| ConfigError::Decompress(format!("brotli decompression failed: {}", e)))?;
    String::from_utf8(decompressed)
        .map_err(|e| ConfigError::Decompress(format!("invalid UTF-8 after decompression: {}", e)))
}

fn parse_ron(source: &str, contents: &str) -> Result<LevelDescriptor, ConfigError> {
    match ron::from_str::<LevelDescriptor>(contents) {
        Ok(desc) => Ok(desc),
        Err(e) => {
            log_ron_error(source, contents, &e);
            Err(e.into())
        }
    }
}

/// Load a level descriptor from disk, detecting the encoding.
pub fn load_descriptor<P: AsRef<Path>>(path: P) -> Result<LevelDescriptor, ConfigError> {
    let path = path.as_ref();
    let bytes = fs::read(path)?;
    let source = path.display().to_string();

    let is_json = path.extension().map(|e| e == "json").unwrap_or(false);
    let desc = if is_json {
        serde_json::from_slice::<LevelDescriptor>(&bytes).map_err(|e| {
            log::error!("JSON parse error in {}: {}", source, e);
            ConfigError::from(e)
        })?
    } else if is_plain_ron(&bytes) {
        let contents = String::from_utf8(bytes)
            .map_err(|e| ConfigError::Validation(format!("invalid UTF-8: {}", e)))?;
        parse_ron(&source, &contents)?
    } else {
        let contents = decompress(&bytes)?;
        parse_ron(&source, &contents)?
    };

    validate_descriptor(&desc)?;
    log::debug!(
        "loaded {}: {} platforms, {} spiders, {} coins",
        source,
        desc.platforms.len(),
        desc.spiders.len(),
        desc.coins.len()
    );
    Ok(desc)
}

/// Load a descriptor from a RON string (embedded levels, tests)
pub fn load_descriptor_from_str(s: &str) -> Result<LevelDescriptor, ConfigError> {
    let desc = parse_ron("<string>", s)?;
    validate_descriptor(&desc)?;
    Ok(desc)
}

/// Load a descriptor from the legacy JSON format
pub fn load_descriptor_from_json(s: &str) -> Result<LevelDescriptor, ConfigError> {
    let desc: LevelDescriptor = serde_json::from_str(s)?;
    validate_descriptor(&desc)?;
    Ok(desc)
}

/// Pretty RON text for a descriptor
pub fn descriptor_to_ron(desc: &LevelDescriptor) -> Result<String, ConfigError> {
    let config = ron::ser::PrettyConfig::new()
        .depth_limit(3)
        .indentor("  ".to_string());
    Ok(ron::ser::to_string_pretty(desc, config)?)
}

/// Save a descriptor as RON, brotli-compressed unless `plain` is set
pub fn save_descriptor<P: AsRef<Path>>(desc: &LevelDescriptor, path: P, plain: bool) -> Result<(), ConfigError> {
    let ron_string = descriptor_to_ron(desc)?;

    if plain {
        fs::write(path, ron_string)?;
        return Ok(());
    }

    // Compress with brotli (quality 6, window 22)
    let mut compressed = Vec::new();
    brotli::BrotliCompress(&mut Cursor::new(ron_string.as_bytes()), &mut compressed, &brotli::enc::BrotliEncoderParams {
        quality: 6,
        lgwin: 22,
        ..Default::default()
    })
    .map_err(|e| ConfigError::Io(std::io::Error::new(
        std::io::ErrorKind::Other,
        format!("brotli compression failed: {}", e),
    )))?;

    fs::write(path, compressed)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::{DecorationDesc, PlatformDesc, Point};

    const MINIMAL_JSON: &str = r#"{
        "hero": {"x": 21, "y": 525},
        "spiders": [{"x": 121, "y": 399}],
        "platforms": [{"x": 0, "y": 546, "image": "ground"}],
        "decoration": [{"x": 85, "y": 504, "frame": 1}],
        "coins": [{"x": 231, "y": 462}],
        "key": {"x": 750, "y": 524},
        "door": {"x": 169, "y": 546}
    }"#;

    fn sample() -> LevelDescriptor {
        LevelDescriptor {
            hero: Point::new(21.0, 525.0),
            spiders: vec![Point::new(121.0, 399.0)],
            platforms: vec![PlatformDesc { x: 0.0, y: 546.0, image: "ground".to_string() }],
            decoration: vec![DecorationDesc { x: 85.0, y: 504.0, frame: 1 }],
            coins: vec![Point::new(231.0, 462.0)],
            key: Point::new(750.0, 524.0),
            door: Point::new(169.0, 546.0),
            door_boxes: Some(Point::new(400.0, 462.0)),
            door_switch: Some(Point::new(300.0, 504.0)),
            water: None,
        }
    }

    #[test]
    fn test_json_legacy_format() {
        let desc = load_descriptor_from_json(MINIMAL_JSON).unwrap();
        assert_eq!(desc.hero, Point::new(21.0, 525.0));
        assert_eq!(desc.platforms[0].image, "ground");
        assert!(desc.door_boxes.is_none());
        assert!(desc.water.is_none());
    }

    #[test]
    fn test_missing_required_field_is_error() {
        let json = r#"{"hero": {"x": 1, "y": 2}, "spiders": []}"#;
        let err = load_descriptor_from_json(json).unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn test_ron_uses_camel_case_fields() {
        let ron_text = descriptor_to_ron(&sample()).unwrap();
        assert!(ron_text.contains("doorBoxes"));
        assert!(!ron_text.contains("water"));
        assert_eq!(load_descriptor_from_str(&ron_text).unwrap(), sample());
    }

    #[test]
    fn test_unpaired_pull_door_rejected() {
        let mut desc = sample();
        desc.door_switch = None;
        assert!(matches!(validate_descriptor(&desc), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_non_finite_coordinate_rejected() {
        let mut desc = sample();
        desc.coins.push(Point::new(f32::NAN, 0.0));
        assert!(matches!(validate_descriptor(&desc), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_load_detects_all_encodings() {
        let dir = tempfile::tempdir().unwrap();

        let json_path = dir.path().join("level00.json");
        fs::write(&json_path, MINIMAL_JSON).unwrap();
        assert_eq!(load_descriptor(&json_path).unwrap().coins.len(), 1);

        let plain_path = dir.path().join("level01.ron");
        save_descriptor(&sample(), &plain_path, true).unwrap();
        assert_eq!(load_descriptor(&plain_path).unwrap(), sample());

        let packed_path = dir.path().join("level02.ron");
        save_descriptor(&sample(), &packed_path, false).unwrap();
        let bytes = fs::read(&packed_path).unwrap();
        assert!(!is_plain_ron(&bytes));
        assert_eq!(load_descriptor(&packed_path).unwrap(), sample());
    }

    #[test]
    fn test_garbage_ron_is_parse_error() {
        let err = load_descriptor_from_str("(hero: (x: 1.0, y:").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
