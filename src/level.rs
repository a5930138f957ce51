//! Level data
//!
//! A level is the pre-parsed content the simulation starts from: terrain
//! pieces (triangles in local space plus a placement), the player spawn
//! point, enemy spawns and coins. Stored as RON; `save_level` writes it
//! brotli-compressed and `load_level` accepts either form.

use std::fs;
use std::io::Cursor;
use std::path::Path;

use glam::{Mat4, Quat, Vec3};
use serde::{Serialize, Deserialize};
use thiserror::Error;

use crate::game::components::AiState;
use crate::geometry::{Terrain, TriangleMesh};

/// Limits for level validation (prevents malicious files from causing issues)
pub mod limits {
    /// Maximum number of terrain pieces in a level
    pub const MAX_TERRAIN_PIECES: usize = 1024;
    /// Maximum triangles in one terrain piece
    pub const MAX_TRIANGLES_PER_PIECE: usize = 65536;
    /// Maximum enemies + coins
    pub const MAX_SPAWNS: usize = 16384;
    /// Maximum coordinate value (prevents overflow issues)
    pub const MAX_COORD: f32 = 1_000_000.0;
}

/// Error type for level loading
#[derive(Debug, Error)]
pub enum LevelError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("Serialize error: {0}")]
    Serialize(#[from] ron::Error),
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Where a terrain piece sits in the world.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Placement {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: f32,
}

impl Default for Placement {
    fn default() -> Self {
        Self { translation: Vec3::ZERO, rotation: Quat::IDENTITY, scale: 1.0 }
    }
}

impl Placement {
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(Vec3::splat(self.scale), self.rotation.normalize(), self.translation)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerrainPiece {
    /// Local-space triangles
    pub triangles: Vec<[Vec3; 3]>,
    #[serde(default)]
    pub placement: Placement,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnemySpawn {
    pub position: Vec3,
    #[serde(default)]
    pub state: AiState,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelData {
    pub spawn_point: Vec3,
    #[serde(default)]
    pub terrain: Vec<TerrainPiece>,
    #[serde(default)]
    pub enemies: Vec<EnemySpawn>,
    #[serde(default)]
    pub coins: Vec<Vec3>,
}

impl LevelData {
    /// Bake every piece into a world-space mesh.
    pub fn bake_terrain(&self) -> Terrain {
        Terrain::from_pieces(
            self.terrain
                .iter()
                .map(|piece| TriangleMesh::bake(&piece.triangles, piece.placement.to_matrix()))
                .collect(),
        )
    }
}

/// Check if a float is valid (not NaN or Inf)
fn is_valid_float(f: f32) -> bool {
    f.is_finite() && f.abs() <= limits::MAX_COORD
}

fn validate_point(p: Vec3, context: &str) -> Result<(), String> {
    if p.to_array().iter().all(|c| is_valid_float(*c)) {
        Ok(())
    } else {
        Err(format!("{}: invalid coordinate {:?}", context, p))
    }
}

fn validate_piece(piece: &TerrainPiece, idx: usize) -> Result<(), String> {
    let context = format!("terrain[{}]", idx);

    if piece.triangles.len() > limits::MAX_TRIANGLES_PER_PIECE {
        return Err(format!(
            "{}: too many triangles ({} > {})",
            context,
            piece.triangles.len(),
            limits::MAX_TRIANGLES_PER_PIECE
        ));
    }

    let placement = &piece.placement;
    validate_point(placement.translation, &format!("{} translation", context))?;
    if !(placement.scale.is_finite() && placement.scale > 0.0) {
        return Err(format!("{}: scale must be positive, got {}", context, placement.scale));
    }
    let q = placement.rotation;
    if !q.is_finite() || q.length_squared() < 1e-6 {
        return Err(format!("{}: invalid rotation {:?}", context, q));
    }

    for (t, tri) in piece.triangles.iter().enumerate() {
        for v in tri {
            validate_point(*v, &format!("{} triangle[{}]", context, t))?;
        }
    }
    Ok(())
}

/// Validate level data after loading
pub fn validate_level(level: &LevelData) -> Result<(), LevelError> {
    if level.terrain.len() > limits::MAX_TERRAIN_PIECES {
        return Err(LevelError::Validation(format!(
            "too many terrain pieces ({} > {})",
            level.terrain.len(),
            limits::MAX_TERRAIN_PIECES
        )));
    }
    let spawns = level.enemies.len() + level.coins.len();
    if spawns > limits::MAX_SPAWNS {
        return Err(LevelError::Validation(format!(
            "too many spawns ({} > {})",
            spawns,
            limits::MAX_SPAWNS
        )));
    }

    validate_point(level.spawn_point, "spawn_point").map_err(LevelError::Validation)?;
    for (idx, piece) in level.terrain.iter().enumerate() {
        validate_piece(piece, idx).map_err(LevelError::Validation)?;
    }
    for (idx, enemy) in level.enemies.iter().enumerate() {
        validate_point(enemy.position, &format!("enemies[{}]", idx)).map_err(LevelError::Validation)?;
    }
    for (idx, coin) in level.coins.iter().enumerate() {
        validate_point(*coin, &format!("coins[{}]", idx)).map_err(LevelError::Validation)?;
    }

    Ok(())
}

/// Load a level from a RON file (supports both compressed and uncompressed)
pub fn load_level<P: AsRef<Path>>(path: P) -> Result<LevelData, LevelError> {
    let path = path.as_ref();
    let bytes = fs::read(path)?;

    // RON text starts with '(' or whitespace; anything else is brotli
    let is_plain_ron = bytes
        .first()
        .map(|&b| b == b'(' || b.is_ascii_whitespace())
        .unwrap_or(false);

    let contents = if is_plain_ron {
        String::from_utf8(bytes).map_err(|e| {
            LevelError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, format!("invalid UTF-8: {}", e)))
        })?
    } else {
        let mut decompressed = Vec::new();
        brotli::BrotliDecompress(&mut Cursor::new(&bytes), &mut decompressed).map_err(|e| {
            LevelError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("brotli decompression failed: {}", e),
            ))
        })?;
        String::from_utf8(decompressed).map_err(|e| {
            LevelError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("invalid UTF-8 after decompression: {}", e),
            ))
        })?
    };

    let level = load_level_from_str(&contents).map_err(|e| {
        if let LevelError::Parse(ref spanned) = e {
            log::error!("RON parse error in {}: {}", path.display(), spanned);
        }
        e
    })?;
    log::info!(
        "loaded level {} ({} terrain pieces, {} enemies, {} coins)",
        path.display(),
        level.terrain.len(),
        level.enemies.len(),
        level.coins.len()
    );
    Ok(level)
}

/// Load a level from a RON string (for embedded levels or testing)
pub fn load_level_from_str(s: &str) -> Result<LevelData, LevelError> {
    let level: LevelData = ron::from_str(s)?;
    validate_level(&level)?;
    Ok(level)
}

pub fn level_to_ron_string(level: &LevelData) -> Result<String, LevelError> {
    let config = ron::ser::PrettyConfig::new()
        .depth_limit(4)
        .indentor("  ".to_string());
    Ok(ron::ser::to_string_pretty(level, config)?)
}

/// Save a level to a compressed RON file (brotli)
pub fn save_level<P: AsRef<Path>>(level: &LevelData, path: P) -> Result<(), LevelError> {
    let ron_string = level_to_ron_string(level)?;

    // Quality 6, window 22
    let mut compressed = Vec::new();
    brotli::BrotliCompress(
        &mut Cursor::new(ron_string.as_bytes()),
        &mut compressed,
        &brotli::enc::BrotliEncoderParams { quality: 6, lgwin: 22, ..Default::default() },
    )
    .map_err(|e| {
        LevelError::Io(std::io::Error::new(
            std::io::ErrorKind::Other,
            format!("brotli compression failed: {}", e),
        ))
    })?;

    fs::write(path, compressed)?;
    Ok(())
}
