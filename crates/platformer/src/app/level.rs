use std::path::Path;

use tilecore::{
    load_map, AnimationConfig, ConfigError, FormulaConfig, MapFileError, MapTile, MapTileError,
    Medias, TileCollision,
};

pub(crate) const TILE_SIZE: u32 = 16;
pub(crate) const LEVEL_WIDTH: u32 = 64;
pub(crate) const LEVEL_HEIGHT: u32 = 15;

const GROUND: u32 = 0;
const BRICK: u32 = 1;
const SOLID_GROUP: &str = "solid";

/// Tops land from above only; sides block unless covered by another solid.
const FORMULAS: &str = r#"<formulas>
    <formula name="ground_top">
        <range output="Y" source="X" minX="0" maxX="15" minY="8" maxY="15"/>
        <function type="linear" a="0" b="16"/>
        <constraint orientation="top" group="solid"/>
    </formula>
    <formula name="block_left">
        <range output="X" source="Y" minX="0" maxX="7" minY="0" maxY="15"/>
        <function type="linear" a="0" b="0"/>
        <constraint orientation="left" group="solid"/>
    </formula>
    <formula name="block_right">
        <range output="X" source="Y" minX="8" maxX="15" minY="0" maxY="15"/>
        <function type="linear" a="0" b="16"/>
        <constraint orientation="right" group="solid"/>
    </formula>
</formulas>"#;

const ANIMATIONS: &str = r#"<animations>
    <animation name="idle" start="1" end="1" speed="0"/>
    <animation name="walk" start="2" end="4" speed="0.2" repeat="true"/>
    <animation name="turn" start="5" end="5" speed="0"/>
    <animation name="jump" start="6" end="6" speed="0"/>
</animations>"#;

/// Flat ground, a one tile step, a two tile wall and a closing wall on the
/// right edge.
pub(crate) fn build_level() -> Result<MapTile, MapTileError> {
    let mut map = MapTile::new();
    map.create(TILE_SIZE, TILE_SIZE, LEVEL_WIDTH, LEVEL_HEIGHT)?;
    for tx in 0..LEVEL_WIDTH {
        map.set_tile(tx, 0, GROUND)?;
    }
    for tx in 20..24 {
        map.set_tile(tx, 1, BRICK)?;
    }
    for ty in 1..3 {
        map.set_tile(36, ty, BRICK)?;
    }
    for ty in 1..LEVEL_HEIGHT {
        map.set_tile(LEVEL_WIDTH - 1, ty, BRICK)?;
    }
    Ok(map)
}

/// Loads a level saved in the binary map format. Sheets referenced by the
/// file resolve against the level's directory.
pub(crate) fn load_level(path: &Path) -> Result<MapTile, MapFileError> {
    let medias = Medias::new(path.parent().unwrap_or_else(|| Path::new(".")));
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    load_map(&medias, &medias.create(&[&name]))
}

pub(crate) fn build_collision() -> Result<TileCollision, ConfigError> {
    let formulas = FormulaConfig::parse(Path::new("formulas.xml"), FORMULAS)?;
    let mut collision = TileCollision::new(formulas);
    collision.add_group(
        SOLID_GROUP,
        [GROUND, BRICK],
        &["ground_top", "block_left", "block_right"],
    )?;
    Ok(collision)
}

pub(crate) fn animations() -> Result<AnimationConfig, ConfigError> {
    AnimationConfig::parse(Path::new("mario.xml"), ANIMATIONS)
}
