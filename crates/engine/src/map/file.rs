//! Binary level layout, big-endian throughout:
//!
//! ```text
//! u16 len + bytes   sheets config path
//! i16 i16           width, height in tiles
//! u8 u8             tile width, tile height
//! i16               block count, one block per 256 columns
//! per block:
//!     i16           tile count
//!     per tile:     i32 sheet, i32 number in sheet, i32 column in block, i32 row
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{info, warn};

use crate::geom::SurfaceTile;
use crate::media::{Media, Medias};

use super::grid::{MapTile, MapTileError};
use super::sheets::{self, Sheet, SheetError};

/// Columns per block.
pub const BLOCK_SIZE: u32 = 256;

#[derive(Debug, Error)]
pub enum MapFileError {
    #[error("failed to read/write map file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("map file {path} has invalid format: {message}")]
    InvalidFormat { path: PathBuf, message: String },
    #[error("tile references sheet {sheet} but only {available} sheets are loaded")]
    SheetMissing { sheet: u32, available: usize },
    #[error(transparent)]
    Map(#[from] MapTileError),
    #[error(transparent)]
    Sheets(#[from] SheetError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileRecord {
    pub sheet: u32,
    pub number: u32,
    pub tx: u32,
    pub ty: u32,
}

/// Decoded map file, not yet bound to any sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapFile {
    pub sheets_config: String,
    pub width: u32,
    pub height: u32,
    pub tile_width: u32,
    pub tile_height: u32,
    pub tiles: Vec<TileRecord>,
}

impl MapFile {
    pub fn read(path: &Path) -> Result<Self, MapFileError> {
        let bytes = fs::read(path).map_err(|source| MapFileError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::decode(path, &bytes)
    }

    pub fn decode(path: &Path, bytes: &[u8]) -> Result<Self, MapFileError> {
        let mut reader = Reader {
            bytes,
            cursor: 0,
            path,
        };
        let sheets_config = reader.string()?;
        let width = reader.dimension("width")?;
        let height = reader.dimension("height")?;
        let tile_width = u32::from(reader.u8()?);
        let tile_height = u32::from(reader.u8()?);

        let blocks = reader.count("block count")?;
        let mut tiles = Vec::new();
        for block in 0..blocks {
            let count = reader.count("tile count")?;
            for _ in 0..count {
                let sheet = reader.non_negative("sheet")?;
                let number = reader.non_negative("tile number")?;
                let column = reader.non_negative("tile column")?;
                let ty = reader.non_negative("tile row")?;
                tiles.push(TileRecord {
                    sheet,
                    number,
                    tx: column + block * BLOCK_SIZE,
                    ty,
                });
            }
        }
        if reader.cursor != bytes.len() {
            return Err(invalid_format(path, "unexpected trailing bytes"));
        }

        Ok(Self {
            sheets_config,
            width,
            height,
            tile_width,
            tile_height,
            tiles,
        })
    }

    /// Builds the map with `sheets` installed. Without sheets the sheet index
    /// of each record is kept as stored.
    pub fn into_map(self, sheets: Vec<Sheet>) -> Result<MapTile, MapFileError> {
        let mut map = MapTile::new();
        map.create(self.tile_width, self.tile_height, self.width, self.height)?;
        let available = sheets.len();
        map.load_sheets(sheets)?;

        let tiles_per_sheet = map.tiles_per_sheet().filter(|count| *count > 0);
        let mut without_sheets = 0usize;
        for record in &self.tiles {
            match tiles_per_sheet {
                Some(tiles_per_sheet) => {
                    if record.sheet as usize >= available {
                        return Err(MapFileError::SheetMissing {
                            sheet: record.sheet,
                            available,
                        });
                    }
                    let number = record.sheet * tiles_per_sheet + record.number;
                    map.put_tile(record.tx, record.ty, number, record.sheet)?;
                }
                None => {
                    without_sheets += 1;
                    map.put_tile(record.tx, record.ty, record.number, record.sheet)?;
                }
            }
        }
        if without_sheets > 0 {
            warn!(tiles = without_sheets, "map_tiles_without_sheets");
        }
        Ok(map)
    }

    pub fn encode(map: &MapTile) -> Result<Vec<u8>, MapFileError> {
        let path = Path::new("<map>");
        if !map.is_created() {
            return Err(MapTileError::NotCreated.into());
        }
        let tiles_per_sheet = map.tiles_per_sheet().unwrap_or(0);
        let width = map.in_tile_width();
        let height = map.in_tile_height();

        let mut bytes = Vec::new();
        let config = map.sheets_config().map(Media::path).unwrap_or_default();
        write_string(&mut bytes, config, path)?;
        write_i16(&mut bytes, width, "width", path)?;
        write_i16(&mut bytes, height, "height", path)?;
        write_u8(&mut bytes, map.tile_width() as u32, "tile width", path)?;
        write_u8(&mut bytes, map.tile_height() as u32, "tile height", path)?;

        let blocks = width.div_ceil(BLOCK_SIZE);
        write_i16(&mut bytes, blocks, "block count", path)?;
        for block in 0..blocks {
            let start = block * BLOCK_SIZE;
            let end = (start + BLOCK_SIZE).min(width);
            let tiles = (start..end)
                .flat_map(|tx| (0..height).map(move |ty| (tx, ty)))
                .filter_map(|(tx, ty)| map.get_tile(tx as i32, ty as i32))
                .collect::<Vec<_>>();
            write_i16(&mut bytes, tiles.len() as u32, "tile count", path)?;
            for tile in tiles {
                let number = tile.number_in_sheet(tiles_per_sheet);
                write_i32(&mut bytes, tile.sheet());
                write_i32(&mut bytes, number);
                write_i32(&mut bytes, tile.in_tile_x() % BLOCK_SIZE);
                write_i32(&mut bytes, tile.in_tile_y());
            }
        }
        Ok(bytes)
    }
}

/// Writes `map` to `path` through a temporary sibling file.
pub fn save_map(map: &MapTile, path: &Path) -> Result<(), MapFileError> {
    let bytes = MapFile::encode(map)?;
    write_bytes_atomic(path, &bytes).map_err(|source| MapFileError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    info!(
        path = %path.display(),
        width = map.in_tile_width(),
        height = map.in_tile_height(),
        tiles = map.tiles_number(),
        "map_saved"
    );
    Ok(())
}

/// Reads a map file and loads the sheets config it references. An empty
/// config path loads the grid without sheets.
pub fn load_map(medias: &Medias, media: &Media) -> Result<MapTile, MapFileError> {
    let file = MapFile::read(media.file())?;
    let config = (!file.sheets_config.is_empty()).then(|| medias.create(&[&file.sheets_config]));
    let sheets = match &config {
        Some(config) => sheets::load_sheets(medias, config)?,
        None => Vec::new(),
    };
    let mut map = file.into_map(sheets)?;
    if let Some(config) = config {
        map.set_sheets_config(config);
    }
    info!(
        path = media.path(),
        width = map.in_tile_width(),
        height = map.in_tile_height(),
        tiles = map.tiles_number(),
        "map_loaded"
    );
    Ok(map)
}

struct Reader<'a> {
    bytes: &'a [u8],
    cursor: usize,
    path: &'a Path,
}

impl Reader<'_> {
    fn take<const N: usize>(&mut self) -> Result<[u8; N], MapFileError> {
        let end = self.cursor.saturating_add(N);
        let slice = self
            .bytes
            .get(self.cursor..end)
            .ok_or_else(|| invalid_format(self.path, "unexpected end of file"))?;
        self.cursor = end;
        let mut out = [0u8; N];
        out.copy_from_slice(slice);
        Ok(out)
    }

    fn u8(&mut self) -> Result<u8, MapFileError> {
        Ok(u8::from_be_bytes(self.take::<1>()?))
    }

    fn i16(&mut self) -> Result<i16, MapFileError> {
        Ok(i16::from_be_bytes(self.take::<2>()?))
    }

    fn i32(&mut self) -> Result<i32, MapFileError> {
        Ok(i32::from_be_bytes(self.take::<4>()?))
    }

    fn string(&mut self) -> Result<String, MapFileError> {
        let len = u16::from_be_bytes(self.take::<2>()?) as usize;
        let end = self.cursor.saturating_add(len);
        let raw = self
            .bytes
            .get(self.cursor..end)
            .ok_or_else(|| invalid_format(self.path, "unexpected end of file"))?;
        self.cursor = end;
        std::str::from_utf8(raw)
            .map(str::to_string)
            .map_err(|_| invalid_format(self.path, "invalid UTF-8 string"))
    }

    fn count(&mut self, field: &str) -> Result<u32, MapFileError> {
        let value = self.i16()?;
        u32::try_from(value)
            .map_err(|_| invalid_format(self.path, &format!("negative {field} {value}")))
    }

    fn dimension(&mut self, field: &str) -> Result<u32, MapFileError> {
        let value = self.count(field)?;
        if value == 0 {
            return Err(invalid_format(self.path, &format!("{field} is zero")));
        }
        Ok(value)
    }

    fn non_negative(&mut self, field: &str) -> Result<u32, MapFileError> {
        let value = self.i32()?;
        u32::try_from(value)
            .map_err(|_| invalid_format(self.path, &format!("negative {field} {value}")))
    }
}

fn write_string(target: &mut Vec<u8>, value: &str, path: &Path) -> Result<(), MapFileError> {
    let bytes = value.as_bytes();
    let len = u16::try_from(bytes.len())
        .map_err(|_| invalid_format(path, "string too long for u16 length"))?;
    target.extend_from_slice(&len.to_be_bytes());
    target.extend_from_slice(bytes);
    Ok(())
}

fn write_i16(target: &mut Vec<u8>, value: u32, field: &str, path: &Path) -> Result<(), MapFileError> {
    let value = i16::try_from(value)
        .map_err(|_| invalid_format(path, &format!("{field} {value} does not fit in i16")))?;
    target.extend_from_slice(&value.to_be_bytes());
    Ok(())
}

fn write_u8(target: &mut Vec<u8>, value: u32, field: &str, path: &Path) -> Result<(), MapFileError> {
    let value = u8::try_from(value)
        .map_err(|_| invalid_format(path, &format!("{field} {value} does not fit in u8")))?;
    target.push(value);
    Ok(())
}

fn write_i32(target: &mut Vec<u8>, value: u32) {
    target.extend_from_slice(&(value as i32).to_be_bytes());
}

fn invalid_format(path: &Path, message: &str) -> MapFileError {
    MapFileError::InvalidFormat {
        path: path.to_path_buf(),
        message: message.to_string(),
    }
}

fn write_bytes_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp_path = match path.file_name().and_then(|name| name.to_str()) {
        Some(name) => path.with_file_name(format!("{name}.tmp")),
        None => path.with_extension("tmp"),
    };
    fs::write(&tmp_path, bytes)?;
    if let Err(error) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(error);
    }
    Ok(())
}
