mod file;
mod grid;
mod sheets;
mod tile;

pub use file::{load_map, save_map, MapFile, MapFileError, TileRecord, BLOCK_SIZE};
pub use grid::{MapTile, MapTileError, TileRenderer, TileSetListener};
pub use sheets::{
    check_consistency, load_sheets, Sheet, SheetError, SheetMetrics, TileSheetsConfig,
    SHEETS_FILENAME,
};
pub use tile::Tile;
