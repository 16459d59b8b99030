use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use crate::media::{Media, Medias};
use crate::xml::{self, XmlDoc, XmlError};

pub const SHEETS_FILENAME: &str = "sheets.xml";
const NODE_SHEETS: &str = "sheets";
const NODE_TILE_SIZE: &str = "tileSize";
const NODE_SHEET: &str = "sheet";

#[derive(Debug, Error)]
pub enum SheetError {
    #[error(
        "sheet '{sheet}' has {width}x{height} tiles, expected {expected_width}x{expected_height}"
    )]
    TileSizeMismatch {
        sheet: String,
        expected_width: u32,
        expected_height: u32,
        width: u32,
        height: u32,
    },
    #[error("sheet '{sheet}' holds {actual} tiles, expected {expected}")]
    TileCountMismatch {
        sheet: String,
        expected: u32,
        actual: u32,
    },
    #[error("sheet '{sheet}' is smaller than one {tile_width}x{tile_height} tile")]
    EmptySheet {
        sheet: String,
        tile_width: u32,
        tile_height: u32,
    },
    #[error("failed to read sheet image {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error(transparent)]
    Xml(#[from] XmlError),
}

/// An image cut into equally sized tiles, addressed row by row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sheet {
    name: String,
    tile_width: u32,
    tile_height: u32,
    tiles_horizontal: u32,
    tiles_vertical: u32,
}

impl Sheet {
    pub fn new(
        name: impl Into<String>,
        tile_width: u32,
        tile_height: u32,
        tiles_horizontal: u32,
        tiles_vertical: u32,
    ) -> Self {
        Self {
            name: name.into(),
            tile_width,
            tile_height,
            tiles_horizontal,
            tiles_vertical,
        }
    }

    /// Reads only the image header to size the tile grid.
    pub fn from_image(
        name: impl Into<String>,
        file: &Path,
        tile_width: u32,
        tile_height: u32,
    ) -> Result<Self, SheetError> {
        let name = name.into();
        let (width, height) = image::image_dimensions(file).map_err(|source| SheetError::Image {
            path: file.to_path_buf(),
            source,
        })?;
        if tile_width == 0 || tile_height == 0 || width < tile_width || height < tile_height {
            return Err(SheetError::EmptySheet {
                sheet: name,
                tile_width,
                tile_height,
            });
        }
        Ok(Self::new(
            name,
            tile_width,
            tile_height,
            width / tile_width,
            height / tile_height,
        ))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tile_width(&self) -> u32 {
        self.tile_width
    }

    pub fn tile_height(&self) -> u32 {
        self.tile_height
    }

    pub fn tiles_horizontal(&self) -> u32 {
        self.tiles_horizontal
    }

    pub fn tiles_vertical(&self) -> u32 {
        self.tiles_vertical
    }

    pub fn tiles_number(&self) -> u32 {
        self.tiles_horizontal * self.tiles_vertical
    }

    /// Pixel origin of a tile index inside this sheet image.
    pub fn tile_origin(&self, number_in_sheet: u32) -> Option<(u32, u32)> {
        if self.tiles_horizontal == 0 || number_in_sheet >= self.tiles_number() {
            return None;
        }
        Some((
            number_in_sheet % self.tiles_horizontal * self.tile_width,
            number_in_sheet / self.tiles_horizontal * self.tile_height,
        ))
    }
}

/// Shape shared by every sheet of one map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SheetMetrics {
    pub tile_width: u32,
    pub tile_height: u32,
    pub tiles_per_sheet: u32,
}

/// Checks that all sheets agree on tile size and tile count. `None` for an
/// empty list.
pub fn check_consistency(sheets: &[Sheet]) -> Result<Option<SheetMetrics>, SheetError> {
    let Some(first) = sheets.first() else {
        return Ok(None);
    };
    let metrics = SheetMetrics {
        tile_width: first.tile_width,
        tile_height: first.tile_height,
        tiles_per_sheet: first.tiles_number(),
    };
    for sheet in sheets {
        check_tile_size(sheet, metrics.tile_width, metrics.tile_height)?;
        if sheet.tiles_number() != metrics.tiles_per_sheet {
            return Err(SheetError::TileCountMismatch {
                sheet: sheet.name.clone(),
                expected: metrics.tiles_per_sheet,
                actual: sheet.tiles_number(),
            });
        }
    }
    Ok(Some(metrics))
}

pub(crate) fn check_tile_size(sheet: &Sheet, width: u32, height: u32) -> Result<(), SheetError> {
    if sheet.tile_width != width || sheet.tile_height != height {
        return Err(SheetError::TileSizeMismatch {
            sheet: sheet.name.clone(),
            expected_width: width,
            expected_height: height,
            width: sheet.tile_width,
            height: sheet.tile_height,
        });
    }
    Ok(())
}

/// Ordered sheet image names plus the tile size they share.
///
/// ```xml
/// <sheets>
///     <tileSize width="16" height="16"/>
///     <sheet>0.png</sheet>
///     <sheet>1.png</sheet>
/// </sheets>
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileSheetsConfig {
    tile_width: u32,
    tile_height: u32,
    sheets: Vec<String>,
}

impl TileSheetsConfig {
    pub fn new(tile_width: u32, tile_height: u32, sheets: Vec<String>) -> Self {
        Self {
            tile_width,
            tile_height,
            sheets,
        }
    }

    pub fn load(media: &Media) -> Result<Self, SheetError> {
        let text = xml::read_text(media.file())?;
        Self::parse(media.file(), &text)
    }

    pub fn parse(path: &Path, text: &str) -> Result<Self, SheetError> {
        let doc = xml::parse(path, text)?;
        let xml = XmlDoc::new(path, &doc);
        let root = xml.root(NODE_SHEETS)?;

        let size = xml.child(root, NODE_TILE_SIZE)?;
        let tile_width = xml.attribute::<u32>(size, "width")?;
        let tile_height = xml.attribute::<u32>(size, "height")?;
        if tile_width == 0 {
            return Err(xml.invalid(size, "width", "0").into());
        }
        if tile_height == 0 {
            return Err(xml.invalid(size, "height", "0").into());
        }

        let sheets = xml::children(root, NODE_SHEET)
            .map(|node| xml.text(node).map(str::to_string))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self::new(tile_width, tile_height, sheets))
    }

    pub fn to_xml(&self) -> String {
        let mut out = String::new();
        out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        out.push_str("<sheets>\n");
        out.push_str(&format!(
            "    <tileSize width=\"{}\" height=\"{}\"/>\n",
            self.tile_width, self.tile_height
        ));
        for sheet in &self.sheets {
            out.push_str(&format!("    <sheet>{}</sheet>\n", xml::escape(sheet)));
        }
        out.push_str("</sheets>\n");
        out
    }

    pub fn tile_width(&self) -> u32 {
        self.tile_width
    }

    pub fn tile_height(&self) -> u32 {
        self.tile_height
    }

    pub fn sheets(&self) -> &[String] {
        &self.sheets
    }
}

/// Loads the config at `config` and every sheet image it lists, resolved next
/// to the config file.
pub fn load_sheets(medias: &Medias, config: &Media) -> Result<Vec<Sheet>, SheetError> {
    let sheets_config = TileSheetsConfig::load(config)?;
    let sheets = sheets_config
        .sheets
        .iter()
        .map(|name| {
            let media = medias.sibling(config, name);
            Sheet::from_image(
                name.as_str(),
                media.file(),
                sheets_config.tile_width,
                sheets_config.tile_height,
            )
        })
        .collect::<Result<Vec<_>, _>>()?;
    check_consistency(&sheets)?;

    info!(
        config = config.path(),
        sheets = sheets.len(),
        tile_width = sheets_config.tile_width,
        tile_height = sheets_config.tile_height,
        "sheets_loaded"
    );
    Ok(sheets)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use image::RgbaImage;
    use tempfile::TempDir;

    use super::*;

    fn write_png(path: &Path, width: u32, height: u32) {
        RgbaImage::new(width, height).save(path).expect("write png");
    }

    #[test]
    fn parses_ordered_sheet_list() {
        let text = r#"<sheets>
            <tileSize width="16" height="8"/>
            <sheet>ground.png</sheet>
            <sheet> sky.png </sheet>
        </sheets>"#;
        let config = TileSheetsConfig::parse(Path::new("sheets.xml"), text).expect("parse");
        assert_eq!((config.tile_width(), config.tile_height()), (16, 8));
        assert_eq!(config.sheets(), ["ground.png", "sky.png"]);

        let reparsed =
            TileSheetsConfig::parse(Path::new("sheets.xml"), &config.to_xml()).expect("reparse");
        assert_eq!(reparsed, config);
    }

    #[test]
    fn missing_tile_size_is_reported() {
        let err = TileSheetsConfig::parse(Path::new("s.xml"), "<sheets><sheet>a.png</sheet></sheets>")
            .expect_err("missing node");
        assert!(matches!(
            err,
            SheetError::Xml(XmlError::MissingNode { node: "tileSize", .. })
        ));
    }

    #[test]
    fn zero_tile_size_is_invalid() {
        let err = TileSheetsConfig::parse(
            Path::new("s.xml"),
            r#"<sheets><tileSize width="0" height="16"/></sheets>"#,
        )
        .expect_err("zero width");
        assert!(matches!(
            err,
            SheetError::Xml(XmlError::InvalidValue { field: "width", .. })
        ));
    }

    #[test]
    fn consistency_rejects_mixed_sheets() {
        let a = Sheet::new("a", 16, 16, 2, 2);
        let b = Sheet::new("b", 8, 16, 2, 2);
        let c = Sheet::new("c", 16, 16, 4, 1);
        let d = Sheet::new("d", 16, 16, 1, 2);

        assert_eq!(
            check_consistency(&[a.clone(), c]).expect("same count"),
            Some(SheetMetrics {
                tile_width: 16,
                tile_height: 16,
                tiles_per_sheet: 4,
            })
        );
        assert!(matches!(
            check_consistency(&[a.clone(), b]),
            Err(SheetError::TileSizeMismatch { .. })
        ));
        assert!(matches!(
            check_consistency(&[a, d]),
            Err(SheetError::TileCountMismatch {
                expected: 4,
                actual: 2,
                ..
            })
        ));
        assert_eq!(check_consistency(&[]).expect("empty"), None);
    }

    #[test]
    fn tile_origin_walks_rows() {
        let sheet = Sheet::new("a", 16, 8, 3, 2);
        assert_eq!(sheet.tile_origin(0), Some((0, 0)));
        assert_eq!(sheet.tile_origin(4), Some((16, 8)));
        assert_eq!(sheet.tile_origin(6), None);
    }

    #[test]
    fn loads_images_next_to_config() {
        let temp = TempDir::new().expect("temp");
        let dir = temp.path().join("tiles");
        fs::create_dir_all(&dir).expect("mkdir");
        write_png(&dir.join("0.png"), 32, 32);
        write_png(&dir.join("1.png"), 64, 16);
        let config = TileSheetsConfig::new(16, 16, vec!["0.png".into(), "1.png".into()]);
        fs::write(dir.join(SHEETS_FILENAME), config.to_xml()).expect("write config");

        let medias = Medias::new(temp.path());
        let sheets = load_sheets(&medias, &medias.create(&["tiles", SHEETS_FILENAME]))
            .expect("load");
        assert_eq!(sheets.len(), 2);
        assert_eq!(sheets[0].tiles_horizontal(), 2);
        assert_eq!(sheets[1].tiles_horizontal(), 4);
        assert_eq!(sheets[1].tiles_vertical(), 1);
    }

    #[test]
    fn missing_image_names_the_file() {
        let temp = TempDir::new().expect("temp");
        let config = TileSheetsConfig::new(16, 16, vec!["gone.png".into()]);
        fs::write(temp.path().join(SHEETS_FILENAME), config.to_xml()).expect("write config");

        let medias = Medias::new(temp.path());
        let err = load_sheets(&medias, &medias.create(&[SHEETS_FILENAME])).expect_err("missing");
        match err {
            SheetError::Image { path, .. } => assert!(path.ends_with("gone.png")),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn image_smaller_than_tile_is_empty() {
        let temp = TempDir::new().expect("temp");
        let file = temp.path().join("tiny.png");
        write_png(&file, 8, 8);
        assert!(matches!(
            Sheet::from_image("tiny.png", &file, 16, 16),
            Err(SheetError::EmptySheet { .. })
        ));
    }
}
