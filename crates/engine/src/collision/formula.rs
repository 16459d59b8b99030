use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;

use crate::config::ConfigError;
use crate::xml::{self, XmlDoc};

const NODE_FORMULAS: &str = "formulas";
const NODE_FORMULA: &str = "formula";
const NODE_RANGE: &str = "range";
const NODE_FUNCTION: &str = "function";
const NODE_CONSTRAINT: &str = "constraint";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Axis {
    X,
    Y,
}

impl FromStr for Axis {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, ()> {
        match value {
            "X" | "x" => Ok(Axis::X),
            "Y" | "y" => Ok(Axis::Y),
            _ => Err(()),
        }
    }
}

/// Neighbour direction, `Top` being towards increasing y.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Orientation {
    Top,
    Bottom,
    Left,
    Right,
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Orientation {
    pub fn offset(self) -> (i32, i32) {
        match self {
            Orientation::Top => (0, 1),
            Orientation::Bottom => (0, -1),
            Orientation::Left => (-1, 0),
            Orientation::Right => (1, 0),
            Orientation::TopLeft => (-1, 1),
            Orientation::TopRight => (1, 1),
            Orientation::BottomLeft => (-1, -1),
            Orientation::BottomRight => (1, -1),
        }
    }
}

impl FromStr for Orientation {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, ()> {
        match value.to_ascii_lowercase().as_str() {
            "top" => Ok(Orientation::Top),
            "bottom" => Ok(Orientation::Bottom),
            "left" => Ok(Orientation::Left),
            "right" => Ok(Orientation::Right),
            "top_left" => Ok(Orientation::TopLeft),
            "top_right" => Ok(Orientation::TopRight),
            "bottom_left" => Ok(Orientation::BottomLeft),
            "bottom_right" => Ok(Orientation::BottomRight),
            _ => Err(()),
        }
    }
}

/// In-tile area where a formula applies. Bounds are inclusive pixel offsets
/// from the tile origin; `source` is the axis fed to the function and
/// `output` the axis it corrects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollisionRange {
    pub output: Axis,
    pub source: Axis,
    pub min_x: i32,
    pub max_x: i32,
    pub min_y: i32,
    pub max_y: i32,
}

impl CollisionRange {
    pub fn contains(&self, local_x: f64, local_y: f64) -> bool {
        local_x >= f64::from(self.min_x)
            && local_x <= f64::from(self.max_x)
            && local_y >= f64::from(self.min_y)
            && local_y <= f64::from(self.max_y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CollisionFunction {
    Linear { a: f64, b: f64 },
}

impl CollisionFunction {
    pub fn compute(&self, input: f64) -> f64 {
        match *self {
            CollisionFunction::Linear { a, b } => a * input + b,
        }
    }
}

/// Neighbour groups that disable a formula: when the neighbour in a listed
/// orientation belongs to one of the listed groups, the formula is skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollisionConstraint {
    excluded: BTreeMap<Orientation, Vec<String>>,
}

impl CollisionConstraint {
    pub fn add(&mut self, orientation: Orientation, group: impl Into<String>) {
        self.excluded.entry(orientation).or_default().push(group.into());
    }

    pub fn excluded(&self, orientation: Orientation) -> &[String] {
        self.excluded
            .get(&orientation)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn orientations(&self) -> impl Iterator<Item = Orientation> + '_ {
        self.excluded.keys().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.excluded.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CollisionFormula {
    name: String,
    range: CollisionRange,
    function: CollisionFunction,
    constraint: CollisionConstraint,
}

impl CollisionFormula {
    pub fn new(
        name: impl Into<String>,
        range: CollisionRange,
        function: CollisionFunction,
        constraint: CollisionConstraint,
    ) -> Self {
        Self {
            name: name.into(),
            range,
            function,
            constraint,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn range(&self) -> &CollisionRange {
        &self.range
    }

    pub fn function(&self) -> &CollisionFunction {
        &self.function
    }

    pub fn constraint(&self) -> &CollisionConstraint {
        &self.constraint
    }
}

/// Named collision formulas.
///
/// ```xml
/// <formulas>
///     <formula name="ground_top">
///         <range output="Y" source="X" minX="0" maxX="15" minY="0" maxY="15"/>
///         <function type="linear" a="0" b="16"/>
///         <constraint orientation="top" group="ground"/>
///     </formula>
/// </formulas>
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormulaConfig {
    formulas: BTreeMap<String, CollisionFormula>,
}

impl FormulaConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = xml::read_text(path)?;
        Self::parse(path, &text)
    }

    pub fn parse(path: &Path, text: &str) -> Result<Self, ConfigError> {
        let doc = xml::parse(path, text)?;
        let xml = XmlDoc::new(path, &doc);
        let root = xml.root(NODE_FORMULAS)?;

        let mut config = Self::default();
        for node in xml::children(root, NODE_FORMULA) {
            let name = xml.attribute::<String>(node, "name")?;

            let range_node = xml.child(node, NODE_RANGE)?;
            let range = CollisionRange {
                output: xml.attribute(range_node, "output")?,
                source: xml.attribute(range_node, "source")?,
                min_x: xml.attribute(range_node, "minX")?,
                max_x: xml.attribute(range_node, "maxX")?,
                min_y: xml.attribute(range_node, "minY")?,
                max_y: xml.attribute(range_node, "maxY")?,
            };

            let function_node = xml.child(node, NODE_FUNCTION)?;
            let kind = xml.attribute::<String>(function_node, "type")?;
            let function = match kind.to_ascii_lowercase().as_str() {
                "linear" => CollisionFunction::Linear {
                    a: xml.attribute(function_node, "a")?,
                    b: xml.attribute(function_node, "b")?,
                },
                _ => return Err(xml.invalid(function_node, "type", &kind).into()),
            };

            let mut constraint = CollisionConstraint::default();
            for constraint_node in xml::children(node, NODE_CONSTRAINT) {
                let orientation = xml.attribute::<Orientation>(constraint_node, "orientation")?;
                let group = xml.attribute::<String>(constraint_node, "group")?;
                constraint.add(orientation, group);
            }

            let formula = CollisionFormula::new(name.clone(), range, function, constraint);
            if config.formulas.insert(name.clone(), formula).is_some() {
                return Err(ConfigError::DuplicateName {
                    path: path.to_path_buf(),
                    kind: "formula",
                    name,
                });
            }
        }
        Ok(config)
    }

    pub fn insert(&mut self, formula: CollisionFormula) {
        self.formulas.insert(formula.name.clone(), formula);
    }

    pub fn formula(&self, name: &str) -> Option<&CollisionFormula> {
        self.formulas.get(name)
    }

    pub fn formulas(&self) -> impl Iterator<Item = &CollisionFormula> {
        self.formulas.values()
    }

    pub fn len(&self) -> usize {
        self.formulas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.formulas.is_empty()
    }
}
