//! Cell-level value rules shared by the worksheet parsers.

use crate::workbook::Cell;
use once_cell::sync::Lazy;
use regex::Regex;

static NAME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z0-9_]+$").expect("valid regex"));
static COORD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^-?\d+(\.\d+)?\s*(px|%)$").expect("valid regex"));
static HEX_COLOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#([0-9a-fA-F]{3}|[0-9a-fA-F]{6})$").expect("valid regex"));

/// Named colors from CSS Color Module Level 4.
const CSS_COLOR_NAMES: &[&str] = &[
    "aliceblue", "antiquewhite", "aqua", "aquamarine", "azure", "beige", "bisque", "black",
    "blanchedalmond", "blue", "blueviolet", "brown", "burlywood", "cadetblue", "chartreuse",
    "chocolate", "coral", "cornflowerblue", "cornsilk", "crimson", "cyan", "darkblue",
    "darkcyan", "darkgoldenrod", "darkgray", "darkgreen", "darkgrey", "darkkhaki",
    "darkmagenta", "darkolivegreen", "darkorange", "darkorchid", "darkred", "darksalmon",
    "darkseagreen", "darkslateblue", "darkslategray", "darkslategrey", "darkturquoise",
    "darkviolet", "deeppink", "deepskyblue", "dimgray", "dimgrey", "dodgerblue", "firebrick",
    "floralwhite", "forestgreen", "fuchsia", "gainsboro", "ghostwhite", "gold", "goldenrod",
    "gray", "green", "greenyellow", "grey", "honeydew", "hotpink", "indianred", "indigo",
    "ivory", "khaki", "lavender", "lavenderblush", "lawngreen", "lemonchiffon", "lightblue",
    "lightcoral", "lightcyan", "lightgoldenrodyellow", "lightgray", "lightgreen", "lightgrey",
    "lightpink", "lightsalmon", "lightseagreen", "lightskyblue", "lightslategray",
    "lightslategrey", "lightsteelblue", "lightyellow", "lime", "limegreen", "linen", "magenta",
    "maroon", "mediumaquamarine", "mediumblue", "mediumorchid", "mediumpurple",
    "mediumseagreen", "mediumslateblue", "mediumspringgreen", "mediumturquoise",
    "mediumvioletred", "midnightblue", "mintcream", "mistyrose", "moccasin", "navajowhite",
    "navy", "oldlace", "olive", "olivedrab", "orange", "orangered", "orchid", "palegoldenrod",
    "palegreen", "paleturquoise", "palevioletred", "papayawhip", "peachpuff", "peru", "pink",
    "plum", "powderblue", "purple", "rebeccapurple", "red", "rosybrown", "royalblue",
    "saddlebrown", "salmon", "sandybrown", "seagreen", "seashell", "sienna", "silver",
    "skyblue", "slateblue", "slategray", "slategrey", "snow", "springgreen", "steelblue", "tan",
    "teal", "thistle", "tomato", "turquoise", "violet", "wheat", "white", "whitesmoke",
    "yellow", "yellowgreen",
];

/// Parses a Y/N style flag. Returns `None` for anything unrecognized,
/// including an empty string.
pub fn parse_bool(text: &str) -> Option<bool> {
    match text.trim().to_ascii_uppercase().as_str() {
        "Y" | "YES" | "T" | "TRUE" | "1" => Some(true),
        "N" | "NO" | "F" | "FALSE" | "0" => Some(false),
        _ => None,
    }
}

/// Letters, digits and underscore only.
pub fn is_valid_name(name: &str) -> bool {
    NAME_RE.is_match(name)
}

pub fn is_valid_color(color: &str) -> bool {
    let color = color.trim();
    HEX_COLOR_RE.is_match(color) || CSS_COLOR_NAMES.contains(&color.to_ascii_lowercase().as_str())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoordError {
    Empty,
    Invalid(String),
}

/// Normalizes a coordinate cell into a CSS length.
///
/// Numbers in [-1, 1] are fractions of the stage (`0.5` -> `50%`); `0` is
/// `0px`. Text must carry an explicit `px` or `%` unit.
pub fn parse_coord(cell: &Cell) -> Result<String, CoordError> {
    match cell {
        Cell::Empty => Err(CoordError::Empty),
        Cell::Text(text) if text.trim().is_empty() => Err(CoordError::Empty),
        Cell::Number(value) if *value == 0.0 => Ok("0px".to_string()),
        Cell::Number(value) if (-1.0..=1.0).contains(value) => {
            let percent = value * 100.0;
            if (percent - percent.round()).abs() < 1e-9 {
                Ok(format!("{}%", percent.round() as i64))
            } else {
                Ok(format!("{percent:.2}%"))
            }
        }
        other => {
            let text = other.as_text().unwrap_or_default().trim().to_string();
            if COORD_RE.is_match(&text) {
                Ok(text)
            } else {
                Err(CoordError::Invalid(text))
            }
        }
    }
}

/// Outcome of reading a millisecond value.
#[derive(Debug, Clone, PartialEq)]
pub enum NumberCheck {
    Missing,
    Value(f64),
    NonNumeric(String),
    OutOfRange(f64),
}

/// Reads a non-negative (or, with `zero_allowed = false`, positive) number.
pub fn check_non_negative(cell: &Cell, zero_allowed: bool) -> NumberCheck {
    if cell.is_blank() {
        return NumberCheck::Missing;
    }
    match cell.as_number() {
        None => NumberCheck::NonNumeric(cell.to_string()),
        Some(value) if value < 0.0 || (!zero_allowed && value == 0.0) => {
            NumberCheck::OutOfRange(value)
        }
        Some(value) => NumberCheck::Value(value),
    }
}

/// Splits a comma list, trimming items and dropping empty ones.
pub fn split_names(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Removes repeated items, keeping the first occurrence. The flag tells
/// whether anything was removed.
pub fn dedup_names(names: Vec<String>) -> (Vec<String>, bool) {
    let original_len = names.len();
    let mut unique: Vec<String> = Vec::with_capacity(original_len);
    for name in names {
        if !unique.contains(&name) {
            unique.push(name);
        }
    }
    let had_duplicates = unique.len() != original_len;
    (unique, had_duplicates)
}
